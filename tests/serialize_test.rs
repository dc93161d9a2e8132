use serde_json::json;
use yamlhost::expr::ast::{Accessor, AssetKind, Expr, InterpPart, Num};
use yamlhost::expr::serialize::{expr_from_json, expr_to_json};

fn roundtrip(expr: Expr) {
    let serialized = expr_to_json(&expr);
    let restored = expr_from_json(&serialized).expect("deserialization should succeed");
    assert_eq!(restored, expr, "round-trip mismatch for {:?}", serialized);
}

#[test]
fn test_serialize_literals() {
    assert_eq!(expr_to_json(&Expr::Null), json!({"t": "null"}));
    assert_eq!(expr_to_json(&Expr::Bool(true)), json!({"t": "bool", "v": true}));
    assert_eq!(
        expr_to_json(&Expr::Number(Num::Int(-42))),
        json!({"t": "number", "v": -42})
    );
    assert_eq!(
        expr_to_json(&Expr::Number(Num::Float(3.5))),
        json!({"t": "number", "v": 3.5})
    );
    assert_eq!(
        expr_to_json(&Expr::String("US".to_string())),
        json!({"t": "string", "v": "US"})
    );
}

#[test]
fn test_serialize_symbol_with_accessors() {
    let expr = Expr::Symbol {
        base: "bucket".to_string(),
        accessors: vec![Accessor::Field("name".to_string()), Accessor::Index(0)],
    };
    assert_eq!(
        expr_to_json(&expr),
        json!({"t": "sym", "base": "bucket", "a": [{"field": "name"}, {"index": 0}]})
    );
}

#[test]
fn test_serialize_interp_parts() {
    let expr = Expr::Interp(vec![
        InterpPart::Lit("prefix-".to_string()),
        InterpPart::Expr(Expr::Symbol {
            base: "name".to_string(),
            accessors: vec![],
        }),
        InterpPart::Lit("-suffix".to_string()),
    ]);
    assert_eq!(
        expr_to_json(&expr),
        json!({
            "t": "interp",
            "parts": ["prefix-", {"t": "sym", "base": "name", "a": []}, "-suffix"],
        })
    );
}

#[test]
fn test_serialize_builtin_call() {
    let expr = Expr::Builtin {
        name: "toBase64".to_string(),
        arg: Box::new(Expr::String("hello".to_string())),
    };
    assert_eq!(
        expr_to_json(&expr),
        json!({"t": "toBase64", "arg": {"t": "string", "v": "hello"}})
    );
}

#[test]
fn test_serialize_invoke() {
    let expr = Expr::Invoke {
        token: "gcp:organizations:getProject".to_string(),
        args: Box::new(Expr::Object(vec![])),
        options: None,
    };
    let serialized = expr_to_json(&expr);
    assert_eq!(serialized["t"], "invoke");
    assert_eq!(serialized["tok"], "gcp:organizations:getProject");
    assert!(serialized.get("options").is_none());
}

#[test]
fn test_serialize_asset() {
    let expr = Expr::Asset {
        kind: AssetKind::StringAsset,
        arg: Box::new(Expr::String("file content".to_string())),
    };
    assert_eq!(
        expr_to_json(&expr),
        json!({"t": "stringAsset", "arg": {"t": "string", "v": "file content"}})
    );
}

#[test]
fn test_serialize_nested_secret_preserved() {
    let expr = Expr::Secret(Box::new(Expr::Secret(Box::new(Expr::String(
        "inner".to_string(),
    )))));
    assert_eq!(
        expr_to_json(&expr),
        json!({"t": "secret", "arg": {"t": "secret", "arg": {"t": "string", "v": "inner"}}})
    );
}

#[test]
fn test_roundtrip_literals() {
    roundtrip(Expr::Null);
    roundtrip(Expr::Bool(false));
    roundtrip(Expr::Number(Num::Int(7)));
    roundtrip(Expr::Number(Num::Float(-0.25)));
    roundtrip(Expr::String("hello".to_string()));
}

#[test]
fn test_roundtrip_compound() {
    roundtrip(Expr::List(vec![
        Expr::Number(Num::Int(1)),
        Expr::String("two".to_string()),
        Expr::Bool(true),
    ]));
    roundtrip(Expr::Object(vec![
        ("b".to_string(), Expr::Number(Num::Int(2))),
        ("a".to_string(), Expr::Number(Num::Int(1))),
    ]));
    roundtrip(Expr::Interp(vec![
        InterpPart::Lit("x-".to_string()),
        InterpPart::Expr(Expr::Symbol {
            base: "r".to_string(),
            accessors: vec![Accessor::Field("id".to_string())],
        }),
    ]));
}

#[test]
fn test_roundtrip_calls() {
    roundtrip(Expr::Builtin {
        name: "join".to_string(),
        arg: Box::new(Expr::List(vec![
            Expr::String(",".to_string()),
            Expr::List(vec![Expr::String("a".to_string())]),
        ])),
    });
    roundtrip(Expr::Invoke {
        token: "aws:ec2:getAmi".to_string(),
        args: Box::new(Expr::Object(vec![(
            "owner".to_string(),
            Expr::String("self".to_string()),
        )])),
        options: Some(Box::new(Expr::Object(vec![(
            "version".to_string(),
            Expr::String("1.0.0".to_string()),
        )]))),
    });
    roundtrip(Expr::Asset {
        kind: AssetKind::FileArchive,
        arg: Box::new(Expr::String("./site".to_string())),
    });
    roundtrip(Expr::Secret(Box::new(Expr::Secret(Box::new(Expr::Null)))));
}

#[test]
fn test_roundtrip_preserves_entry_order() {
    let expr = Expr::Object(vec![
        ("z".to_string(), Expr::Null),
        ("a".to_string(), Expr::Null),
        ("m".to_string(), Expr::Null),
    ]);
    let restored = expr_from_json(&expr_to_json(&expr)).unwrap();
    match restored {
        Expr::Object(entries) => {
            let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["z", "a", "m"]);
        }
        other => panic!("expected object, got {:?}", other),
    }
}

#[test]
fn test_deserialize_unknown_tag_fails() {
    let result = expr_from_json(&json!({"t": "noSuchThing", "arg": {"t": "null"}}));
    assert!(result.is_err());
}
