use yamlhost::builtins::{evaluate_builtin, is_builtin, is_nondeterministic};
use yamlhost::Value;

fn num_list(items: &[i64]) -> Value {
    Value::List(items.iter().map(|&i| Value::Int(i)).collect())
}

fn str_list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::String(s.to_string())).collect())
}

#[test]
fn test_abs_positive() {
    let result = evaluate_builtin("abs", &Value::Int(-5)).unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn test_abs_float() {
    let result = evaluate_builtin("abs", &Value::Float(-3.14)).unwrap();
    match result {
        Value::Float(f) => assert!((f - 3.14).abs() < 1e-9),
        other => panic!("expected float, got {:?}", other),
    }
}

#[test]
fn test_floor() {
    assert_eq!(
        evaluate_builtin("floor", &Value::Float(3.7)).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn test_ceil() {
    assert_eq!(
        evaluate_builtin("ceil", &Value::Float(3.2)).unwrap(),
        Value::Int(4)
    );
}

#[test]
fn test_max() {
    assert_eq!(
        evaluate_builtin("max", &num_list(&[1, 5, 3])).unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_min() {
    assert_eq!(
        evaluate_builtin("min", &num_list(&[1, 5, 3])).unwrap(),
        Value::Int(1)
    );
}

#[test]
fn test_max_empty_list_error() {
    let err = evaluate_builtin("max", &Value::List(vec![])).unwrap_err();
    assert_eq!(err.code(), "TypeError");
}

#[test]
fn test_join() {
    let arg = Value::List(vec![Value::String(",".to_string()), str_list(&["a", "b", "c"])]);
    assert_eq!(
        evaluate_builtin("join", &arg).unwrap(),
        Value::String("a,b,c".to_string())
    );
}

#[test]
fn test_split() {
    let arg = Value::List(vec![
        Value::String(",".to_string()),
        Value::String("a,b,c".to_string()),
    ]);
    assert_eq!(evaluate_builtin("split", &arg).unwrap(), str_list(&["a", "b", "c"]));
}

#[test]
fn test_select() {
    let arg = Value::List(vec![Value::Int(1), str_list(&["a", "b", "c"])]);
    assert_eq!(
        evaluate_builtin("select", &arg).unwrap(),
        Value::String("b".to_string())
    );
}

#[test]
fn test_select_out_of_range() {
    let arg = Value::List(vec![Value::Int(5), str_list(&["a"])]);
    let err = evaluate_builtin("select", &arg).unwrap_err();
    assert_eq!(err.code(), "IndexError");
}

#[test]
fn test_select_negative_index() {
    let arg = Value::List(vec![Value::Int(-1), str_list(&["a"])]);
    let err = evaluate_builtin("select", &arg).unwrap_err();
    assert_eq!(err.code(), "IndexError");
}

#[test]
fn test_string_len() {
    assert_eq!(
        evaluate_builtin("stringLen", &Value::String("hello".to_string())).unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_string_len_counts_scalars() {
    assert_eq!(
        evaluate_builtin("stringLen", &Value::String("héllo".to_string())).unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_substring() {
    let arg = Value::List(vec![
        Value::String("hello world".to_string()),
        Value::Int(6),
        Value::Int(5),
    ]);
    assert_eq!(
        evaluate_builtin("substring", &arg).unwrap(),
        Value::String("world".to_string())
    );
}

#[test]
fn test_substring_clips_out_of_range() {
    let arg = Value::List(vec![
        Value::String("hello".to_string()),
        Value::Int(3),
        Value::Int(100),
    ]);
    assert_eq!(
        evaluate_builtin("substring", &arg).unwrap(),
        Value::String("lo".to_string())
    );
}

#[test]
fn test_to_json_preserves_declaration_order() {
    let arg = Value::Map(vec![
        ("b".to_string(), Value::Int(2)),
        ("a".to_string(), Value::Int(1)),
    ]);
    assert_eq!(
        evaluate_builtin("toJSON", &arg).unwrap(),
        Value::String(r#"{"b":2,"a":1}"#.to_string())
    );
}

#[test]
fn test_to_base64() {
    assert_eq!(
        evaluate_builtin("toBase64", &Value::String("hello".to_string())).unwrap(),
        Value::String("aGVsbG8=".to_string())
    );
}

#[test]
fn test_from_base64() {
    assert_eq!(
        evaluate_builtin("fromBase64", &Value::String("aGVsbG8=".to_string())).unwrap(),
        Value::String("hello".to_string())
    );
}

#[test]
fn test_from_base64_invalid() {
    let err =
        evaluate_builtin("fromBase64", &Value::String("not base64!!".to_string())).unwrap_err();
    assert_eq!(err.code(), "DecodeError");
}

#[test]
fn test_secret_wraps_value() {
    let result = evaluate_builtin("secret", &Value::String("password".to_string())).unwrap();
    match result {
        Value::Map(entries) => {
            assert_eq!(entries[0], ("__secret".to_string(), Value::Bool(true)));
            assert_eq!(
                entries[1],
                ("value".to_string(), Value::String("password".to_string()))
            );
        }
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn test_uuid_shape() {
    let result = evaluate_builtin("uuid", &Value::String(String::new())).unwrap();
    let s = result.as_str().expect("uuid should be a string");
    let segments: Vec<&str> = s.split('-').collect();
    assert_eq!(segments.len(), 5);
    assert_eq!(s.len(), 36);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
}

#[test]
fn test_random_string() {
    let result = evaluate_builtin("randomString", &Value::Int(16)).unwrap();
    let s = result.as_str().expect("randomString should be a string");
    assert_eq!(s.len(), 16);
    assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_random_string_rejects_zero() {
    let err = evaluate_builtin("randomString", &Value::Int(0)).unwrap_err();
    assert_eq!(err.code(), "TypeError");
}

#[test]
fn test_time_utc_reference_layout() {
    let result = evaluate_builtin(
        "timeUtc",
        &Value::String("2006-01-02T15:04:05Z07:00".to_string()),
    )
    .unwrap();
    let s = result.as_str().expect("timeUtc should be a string");
    // e.g. 2026-08-01T12:34:56Z
    assert_eq!(s.len(), 20);
    assert!(s.ends_with('Z'));
    assert_eq!(&s[4..5], "-");
    assert_eq!(&s[10..11], "T");
    assert!(s[0..4].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_registry_membership() {
    for name in [
        "abs",
        "floor",
        "ceil",
        "max",
        "min",
        "join",
        "split",
        "select",
        "stringLen",
        "substring",
        "toJSON",
        "toBase64",
        "fromBase64",
        "secret",
        "uuid",
        "randomString",
        "timeUtc",
    ] {
        assert!(is_builtin(name), "{} should be registered", name);
    }
    assert!(!is_builtin("invoke"));
    assert!(!is_builtin("stringAsset"));
}

#[test]
fn test_nondeterministic_marking() {
    for name in ["uuid", "randomString", "timeUtc"] {
        assert!(is_nondeterministic(name));
    }
    for name in ["abs", "toBase64", "secret"] {
        assert!(!is_nondeterministic(name));
    }
}

#[test]
fn test_unknown_builtin_error() {
    let err = evaluate_builtin("nonexistent", &Value::String("arg".to_string())).unwrap_err();
    assert_eq!(err.code(), "UnknownBuiltin");
}

#[test]
fn test_join_wrong_args_error() {
    let err =
        evaluate_builtin("join", &Value::String("not-a-list".to_string())).unwrap_err();
    assert_eq!(err.code(), "TypeError");
}

#[test]
fn test_abs_string_error() {
    let err = evaluate_builtin("abs", &Value::String("not-a-number".to_string())).unwrap_err();
    assert_eq!(err.code(), "TypeError");
}

#[test]
fn test_json_boundary_roundtrip() {
    // Send a value through JSON → Value → JSON via select(0, [value]).
    let roundtrip = |v: serde_json::Value| {
        let arg = serde_json::json!([0, [v]]);
        yamlhost::evaluate_builtin_json("select", &arg).unwrap()
    };
    assert_eq!(roundtrip(serde_json::Value::Null), serde_json::Value::Null);
    assert_eq!(roundtrip(serde_json::json!(true)), serde_json::json!(true));
    assert_eq!(roundtrip(serde_json::json!(42)), serde_json::json!(42));
    assert_eq!(roundtrip(serde_json::json!(3.14)), serde_json::json!(3.14));
    assert_eq!(roundtrip(serde_json::json!("hello")), serde_json::json!("hello"));
    assert_eq!(
        roundtrip(serde_json::json!([1, "a", true])),
        serde_json::json!([1, "a", true])
    );
    assert_eq!(
        roundtrip(serde_json::json!({"a": [1, {"b": "c"}]})),
        serde_json::json!({"a": [1, {"b": "c"}]})
    );
}
