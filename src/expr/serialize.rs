//! Projection of the expression AST to the language-neutral tagged form and
//! back. The `t` discriminator and payload keys (`v`, `arg`, `parts`, `a`,
//! `items`, `entries`, `tok`, `options`) are part of the external interface.

use anyhow::{bail, Result};
use serde_json::{json, Value as Json};

use super::ast::{Accessor, AssetKind, Expr, InterpPart, Num};
use crate::builtins;

/// Serialize an expression to its tagged JSON form.
pub fn expr_to_json(expr: &Expr) -> Json {
    match expr {
        Expr::Null => json!({"t": "null"}),
        Expr::Bool(b) => json!({"t": "bool", "v": b}),
        Expr::Number(n) => json!({"t": "number", "v": n.to_json()}),
        Expr::String(s) => json!({"t": "string", "v": s}),
        Expr::Interp(parts) => {
            let parts: Vec<Json> = parts
                .iter()
                .map(|p| match p {
                    InterpPart::Lit(s) => json!(s),
                    InterpPart::Expr(e) => expr_to_json(e),
                })
                .collect();
            json!({"t": "interp", "parts": parts})
        }
        Expr::Symbol { base, accessors } => {
            let a: Vec<Json> = accessors
                .iter()
                .map(|acc| match acc {
                    Accessor::Field(name) => json!({"field": name}),
                    Accessor::Index(i) => json!({"index": i}),
                })
                .collect();
            json!({"t": "sym", "base": base, "a": a})
        }
        Expr::List(items) => {
            let items: Vec<Json> = items.iter().map(expr_to_json).collect();
            json!({"t": "list", "items": items})
        }
        Expr::Object(entries) => {
            let entries: Vec<Json> = entries
                .iter()
                .map(|(k, v)| json!([k, expr_to_json(v)]))
                .collect();
            json!({"t": "object", "entries": entries})
        }
        Expr::Builtin { name, arg } => json!({"t": name, "arg": expr_to_json(arg)}),
        Expr::Invoke {
            token,
            args,
            options,
        } => {
            let mut obj = json!({"t": "invoke", "tok": token, "arg": expr_to_json(args)});
            if let Some(opts) = options {
                obj.as_object_mut()
                    .unwrap()
                    .insert("options".to_string(), expr_to_json(opts));
            }
            obj
        }
        Expr::Asset { kind, arg } => json!({"t": kind.tag(), "arg": expr_to_json(arg)}),
        Expr::Secret(inner) => json!({"t": "secret", "arg": expr_to_json(inner)}),
    }
}

/// Reconstruct an expression from its tagged JSON form.
pub fn expr_from_json(value: &Json) -> Result<Expr> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => bail!("expression must be a tagged object, got: {}", value),
    };
    let tag = obj
        .get("t")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow::anyhow!("expression object is missing the 't' discriminator"))?;

    match tag {
        "null" => Ok(Expr::Null),
        "bool" => match obj.get("v").and_then(|v| v.as_bool()) {
            Some(b) => Ok(Expr::Bool(b)),
            None => bail!("bool expression requires a boolean 'v'"),
        },
        "number" => match obj.get("v") {
            Some(v) if v.is_i64() => Ok(Expr::Number(Num::Int(v.as_i64().unwrap()))),
            Some(v) if v.is_f64() => Ok(Expr::Number(Num::Float(v.as_f64().unwrap()))),
            _ => bail!("number expression requires a numeric 'v'"),
        },
        "string" => match obj.get("v").and_then(|v| v.as_str()) {
            Some(s) => Ok(Expr::String(s.to_string())),
            None => bail!("string expression requires a string 'v'"),
        },
        "interp" => {
            let raw = match obj.get("parts").and_then(|p| p.as_array()) {
                Some(raw) => raw,
                None => bail!("interp expression requires a 'parts' array"),
            };
            let mut parts = Vec::with_capacity(raw.len());
            for part in raw {
                match part {
                    Json::String(s) => parts.push(InterpPart::Lit(s.clone())),
                    other => parts.push(InterpPart::Expr(expr_from_json(other)?)),
                }
            }
            Ok(Expr::Interp(parts))
        }
        "sym" => {
            let base = match obj.get("base").and_then(|b| b.as_str()) {
                Some(base) => base.to_string(),
                None => bail!("sym expression requires a string 'base'"),
            };
            let mut accessors = Vec::new();
            if let Some(steps) = obj.get("a").and_then(|a| a.as_array()) {
                for step in steps {
                    if let Some(name) = step.get("field").and_then(|f| f.as_str()) {
                        accessors.push(Accessor::Field(name.to_string()));
                    } else if let Some(i) = step.get("index").and_then(|i| i.as_u64()) {
                        accessors.push(Accessor::Index(i as usize));
                    } else {
                        bail!("accessor must be {{field}} or {{index}}, got: {}", step);
                    }
                }
            }
            Ok(Expr::Symbol { base, accessors })
        }
        "list" => {
            let raw = match obj.get("items").and_then(|i| i.as_array()) {
                Some(raw) => raw,
                None => bail!("list expression requires an 'items' array"),
            };
            let items = raw.iter().map(expr_from_json).collect::<Result<_>>()?;
            Ok(Expr::List(items))
        }
        "object" => {
            let raw = match obj.get("entries").and_then(|e| e.as_array()) {
                Some(raw) => raw,
                None => bail!("object expression requires an 'entries' array"),
            };
            let mut entries = Vec::with_capacity(raw.len());
            for entry in raw {
                let pair = entry.as_array().filter(|p| p.len() == 2);
                let pair = match pair {
                    Some(pair) => pair,
                    None => bail!("object entry must be a [key, value] pair, got: {}", entry),
                };
                let key = match pair[0].as_str() {
                    Some(key) => key.to_string(),
                    None => bail!("object entry key must be a string"),
                };
                entries.push((key, expr_from_json(&pair[1])?));
            }
            Ok(Expr::Object(entries))
        }
        "invoke" => {
            let token = match obj.get("tok").and_then(|t| t.as_str()) {
                Some(tok) => tok.to_string(),
                None => bail!("invoke expression requires a string 'tok'"),
            };
            let args = match obj.get("arg") {
                Some(arg) => expr_from_json(arg)?,
                None => Expr::Object(vec![]),
            };
            let options = match obj.get("options") {
                Some(opts) => Some(Box::new(expr_from_json(opts)?)),
                None => None,
            };
            Ok(Expr::Invoke {
                token,
                args: Box::new(args),
                options,
            })
        }
        "secret" => {
            let arg = match obj.get("arg") {
                Some(arg) => expr_from_json(arg)?,
                None => bail!("secret expression requires an 'arg'"),
            };
            Ok(Expr::Secret(Box::new(arg)))
        }
        other => {
            let arg = match obj.get("arg") {
                Some(arg) => expr_from_json(arg)?,
                None => bail!("'{}' expression requires an 'arg'", other),
            };
            if let Some(kind) = AssetKind::from_tag(other) {
                return Ok(Expr::Asset {
                    kind,
                    arg: Box::new(arg),
                });
            }
            if builtins::is_builtin(other) {
                return Ok(Expr::Builtin {
                    name: other.to_string(),
                    arg: Box::new(arg),
                });
            }
            bail!("unknown expression tag '{}'", other)
        }
    }
}
