//! Builtin evaluators. Each validates its argument shape before computing;
//! shape violations are `TypeError`, bad indices are `IndexError`, and bad
//! encodings are `DecodeError`.

use rand::{distributions::Alphanumeric, Rng};

use super::value::Value;
use crate::diag::HostError;

fn type_err(builtin: &str, expected: &str, got: &Value) -> HostError {
    HostError::Type(format!(
        "{} expects {}, got {}",
        builtin,
        expected,
        got.type_name()
    ))
}

// ─── Math ───────────────────────────────────────────────────────────────────

pub fn abs(arg: &Value) -> Result<Value, HostError> {
    match arg {
        Value::Int(i) => Ok(Value::Int(i.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_err("abs", "a number", other)),
    }
}

pub fn floor(arg: &Value) -> Result<Value, HostError> {
    match arg {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(f.floor() as i64)),
        other => Err(type_err("floor", "a number", other)),
    }
}

pub fn ceil(arg: &Value) -> Result<Value, HostError> {
    match arg {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(f.ceil() as i64)),
        other => Err(type_err("ceil", "a number", other)),
    }
}

pub fn max(arg: &Value) -> Result<Value, HostError> {
    extremum("max", arg, |candidate, best| candidate > best)
}

pub fn min(arg: &Value) -> Result<Value, HostError> {
    extremum("min", arg, |candidate, best| candidate < best)
}

/// Pick the element of a non-empty numeric list by a comparison on its f64
/// view; the first element wins ties.
fn extremum(
    builtin: &str,
    arg: &Value,
    replace: fn(f64, f64) -> bool,
) -> Result<Value, HostError> {
    let items = arg
        .as_list()
        .ok_or_else(|| type_err(builtin, "a list of numbers", arg))?;
    if items.is_empty() {
        return Err(HostError::Type(format!(
            "{} expects a non-empty list",
            builtin
        )));
    }
    let mut best = &items[0];
    let mut best_key = best
        .as_f64()
        .ok_or_else(|| type_err(builtin, "a list of numbers", best))?;
    for item in &items[1..] {
        let key = item
            .as_f64()
            .ok_or_else(|| type_err(builtin, "a list of numbers", item))?;
        if replace(key, best_key) {
            best = item;
            best_key = key;
        }
    }
    Ok(best.clone())
}

// ─── Strings ────────────────────────────────────────────────────────────────

pub fn join(arg: &Value) -> Result<Value, HostError> {
    let pair = two_args("join", arg)?;
    let sep = pair[0]
        .as_str()
        .ok_or_else(|| type_err("join", "[separator, [strings]]", arg))?;
    let items = pair[1]
        .as_list()
        .ok_or_else(|| type_err("join", "[separator, [strings]]", arg))?;
    let mut strings = Vec::with_capacity(items.len());
    for item in items {
        strings.push(
            item.as_str()
                .ok_or_else(|| type_err("join", "a list of strings", item))?,
        );
    }
    Ok(Value::String(strings.join(sep)))
}

pub fn split(arg: &Value) -> Result<Value, HostError> {
    let pair = two_args("split", arg)?;
    let sep = pair[0]
        .as_str()
        .ok_or_else(|| type_err("split", "[separator, string]", arg))?;
    let s = pair[1]
        .as_str()
        .ok_or_else(|| type_err("split", "[separator, string]", arg))?;
    if sep.is_empty() {
        return Err(HostError::Type(
            "split expects a non-empty separator".to_string(),
        ));
    }
    let parts = s
        .split(sep)
        .map(|p| Value::String(p.to_string()))
        .collect();
    Ok(Value::List(parts))
}

pub fn select(arg: &Value) -> Result<Value, HostError> {
    let pair = two_args("select", arg)?;
    let index = pair[0]
        .as_i64()
        .ok_or_else(|| type_err("select", "[index, list]", arg))?;
    let items = pair[1]
        .as_list()
        .ok_or_else(|| type_err("select", "[index, list]", arg))?;
    if index < 0 || index as usize >= items.len() {
        return Err(HostError::Index(format!(
            "select index {} out of range for list of length {}",
            index,
            items.len()
        )));
    }
    Ok(items[index as usize].clone())
}

pub fn string_len(arg: &Value) -> Result<Value, HostError> {
    let s = arg
        .as_str()
        .ok_or_else(|| type_err("stringLen", "a string", arg))?;
    Ok(Value::Int(s.chars().count() as i64))
}

/// `substring([string, start, length])` — offsets count Unicode scalar
/// values; out-of-range bounds clip.
pub fn substring(arg: &Value) -> Result<Value, HostError> {
    let items = arg
        .as_list()
        .filter(|items| items.len() == 3)
        .ok_or_else(|| type_err("substring", "[string, start, length]", arg))?;
    let s = items[0]
        .as_str()
        .ok_or_else(|| type_err("substring", "[string, start, length]", arg))?;
    let start = items[1]
        .as_i64()
        .ok_or_else(|| type_err("substring", "[string, start, length]", arg))?;
    let length = items[2]
        .as_i64()
        .ok_or_else(|| type_err("substring", "[string, start, length]", arg))?;
    let start = start.max(0) as usize;
    let length = length.max(0) as usize;
    let result: String = s.chars().skip(start).take(length).collect();
    Ok(Value::String(result))
}

fn two_args<'a>(builtin: &str, arg: &'a Value) -> Result<&'a [Value], HostError> {
    arg.as_list()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| {
            HostError::Type(format!(
                "{} expects a two-element list argument, got {}",
                builtin,
                arg.type_name()
            ))
        })
}

// ─── Encoding ───────────────────────────────────────────────────────────────

pub fn to_json(arg: &Value) -> Result<Value, HostError> {
    let json = serde_json::to_string(&arg.to_json())
        .map_err(|e| HostError::Type(format!("toJSON failed: {}", e)))?;
    Ok(Value::String(json))
}

pub fn to_base64(arg: &Value) -> Result<Value, HostError> {
    let s = arg
        .as_str()
        .ok_or_else(|| type_err("toBase64", "a string", arg))?;
    Ok(Value::String(base64::encode(s)))
}

pub fn from_base64(arg: &Value) -> Result<Value, HostError> {
    let s = arg
        .as_str()
        .ok_or_else(|| type_err("fromBase64", "a string", arg))?;
    let bytes = base64::decode(s)
        .map_err(|e| HostError::Decode(format!("invalid base64: {}", e)))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|e| HostError::Decode(format!("decoded bytes are not UTF-8: {}", e)))?;
    Ok(Value::String(decoded))
}

// ─── Secrets ────────────────────────────────────────────────────────────────

pub fn secret(arg: &Value) -> Result<Value, HostError> {
    Ok(Value::Map(vec![
        ("__secret".to_string(), Value::Bool(true)),
        ("value".to_string(), arg.clone()),
    ]))
}

// ─── Entropy and clock (never pre-evaluated by the planner) ─────────────────

pub fn uuid_v4(arg: &Value) -> Result<Value, HostError> {
    match arg {
        Value::Null => {}
        Value::String(s) if s.is_empty() => {}
        other => return Err(type_err("uuid", "no argument", other)),
    }
    Ok(Value::String(uuid::Uuid::new_v4().to_string()))
}

pub fn random_string(arg: &Value) -> Result<Value, HostError> {
    let n = arg
        .as_i64()
        .filter(|n| *n > 0)
        .ok_or_else(|| type_err("randomString", "a positive integer length", arg))?;
    let s: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(n as usize)
        .map(char::from)
        .collect();
    Ok(Value::String(s))
}

pub fn time_utc(arg: &Value) -> Result<Value, HostError> {
    let layout = arg
        .as_str()
        .ok_or_else(|| type_err("timeUtc", "a layout string", arg))?;
    let format = go_layout_to_strftime(layout);
    Ok(Value::String(
        chrono::Utc::now().format(&format).to_string(),
    ))
}

/// Translate a Go reference-time layout ("2006-01-02T15:04:05Z07:00") into a
/// strftime format string. The output is always UTC, so zone tokens render
/// as fixed text. Unrecognized layout text passes through literally.
fn go_layout_to_strftime(layout: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("2006", "%Y"),
        ("Z07:00", "Z"),
        ("-07:00", "+00:00"),
        (".000", "%.3f"),
        ("January", "%B"),
        ("Monday", "%A"),
        ("Jan", "%b"),
        ("Mon", "%a"),
        ("MST", "UTC"),
        ("01", "%m"),
        ("02", "%d"),
        ("15", "%H"),
        ("04", "%M"),
        ("05", "%S"),
    ];

    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (token, fmt) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(fmt);
                rest = tail;
                continue 'outer;
            }
        }
        let c = rest.chars().next().unwrap();
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}
