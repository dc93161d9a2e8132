//! The builtin function registry: a fixed table of pure evaluators keyed by
//! name. Names are compile-time constants; adding an entry is one line in
//! `table()` plus its evaluator in `eval`.

pub mod eval;
pub mod value;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::diag::HostError;
use value::Value;

type BuiltinFn = fn(&Value) -> Result<Value, HostError>;

static REGISTRY: OnceLock<HashMap<&'static str, BuiltinFn>> = OnceLock::new();

fn table() -> &'static HashMap<&'static str, BuiltinFn> {
    REGISTRY.get_or_init(|| {
        let mut t: HashMap<&'static str, BuiltinFn> = HashMap::new();
        t.insert("abs", eval::abs);
        t.insert("floor", eval::floor);
        t.insert("ceil", eval::ceil);
        t.insert("max", eval::max);
        t.insert("min", eval::min);
        t.insert("join", eval::join);
        t.insert("split", eval::split);
        t.insert("select", eval::select);
        t.insert("stringLen", eval::string_len);
        t.insert("substring", eval::substring);
        t.insert("toJSON", eval::to_json);
        t.insert("toBase64", eval::to_base64);
        t.insert("fromBase64", eval::from_base64);
        t.insert("secret", eval::secret);
        t.insert("uuid", eval::uuid_v4);
        t.insert("randomString", eval::random_string);
        t.insert("timeUtc", eval::time_utc);
        t
    })
}

/// True if `name` is a registered builtin.
pub fn is_builtin(name: &str) -> bool {
    table().contains_key(name)
}

/// Builtins that read an implicit entropy or clock source. The planner never
/// pre-evaluates these; only the standalone evaluator runs them.
pub fn is_nondeterministic(name: &str) -> bool {
    matches!(name, "uuid" | "randomString" | "timeUtc")
}

/// Evaluate a builtin by name against an already-converted argument value.
pub fn evaluate_builtin(name: &str, arg: &Value) -> Result<Value, HostError> {
    match table().get(name) {
        Some(f) => f(arg),
        None => Err(HostError::UnknownBuiltin(name.to_string())),
    }
}

/// Evaluate a builtin against a JSON argument, converting the argument and
/// result at the boundary.
pub fn evaluate_builtin_json(
    name: &str,
    arg: &serde_json::Value,
) -> Result<serde_json::Value, HostError> {
    let value = Value::from_json(arg)?;
    evaluate_builtin(name, &value).map(|v| v.to_json())
}
