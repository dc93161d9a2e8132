//! Lowering of raw YAML nodes into the typed expression AST. Problems are
//! recorded as diagnostics in place; lowering always produces a value.

use serde_yaml::Value as Yaml;

use super::ast::{Accessor, AssetKind, Expr, InterpPart, Num};
use crate::builtins;
use crate::diag::{self, Diagnostic};

/// Lower a YAML node to an expression.
pub fn lower_value(value: &Yaml, file: &str, diags: &mut Vec<Diagnostic>) -> Expr {
    match value {
        Yaml::Null => Expr::Null,
        Yaml::Bool(b) => Expr::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Expr::Number(Num::Int(i))
            } else {
                Expr::Number(Num::Float(n.as_f64().unwrap_or(0.0)))
            }
        }
        Yaml::String(s) => lower_string(s, file, diags),
        Yaml::Sequence(seq) => {
            let items = seq.iter().map(|v| lower_value(v, file, diags)).collect();
            Expr::List(items)
        }
        Yaml::Mapping(map) => {
            // A single-key mapping whose key begins with fn:: is a call.
            if map.len() == 1 {
                let (k, v) = map.iter().next().unwrap();
                if let Some(name) = k.as_str().and_then(|k| k.strip_prefix("fn::")) {
                    return lower_fn(name, v, file, diags);
                }
            }
            let entries = map
                .iter()
                .map(|(k, v)| (yaml_key_to_string(k), lower_value(v, file, diags)))
                .collect();
            Expr::Object(entries)
        }
        Yaml::Tagged(tagged) => lower_value(&tagged.value, file, diags),
    }
}

/// Lower the argument of a `fn::<name>` key.
fn lower_fn(name: &str, arg: &Yaml, file: &str, diags: &mut Vec<Diagnostic>) -> Expr {
    if name == "invoke" {
        return lower_invoke(arg, file, diags);
    }
    if name == "secret" {
        return Expr::Secret(Box::new(lower_value(arg, file, diags)));
    }
    if let Some(kind) = AssetKind::from_tag(name) {
        return Expr::Asset {
            kind,
            arg: Box::new(lower_value(arg, file, diags)),
        };
    }
    if builtins::is_builtin(name) {
        return Expr::Builtin {
            name: name.to_string(),
            arg: Box::new(lower_value(arg, file, diags)),
        };
    }
    diags.push(
        Diagnostic::error(
            diag::UNKNOWN_BUILTIN,
            format!("unknown builtin function 'fn::{}'", name),
        )
        .with_file(file),
    );
    Expr::Null
}

/// Lower `fn::invoke: {function, arguments?, options?}`.
fn lower_invoke(arg: &Yaml, file: &str, diags: &mut Vec<Diagnostic>) -> Expr {
    let map = match arg.as_mapping() {
        Some(map) => map,
        None => {
            diags.push(
                Diagnostic::error(diag::SCHEMA_ERROR, "fn::invoke requires a mapping argument")
                    .with_file(file),
            );
            return Expr::Null;
        }
    };
    let token = match map.get("function").and_then(|f| f.as_str()) {
        Some(tok) => tok.to_string(),
        None => {
            diags.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    "fn::invoke requires a string 'function' token",
                )
                .with_file(file),
            );
            return Expr::Null;
        }
    };
    let args = match map.get("arguments") {
        Some(v) => lower_value(v, file, diags),
        None => Expr::Object(vec![]),
    };
    let options = map
        .get("options")
        .map(|v| Box::new(lower_value(v, file, diags)));
    Expr::Invoke {
        token,
        args: Box::new(args),
        options,
    }
}

/// Lower a YAML string, scanning for `${…}` interpolation segments. The
/// scanner recognizes balanced `${ … }` with nested braces; everything else
/// stays literal text. An interpolation that is the entire string collapses
/// to the embedded expression.
pub fn lower_string(s: &str, file: &str, diags: &mut Vec<Diagnostic>) -> Expr {
    if !s.contains("${") {
        return Expr::String(s.to_string());
    }

    let chars: Vec<char> = s.chars().collect();
    let mut parts: Vec<InterpPart> = Vec::new();
    let mut lit = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' && i + 1 < chars.len() && chars[i + 1] == '{' {
            let mut depth = 1usize;
            let mut j = i + 2;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            if depth != 0 {
                // Unterminated ${ — keep it literal.
                lit.push(chars[i]);
                i += 1;
                continue;
            }
            let inner: String = chars[i + 2..j - 1].iter().collect();
            match parse_symbol_expr(inner.trim()) {
                Some(expr) => {
                    if !lit.is_empty() {
                        parts.push(InterpPart::Lit(std::mem::take(&mut lit)));
                    }
                    parts.push(InterpPart::Expr(expr));
                }
                None => {
                    diags.push(
                        Diagnostic::error(
                            diag::SCHEMA_ERROR,
                            format!("invalid symbol expression '${{{}}}'", inner),
                        )
                        .with_file(file),
                    );
                    lit.push_str(&chars[i..j].iter().collect::<String>());
                }
            }
            i = j;
        } else {
            lit.push(chars[i]);
            i += 1;
        }
    }
    if !lit.is_empty() {
        parts.push(InterpPart::Lit(lit));
    }

    match parts.as_slice() {
        [InterpPart::Expr(e)] => e.clone(),
        _ if parts.iter().all(|p| matches!(p, InterpPart::Lit(_))) => Expr::String(s.to_string()),
        _ => Expr::Interp(parts),
    }
}

/// Parse the inside of a `${…}` segment: an identifier followed by `.field`
/// and `[index]` accessor steps. Returns None when the text is not a symbol
/// expression.
fn parse_symbol_expr(inner: &str) -> Option<Expr> {
    let chars: Vec<char> = inner.chars().collect();
    let mut pos = 0;

    let base = parse_ident(&chars, &mut pos, true)?;
    let mut accessors = Vec::new();

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                let name = parse_ident(&chars, &mut pos, false)?;
                accessors.push(Accessor::Field(name));
            }
            '[' => {
                pos += 1;
                let start = pos;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == start || pos >= chars.len() || chars[pos] != ']' {
                    return None;
                }
                let digits: String = chars[start..pos].iter().collect();
                pos += 1;
                accessors.push(Accessor::Index(digits.parse().ok()?));
            }
            _ => return None,
        }
    }

    Some(Expr::Symbol { base, accessors })
}

/// Parse one identifier. Base identifiers additionally allow `:` so that
/// namespaced config keys (`gcp:project`) are referenceable.
fn parse_ident(chars: &[char], pos: &mut usize, allow_colon: bool) -> Option<String> {
    let start = *pos;
    if *pos >= chars.len() || !(chars[*pos].is_alphabetic() || chars[*pos] == '_') {
        return None;
    }
    *pos += 1;
    while *pos < chars.len() {
        let c = chars[*pos];
        let ok = c.is_alphanumeric() || c == '_' || c == '-' || (allow_colon && c == ':');
        if !ok {
            break;
        }
        *pos += 1;
    }
    Some(chars[start..*pos].iter().collect())
}

/// Canonicalize a resource type token: `ns:mod:Name` becomes
/// `ns:mod/name:Name` with the module segment's first character lowercased.
/// Tokens already containing `/` pass through unchanged.
pub fn canonicalize_type_token(token: &str) -> Option<String> {
    if token.contains('/') {
        return Some(token.to_string());
    }
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let (ns, module, name) = (parts[0], parts[1], parts[2]);
    let mut seg = String::with_capacity(name.len());
    let mut name_chars = name.chars();
    if let Some(first) = name_chars.next() {
        seg.push(first.to_ascii_lowercase());
        seg.extend(name_chars);
    }
    Some(format!("{}:{}/{}:{}", ns, module, seg, name))
}

/// Render a YAML mapping key as a string. Non-string scalars keep their
/// YAML scalar rendering.
pub fn yaml_key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
