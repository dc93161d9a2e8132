//! Dependency collection: walk an expression tree and record every symbol
//! base it references. The AST is a strict tree, so the walk is a plain
//! recursion with no visited set.

use super::ast::{Expr, InterpPart};

/// Collect the base name of every `Symbol` reference in `expr`, in
/// left-to-right order. Duplicates are kept; callers dedupe as needed.
pub fn collect_symbol_refs(expr: &Expr, refs: &mut Vec<String>) {
    match expr {
        Expr::Null | Expr::Bool(_) | Expr::Number(_) | Expr::String(_) => {}
        Expr::Interp(parts) => {
            for part in parts {
                if let InterpPart::Expr(e) = part {
                    collect_symbol_refs(e, refs);
                }
            }
        }
        Expr::Symbol { base, .. } => refs.push(base.clone()),
        Expr::List(items) => {
            for item in items {
                collect_symbol_refs(item, refs);
            }
        }
        Expr::Object(entries) => {
            for (_, v) in entries {
                collect_symbol_refs(v, refs);
            }
        }
        Expr::Builtin { arg, .. } => collect_symbol_refs(arg, refs),
        Expr::Invoke { args, options, .. } => {
            collect_symbol_refs(args, refs);
            if let Some(opts) = options {
                collect_symbol_refs(opts, refs);
            }
        }
        Expr::Asset { arg, .. } => collect_symbol_refs(arg, refs),
        Expr::Secret(inner) => collect_symbol_refs(inner, refs),
    }
}
