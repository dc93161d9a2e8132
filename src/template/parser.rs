//! YAML front end: parse one (possibly preprocessed) text blob into a
//! structural document. Re-entrant and pure; problems become diagnostics.

use crate::diag::{self, Diagnostic};

/// Parse a template text as YAML. The root must be a mapping; anything else
/// is recorded as a diagnostic and the document is skipped. An empty
/// document parses to an empty mapping.
pub fn parse_document(
    text: &str,
    file: &str,
    diags: &mut Vec<Diagnostic>,
) -> Option<serde_yaml::Mapping> {
    let value: serde_yaml::Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            let mut d = Diagnostic::error(diag::SYNTAX_ERROR, err.to_string()).with_file(file);
            if let Some(loc) = err.location() {
                d = d.with_location(loc.line(), loc.column());
            }
            diags.push(d);
            return None;
        }
    };

    match value {
        serde_yaml::Value::Mapping(map) => Some(map),
        serde_yaml::Value::Null => Some(serde_yaml::Mapping::new()),
        _ => {
            diags.push(
                Diagnostic::error(diag::SCHEMA_ERROR, "top-level must be a mapping")
                    .with_file(file),
            );
            None
        }
    }
}
