//! Document merging: combine parsed template documents into a single
//! project. Scalar keys come from the main file; declaration maps
//! union-merge in file order with first-binding-wins duplicate handling.
//! Declarations are lowered to the AST as they are accepted.

use serde_yaml::{Mapping, Value as Yaml};

use super::types::{
    ConfigDecl, GetDecl, OutputDecl, Project, ResourceDecl, VariableDecl, KNOWN_OPTION_KEYS,
};
use crate::diag::{self, Diagnostic};
use crate::expr::ast::Expr;
use crate::expr::lower::{canonicalize_type_token, lower_value, yaml_key_to_string};

/// Merge one parsed document into the project. `file` is recorded in the
/// source map for every symbol this document introduces.
pub fn merge_document(project: &mut Project, doc: &Mapping, file: &str, is_main: bool) {
    for (key, value) in doc {
        let key = yaml_key_to_string(key);
        match key.as_str() {
            "name" | "runtime" | "description" => {
                merge_scalar(project, &key, value, file, is_main)
            }
            "config" => merge_section(project, &key, value, file, merge_config_entry),
            "variables" => merge_section(project, &key, value, file, merge_variable_entry),
            "resources" => merge_section(project, &key, value, file, merge_resource_entry),
            "components" => merge_section(project, &key, value, file, merge_component_entry),
            "outputs" => merge_section(project, &key, value, file, merge_output_entry),
            other => {
                project.diagnostics.push(
                    Diagnostic::warning(
                        diag::SCHEMA_WARNING,
                        format!("unknown top-level key '{}'", other),
                    )
                    .with_file(file),
                );
            }
        }
    }
}

fn merge_scalar(project: &mut Project, key: &str, value: &Yaml, file: &str, is_main: bool) {
    if !is_main {
        project.diagnostics.push(
            Diagnostic::warning(
                diag::SCHEMA_WARNING,
                format!("overlay cannot set '{}'; value from the main file wins", key),
            )
            .with_file(file),
        );
        return;
    }
    // `runtime` also comes as a mapping: {name: yaml, options: {...}}.
    let scalar = match value {
        Yaml::Mapping(map) if key == "runtime" => map.get("name").and_then(Yaml::as_str),
        other => other.as_str(),
    };
    let text = match scalar {
        Some(text) => text.to_string(),
        None => {
            project.diagnostics.push(
                Diagnostic::error(diag::SCHEMA_ERROR, format!("'{}' must be a string", key))
                    .with_file(file),
            );
            return;
        }
    };
    match key {
        "name" => project.name = Some(text),
        "runtime" => project.runtime = Some(text),
        _ => project.description = Some(text),
    }
}

fn merge_section(
    project: &mut Project,
    section: &str,
    value: &Yaml,
    file: &str,
    merge_entry: fn(&mut Project, &str, &Yaml, &str),
) {
    let map = match value.as_mapping() {
        Some(map) => map,
        None => {
            // An explicitly empty section is fine; anything else is not.
            if !value.is_null() {
                project.diagnostics.push(
                    Diagnostic::error(
                        diag::SCHEMA_ERROR,
                        format!("'{}' must be a mapping of declarations", section),
                    )
                    .with_file(file),
                );
            }
            return;
        }
    };
    for (name, body) in map {
        let name = yaml_key_to_string(name);
        merge_entry(project, &name, body, file);
    }
}

/// Accept a symbol into the shared namespace (config, variables, resources,
/// components). Duplicates keep the first binding.
fn accept_symbol(project: &mut Project, name: &str, file: &str) -> bool {
    if project.symbol_exists(name) {
        project.diagnostics.push(
            Diagnostic::error(
                diag::DUPLICATE_SYMBOL,
                format!(
                    "duplicate symbol '{}'; first declaration in {} wins",
                    name,
                    project
                        .source_map
                        .get(name)
                        .map(String::as_str)
                        .unwrap_or("an earlier file")
                ),
            )
            .with_file(file),
        );
        return false;
    }
    project
        .source_map
        .insert(name.to_string(), file.to_string());
    true
}

// ─── Per-kind entry lowering ────────────────────────────────────────────────

fn merge_config_entry(project: &mut Project, name: &str, body: &Yaml, file: &str) {
    if !accept_symbol(project, name, file) {
        return;
    }
    let decl = lower_config(name, body, file, project);
    project.config.push(decl);
}

fn lower_config(name: &str, body: &Yaml, file: &str, project: &mut Project) -> ConfigDecl {
    let mut decl = ConfigDecl {
        name: name.to_string(),
        config_type: None,
        default: None,
        secret: None,
    };

    let map = match body.as_mapping() {
        Some(map) => map,
        None => {
            // Bare scalar shorthand: the value is the default.
            decl.default = Some(lower_value(body, file, &mut project.diagnostics));
            return decl;
        }
    };

    let mut fixed_value: Option<Expr> = None;
    for (key, value) in map {
        match yaml_key_to_string(key).as_str() {
            "type" => decl.config_type = value.as_str().map(str::to_string),
            "default" => {
                decl.default = Some(lower_value(value, file, &mut project.diagnostics))
            }
            "value" => fixed_value = Some(lower_value(value, file, &mut project.diagnostics)),
            "secret" => match value.as_bool() {
                Some(b) => decl.secret = Some(b),
                None => project.diagnostics.push(
                    Diagnostic::warning(
                        diag::SCHEMA_WARNING,
                        format!("config '{}': 'secret' must be a boolean", name),
                    )
                    .with_file(file),
                ),
            },
            other => project.diagnostics.push(
                Diagnostic::warning(
                    diag::SCHEMA_WARNING,
                    format!("config '{}': unknown key '{}'", name, other),
                )
                .with_file(file),
            ),
        }
    }
    // A fixed `value` is a default that cannot be overridden per stack.
    if fixed_value.is_some() {
        decl.default = fixed_value;
    }
    decl
}

fn merge_variable_entry(project: &mut Project, name: &str, body: &Yaml, file: &str) {
    if !accept_symbol(project, name, file) {
        return;
    }
    let value = lower_value(body, file, &mut project.diagnostics);
    project.variables.push(VariableDecl {
        name: name.to_string(),
        value,
    });
}

fn merge_resource_entry(project: &mut Project, name: &str, body: &Yaml, file: &str) {
    if !accept_symbol(project, name, file) {
        return;
    }
    if let Some(decl) = lower_resource(name, body, file, project) {
        if decl.component {
            project.components.push(decl);
        } else {
            project.resources.push(decl);
        }
    }
}

fn merge_component_entry(project: &mut Project, name: &str, body: &Yaml, file: &str) {
    if !accept_symbol(project, name, file) {
        return;
    }
    if let Some(mut decl) = lower_resource(name, body, file, project) {
        decl.component = true;
        project.components.push(decl);
    }
}

fn merge_output_entry(project: &mut Project, name: &str, body: &Yaml, file: &str) {
    if project.outputs.iter().any(|o| o.name == name) {
        project.diagnostics.push(
            Diagnostic::error(
                diag::DUPLICATE_SYMBOL,
                format!("duplicate output '{}'; first declaration wins", name),
            )
            .with_file(file),
        );
        return;
    }
    project
        .source_map
        .entry(name.to_string())
        .or_insert_with(|| file.to_string());
    let value = lower_value(body, file, &mut project.diagnostics);
    project.outputs.push(OutputDecl {
        name: name.to_string(),
        value,
    });
}

/// Lower a resource body. Returns None when the declaration is unusable
/// (missing or malformed type token); the symbol stays in the source map.
fn lower_resource(
    name: &str,
    body: &Yaml,
    file: &str,
    project: &mut Project,
) -> Option<ResourceDecl> {
    let map = match body.as_mapping() {
        Some(map) => map,
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!("resource '{}' must be a mapping", name),
                )
                .with_file(file),
            );
            return None;
        }
    };

    let raw_token = match map.get("type").and_then(|t| t.as_str()) {
        Some(tok) => tok,
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!("resource '{}' is missing a string 'type'", name),
                )
                .with_file(file),
            );
            return None;
        }
    };
    let type_token = match canonicalize_type_token(raw_token) {
        Some(tok) => tok,
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!(
                        "resource '{}': malformed type token '{}' (expected ns:mod:Name)",
                        name, raw_token
                    ),
                )
                .with_file(file),
            );
            return None;
        }
    };

    let mut decl = ResourceDecl {
        name: name.to_string(),
        type_token,
        properties: Vec::new(),
        options: None,
        get: None,
        component: false,
    };

    for (key, value) in map {
        match yaml_key_to_string(key).as_str() {
            "type" => {}
            "properties" => {
                if let Some(props) = value.as_mapping() {
                    for (k, v) in props {
                        decl.properties.push((
                            yaml_key_to_string(k),
                            lower_value(v, file, &mut project.diagnostics),
                        ));
                    }
                } else if !value.is_null() {
                    project.diagnostics.push(
                        Diagnostic::error(
                            diag::SCHEMA_ERROR,
                            format!("resource '{}': 'properties' must be a mapping", name),
                        )
                        .with_file(file),
                    );
                }
            }
            "options" => decl.options = lower_options(name, value, file, project),
            "get" => decl.get = lower_get(name, value, file, project),
            "component" => decl.component = value.as_bool().unwrap_or(false),
            other => project.diagnostics.push(
                Diagnostic::warning(
                    diag::SCHEMA_WARNING,
                    format!("resource '{}': unknown key '{}'", name, other),
                )
                .with_file(file),
            ),
        }
    }
    Some(decl)
}

fn lower_options(
    resource: &str,
    value: &Yaml,
    file: &str,
    project: &mut Project,
) -> Option<Vec<(String, Expr)>> {
    let map = match value.as_mapping() {
        Some(map) => map,
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!("resource '{}': 'options' must be a mapping", resource),
                )
                .with_file(file),
            );
            return None;
        }
    };
    let mut options = Vec::new();
    for (key, v) in map {
        let key = yaml_key_to_string(key);
        if KNOWN_OPTION_KEYS.contains(&key.as_str()) {
            options.push((key, lower_value(v, file, &mut project.diagnostics)));
        } else {
            project.diagnostics.push(
                Diagnostic::warning(
                    diag::SCHEMA_WARNING,
                    format!("resource '{}': unknown option '{}'", resource, key),
                )
                .with_file(file),
            );
        }
    }
    Some(options)
}

fn lower_get(
    resource: &str,
    value: &Yaml,
    file: &str,
    project: &mut Project,
) -> Option<GetDecl> {
    let map = match value.as_mapping() {
        Some(map) => map,
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!("resource '{}': 'get' must be a mapping", resource),
                )
                .with_file(file),
            );
            return None;
        }
    };
    let id = match map.get("id") {
        Some(id) => lower_value(id, file, &mut project.diagnostics),
        None => {
            project.diagnostics.push(
                Diagnostic::error(
                    diag::SCHEMA_ERROR,
                    format!("resource '{}': 'get' requires an 'id'", resource),
                )
                .with_file(file),
            );
            return None;
        }
    };
    let state = map
        .get("state")
        .map(|s| lower_value(s, file, &mut project.diagnostics));
    for (key, _) in map {
        let key = yaml_key_to_string(key);
        if key != "id" && key != "state" {
            project.diagnostics.push(
                Diagnostic::warning(
                    diag::SCHEMA_WARNING,
                    format!("resource '{}': unknown 'get' key '{}'", resource, key),
                )
                .with_file(file),
            );
        }
    }
    Some(GetDecl { id, state })
}
