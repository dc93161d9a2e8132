use std::collections::BTreeMap;

use serde::Serialize;

use crate::diag::{any_errors, Diagnostic};
use crate::expr::ast::Expr;

// ─── Declarations ───────────────────────────────────────────────────────────

/// A config key declaration.
#[derive(Debug, Clone)]
pub struct ConfigDecl {
    pub name: String,
    pub config_type: Option<String>,
    pub default: Option<Expr>,
    pub secret: Option<bool>,
}

/// A named intermediate value.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub value: Expr,
}

/// A resource (or component resource) declaration.
#[derive(Debug, Clone)]
pub struct ResourceDecl {
    pub name: String,
    pub type_token: String,
    pub properties: Vec<(String, Expr)>,
    pub options: Option<Vec<(String, Expr)>>,
    pub get: Option<GetDecl>,
    pub component: bool,
}

/// `get: {id, state?}` — adopt an existing resource instead of creating one.
#[derive(Debug, Clone)]
pub struct GetDecl {
    pub id: Expr,
    pub state: Option<Expr>,
}

/// A stack output.
#[derive(Debug, Clone)]
pub struct OutputDecl {
    pub name: String,
    pub value: Expr,
}

/// The resource option keys the lowerer accepts; anything else is warned
/// about and dropped.
pub const KNOWN_OPTION_KEYS: &[&str] = &[
    "protect",
    "dependsOn",
    "parent",
    "provider",
    "providers",
    "aliases",
    "ignoreChanges",
    "version",
    "pluginDownloadURL",
    "retainOnDelete",
    "deleteBeforeReplace",
    "customTimeouts",
    "importID",
];

// ─── Project ────────────────────────────────────────────────────────────────

/// The merged logical document formed from one primary manifest plus its
/// overlays. Declaration lists preserve first-seen insertion order across
/// files.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub name: Option<String>,
    pub runtime: Option<String>,
    pub description: Option<String>,
    pub config: Vec<ConfigDecl>,
    pub variables: Vec<VariableDecl>,
    pub resources: Vec<ResourceDecl>,
    pub components: Vec<ResourceDecl>,
    pub outputs: Vec<OutputDecl>,
    /// Which file declared each top-level symbol.
    pub source_map: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Project {
    pub fn has_errors(&self) -> bool {
        any_errors(&self.diagnostics)
    }

    /// True if `name` is already bound as a config, variable, resource, or
    /// component. Outputs live in their own namespace.
    pub fn symbol_exists(&self, name: &str) -> bool {
        self.config.iter().any(|c| c.name == name)
            || self.variables.iter().any(|v| v.name == name)
            || self.resources.iter().any(|r| r.name == name)
            || self.components.iter().any(|c| c.name == name)
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            resource_count: self.resources.len(),
            variable_count: self.variables.len(),
            output_count: self.outputs.len(),
            config_count: self.config.len(),
            component_count: self.components.len(),
            resource_names: self.resources.iter().map(|r| r.name.clone()).collect(),
            variable_names: self.variables.iter().map(|v| v.name.clone()).collect(),
            output_names: self.outputs.iter().map(|o| o.name.clone()).collect(),
            has_errors: self.has_errors(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn info(&self, file_count: usize) -> ProjectInfo {
        let summary = self.summary();
        ProjectInfo {
            name: summary.name,
            description: summary.description,
            resource_count: summary.resource_count,
            variable_count: summary.variable_count,
            output_count: summary.output_count,
            config_count: summary.config_count,
            component_count: summary.component_count,
            resource_names: summary.resource_names,
            variable_names: summary.variable_names,
            output_names: summary.output_names,
            source_map: self.source_map.clone(),
            file_count,
            has_errors: summary.has_errors,
            diagnostics: summary.diagnostics,
        }
    }
}

// ─── External summaries ─────────────────────────────────────────────────────

/// The result of analyzing a single template text.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub resource_count: usize,
    pub variable_count: usize,
    pub output_count: usize,
    pub config_count: usize,
    pub component_count: usize,
    pub resource_names: Vec<String>,
    pub variable_names: Vec<String>,
    pub output_names: Vec<String>,
    pub has_errors: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// The files making up a project directory.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFiles {
    pub main_file: String,
    pub additional_files: Vec<String>,
    pub file_count: usize,
}

/// A loaded project: the template summary plus origin tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub resource_count: usize,
    pub variable_count: usize,
    pub output_count: usize,
    pub config_count: usize,
    pub component_count: usize,
    pub resource_names: Vec<String>,
    pub variable_names: Vec<String>,
    pub output_names: Vec<String>,
    pub source_map: BTreeMap<String, String>,
    pub file_count: usize,
    pub has_errors: bool,
    pub diagnostics: Vec<Diagnostic>,
}

