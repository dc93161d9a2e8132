//! Execution-plan assembly: the final value an external deployment engine
//! drives. Everything here is a pure projection of the merged project.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value as Json};

use super::graph::build_symbol_graph;
use super::levels::resolve_levels;
use crate::diag::{any_errors, Diagnostic};
use crate::expr::serialize::expr_to_json;
use crate::project::loader::load_project_full;
use crate::project::types::{ConfigDecl, OutputDecl, Project, ResourceDecl, VariableDecl};
use crate::template::jinja::JinjaContext;

/// A planner node: one declaration, ready for serialization.
#[derive(Debug, Clone)]
pub enum PlanNode {
    Config(ConfigDecl),
    Variable(VariableDecl),
    Resource(ResourceDecl),
}

impl PlanNode {
    pub fn name(&self) -> &str {
        match self {
            PlanNode::Config(c) => &c.name,
            PlanNode::Variable(v) => &v.name,
            PlanNode::Resource(r) => &r.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlanNode::Config(_) => "config",
            PlanNode::Variable(_) => "variable",
            PlanNode::Resource(_) => "resource",
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            PlanNode::Config(c) => {
                let mut obj = json!({"kind": "config", "name": c.name});
                let map = obj.as_object_mut().unwrap();
                if let Some(t) = &c.config_type {
                    map.insert("type".to_string(), json!(t));
                }
                if let Some(default) = &c.default {
                    map.insert("default".to_string(), expr_to_json(default));
                }
                if let Some(secret) = c.secret {
                    map.insert("secret".to_string(), json!(secret));
                }
                obj
            }
            PlanNode::Variable(v) => {
                json!({"kind": "variable", "name": v.name, "value": expr_to_json(&v.value)})
            }
            PlanNode::Resource(r) => {
                let properties: Vec<Json> = r
                    .properties
                    .iter()
                    .map(|(k, v)| json!({"k": k, "v": expr_to_json(v)}))
                    .collect();
                let mut obj = json!({
                    "kind": "resource",
                    "name": r.name,
                    "type_token": r.type_token,
                    "properties": properties,
                });
                let map = obj.as_object_mut().unwrap();
                if let Some(options) = &r.options {
                    let opts: serde_json::Map<String, Json> = options
                        .iter()
                        .map(|(k, v)| (k.clone(), expr_to_json(v)))
                        .collect();
                    map.insert("options".to_string(), Json::Object(opts));
                }
                if let Some(get) = &r.get {
                    let mut get_obj = json!({"id": expr_to_json(&get.id)});
                    if let Some(state) = &get.state {
                        get_obj
                            .as_object_mut()
                            .unwrap()
                            .insert("state".to_string(), expr_to_json(state));
                    }
                    map.insert("get".to_string(), get_obj);
                }
                if r.component {
                    map.insert("component".to_string(), json!(true));
                }
                obj
            }
        }
    }
}

/// The topologically ordered, serializable output of the core.
#[derive(Debug, Clone)]
pub struct Plan {
    pub project_name: String,
    pub nodes: Vec<PlanNode>,
    pub outputs: Vec<OutputDecl>,
    pub source_map: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
    pub levels: Vec<Vec<String>>,
    pub has_errors: bool,
}

impl Plan {
    pub fn to_json(&self) -> Json {
        let nodes: Vec<Json> = self.nodes.iter().map(PlanNode::to_json).collect();
        let outputs: Vec<Json> = self
            .outputs
            .iter()
            .map(|o| json!({"name": o.name, "value": expr_to_json(&o.value)}))
            .collect();
        let diagnostics = serde_json::to_value(&self.diagnostics).unwrap_or(Json::Null);
        json!({
            "project_name": self.project_name,
            "nodes": nodes,
            "outputs": outputs,
            "source_map": self.source_map,
            "diagnostics": diagnostics,
            "levels": self.levels,
            "has_errors": self.has_errors,
        })
    }
}

/// Build the execution plan for a merged project.
pub fn plan_project(project: Project) -> Plan {
    let mut diagnostics = project.diagnostics.clone();
    let graph_info = build_symbol_graph(&project, &mut diagnostics);
    let levels = resolve_levels(&graph_info, &mut diagnostics);

    let mut nodes: Vec<PlanNode> = Vec::new();
    for decl in &project.config {
        nodes.push(PlanNode::Config(decl.clone()));
    }
    for decl in &project.variables {
        nodes.push(PlanNode::Variable(decl.clone()));
    }
    for decl in &project.resources {
        nodes.push(PlanNode::Resource(decl.clone()));
    }
    for decl in &project.components {
        nodes.push(PlanNode::Resource(decl.clone()));
    }

    let has_errors = any_errors(&diagnostics);
    Plan {
        project_name: project.name.clone().unwrap_or_default(),
        nodes,
        outputs: project.outputs.clone(),
        source_map: project.source_map.clone(),
        diagnostics,
        levels,
        has_errors,
    }
}

/// Load a project directory and produce its execution plan.
pub fn create_execution_plan(dir: &Path, ctx: Option<&JinjaContext>) -> Result<Plan> {
    let (project, _file_count) = load_project_full(dir, ctx)?;
    Ok(plan_project(project))
}
