//! The symbol dependency graph: one node per declaration, one edge from
//! dependency to dependent for every resolvable symbol reference.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::diag::{self, Diagnostic};
use crate::expr::ast::Expr;
use crate::expr::walker::collect_symbol_refs;
use crate::project::types::Project;

/// Declaration kinds, in level-ordering priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclKind {
    Config,
    Variable,
    Resource,
    Component,
    Output,
}

impl DeclKind {
    pub fn priority(self) -> u8 {
        match self {
            DeclKind::Config => 0,
            DeclKind::Variable => 1,
            DeclKind::Resource => 2,
            DeclKind::Component => 3,
            DeclKind::Output => 4,
        }
    }
}

/// A dependency graph over symbol names. Edges run dependency → dependent.
pub type SymbolGraph = DiGraph<String, ()>;

pub struct GraphInfo {
    pub graph: SymbolGraph,
    pub node_map: HashMap<String, NodeIndex>,
    pub kinds: HashMap<String, DeclKind>,
}

impl GraphInfo {
    fn add_node(&mut self, name: &str, kind: DeclKind) -> bool {
        if self.node_map.contains_key(name) {
            return false;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        self.kinds.insert(name.to_string(), kind);
        true
    }

    /// Resolve a reference target. Outputs are not referenceable.
    fn target(&self, base: &str) -> Option<NodeIndex> {
        match self.kinds.get(base) {
            Some(DeclKind::Output) | None => None,
            Some(_) => self.node_map.get(base).copied(),
        }
    }

    fn add_edges(
        &mut self,
        name: &str,
        exprs: &[&Expr],
        source_map: &BTreeMap<String, String>,
        diags: &mut Vec<Diagnostic>,
    ) {
        let to_idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return,
        };
        let mut refs = Vec::new();
        for expr in exprs {
            collect_symbol_refs(expr, &mut refs);
        }
        // Dedupe while keeping deterministic order.
        let bases: BTreeSet<String> = refs.into_iter().collect();
        for base in bases {
            match self.target(&base) {
                Some(from_idx) => {
                    self.graph.add_edge(from_idx, to_idx, ());
                }
                None => diags.push(
                    Diagnostic::error(
                        diag::UNKNOWN_SYMBOL,
                        format!("'{}' references unknown symbol '{}'", name, base),
                    )
                    .with_file(source_map.get(name).map(String::as_str).unwrap_or("")),
                ),
            }
        }
    }
}

/// Build the symbol graph for a merged project. Unresolvable references are
/// reported and contribute no edge; config declarations never depend on
/// anything.
pub fn build_symbol_graph(project: &Project, diags: &mut Vec<Diagnostic>) -> GraphInfo {
    let mut info = GraphInfo {
        graph: DiGraph::new(),
        node_map: HashMap::new(),
        kinds: HashMap::new(),
    };

    for decl in &project.config {
        info.add_node(&decl.name, DeclKind::Config);
    }
    for decl in &project.variables {
        info.add_node(&decl.name, DeclKind::Variable);
    }
    for decl in &project.resources {
        info.add_node(&decl.name, DeclKind::Resource);
    }
    for decl in &project.components {
        info.add_node(&decl.name, DeclKind::Component);
    }
    for output in &project.outputs {
        if !info.add_node(&output.name, DeclKind::Output) {
            diags.push(Diagnostic::warning(
                diag::DUPLICATE_SYMBOL,
                format!(
                    "output '{}' shadows a declaration of the same name and is not leveled",
                    output.name
                ),
            ));
        }
    }

    for decl in &project.variables {
        info.add_edges(&decl.name, &[&decl.value], &project.source_map, diags);
    }
    for decl in project.resources.iter().chain(project.components.iter()) {
        let mut exprs: Vec<&Expr> = decl.properties.iter().map(|(_, e)| e).collect();
        if let Some(options) = &decl.options {
            exprs.extend(options.iter().map(|(_, e)| e));
        }
        if let Some(get) = &decl.get {
            exprs.push(&get.id);
            if let Some(state) = &get.state {
                exprs.push(state);
            }
        }
        info.add_edges(&decl.name, &exprs, &project.source_map, diags);
    }
    for output in &project.outputs {
        // An output shadowed by a declaration gets no edges of its own.
        if info.kinds.get(output.name.as_str()) == Some(&DeclKind::Output) {
            info.add_edges(&output.name, &[&output.value], &project.source_map, diags);
        }
    }

    tracing::debug!(
        nodes = info.graph.node_count(),
        edges = info.graph.edge_count(),
        "built symbol graph"
    );

    info
}

/// Render the symbol graph as DOT for visualization.
pub fn to_dot(info: &GraphInfo) -> String {
    let mut lines = Vec::new();
    lines.push("digraph project {".to_string());
    lines.push("    rankdir=TB;".to_string());
    lines.push("    node [shape=box, style=filled, fillcolor=lightblue];".to_string());

    let mut names: Vec<&String> = info.node_map.keys().collect();
    names.sort();
    for name in names {
        lines.push(format!("    \"{}\" [label=\"{}\"];", name, name));
    }

    let mut edges: Vec<(String, String)> = info
        .graph
        .edge_indices()
        .filter_map(|edge| info.graph.edge_endpoints(edge))
        .map(|(from, to)| (info.graph[from].clone(), info.graph[to].clone()))
        .collect();
    edges.sort();
    for (from, to) in edges {
        lines.push(format!("    \"{}\" -> \"{}\";", from, to));
    }

    lines.push("}".to_string());
    lines.join("\n")
}
