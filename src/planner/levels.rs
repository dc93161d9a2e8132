//! Topological layering of the symbol graph. Kahn's algorithm produces
//! levels of symbols whose dependencies are all in earlier levels; whatever
//! never becomes ready is in a cycle (or downstream of one) and is omitted.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

use super::graph::GraphInfo;
use crate::diag::{self, Diagnostic};

/// Resolve the graph into deterministic execution levels. Within a level,
/// symbols sort by declaration-kind priority, then name.
pub fn resolve_levels(info: &GraphInfo, diags: &mut Vec<Diagnostic>) -> Vec<Vec<String>> {
    let graph = &info.graph;
    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
        .collect();

    let mut ready: Vec<NodeIndex> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&idx, _)| idx)
        .collect();

    let mut levels: Vec<Vec<String>> = Vec::new();
    let mut placed = 0usize;

    while !ready.is_empty() {
        let mut level: Vec<String> = ready.iter().map(|&idx| graph[idx].clone()).collect();
        level.sort_by_key(|name| {
            let priority = info.kinds.get(name).map(|k| k.priority()).unwrap_or(u8::MAX);
            (priority, name.clone())
        });

        let mut next: Vec<NodeIndex> = Vec::new();
        for &idx in &ready {
            placed += 1;
            for neighbor in graph.neighbors_directed(idx, Direction::Outgoing) {
                let degree = in_degree.get_mut(&neighbor).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    next.push(neighbor);
                }
            }
        }

        levels.push(level);
        ready = next;
    }

    if placed < graph.node_count() {
        report_cycles(info, diags);
    }

    levels
}

/// One diagnostic per strongly connected component that forms a cycle,
/// members in sorted order. Nodes that merely depend on a cycle are omitted
/// from the levels without a diagnostic of their own.
fn report_cycles(info: &GraphInfo, diags: &mut Vec<Diagnostic>) {
    let mut cycles: Vec<Vec<String>> = Vec::new();
    for scc in tarjan_scc(&info.graph) {
        let is_cycle = scc.len() > 1
            || (scc.len() == 1 && info.graph.contains_edge(scc[0], scc[0]));
        if !is_cycle {
            continue;
        }
        let mut members: Vec<String> = scc.iter().map(|&idx| info.graph[idx].clone()).collect();
        members.sort();
        cycles.push(members);
    }
    cycles.sort();

    for members in cycles {
        diags.push(Diagnostic::error(
            diag::CYCLE_DETECTED,
            format!("circular dependency detected among: {}", members.join(", ")),
        ));
    }
}
