//! Per-compile graph context
//!
//! Built fresh from a terminal node before every compile: the reachable node
//! set, a stable numeric id per node, the outgoing-stream map, and a checked
//! topological order.

use std::collections::{HashMap, HashSet};

use crate::error::{FfgraphError, FfgraphResult};
use crate::graph::{FilterGraph, Node, NodeId, Stream};

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Computed view of the reachable graph below one root node
#[derive(Debug)]
pub struct Context {
    /// Upstream-first discovery order
    order: Vec<NodeId>,
    /// Reachable nodes sorted by assigned id (inputs first)
    by_id: Vec<NodeId>,
    ids: HashMap<NodeId, usize>,
    outgoing: HashMap<NodeId, Vec<Stream>>,
    filter_order: Vec<NodeId>,
}

impl Context {
    /// Walk the graph from `root`, assign ids, and compute consumer maps
    ///
    /// Fails with [`FfgraphError::CycleDetected`] if the reachable subgraph is
    /// not a DAG.
    pub fn build(graph: &FilterGraph, root: NodeId) -> FfgraphResult<Context> {
        let order = discover(graph, root);
        let topo = topological_order(graph, &order)?;

        // Input nodes are numbered first so their ids double as `-i` positions.
        let mut by_id: Vec<NodeId> = Vec::with_capacity(order.len());
        by_id.extend(
            order
                .iter()
                .filter(|&&id| matches!(graph.node(id), Node::Input { .. })),
        );
        by_id.extend(
            order
                .iter()
                .filter(|&&id| !matches!(graph.node(id), Node::Input { .. })),
        );
        let ids: HashMap<NodeId, usize> = by_id
            .iter()
            .enumerate()
            .map(|(position, &id)| (id, position))
            .collect();

        let mut outgoing: HashMap<NodeId, Vec<Stream>> = HashMap::new();
        for &id in &order {
            let inputs: &[Stream] = match graph.node(id) {
                Node::Filter { inputs, .. } | Node::Output { inputs, .. } => inputs,
                _ => &[],
            };
            for stream in inputs {
                let consumers = outgoing.entry(stream.node).or_default();
                if !consumers.contains(stream) {
                    consumers.push(*stream);
                }
            }
        }

        let filter_order = topo
            .iter()
            .copied()
            .filter(|&id| matches!(graph.node(id), Node::Filter { .. }))
            .collect();

        Ok(Context {
            order,
            by_id,
            ids,
            outgoing,
            filter_order,
        })
    }

    /// Reachable nodes in discovery order
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// Reachable nodes sorted by assigned id
    pub fn nodes_by_id(&self) -> &[NodeId] {
        &self.by_id
    }

    /// Numeric id assigned to a reachable node
    pub fn id(&self, node: NodeId) -> usize {
        debug_assert!(self.ids.contains_key(&node));
        self.ids.get(&node).copied().unwrap_or(0)
    }

    /// Every distinct stream in the reachable graph produced by `node`
    pub fn outgoing_streams(&self, node: NodeId) -> &[Stream] {
        self.outgoing
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Filter nodes in topological order
    pub fn filter_order(&self) -> &[NodeId] {
        &self.filter_order
    }
}

/// Reachable nodes, upstream-first, each exactly once
///
/// The inputs of a node are visited in declaration order before the node
/// itself, so the order is deterministic for a given graph.
fn discover(graph: &FilterGraph, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![Step::Enter(root)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                if !visited.insert(id) {
                    continue;
                }
                stack.push(Step::Exit(id));
                for dependency in graph.node(id).upstream().into_iter().rev() {
                    stack.push(Step::Enter(dependency));
                }
            }
            Step::Exit(id) => order.push(id),
        }
    }
    order
}

/// Kahn's algorithm over the reachable subgraph, ties broken by discovery order
fn topological_order(graph: &FilterGraph, order: &[NodeId]) -> FfgraphResult<Vec<NodeId>> {
    let mut indegree: HashMap<NodeId, usize> = order
        .iter()
        .map(|&id| (id, graph.node(id).upstream().len()))
        .collect();
    let mut downstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &id in order {
        for dependency in graph.node(id).upstream() {
            downstream.entry(dependency).or_default().push(id);
        }
    }

    let mut topo = Vec::with_capacity(order.len());
    let mut emitted: HashSet<NodeId> = HashSet::new();
    while topo.len() < order.len() {
        let ready = order
            .iter()
            .copied()
            .find(|id| !emitted.contains(id) && indegree.get(id) == Some(&0));
        let Some(next) = ready else {
            let stuck = order
                .iter()
                .copied()
                .find(|id| !emitted.contains(id))
                .map(|id| graph.node(id).describe())
                .unwrap_or_default();
            return Err(FfgraphError::CycleDetected { node: stuck });
        };
        emitted.insert(next);
        topo.push(next);
        if let Some(consumers) = downstream.get(&next) {
            for consumer in consumers {
                if let Some(degree) = indegree.get_mut(consumer) {
                    *degree -= 1;
                }
            }
        }
    }
    Ok(topo)
}
