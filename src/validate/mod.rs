//! Graph validation pass
//!
//! Runs before every compile: checks pad arities and stream types against the
//! declared filter typings, rejects empty outputs and cycles, and resolves
//! filter fan-out either by inserting `split`/`asplit` nodes (auto-fix) or by
//! failing.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::compile::Context;
use crate::error::{FfgraphError, FfgraphResult};
use crate::graph::{FilterGraph, Node, NodeId, OutputStream, Stream, StreamKind, StreamType};

/// Validate the graph below `terminal`, returning the (possibly rewired)
/// terminal handle
///
/// With `auto_fix` enabled, a filter output consumed by several downstream
/// inputs gets a split filter inserted and the consumers rewired onto its
/// pads. Type mismatches are never auto-fixable.
pub fn validate(
    graph: &mut FilterGraph,
    terminal: OutputStream,
    auto_fix: bool,
) -> FfgraphResult<OutputStream> {
    // Context building runs the cycle check, so a cyclic graph fails before
    // any rewiring happens.
    let context = Context::build(graph, terminal.node)?;

    if context.nodes().len() < graph.nodes().len() {
        warn!(
            reachable = context.nodes().len(),
            total = graph.nodes().len(),
            "graph has disconnected nodes; they will not be compiled"
        );
    }

    for &id in context.nodes() {
        match graph.node(id) {
            Node::Output {
                filename, inputs, ..
            } => {
                if inputs.is_empty() {
                    return Err(FfgraphError::EmptyOutput {
                        filename: filename.clone(),
                    });
                }
            }
            Node::Filter {
                name,
                input_typings,
                inputs,
                ..
            } => {
                if inputs.len() != input_typings.len() {
                    return Err(FfgraphError::ArityMismatch {
                        filter: name.clone(),
                        expected: input_typings.len(),
                        actual: inputs.len(),
                    });
                }
                for (position, (stream, &typing)) in
                    inputs.iter().zip(input_typings).enumerate()
                {
                    let compatible = matches!(
                        (stream.kind, typing),
                        (StreamKind::Av, _)
                            | (StreamKind::Video, StreamType::Video)
                            | (StreamKind::Audio, StreamType::Audio)
                    );
                    if !compatible {
                        return Err(FfgraphError::TypeMismatch {
                            filter: name.clone(),
                            position,
                            expected: typing.to_string(),
                            actual: stream.kind.to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fix_fan_out(graph, &context, auto_fix)?;
    Ok(terminal)
}

/// Locate filter pads with several consumers and split them
///
/// Input-node streams fan out freely (ffmpeg decodes per use); only filter
/// pads require an explicit split.
fn fix_fan_out(graph: &mut FilterGraph, context: &Context, auto_fix: bool) -> FfgraphResult<()> {
    let mut consumers: HashMap<(NodeId, usize), Vec<(NodeId, usize)>> = HashMap::new();
    let mut pad_order: Vec<(NodeId, usize)> = Vec::new();
    for &id in context.nodes_by_id() {
        let inputs: &[Stream] = match graph.node(id) {
            Node::Filter { inputs, .. } | Node::Output { inputs, .. } => inputs,
            _ => &[],
        };
        for (slot, stream) in inputs.iter().enumerate() {
            if matches!(graph.node(stream.node), Node::Filter { .. }) {
                let pad = (stream.node, stream.index.unwrap_or(0));
                if !consumers.contains_key(&pad) {
                    pad_order.push(pad);
                }
                consumers.entry(pad).or_default().push((id, slot));
            }
        }
    }

    for pad in pad_order {
        let edges = consumers[&pad].clone();
        if edges.len() < 2 {
            continue;
        }
        let (producer, pad_index) = pad;
        let (producer_name, pad_type) = match graph.node(producer) {
            Node::Filter {
                name,
                output_typings,
                ..
            } => {
                let Some(typing) = output_typings.get(pad_index).copied() else {
                    return Err(FfgraphError::InvalidGraph {
                        message: format!("filter '{name}' has no output pad {pad_index}"),
                    });
                };
                (name.clone(), typing)
            }
            other => {
                return Err(FfgraphError::InvalidGraph {
                    message: format!("{} consumed as a filter pad", other.describe()),
                });
            }
        };

        if !auto_fix {
            return Err(FfgraphError::MultipleConsumers {
                filter: producer_name,
                pad: pad_index,
                count: edges.len(),
            });
        }

        let split_name = match pad_type {
            StreamType::Video => "split",
            StreamType::Audio => "asplit",
        };
        let source = consumed_stream(graph, edges[0])?;
        let pads = graph.filter_custom(
            &[source],
            split_name,
            vec![pad_type],
            vec![pad_type; edges.len()],
            vec![edges.len().into()],
            Vec::new(),
        );
        for ((consumer, slot), stream) in edges.iter().copied().zip(pads.iter().copied()) {
            graph.rewire_input(consumer, slot, stream);
        }
        debug!(
            filter = %producer_name,
            pad = pad_index,
            consumers = edges.len(),
            split = split_name,
            "inserted fan-out split"
        );
    }
    Ok(())
}

fn consumed_stream(graph: &FilterGraph, edge: (NodeId, usize)) -> FfgraphResult<Stream> {
    match graph.node(edge.0) {
        Node::Filter { inputs, .. } | Node::Output { inputs, .. } => inputs
            .get(edge.1)
            .copied()
            .ok_or_else(|| FfgraphError::InvalidGraph {
                message: format!("{} lost input slot {}", graph.node(edge.0).describe(), edge.1),
            }),
        other => Err(FfgraphError::InvalidGraph {
            message: format!("{} has no input slots", other.describe()),
        }),
    }
}
