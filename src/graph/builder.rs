//! Arena-based graph builder
//!
//! All construction calls are permissive: they record exactly what the caller
//! asked for and leave structural checking to the validation pass, so graphs
//! can be assembled incrementally in any order.

use crate::catalogue::Catalogue;
use crate::error::{FfgraphError, FfgraphResult};

use super::node::{Node, NodeId, OptionList, ParamValue, StreamType};
use super::stream::{OutputStream, Stream, StreamKind};

/// A declarative ffmpeg processing graph
///
/// Owns every node in a `Vec` arena and the option/filter catalogue used to
/// resolve filter pad typings at construction time.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    nodes: Vec<Node>,
    catalogue: Catalogue,
}

impl FilterGraph {
    /// Create an empty graph backed by the built-in catalogue
    pub fn new() -> Self {
        Self::with_catalogue(Catalogue::builtin())
    }

    /// Create an empty graph backed by a caller-provided catalogue
    pub fn with_catalogue(catalogue: Catalogue) -> Self {
        Self {
            nodes: Vec::new(),
            catalogue,
        }
    }

    /// Catalogue consulted for filter typings and option descriptors
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Declare a media source, returning its combined audio/video stream
    pub fn input(&mut self, filename: &str) -> Stream {
        self.input_with(filename, OptionList::new())
    }

    /// Declare a media source with per-input options
    pub fn input_with(&mut self, filename: &str, options: OptionList) -> Stream {
        let node = self.push(Node::Input {
            filename: filename.to_string(),
            options,
        });
        Stream {
            node,
            kind: StreamKind::Av,
            index: None,
        }
    }

    /// Apply a single-output filter, returning the stream of its only pad
    ///
    /// Filters declaring several output pads return pad 0 here; use
    /// [`filter_multi`](Self::filter_multi) to get every pad.
    pub fn filter(
        &mut self,
        inputs: &[Stream],
        name: &str,
        args: Vec<ParamValue>,
        kwargs: Vec<(String, ParamValue)>,
    ) -> FfgraphResult<Stream> {
        let streams = self.filter_multi(inputs, name, args, kwargs)?;
        streams
            .first()
            .copied()
            .ok_or_else(|| FfgraphError::InvalidGraph {
                message: format!("filter '{name}' declares no output pads"),
            })
    }

    /// Apply a filter, returning one stream per declared output pad
    ///
    /// Pad typings are resolved through the catalogue; unknown filter names
    /// are rejected.
    pub fn filter_multi(
        &mut self,
        inputs: &[Stream],
        name: &str,
        args: Vec<ParamValue>,
        kwargs: Vec<(String, ParamValue)>,
    ) -> FfgraphResult<Vec<Stream>> {
        let (input_typings, output_typings) = {
            let descriptor =
                self.catalogue
                    .filter(name)
                    .ok_or_else(|| FfgraphError::UnknownFilter {
                        name: name.to_string(),
                    })?;
            (
                descriptor.inputs.resolve(&args, &kwargs),
                descriptor.outputs.resolve(&args, &kwargs),
            )
        };
        Ok(self.filter_custom(inputs, name, input_typings, output_typings, args, kwargs))
    }

    /// Apply a filter with explicit pad typings, bypassing the catalogue
    pub fn filter_custom(
        &mut self,
        inputs: &[Stream],
        name: &str,
        input_typings: Vec<StreamType>,
        output_typings: Vec<StreamType>,
        args: Vec<ParamValue>,
        kwargs: Vec<(String, ParamValue)>,
    ) -> Vec<Stream> {
        let multi = output_typings.len() > 1;
        let pads = output_typings.clone();
        let node = self.push(Node::Filter {
            name: name.to_string(),
            input_typings,
            output_typings,
            inputs: inputs.to_vec(),
            args,
            kwargs,
        });
        pads.iter()
            .enumerate()
            .map(|(position, typing)| Stream {
                node,
                kind: (*typing).into(),
                index: if multi { Some(position) } else { None },
            })
            .collect()
    }

    /// Declare a destination file mapped from the given streams
    pub fn output(&mut self, streams: &[Stream], filename: &str) -> OutputStream {
        self.output_with(streams, filename, OptionList::new())
    }

    /// Declare a destination file with per-output options
    pub fn output_with(
        &mut self,
        streams: &[Stream],
        filename: &str,
        options: OptionList,
    ) -> OutputStream {
        let node = self.push(Node::Output {
            filename: filename.to_string(),
            inputs: streams.to_vec(),
            options,
        });
        OutputStream { node }
    }

    /// Combine several outputs into one terminal handle
    pub fn merge_outputs(&mut self, outputs: &[OutputStream]) -> OutputStream {
        let node = self.push(Node::Global {
            options: OptionList::new(),
            inputs: outputs.to_vec(),
        });
        OutputStream { node }
    }

    /// Attach global options to a terminal handle
    pub fn global_args(&mut self, terminal: OutputStream, options: OptionList) -> OutputStream {
        let node = self.push(Node::Global {
            options,
            inputs: vec![terminal],
        });
        OutputStream { node }
    }

    /// Shorthand for the `-y` overwrite flag
    pub fn overwrite_output(&mut self, terminal: OutputStream) -> OutputStream {
        self.global_args(terminal, vec![super::node::opt("y", true)])
    }

    /// Redirect one input slot of a consumer node to a different stream
    ///
    /// Only the validator's split insertion uses this; node payloads are
    /// otherwise immutable after construction.
    pub(crate) fn rewire_input(&mut self, consumer: NodeId, slot: usize, stream: Stream) {
        match &mut self.nodes[consumer.0] {
            Node::Filter { inputs, .. } | Node::Output { inputs, .. } => {
                if let Some(entry) = inputs.get_mut(slot) {
                    *entry = stream;
                }
            }
            _ => {}
        }
    }
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::param;

    #[test]
    fn test_input_returns_av_stream() {
        let mut graph = FilterGraph::new();
        let stream = graph.input("in.mp4");
        assert_eq!(stream.kind, StreamKind::Av);
        assert_eq!(stream.index, None);
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_filter_resolves_typings_from_catalogue() {
        let mut graph = FilterGraph::new();
        let source = graph.input("in.mp4");
        let scaled = graph
            .filter(&[source], "scale", vec![1280.into(), 720.into()], vec![])
            .unwrap();
        assert_eq!(scaled.kind, StreamKind::Video);
        assert_eq!(scaled.index, None);

        match graph.node(scaled.node) {
            Node::Filter {
                input_typings,
                output_typings,
                ..
            } => {
                assert_eq!(input_typings, &[StreamType::Video]);
                assert_eq!(output_typings, &[StreamType::Video]);
            }
            other => panic!("expected filter node, got {}", other.describe()),
        }
    }

    #[test]
    fn test_filter_multi_indexes_pads() {
        let mut graph = FilterGraph::new();
        let source = graph.input("in.mp4");
        let pads = graph
            .filter_multi(&[source], "split", vec![3.into()], vec![])
            .unwrap();
        assert_eq!(pads.len(), 3);
        assert_eq!(pads[0].index, Some(0));
        assert_eq!(pads[2].index, Some(2));
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let mut graph = FilterGraph::new();
        let source = graph.input("in.mp4");
        let result = graph.filter(&[source], "frobnicate", vec![], vec![]);
        assert!(matches!(result, Err(FfgraphError::UnknownFilter { .. })));
    }

    #[test]
    fn test_construction_is_permissive() {
        // Type checking is the validator's job, not the builder's.
        let mut graph = FilterGraph::new();
        let source = graph.input("in.mp4");
        let wrong = graph.filter(&[source.audio()], "scale", vec![], vec![param("w", 640)]);
        assert!(wrong.is_ok());
    }
}
