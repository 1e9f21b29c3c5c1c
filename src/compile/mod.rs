//! Compiler: filter graphs into ffmpeg argument lists
//!
//! Emission order is fixed: global options, input declarations, one combined
//! `-filter_complex` argument, output declarations. Stream labels are derived
//! from the context's node ids, so compiling an unchanged graph twice yields
//! byte-identical output.

pub mod context;

use tracing::debug;

pub use context::Context;

use crate::error::{FfgraphError, FfgraphResult};
use crate::escape::{escape, join_command_line, FILTER_CLAUSE_SPECIAL, FILTER_PARAM_SPECIAL};
use crate::graph::{
    FilterGraph, Node, NodeId, OptValue, OutputStream, ParamValue, Stream, StreamKind,
};

impl FilterGraph {
    /// Compile the graph below `terminal` into argument tokens, auto-fixing
    /// fixable structural problems
    pub fn compile(&mut self, terminal: OutputStream) -> FfgraphResult<Vec<String>> {
        self.compile_with(terminal, true)
    }

    /// Compile with explicit control over the validator's auto-fix mode
    pub fn compile_with(
        &mut self,
        terminal: OutputStream,
        auto_fix: bool,
    ) -> FfgraphResult<Vec<String>> {
        let terminal = crate::validate::validate(self, terminal, auto_fix)?;
        let context = Context::build(self, terminal.node)?;
        let mut args: Vec<String> = Vec::new();

        for &id in context.nodes_by_id() {
            if let Node::Global { options, .. } = self.node(id) {
                for (key, value) in options {
                    serialize_cli_flag(key, value, &mut args);
                }
            }
        }

        for &id in context.nodes_by_id() {
            if let Node::Input { filename, options } = self.node(id) {
                for (key, value) in options {
                    serialize_cli_flag(key, value, &mut args);
                }
                args.push("-i".to_string());
                args.push(filename.clone());
            }
        }

        let mut clauses = Vec::new();
        for &id in context.filter_order() {
            clauses.push(self.filter_clause(id, &context)?);
        }
        if !clauses.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(clauses.join(";"));
        }

        let elide_map = self.can_elide_map(&context);
        for &id in context.nodes_by_id() {
            if let Node::Output {
                filename,
                inputs,
                options,
            } = self.node(id)
            {
                if !elide_map {
                    for stream in inputs {
                        args.push("-map".to_string());
                        args.push(self.map_target(&context, *stream)?);
                    }
                }
                for (key, value) in options {
                    serialize_cli_flag(key, value, &mut args);
                }
                args.push(filename.clone());
            }
        }

        debug!(
            nodes = context.nodes().len(),
            tokens = args.len(),
            "compiled filter graph"
        );
        Ok(args)
    }

    /// Compile and render as a shell-quoted `ffmpeg ...` command line
    pub fn command_line(&mut self, terminal: OutputStream) -> FfgraphResult<String> {
        let args = self.compile(terminal)?;
        Ok(format!("ffmpeg {}", join_command_line(&args)))
    }

    /// The `-map` entries of the single output are dropped when ffmpeg's own
    /// default mapping would pick the same streams: one input, one output,
    /// connected by a bare combined stream.
    fn can_elide_map(&self, context: &Context) -> bool {
        let mut inputs = 0;
        let mut outputs = Vec::new();
        for &id in context.nodes_by_id() {
            match self.node(id) {
                Node::Input { .. } => inputs += 1,
                Node::Output { .. } => outputs.push(id),
                _ => {}
            }
        }
        if inputs != 1 || outputs.len() != 1 {
            return false;
        }
        match self.node(outputs[0]) {
            Node::Output { inputs, .. } => {
                inputs.len() == 1
                    && inputs[0].kind == StreamKind::Av
                    && inputs[0].index.is_none()
                    && matches!(self.node(inputs[0].node), Node::Input { .. })
            }
            _ => false,
        }
    }

    /// Value of a `-map` token: bracketed for filter pads, bare for inputs
    fn map_target(&self, context: &Context, stream: Stream) -> FfgraphResult<String> {
        let label = stream_label(self, context, stream)?;
        match self.node(stream.node) {
            Node::Filter { .. } => Ok(format!("[{label}]")),
            _ => Ok(label),
        }
    }

    /// Serialize one filter node as a mini-language clause
    fn filter_clause(&self, id: NodeId, context: &Context) -> FfgraphResult<String> {
        let Node::Filter {
            name,
            inputs,
            args,
            kwargs,
            ..
        } = self.node(id)
        else {
            return Err(FfgraphError::InvalidGraph {
                message: format!("{} is not a filter", self.node(id).describe()),
            });
        };

        let mut clause = String::new();
        for stream in inputs {
            clause.push('[');
            clause.push_str(&stream_label(self, context, *stream)?);
            clause.push(']');
        }

        let mut params: Vec<String> = Vec::new();
        for value in args {
            if let Some(text) = serialize_filter_param(value) {
                params.push(text);
            }
        }
        for (key, value) in kwargs {
            if let Some(text) = serialize_filter_param(value) {
                params.push(format!("{}={}", escape(key, FILTER_PARAM_SPECIAL), text));
            }
        }
        let mut body = escape(name, FILTER_PARAM_SPECIAL);
        if !params.is_empty() {
            body.push('=');
            body.push_str(&params.join(":"));
        }
        clause.push_str(&escape(&body, FILTER_CLAUSE_SPECIAL));

        // Consumed pads only, in pad order; dangling pads stay unlabeled.
        let mut consumed: Vec<Stream> = context.outgoing_streams(id).to_vec();
        consumed.sort_by_key(|stream| stream.index.unwrap_or(0));
        consumed.dedup_by_key(|stream| stream.index.unwrap_or(0));
        for stream in consumed {
            clause.push('[');
            clause.push_str(&stream_label(self, context, stream)?);
            clause.push(']');
        }
        Ok(clause)
    }
}

/// Label of a stream within one compiled command
///
/// Input pads use ffmpeg stream-specifier syntax (`0`, `0:v`, `0:a:1`);
/// filter pads use generated link names (`s3`, `s3#0`).
pub fn stream_label(
    graph: &FilterGraph,
    context: &Context,
    stream: Stream,
) -> FfgraphResult<String> {
    let id = context.id(stream.node);
    match graph.node(stream.node) {
        Node::Input { .. } => Ok(match (stream.kind, stream.index) {
            (StreamKind::Av, _) => id.to_string(),
            (StreamKind::Video, None) => format!("{id}:v"),
            (StreamKind::Video, Some(index)) => format!("{id}:v:{index}"),
            (StreamKind::Audio, None) => format!("{id}:a"),
            (StreamKind::Audio, Some(index)) => format!("{id}:a:{index}"),
        }),
        Node::Filter { output_typings, .. } => Ok(if output_typings.len() > 1 {
            format!("s{id}#{}", stream.index.unwrap_or(0))
        } else {
            format!("s{id}")
        }),
        node => Err(FfgraphError::InvalidGraph {
            message: format!("{} cannot produce a labeled stream", node.describe()),
        }),
    }
}

/// CLI flag policy: `-key value`, bare `-key` for true, `-nokey` for false
pub fn serialize_cli_flag(key: &str, value: &OptValue, args: &mut Vec<String>) {
    match value {
        OptValue::Str(text) => {
            args.push(format!("-{key}"));
            args.push(text.clone());
        }
        OptValue::Flag(true) => args.push(format!("-{key}")),
        OptValue::Flag(false) => args.push(format!("-no{key}")),
    }
}

/// Filter parameter policy: booleans become `1`/`0`, defaults are omitted,
/// everything else is escaped text
pub fn serialize_filter_param(value: &ParamValue) -> Option<String> {
    match value {
        ParamValue::Str(text) => Some(escape(text, FILTER_PARAM_SPECIAL)),
        ParamValue::Bool(true) => Some("1".to_string()),
        ParamValue::Bool(false) => Some("0".to_string()),
        ParamValue::Default => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_cli_flag_policies() {
        let mut args = Vec::new();
        serialize_cli_flag("crf", &OptValue::Str("18".to_string()), &mut args);
        serialize_cli_flag("y", &OptValue::Flag(true), &mut args);
        serialize_cli_flag("stats", &OptValue::Flag(false), &mut args);
        assert_eq!(args, vec!["-crf", "18", "-y", "-nostats"]);
    }

    #[test]
    fn test_serialize_filter_param_policies() {
        assert_eq!(
            serialize_filter_param(&ParamValue::Bool(true)),
            Some("1".to_string())
        );
        assert_eq!(
            serialize_filter_param(&ParamValue::Bool(false)),
            Some("0".to_string())
        );
        assert_eq!(serialize_filter_param(&ParamValue::Default), None);
        assert_eq!(
            serialize_filter_param(&ParamValue::Str("a:b".to_string())),
            Some("a\\:b".to_string())
        );
    }

    #[test]
    fn test_stream_label_forms() {
        let mut graph = FilterGraph::new();
        let source = graph.input("in.mp4");
        let scaled = graph
            .filter(&[source.video()], "scale", vec![640.into(), 480.into()], vec![])
            .unwrap();
        let out = graph.output(&[scaled, source.audio_stream(1)], "out.mp4");
        let context = Context::build(&graph, out.node).unwrap();

        assert_eq!(stream_label(&graph, &context, source).unwrap(), "0");
        assert_eq!(
            stream_label(&graph, &context, source.video()).unwrap(),
            "0:v"
        );
        assert_eq!(
            stream_label(&graph, &context, source.audio_stream(1)).unwrap(),
            "0:a:1"
        );
        assert_eq!(stream_label(&graph, &context, scaled).unwrap(), "s1");
    }
}
