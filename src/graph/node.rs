//! Graph node definitions
//!
//! Nodes live in the [`FilterGraph`](super::FilterGraph) arena and are referenced
//! everywhere by [`NodeId`] index rather than by pointer, so diamond-shaped
//! graphs need no shared ownership.

use std::fmt;

use serde::Serialize;

use super::stream::{OutputStream, Stream};

/// Identifier of a node inside a graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stream type declared by a filter pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamType::Video => write!(f, "video"),
            StreamType::Audio => write!(f, "audio"),
        }
    }
}

/// Value of a command-line option attached to an input, output, or global node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptValue {
    /// Option with a value token (`-key value`)
    Str(String),
    /// Boolean option (`-key` when true, `-nokey` when false)
    Flag(bool),
}

impl From<&str> for OptValue {
    fn from(value: &str) -> Self {
        OptValue::Str(value.to_string())
    }
}

impl From<String> for OptValue {
    fn from(value: String) -> Self {
        OptValue::Str(value)
    }
}

impl From<bool> for OptValue {
    fn from(value: bool) -> Self {
        OptValue::Flag(value)
    }
}

macro_rules! numeric_opt_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for OptValue {
            fn from(value: $ty) -> Self {
                OptValue::Str(value.to_string())
            }
        })*
    };
}

numeric_opt_value!(i32, i64, u32, u64, usize, f32, f64);

/// Ordered option list for input, output, and global nodes
pub type OptionList = Vec<(String, OptValue)>;

/// Value of a filter parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Literal value, stringified and escaped on serialization
    Str(String),
    /// Boolean, serialized as `1` / `0` inside filter parameter strings
    Bool(bool),
    /// Use the filter's declared default; omitted from the compiled clause
    Default,
}

impl ParamValue {
    pub(crate) fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Str(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

macro_rules! numeric_param_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Str(value.to_string())
            }
        })*
    };
}

numeric_param_value!(i32, i64, u32, u64, usize, f32, f64);

/// Build one entry of an [`OptionList`]
pub fn opt(key: &str, value: impl Into<OptValue>) -> (String, OptValue) {
    (key.to_string(), value.into())
}

/// Build one keyword parameter for a filter
pub fn param(key: &str, value: impl Into<ParamValue>) -> (String, ParamValue) {
    (key.to_string(), value.into())
}

/// A vertex in the processing graph
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    /// Media source declared with `-i`
    Input { filename: String, options: OptionList },
    /// One clause of the filter graph
    Filter {
        name: String,
        input_typings: Vec<StreamType>,
        output_typings: Vec<StreamType>,
        inputs: Vec<Stream>,
        args: Vec<ParamValue>,
        kwargs: Vec<(String, ParamValue)>,
    },
    /// Destination file with its `-map` sources
    Output {
        filename: String,
        inputs: Vec<Stream>,
        options: OptionList,
    },
    /// Global options; also the merge point for multi-output commands
    Global {
        options: OptionList,
        inputs: Vec<OutputStream>,
    },
}

impl Node {
    /// Upstream dependencies in declaration order
    pub(crate) fn upstream(&self) -> Vec<NodeId> {
        match self {
            Node::Input { .. } => Vec::new(),
            Node::Filter { inputs, .. } | Node::Output { inputs, .. } => {
                inputs.iter().map(|stream| stream.node).collect()
            }
            Node::Global { inputs, .. } => inputs.iter().map(|output| output.node).collect(),
        }
    }

    /// Human-readable description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Node::Input { filename, .. } => format!("input '{filename}'"),
            Node::Filter { name, .. } => format!("filter '{name}'"),
            Node::Output { filename, .. } => format!("output '{filename}'"),
            Node::Global { .. } => "global options".to_string(),
        }
    }
}
