//! Node/stream data model and the graph builder
//!
//! The graph is a DAG of typed nodes (input, filter, output, global) connected
//! by [`Stream`] handles. Nodes are allocated in an arena owned by
//! [`FilterGraph`] and referenced by [`NodeId`].

pub mod builder;
pub mod node;
pub mod stream;

pub use builder::FilterGraph;
pub use node::{opt, param, Node, NodeId, OptValue, OptionList, ParamValue, StreamType};
pub use stream::{OutputStream, Stream, StreamKind};
