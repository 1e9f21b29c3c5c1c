//! ffgraph Filter-Graph Compiler Library
//!
//! Builds declarative ffmpeg processing graphs, compiles them into ffmpeg
//! command-line argument lists, and parses existing command lines back into
//! the same graph representation.
//!
//! ```
//! use ffgraph::FilterGraph;
//!
//! let mut graph = FilterGraph::new();
//! let source = graph.input("in.mp4");
//! let scaled = graph
//!     .filter(&[source], "scale", vec![1280.into(), 720.into()], vec![])
//!     .unwrap();
//! let out = graph.output(&[scaled], "out.mp4");
//!
//! let tokens = graph.compile(out).unwrap();
//! assert_eq!(tokens[3], "[0]scale=1280:720[s1]");
//! ```

pub mod catalogue;
pub mod cli;
pub mod compile;
pub mod error;
pub mod escape;
pub mod exec;
pub mod graph;
pub mod parse;
pub mod probe;
pub mod validate;

// Re-export commonly used types
pub use catalogue::{Catalogue, FilterDescriptor, OptionDescriptor, PadSpec};
pub use error::{FfgraphError, FfgraphResult};
pub use exec::{run, run_capture, CommandOutput, RunOptions};
pub use graph::{
    opt, param, FilterGraph, Node, NodeId, OptValue, OptionList, OutputStream, ParamValue, Stream,
    StreamKind, StreamType,
};
pub use parse::{parse_command, parse_command_unchecked, ParsedCommand};
pub use probe::{probe, probe_with, FormatInfo, ProbeReport, ProbeStream};
pub use validate::validate;
