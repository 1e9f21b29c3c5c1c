//! Typed stream handles
//!
//! A [`Stream`] is a cheap copyable reference to one output pad of a node. It
//! never owns graph data; all node payloads stay in the arena.

use std::fmt;

use serde::Serialize;

use super::node::{NodeId, StreamType};

/// Media kind carried by a stream handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    /// Combined audio/video handle produced by an input declaration
    Av,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Av => write!(f, "av"),
        }
    }
}

impl From<StreamType> for StreamKind {
    fn from(typing: StreamType) -> Self {
        match typing {
            StreamType::Video => StreamKind::Video,
            StreamType::Audio => StreamKind::Audio,
        }
    }
}

/// Reference to one output pad of a node
///
/// `index` of `None` means "the default/only pad"; for an [`StreamKind::Av`]
/// handle it means "all streams of the input".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Stream {
    pub node: NodeId,
    pub kind: StreamKind,
    pub index: Option<usize>,
}

impl Stream {
    /// Select the video side of a combined input stream
    pub fn video(self) -> Stream {
        Stream {
            node: self.node,
            kind: StreamKind::Video,
            index: None,
        }
    }

    /// Select the audio side of a combined input stream
    pub fn audio(self) -> Stream {
        Stream {
            node: self.node,
            kind: StreamKind::Audio,
            index: None,
        }
    }

    /// Select a video stream of an input by explicit index
    pub fn video_stream(self, index: usize) -> Stream {
        Stream {
            node: self.node,
            kind: StreamKind::Video,
            index: Some(index),
        }
    }

    /// Select an audio stream of an input by explicit index
    pub fn audio_stream(self, index: usize) -> Stream {
        Stream {
            node: self.node,
            kind: StreamKind::Audio,
            index: Some(index),
        }
    }
}

/// Terminal handle returned by output, merge, and global-option calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OutputStream {
    pub node: NodeId,
}
