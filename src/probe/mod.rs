//! ffprobe collaborator
//!
//! Invokes `ffprobe -show_format -show_streams -of json` on a media file,
//! parses stdout into a typed report, and surfaces non-zero exits as a
//! structured [`CommandFailed`](crate::error::FfgraphError::CommandFailed)
//! error. Purely a wrapper; no media handling happens here.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compile::serialize_cli_flag;
use crate::error::FfgraphResult;
use crate::exec::run_capture;
use crate::graph::OptValue;

/// Container-level information from `-show_format`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormatInfo {
    pub filename: Option<String>,
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    pub nb_streams: Option<u32>,
    pub duration: Option<String>,
    pub size: Option<String>,
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl FormatInfo {
    /// Duration in seconds, when ffprobe reported one
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration.as_deref().and_then(|text| text.parse().ok())
    }
}

/// Per-stream information from `-show_streams`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProbeStream {
    pub index: u32,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<u32>,
    pub channel_layout: Option<String>,
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ProbeStream {
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type.as_deref() == Some("audio")
    }
}

#[derive(Debug, Deserialize, Default)]
struct ProbeDocument {
    #[serde(default)]
    format: Option<FormatInfo>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Typed probe result plus the raw JSON document as an escape hatch
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub format: Option<FormatInfo>,
    pub streams: Vec<ProbeStream>,
    pub raw: serde_json::Value,
}

impl ProbeReport {
    pub fn video_streams(&self) -> impl Iterator<Item = &ProbeStream> {
        self.streams.iter().filter(|stream| stream.is_video())
    }

    pub fn audio_streams(&self) -> impl Iterator<Item = &ProbeStream> {
        self.streams.iter().filter(|stream| stream.is_audio())
    }
}

/// Probe a media file with default settings
pub fn probe(path: &str) -> FfgraphResult<ProbeReport> {
    probe_with(path, &[], None)
}

/// Probe a media file with passthrough flags and an optional timeout
///
/// Extra options use the same `-key value` / `-flag` conventions as the
/// compiler and are inserted before the filename.
pub fn probe_with(
    path: &str,
    extra: &[(String, OptValue)],
    timeout: Option<Duration>,
) -> FfgraphResult<ProbeReport> {
    let mut args: Vec<String> = vec![
        "-show_format".to_string(),
        "-show_streams".to_string(),
        "-of".to_string(),
        "json".to_string(),
    ];
    for (key, value) in extra {
        serialize_cli_flag(key, value, &mut args);
    }
    args.push(path.to_string());

    let output = run_capture("ffprobe", &args, timeout)?;
    let raw: serde_json::Value = serde_json::from_str(&output.stdout)?;
    let document: ProbeDocument = serde_json::from_value(raw.clone())?;
    info!(
        path,
        streams = document.streams.len(),
        "probed media file"
    );
    Ok(ProbeReport {
        format: document.format,
        streams: document.streams,
        raw,
    })
}
