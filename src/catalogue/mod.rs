//! Option and filter descriptor tables
//!
//! The compiler and parser consult a [`Catalogue`] for option shapes (flag vs
//! value, valid contexts) and filter pad typings. Catalogues are plain values
//! passed into graphs and parsers; there is no process-global registry.

use std::collections::HashMap;

use crate::graph::{ParamValue, StreamType};

/// Command-line contexts an option is valid in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionContexts(u8);

impl OptionContexts {
    pub const GLOBAL: OptionContexts = OptionContexts(0b001);
    pub const INPUT: OptionContexts = OptionContexts(0b010);
    pub const OUTPUT: OptionContexts = OptionContexts(0b100);
    /// Input and output blocks
    pub const IO: OptionContexts = OptionContexts(0b110);
    pub const ANY: OptionContexts = OptionContexts(0b111);

    /// Whether every context in `other` is allowed here
    pub fn contains(self, other: OptionContexts) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Whether an option is a bare flag or carries a value token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Value,
}

/// Shape of one known command-line option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub name: String,
    pub kind: OptionKind,
    pub contexts: OptionContexts,
}

/// Declared pad arity of one side of a filter
///
/// `Repeated` is the closed replacement for free-form arity formulas: the pad
/// count comes from a named parameter (or a single positional argument), with
/// a fixed fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum PadSpec {
    Fixed(Vec<StreamType>),
    Repeated {
        kind: StreamType,
        count_param: String,
        default: usize,
    },
}

impl PadSpec {
    /// One video pad
    pub fn video() -> Self {
        PadSpec::Fixed(vec![StreamType::Video])
    }

    /// One audio pad
    pub fn audio() -> Self {
        PadSpec::Fixed(vec![StreamType::Audio])
    }

    /// No pads (source filters)
    pub fn none() -> Self {
        PadSpec::Fixed(Vec::new())
    }

    /// `kind` repeated `count_param` times, defaulting when unset
    pub fn repeated(kind: StreamType, count_param: &str, default: usize) -> Self {
        PadSpec::Repeated {
            kind,
            count_param: count_param.to_string(),
            default,
        }
    }

    /// Resolve the concrete pad typing list against a call's parameters
    pub fn resolve(
        &self,
        args: &[ParamValue],
        kwargs: &[(String, ParamValue)],
    ) -> Vec<StreamType> {
        match self {
            PadSpec::Fixed(typings) => typings.clone(),
            PadSpec::Repeated {
                kind,
                count_param,
                default,
            } => {
                let count = kwargs
                    .iter()
                    .find(|(key, _)| key == count_param)
                    .and_then(|(_, value)| value.as_usize())
                    .or_else(|| match args {
                        [single] => single.as_usize(),
                        _ => None,
                    })
                    .unwrap_or(*default);
                vec![*kind; count]
            }
        }
    }
}

/// Declared typings of one filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    pub name: String,
    pub inputs: PadSpec,
    pub outputs: PadSpec,
}

/// Lookup tables for known options and filters
#[derive(Debug, Clone)]
pub struct Catalogue {
    options: HashMap<String, OptionDescriptor>,
    filters: HashMap<String, FilterDescriptor>,
}

impl Catalogue {
    /// Create an empty catalogue
    pub fn empty() -> Self {
        Self {
            options: HashMap::new(),
            filters: HashMap::new(),
        }
    }

    /// Register an option descriptor
    pub fn add_option(&mut self, name: &str, kind: OptionKind, contexts: OptionContexts) {
        self.options.insert(
            name.to_string(),
            OptionDescriptor {
                name: name.to_string(),
                kind,
                contexts,
            },
        );
    }

    /// Register a filter descriptor
    pub fn add_filter(&mut self, name: &str, inputs: PadSpec, outputs: PadSpec) {
        self.filters.insert(
            name.to_string(),
            FilterDescriptor {
                name: name.to_string(),
                inputs,
                outputs,
            },
        );
    }

    /// Look up an option by name
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.get(name)
    }

    /// Look up a filter by name
    pub fn filter(&self, name: &str) -> Option<&FilterDescriptor> {
        self.filters.get(name)
    }

    /// Catalogue of the common ffmpeg options and filters
    ///
    /// Intentionally a realistic subset, not the full generated surface;
    /// callers with exotic needs extend it through [`add_option`](Self::add_option)
    /// and [`add_filter`](Self::add_filter).
    pub fn builtin() -> Self {
        let mut catalogue = Self::empty();
        catalogue.register_builtin_options();
        catalogue.register_builtin_filters();
        catalogue
    }

    fn register_builtin_options(&mut self) {
        use OptionContexts as Ctx;
        use OptionKind::{Flag, Value};

        // Global behavior
        self.add_option("y", Flag, Ctx::GLOBAL);
        self.add_option("n", Flag, Ctx::GLOBAL);
        self.add_option("hide_banner", Flag, Ctx::GLOBAL);
        self.add_option("nostdin", Flag, Ctx::GLOBAL);
        self.add_option("stats", Flag, Ctx::GLOBAL);
        self.add_option("report", Flag, Ctx::GLOBAL);
        self.add_option("ignore_unknown", Flag, Ctx::GLOBAL);
        self.add_option("loglevel", Value, Ctx::GLOBAL);
        self.add_option("v", Value, Ctx::GLOBAL);
        self.add_option("threads", Value, Ctx::ANY);
        self.add_option("filter_threads", Value, Ctx::GLOBAL);
        self.add_option("filter_complex", Value, Ctx::GLOBAL);
        self.add_option("max_error_rate", Value, Ctx::GLOBAL);

        // Shared input/output
        self.add_option("f", Value, Ctx::IO);
        self.add_option("t", Value, Ctx::IO);
        self.add_option("ss", Value, Ctx::IO);
        self.add_option("to", Value, Ctx::IO);
        self.add_option("c", Value, Ctx::IO);
        self.add_option("codec", Value, Ctx::IO);
        self.add_option("c:v", Value, Ctx::IO);
        self.add_option("c:a", Value, Ctx::IO);
        self.add_option("c:s", Value, Ctx::IO);
        self.add_option("r", Value, Ctx::IO);
        self.add_option("s", Value, Ctx::IO);
        self.add_option("ar", Value, Ctx::IO);
        self.add_option("ac", Value, Ctx::IO);
        self.add_option("pix_fmt", Value, Ctx::IO);

        // Input-side
        self.add_option("sseof", Value, Ctx::INPUT);
        self.add_option("stream_loop", Value, Ctx::INPUT);
        self.add_option("re", Flag, Ctx::INPUT);
        self.add_option("itsoffset", Value, Ctx::INPUT);
        self.add_option("framerate", Value, Ctx::INPUT);
        self.add_option("safe", Value, Ctx::INPUT);
        self.add_option("probesize", Value, Ctx::INPUT);
        self.add_option("analyzeduration", Value, Ctx::INPUT);
        self.add_option("hwaccel", Value, Ctx::INPUT);
        self.add_option("thread_queue_size", Value, Ctx::INPUT);

        // Output-side
        self.add_option("map", Value, Ctx::OUTPUT);
        self.add_option("b", Value, Ctx::OUTPUT);
        self.add_option("b:v", Value, Ctx::OUTPUT);
        self.add_option("b:a", Value, Ctx::OUTPUT);
        self.add_option("vcodec", Value, Ctx::OUTPUT);
        self.add_option("acodec", Value, Ctx::OUTPUT);
        self.add_option("scodec", Value, Ctx::OUTPUT);
        self.add_option("vn", Flag, Ctx::OUTPUT);
        self.add_option("an", Flag, Ctx::OUTPUT);
        self.add_option("sn", Flag, Ctx::OUTPUT);
        self.add_option("dn", Flag, Ctx::OUTPUT);
        self.add_option("crf", Value, Ctx::OUTPUT);
        self.add_option("preset", Value, Ctx::OUTPUT);
        self.add_option("tune", Value, Ctx::OUTPUT);
        self.add_option("profile", Value, Ctx::OUTPUT);
        self.add_option("qscale", Value, Ctx::OUTPUT);
        self.add_option("q:v", Value, Ctx::OUTPUT);
        self.add_option("q:a", Value, Ctx::OUTPUT);
        self.add_option("maxrate", Value, Ctx::OUTPUT);
        self.add_option("minrate", Value, Ctx::OUTPUT);
        self.add_option("bufsize", Value, Ctx::OUTPUT);
        self.add_option("g", Value, Ctx::OUTPUT);
        self.add_option("keyint_min", Value, Ctx::OUTPUT);
        self.add_option("movflags", Value, Ctx::OUTPUT);
        self.add_option("vframes", Value, Ctx::OUTPUT);
        self.add_option("aframes", Value, Ctx::OUTPUT);
        self.add_option("shortest", Flag, Ctx::OUTPUT);
        self.add_option("metadata", Value, Ctx::OUTPUT);
        self.add_option("map_metadata", Value, Ctx::OUTPUT);
        self.add_option("map_chapters", Value, Ctx::OUTPUT);
        self.add_option("disposition", Value, Ctx::OUTPUT);
        self.add_option("fps_mode", Value, Ctx::OUTPUT);
        self.add_option("vsync", Value, Ctx::OUTPUT);
    }

    fn register_builtin_filters(&mut self) {
        use StreamType::{Audio, Video};

        // Unary video
        for name in [
            "null", "scale", "crop", "pad", "trim", "setpts", "hflip", "vflip", "transpose",
            "rotate", "fps", "format", "fade", "eq", "drawtext", "drawbox", "boxblur", "unsharp",
            "yadif", "setsar", "setdar",
        ] {
            self.add_filter(name, PadSpec::video(), PadSpec::video());
        }

        // Unary audio
        for name in [
            "anull",
            "atrim",
            "asetpts",
            "volume",
            "atempo",
            "aecho",
            "aresample",
            "adelay",
            "aformat",
            "loudnorm",
        ] {
            self.add_filter(name, PadSpec::audio(), PadSpec::audio());
        }

        // Fixed multi-input
        self.add_filter(
            "overlay",
            PadSpec::Fixed(vec![Video, Video]),
            PadSpec::video(),
        );
        self.add_filter(
            "blend",
            PadSpec::Fixed(vec![Video, Video]),
            PadSpec::video(),
        );

        // Variable-arity inputs
        self.add_filter(
            "amix",
            PadSpec::repeated(Audio, "inputs", 2),
            PadSpec::audio(),
        );
        self.add_filter(
            "amerge",
            PadSpec::repeated(Audio, "inputs", 2),
            PadSpec::audio(),
        );
        self.add_filter(
            "hstack",
            PadSpec::repeated(Video, "inputs", 2),
            PadSpec::video(),
        );
        self.add_filter(
            "vstack",
            PadSpec::repeated(Video, "inputs", 2),
            PadSpec::video(),
        );
        self.add_filter(
            "concat",
            PadSpec::repeated(Video, "n", 2),
            PadSpec::video(),
        );

        // Fan-out
        self.add_filter(
            "split",
            PadSpec::video(),
            PadSpec::repeated(Video, "outputs", 2),
        );
        self.add_filter(
            "asplit",
            PadSpec::audio(),
            PadSpec::repeated(Audio, "outputs", 2),
        );

        // Sources
        for name in ["testsrc", "color", "smptebars"] {
            self.add_filter(name, PadSpec::none(), PadSpec::video());
        }
        for name in ["sine", "anullsrc", "aevalsrc"] {
            self.add_filter(name, PadSpec::none(), PadSpec::audio());
        }
    }
}
