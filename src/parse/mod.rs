//! Command-line parser
//!
//! Inverts the compiler: a full ffmpeg invocation string is tokenized and
//! rebuilt into a [`FilterGraph`]. The pipeline is single-pass with five
//! strict phases (global options, inputs, filter graph, outputs, assembly);
//! the only carried state is the token cursor and the label-to-stream map.

pub mod clause;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::catalogue::{Catalogue, OptionKind};
use crate::error::{FfgraphError, FfgraphResult};
use crate::escape::split_command_line;
use crate::graph::{
    FilterGraph, OptValue, OptionList, OutputStream, ParamValue, Stream, StreamKind,
};

use clause::{parse_clause, split_clauses};

/// Construct a [`FfgraphError::BadCommand`] from a message.
fn bad(message: &str) -> FfgraphError {
    FfgraphError::BadCommand {
        message: message.to_string(),
    }
}

/// Result of parsing a complete ffmpeg command line
#[derive(Debug)]
pub struct ParsedCommand {
    pub graph: FilterGraph,
    pub terminal: OutputStream,
}

/// Parse an ffmpeg command line, rejecting options absent from the catalogue
pub fn parse_command(command: &str, catalogue: &Catalogue) -> FfgraphResult<ParsedCommand> {
    parse_with(command, catalogue, true)
}

/// Parse an ffmpeg command line, passing unknown options through unvalidated
pub fn parse_command_unchecked(
    command: &str,
    catalogue: &Catalogue,
) -> FfgraphResult<ParsedCommand> {
    parse_with(command, catalogue, false)
}

fn parse_with(command: &str, catalogue: &Catalogue, checked: bool) -> FfgraphResult<ParsedCommand> {
    let tokens = split_command_line(command)?;
    let program = tokens
        .first()
        .ok_or_else(|| bad("empty command line"))?;
    let stem = Path::new(program)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem != "ffmpeg" {
        return Err(bad(&format!(
            "expected an ffmpeg invocation, got '{program}'"
        )));
    }
    let mut tokens: Vec<String> = tokens[1..].to_vec();

    // The filter graph is recognized structurally wherever it appears, but
    // always parsed after the inputs it references.
    let mut filter_expression: Option<String> = None;
    if let Some(at) = tokens.iter().position(|token| token == "-filter_complex") {
        if at + 1 >= tokens.len() {
            return Err(FfgraphError::MissingValue {
                name: "filter_complex".to_string(),
            });
        }
        filter_expression = Some(tokens[at + 1].clone());
        tokens.drain(at..=at + 1);
    }

    // Phase 1: global options run up to the first input declaration.
    let global_end = tokens
        .iter()
        .position(|token| token == "-i")
        .unwrap_or(tokens.len());
    let globals = parse_option_block(&tokens[..global_end], catalogue, checked)?;
    let mut cursor = global_end;

    // Phase 2: one input node per -i occurrence, preceding tokens are its
    // options; sequential labels match compiler-side input numbering.
    let mut graph = FilterGraph::with_catalogue(catalogue.clone());
    let mut labels: HashMap<String, Stream> = HashMap::new();
    let mut input_streams: Vec<Stream> = Vec::new();
    while let Some(offset) = tokens[cursor..].iter().position(|token| token == "-i") {
        let at = cursor + offset;
        let options = parse_option_block(&tokens[cursor..at], catalogue, checked)?;
        let filename = tokens
            .get(at + 1)
            .ok_or_else(|| FfgraphError::MissingValue {
                name: "i".to_string(),
            })?;
        let stream = graph.input_with(filename, options);
        labels.insert(input_streams.len().to_string(), stream);
        input_streams.push(stream);
        cursor = at + 2;
    }

    // Phase 3: filter graph clauses, in order, against the running label map.
    if let Some(expression) = &filter_expression {
        parse_filter_graph(&mut graph, expression, &mut labels)?;
    }

    // Phase 4: remaining tokens form output blocks, each closed by a filename.
    let outputs = parse_outputs(
        &mut graph,
        &tokens[cursor..],
        &labels,
        &input_streams,
        catalogue,
        checked,
    )?;

    // Phase 5: assembly.
    let terminal = match outputs.as_slice() {
        [] => return Err(bad("command line has no output files")),
        [single] => *single,
        several => graph.merge_outputs(several),
    };
    let terminal = if globals.is_empty() {
        terminal
    } else {
        graph.global_args(terminal, globals)
    };

    debug!(
        inputs = input_streams.len(),
        outputs = outputs.len(),
        filters = filter_expression.is_some(),
        "parsed command line"
    );
    Ok(ParsedCommand { graph, terminal })
}

/// Parse every clause of a `-filter_complex` expression into the graph
fn parse_filter_graph(
    graph: &mut FilterGraph,
    expression: &str,
    labels: &mut HashMap<String, Stream>,
) -> FfgraphResult<()> {
    for clause_text in split_clauses(expression) {
        let parsed = parse_clause(&clause_text)?;
        let inputs: Vec<Stream> = parsed
            .inputs
            .iter()
            .map(|label| resolve_selector(labels, label))
            .collect::<FfgraphResult<_>>()?;
        let args: Vec<ParamValue> = parsed
            .args
            .iter()
            .map(|value| ParamValue::Str(value.clone()))
            .collect();
        let kwargs: Vec<(String, ParamValue)> = parsed
            .kwargs
            .iter()
            .map(|(key, value)| (key.clone(), ParamValue::Str(value.clone())))
            .collect();
        let streams = graph.filter_multi(&inputs, &parsed.name, args, kwargs)?;
        if parsed.outputs.len() > streams.len() {
            return Err(FfgraphError::InvalidClause {
                clause: clause_text.clone(),
                reason: format!(
                    "filter '{}' declares {} output pad(s) but {} labels are given",
                    parsed.name,
                    streams.len(),
                    parsed.outputs.len()
                ),
            });
        }
        for (position, label) in parsed.outputs.iter().enumerate() {
            labels.insert(label.clone(), streams[position]);
        }
    }
    Ok(())
}

/// Parse the output blocks at the tail of the token stream
fn parse_outputs(
    graph: &mut FilterGraph,
    tokens: &[String],
    labels: &HashMap<String, Stream>,
    input_streams: &[Stream],
    catalogue: &Catalogue,
    checked: bool,
) -> FfgraphResult<Vec<OutputStream>> {
    let mut outputs = Vec::new();
    let mut options = OptionList::new();
    let mut maps: Vec<String> = Vec::new();
    let mut at = 0;
    while at < tokens.len() {
        let token = &tokens[at];
        if token != "-" && token.starts_with('-') {
            if token == "-map" {
                let selector = tokens
                    .get(at + 1)
                    .ok_or_else(|| FfgraphError::MissingValue {
                        name: "map".to_string(),
                    })?;
                maps.push(selector.clone());
                at += 2;
            } else {
                let (key, value, next) = take_option(tokens, at, catalogue, checked)?;
                options.push((key, value));
                at = next;
            }
        } else {
            let streams: Vec<Stream> = if maps.is_empty() {
                match input_streams {
                    [single] => vec![*single],
                    _ => {
                        return Err(bad(&format!(
                            "output '{token}' has no -map and the command does not have exactly one input"
                        )))
                    }
                }
            } else {
                maps.iter()
                    .map(|selector| resolve_selector(labels, selector))
                    .collect::<FfgraphResult<_>>()?
            };
            outputs.push(graph.output_with(&streams, token, std::mem::take(&mut options)));
            maps.clear();
            at += 1;
        }
    }
    if !options.is_empty() || !maps.is_empty() {
        return Err(bad("trailing options without an output file"));
    }
    Ok(outputs)
}

/// Resolve a stream selector (`0`, `0:v`, `0:a:1`, `[label]`) against the
/// label map
fn resolve_selector(
    labels: &HashMap<String, Stream>,
    selector: &str,
) -> FfgraphResult<Stream> {
    let inner = selector
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(selector);
    let parts: Vec<&str> = inner.split(':').collect();
    let base = *labels
        .get(parts[0])
        .ok_or_else(|| FfgraphError::UnknownLabel {
            label: parts[0].to_string(),
        })?;
    if parts.len() == 1 {
        return Ok(base);
    }
    if base.kind != StreamKind::Av {
        return Err(bad(&format!(
            "selector '{inner}' applies a stream specifier to a non-input stream"
        )));
    }
    let kind = match parts[1] {
        "v" => StreamKind::Video,
        "a" => StreamKind::Audio,
        other => {
            return Err(bad(&format!(
                "unsupported stream specifier '{other}' in '{inner}'"
            )))
        }
    };
    let index = match parts.len() {
        2 => None,
        3 => Some(parts[2].parse::<usize>().map_err(|_| {
            bad(&format!("invalid stream index in '{inner}'"))
        })?),
        _ => return Err(bad(&format!("malformed stream selector '{inner}'"))),
    };
    Ok(Stream {
        node: base.node,
        kind,
        index,
    })
}

/// Parse a run of option tokens with no filenames in it
fn parse_option_block(
    tokens: &[String],
    catalogue: &Catalogue,
    checked: bool,
) -> FfgraphResult<OptionList> {
    let mut options = OptionList::new();
    let mut at = 0;
    while at < tokens.len() {
        if !tokens[at].starts_with('-') {
            return Err(bad(&format!(
                "unexpected token '{}' before an input or output file",
                tokens[at]
            )));
        }
        let (key, value, next) = take_option(tokens, at, catalogue, checked)?;
        options.push((key, value));
        at = next;
    }
    Ok(options)
}

/// Consume one option at `at`, returning its entry and the next cursor
///
/// `-flag value` for value options, bare `-flag` for boolean true, `-noflag`
/// for boolean false. In unchecked mode an unknown option takes the following
/// token as its value when that token does not look like another flag.
fn take_option(
    tokens: &[String],
    at: usize,
    catalogue: &Catalogue,
    checked: bool,
) -> FfgraphResult<(String, OptValue, usize)> {
    let name = &tokens[at][1..];
    if let Some(descriptor) = catalogue.option(name) {
        return match descriptor.kind {
            OptionKind::Flag => Ok((name.to_string(), OptValue::Flag(true), at + 1)),
            OptionKind::Value => {
                let value = tokens
                    .get(at + 1)
                    .ok_or_else(|| FfgraphError::MissingValue {
                        name: name.to_string(),
                    })?;
                Ok((name.to_string(), OptValue::Str(value.clone()), at + 2))
            }
        };
    }
    if let Some(base) = name.strip_prefix("no") {
        if let Some(descriptor) = catalogue.option(base) {
            if descriptor.kind == OptionKind::Flag {
                return Ok((base.to_string(), OptValue::Flag(false), at + 1));
            }
        }
    }
    if !checked {
        return match tokens.get(at + 1) {
            Some(next) if !next.starts_with('-') => {
                Ok((name.to_string(), OptValue::Str(next.clone()), at + 2))
            }
            _ => Ok((name.to_string(), OptValue::Flag(true), at + 1)),
        };
    }
    Err(FfgraphError::UnknownOption {
        name: name.to_string(),
    })
}
