//! Command implementations

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalogue::Catalogue;
use crate::cli::args::{ParseArgs, ProbeArgs, RunArgs};
use crate::exec::{self, RunOptions};
use crate::parse::{parse_command, parse_command_unchecked, ParsedCommand};
use crate::probe::probe_with;

/// Execute the parse command
///
/// Parses the given ffmpeg command line and prints it back normalized (or as
/// a JSON dump of the graph), proving the round trip.
pub fn parse(args: ParseArgs) -> Result<()> {
    let catalogue = Catalogue::builtin();
    let parsed = parse_graph(&args.command, &catalogue, args.no_validate)?;
    let ParsedCommand {
        mut graph,
        terminal,
    } = parsed;

    if args.json {
        println!("{}", serde_json::to_string_pretty(graph.nodes())?);
    } else {
        let normalized = graph
            .command_line(terminal)
            .context("Failed to compile the parsed graph")?;
        println!("{normalized}");
    }
    Ok(())
}

/// Execute the probe command
pub fn probe(args: ProbeArgs) -> Result<()> {
    info!("Probing media file: {}", args.input);
    let timeout = args.timeout.map(Duration::from_secs);
    let report = probe_with(&args.input, &[], timeout)
        .with_context(|| format!("Failed to probe '{}'", args.input))?;

    let rendered = if args.compact {
        serde_json::to_string(&report.raw)?
    } else {
        serde_json::to_string_pretty(&report.raw)?
    };
    println!("{rendered}");
    Ok(())
}

/// Execute the run command
pub fn run(args: RunArgs) -> Result<()> {
    let catalogue = Catalogue::builtin();
    let parsed = parse_graph(&args.command, &catalogue, args.no_validate)?;
    let ParsedCommand {
        mut graph,
        terminal,
    } = parsed;

    let options = RunOptions {
        overwrite: args.overwrite,
        quiet: args.quiet,
        timeout: args.timeout.map(Duration::from_secs),
    };
    let output = exec::run(&mut graph, terminal, &options).context("ffmpeg execution failed")?;
    info!(status = output.status, "ffmpeg completed");
    Ok(())
}

fn parse_graph(
    command: &str,
    catalogue: &Catalogue,
    no_validate: bool,
) -> Result<ParsedCommand> {
    let parsed = if no_validate {
        parse_command_unchecked(command, catalogue)
    } else {
        parse_command(command, catalogue)
    };
    parsed.context("Failed to parse command line")
}
