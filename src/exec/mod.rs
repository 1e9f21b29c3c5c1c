//! Synchronous subprocess execution
//!
//! Shared by the probe wrapper and `run`: spawn, capture both output streams,
//! block until exit (optionally bounded by a timeout), and surface non-zero
//! exits as a single structured error. Nothing is ever retried.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{FfgraphError, FfgraphResult};
use crate::graph::{FilterGraph, OutputStream};

/// Captured result of a completed subprocess
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Options for [`run`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Prepend `-y` so existing output files are overwritten
    pub overwrite: bool,
    /// Prepend `-hide_banner -loglevel error`
    pub quiet: bool,
    /// Kill the process after this long
    pub timeout: Option<Duration>,
}

/// Compile the graph below `terminal` and execute it with ffmpeg
pub fn run(
    graph: &mut FilterGraph,
    terminal: OutputStream,
    options: &RunOptions,
) -> FfgraphResult<CommandOutput> {
    let mut args: Vec<String> = Vec::new();
    if options.overwrite {
        args.push("-y".to_string());
    }
    if options.quiet {
        args.push("-hide_banner".to_string());
        args.push("-loglevel".to_string());
        args.push("error".to_string());
    }
    args.extend(graph.compile(terminal)?);

    info!(tokens = args.len(), "executing ffmpeg");
    run_capture("ffmpeg", &args, options.timeout)
}

/// Spawn a program, capture stdout/stderr, and wait for completion
///
/// With a timeout, the child is polled and killed once the limit passes; the
/// caller sees [`FfgraphError::Timeout`]. A non-zero exit becomes
/// [`FfgraphError::CommandFailed`] carrying both output streams.
pub fn run_capture(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> FfgraphResult<CommandOutput> {
    debug!(program, args = args.len(), ?timeout, "spawning subprocess");
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_reader = child.stdout.take().map(drain_pipe);
    let stderr_reader = child.stderr.take().map(drain_pipe);

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => {
            let started = Instant::now();
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if started.elapsed() > limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FfgraphError::Timeout {
                        program: program.to_string(),
                        seconds: limit.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
    };

    let stdout = collect_pipe(stdout_reader);
    let stderr = collect_pipe(stderr_reader);
    if !status.success() {
        return Err(FfgraphError::CommandFailed {
            program: program.to_string(),
            status: status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }
    Ok(CommandOutput {
        status: status.code().unwrap_or(0),
        stdout,
        stderr,
    })
}

/// Read a child pipe to the end on a helper thread, avoiding pipe deadlock
fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn collect_pipe(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
