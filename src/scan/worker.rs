//! Command workers
//!
//! A worker pulls [`JobDescriptor`]s off the job queue and runs each one as a
//! subprocess until the queue is closed and drained. A failing command is
//! logged and counted; it never stops the worker.

use console::style;
use crossbeam::channel::Receiver;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use tracing::{debug, error, info, trace};

use super::error::ScanError;
use super::types::{JobDescriptor, WorkerStats};
use crate::config::OutputMode;

/// Buffered output of a command run in [`OutputMode::Captured`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Result of running a single descriptor
#[derive(Debug)]
pub struct Execution {
    pub result: Result<(), ScanError>,
    pub captured: Option<CapturedOutput>,
}

#[derive(Debug, Clone)]
pub struct Worker {
    id: usize,
    output: OutputMode,
    dry_run: bool,
}

impl Worker {
    pub fn new(id: usize, output: OutputMode, dry_run: bool) -> Self {
        Self {
            id,
            output,
            dry_run,
        }
    }

    /// Consume descriptors until every sender is gone and the queue is empty
    pub fn run(&self, queue: Receiver<JobDescriptor>) -> WorkerStats {
        let mut stats = WorkerStats::default();

        for job in queue.iter() {
            stats.received += 1;
            trace!(
                worker = self.id,
                path = %job.trigger_path.display(),
                command = %job,
                "Command will run"
            );

            if self.dry_run {
                info!(
                    worker = self.id,
                    path = %job.trigger_path.display(),
                    command = %job,
                    "Dry run, command not executed"
                );
                stats.skipped += 1;
                continue;
            }

            let execution = self.execute(&job);
            if execution.result.is_ok() {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
            self.log_execution(&job, execution);
        }

        debug!(worker = self.id, received = stats.received, "Worker finished");
        stats
    }

    /// Run one descriptor as a subprocess in this worker's output mode
    pub fn execute(&self, job: &JobDescriptor) -> Execution {
        let mut command = Command::new(&job.command);
        command
            .args(&job.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match self.output {
            OutputMode::Captured => run_captured(job, command),
            OutputMode::Colored => Execution {
                result: run_streamed(job, command, true),
                captured: None,
            },
            OutputMode::Plain => Execution {
                result: run_streamed(job, command, false),
                captured: None,
            },
        }
    }

    fn log_execution(&self, job: &JobDescriptor, execution: Execution) {
        let path = job.trigger_path.display();
        match (execution.result, execution.captured) {
            (Ok(()), Some(captured)) => info!(
                worker = self.id,
                path = %path,
                command = %job.program(),
                stdout = %captured.stdout.trim_end(),
                stderr = %captured.stderr.trim_end(),
                "Command exited successfully"
            ),
            (Ok(()), None) => debug!(
                worker = self.id,
                path = %path,
                command = %job.program(),
                "Command exited successfully"
            ),
            (Err(err), Some(captured)) => error!(
                worker = self.id,
                path = %path,
                command = %job.program(),
                args = ?job.args,
                error = %err,
                stdout = %captured.stdout.trim_end(),
                stderr = %captured.stderr.trim_end(),
                "Command exited with errors"
            ),
            (Err(err), None) => error!(
                worker = self.id,
                path = %path,
                command = %job.program(),
                args = ?job.args,
                error = %err,
                "Command exited with errors"
            ),
        }
    }
}

fn run_captured(job: &JobDescriptor, mut command: Command) -> Execution {
    let output = match command.output() {
        Ok(output) => output,
        Err(source) => {
            return Execution {
                result: Err(ScanError::Spawn {
                    command: job.program(),
                    source,
                }),
                captured: None,
            };
        }
    };

    let captured = CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    let result = if output.status.success() {
        Ok(())
    } else {
        Err(ScanError::Exit {
            command: job.program(),
            status: output.status,
        })
    };

    Execution {
        result,
        captured: Some(captured),
    }
}

fn run_streamed(job: &JobDescriptor, mut command: Command, colored: bool) -> Result<(), ScanError> {
    let mut child = command.spawn().map_err(|source| ScanError::Spawn {
        command: job.program(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both pipes are drained concurrently so neither can fill up and stall the child.
    let forwarded = crossbeam::thread::scope(|s| {
        let out = s.spawn(move |_| match stdout {
            Some(pipe) => forward_lines(pipe, io::stdout(), Sink::Stdout, colored),
            None => Ok(()),
        });
        let err = s.spawn(move |_| match stderr {
            Some(pipe) => forward_lines(pipe, io::stderr(), Sink::Stderr, colored),
            None => Ok(()),
        });
        (out.join(), err.join())
    });

    let status = child.wait().map_err(|source| ScanError::Output {
        command: job.program(),
        source,
    })?;

    let read_result = match forwarded {
        Ok((Ok(out), Ok(err))) => out.and(err),
        _ => Err(io::Error::other("output reader thread panicked")),
    };
    read_result.map_err(|source| ScanError::Output {
        command: job.program(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ScanError::Exit {
            command: job.program(),
            status,
        })
    }
}

/// Which of our own streams a child's stream is forwarded to
#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

impl Sink {
    /// Stdout lines are green and stderr lines red when colored
    fn paint(self, line: &str, colored: bool) -> String {
        match (self, colored) {
            (Sink::Stdout, true) => style(line).green().force_styling(true).to_string(),
            (Sink::Stderr, true) => style(line).red().force_styling(true).to_string(),
            _ => line.to_string(),
        }
    }
}

/// Copy `reader` to `out` line by line until EOF
///
/// If `out` stops accepting writes the pipe is still drained to EOF.
fn forward_lines<R: Read, W: Write>(reader: R, mut out: W, sink: Sink, colored: bool) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut sink_open = true;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        if !sink_open {
            continue;
        }

        let text = String::from_utf8_lossy(&line);
        let painted = sink.paint(text.trim_end_matches(['\n', '\r']), colored);
        if let Err(err) = writeln!(out, "{painted}") {
            debug!(error = %err, "Output sink closed, discarding remaining output");
            sink_open = false;
        }
    }
}
