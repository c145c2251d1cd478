//! Layout engine invocation.
//!
//! The renderer hands DOT source to a [`LayoutEngine`] and gets image bytes
//! back. [`Graphviz`] runs the Graphviz command line tool as a child process,
//! bounded by a timeout.

use std::{
    io::{self, Read, Write},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::{config::EngineConfig, error::RenderError, export::OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Computes a layout and renders it to image bytes.
pub trait LayoutEngine: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Lays out `source` and renders it in `format`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] carrying the engine's diagnostic text.
    fn layout(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError>;
}

/// The Graphviz command line engine.
#[derive(Debug, Clone)]
pub struct Graphviz {
    program: String,
    timeout: Duration,
}

impl Graphviz {
    /// Creates an engine running `program` with the given timeout.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Creates an engine from the `[engine]` configuration section.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.program(), config.timeout())
    }

    /// Returns the program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the timeout for a single run.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn spawn(&self, format: OutputFormat) -> Result<Child, RenderError> {
        Command::new(&self.program)
            .arg(format!("-T{}", format.extension()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => RenderError::EngineMissing {
                    program: self.program.clone(),
                },
                _ => RenderError::Spawn {
                    program: self.program.clone(),
                    source: err,
                },
            })
    }

    /// Waits for `child`, killing it once `deadline` has passed.
    fn wait(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, RenderError> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(
                    program = self.program,
                    timeout:? = self.timeout;
                    "Layout engine timed out, killing it"
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Waits for a pipe thread until `deadline`.
    ///
    /// A process the engine left running can hold its pipes open after the
    /// engine itself exited; the pipe thread is then abandoned.
    fn collect<T>(
        &self,
        pipe: Receiver<io::Result<T>>,
        deadline: Instant,
    ) -> Result<T, RenderError> {
        match pipe.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result.map_err(RenderError::from),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    program = self.program,
                    timeout:? = self.timeout;
                    "Layout engine pipes still open at the deadline"
                );
                Err(self.timed_out())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(io::Error::other("layout engine pipe thread panicked").into())
            }
        }
    }

    fn timed_out(&self) -> RenderError {
        RenderError::Timeout {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }
}

impl Default for Graphviz {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl LayoutEngine for Graphviz {
    fn name(&self) -> &str {
        &self.program
    }

    fn layout(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        info!(program = self.program, format:% = format; "Running layout engine");
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut child = self.spawn(format)?;

        // Pipes are serviced on their own threads so a chatty engine can never
        // block on a full pipe while the source is still being written.
        let writer = child.stdin.take().map(|mut stdin| {
            let source = source.as_bytes().to_vec();
            background(move || match stdin.write_all(&source) {
                Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err),
                _ => Ok(()),
            })
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = self.wait(&mut child, deadline)?;

        if let Some(writer) = writer {
            self.collect(writer, deadline)?;
        }
        let stdout = match stdout {
            Some(pipe) => self.collect(pipe, deadline)?,
            None => Vec::new(),
        };
        let stderr = match stderr {
            Some(pipe) => self.collect(pipe, deadline)?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            warn!(
                program = self.program,
                status:% = status,
                stderr = stderr;
                "Layout engine failed"
            );
            return Err(RenderError::Engine {
                program: self.program.clone(),
                status,
                stderr,
            });
        }
        if stdout.is_empty() {
            return Err(RenderError::EmptyOutput {
                program: self.program.clone(),
            });
        }

        debug!(
            format:% = format,
            bytes = stdout.len(),
            elapsed_ms = started.elapsed().as_millis();
            "Layout engine finished"
        );
        Ok(stdout)
    }
}

/// Runs `task` on its own thread and hands back a channel for its result.
fn background<T, F>(task: F) -> Receiver<io::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(task());
    });
    rx
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<io::Result<Vec<u8>>> {
    background(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}
