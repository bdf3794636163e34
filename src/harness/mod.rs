//! Command-driven test harness for the queue.
//!
//! The harness reads one command per line, applies it to the current queue
//! (which may be absent), and writes a transcript. Failed checks are reported
//! as `ERROR:` lines and counted; the caller decides what a non-zero error
//! count means.
//!
//! All queues the harness creates share one [`AllocTracker`] layered over a
//! [`FaultInjector`], so `free` can verify that every node and value was
//! released and `option malloc N` can force allocation failures.
//!
//! # Examples
//!
//! ```rust
//! use strqueue::config::HarnessConfig;
//! use strqueue::harness::Harness;
//!
//! # fn main() -> anyhow::Result<()> {
//! let script = "new\nit b\nih a\nrh a\nsize 1\nfree\n";
//! let mut out = Vec::new();
//! let summary = Harness::new(HarnessConfig::default(), &mut out).run(script.as_bytes())?;
//!
//! assert_eq!(summary.errors, 0);
//! assert!(String::from_utf8(out)?.contains("Removed a from queue"));
//! # Ok(())
//! # }
//! ```

mod command;

pub use command::{Command, HELP, ParseError, Setting, parse};

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::alloc::{AllocTracker, FaultInjector};
use crate::config::{HarnessConfig, MAX_STRING_LENGTH};
use crate::error::Error;
use crate::ops;
use crate::queue::Queue;

/// Whether to keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Outcome of a harness run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Commands executed (blank lines and comments excluded).
    pub commands: usize,
    /// Failed commands and checks.
    pub errors: usize,
}

/// Command interpreter driving a single current queue.
pub struct Harness<W: Write> {
    config: HarnessConfig,
    queue: Option<Queue>,
    faults: FaultInjector,
    tracker: AllocTracker,
    out: W,
    summary: Summary,
}

impl<W: Write> Harness<W> {
    /// Create a harness writing its transcript to `out`. No queue exists yet.
    pub fn new(config: HarnessConfig, out: W) -> Self {
        let faults = FaultInjector::new(config.fault_period);
        let tracker = AllocTracker::wrapping(faults.clone());
        Self {
            config,
            queue: None,
            faults,
            tracker,
            out,
            summary: Summary::default(),
        }
    }

    /// Allocation counters across every queue this harness created.
    #[must_use]
    pub fn tracker(&self) -> &AllocTracker {
        &self.tracker
    }

    /// Current queue, if any.
    #[must_use]
    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }

    /// Execute every line of `input`, then tear down the remaining queue.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing the transcript
    /// fails. Command failures are counted in the returned [`Summary`].
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<Summary> {
        for (index, line) in input.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
            if self.execute_line(index + 1, &line)? == Flow::Quit {
                tracing::debug!(line = index + 1, "quit requested");
                break;
            }
        }
        self.finish()
    }

    /// Parse and execute one input line.
    ///
    /// # Errors
    ///
    /// Returns an error if the transcript cannot be written.
    pub fn execute_line(&mut self, lineno: usize, line: &str) -> Result<Flow> {
        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                self.summary.commands += 1;
                self.fail(lineno, &e.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        if self.config.echo {
            writeln!(self.out, "cmd> {}", line.trim())?;
        }
        tracing::debug!(line = lineno, command = ?command, "executing command");
        self.summary.commands += 1;

        let errors_before = self.summary.errors;
        let flow = self.execute(lineno, command)?;
        if self.summary.errors > errors_before {
            tracing::warn!(line = lineno, input = line.trim(), "command failed");
        }
        Ok(flow)
    }

    /// Destroy the remaining queue and return the run summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the transcript cannot be written.
    pub fn finish(&mut self) -> Result<Summary> {
        if self.queue.is_some() {
            self.free_queue(0)?;
        }
        self.out.flush()?;
        tracing::info!(
            commands = self.summary.commands,
            errors = self.summary.errors,
            refused_allocations = self.faults.refused(),
            "harness finished"
        );
        Ok(self.summary)
    }

    fn execute(&mut self, lineno: usize, command: Command) -> Result<Flow> {
        match command {
            Command::New => {
                if self.queue.is_some() {
                    self.free_queue(lineno)?;
                }
                self.queue = ops::new_with_gate(self.tracker.clone());
                if self.queue.is_none() {
                    self.alloc_failed(lineno, "Queue creation")?;
                }
                self.show_after()?;
            }
            Command::Free => {
                self.free_queue(lineno)?;
                self.show_after()?;
            }
            Command::InsertHead { value, count } => {
                self.insert(lineno, &value, count, Queue::insert_head, "head")?;
            }
            Command::InsertTail { value, count } => {
                self.insert(lineno, &value, count, Queue::insert_tail, "tail")?;
            }
            Command::RemoveHead { expected } => self.remove(lineno, true, expected.as_deref())?,
            Command::RemoveHeadQuiet => self.remove(lineno, false, None)?,
            Command::Size { expected } => self.size(lineno, expected)?,
            Command::Reverse => {
                if self.queue.is_none() {
                    writeln!(self.out, "Warning: Calling reverse on null queue")?;
                }
                ops::reverse(self.queue.as_mut());
                self.show_after()?;
            }
            Command::Sort => self.sort(lineno)?,
            Command::Show => self.show()?,
            Command::Set(setting) => self.set(lineno, setting)?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn insert(
        &mut self,
        lineno: usize,
        value: &str,
        count: usize,
        op: fn(&mut Queue, &str) -> crate::Result<()>,
        end: &str,
    ) -> Result<()> {
        let queue = match self.queue.as_mut().ok_or(Error::NoQueue) {
            Ok(queue) => queue,
            Err(e) => return self.fail(lineno, &format!("Cannot insert at {end}: {e}")),
        };

        let mut failure = None;
        for _ in 0..count {
            if let Err(e) = op(queue, value) {
                failure = Some(e);
                break;
            }
        }

        match failure {
            Some(e) if e.is_allocation_failure() => {
                self.alloc_failed(lineno, &format!("Insertion of {value}"))?;
            }
            Some(e) => self.fail(lineno, &format!("Insertion of {value} failed: {e}"))?,
            None => {}
        }
        self.show_after()
    }

    fn remove(&mut self, lineno: usize, report: bool, expected: Option<&str>) -> Result<()> {
        let queue = match self.queue.as_mut().ok_or(Error::NoQueue) {
            Ok(queue) => queue,
            Err(e) => return self.fail(lineno, &format!("Cannot remove head: {e}")),
        };

        let mut buf = vec![0u8; self.config.string_length + 1];
        let out = if report { Some(buf.as_mut_slice()) } else { None };

        match queue.remove_head(out) {
            Ok(()) => {}
            Err(Error::EmptyQueue) => return self.fail(lineno, "Removal from empty queue"),
            Err(e) => return self.fail(lineno, &format!("Removal failed: {e}")),
        }

        if report {
            let removed = terminated(&buf);
            writeln!(self.out, "Removed {removed} from queue")?;
            if let Some(expected) = expected
                && removed != expected
            {
                let message = format!("Removed value {removed} != expected value {expected}");
                self.fail(lineno, &message)?;
            }
        }
        self.show_after()
    }

    fn size(&mut self, lineno: usize, expected: Option<usize>) -> Result<()> {
        let size = ops::size(self.queue.as_ref());
        writeln!(self.out, "Queue size = {size}")?;

        if let Some(queue) = &self.queue {
            let walked = queue.iter().count();
            if walked != size {
                let message = format!("Computed queue size as {size}, but chain holds {walked}");
                self.fail(lineno, &message)?;
            }
        }
        if let Some(expected) = expected
            && expected != size
        {
            self.fail(lineno, &format!("Queue size {size} != expected size {expected}"))?;
        }
        Ok(())
    }

    fn sort(&mut self, lineno: usize) -> Result<()> {
        let Some(queue) = self.queue.as_mut() else {
            writeln!(self.out, "Warning: Calling sort on null queue")?;
            return self.show_after();
        };

        queue.sort_with(self.config.strategy);
        let ordered = queue
            .iter()
            .zip(queue.iter().skip(1))
            .all(|(a, b)| a <= b);
        if !ordered {
            self.fail(lineno, "Not sorted in ascending order")?;
        }
        self.show_after()
    }

    fn set(&mut self, lineno: usize, setting: Setting) -> Result<()> {
        match setting {
            Setting::Length(length) if length > MAX_STRING_LENGTH => {
                let message = format!("length {length} exceeds maximum of {MAX_STRING_LENGTH}");
                return self.fail(lineno, &message);
            }
            Setting::Length(length) => self.config.string_length = length,
            Setting::Malloc(period) => self.faults.set_period(period),
            Setting::Strategy(strategy) => self.config.strategy = strategy,
            Setting::Echo(echo) => self.config.echo = echo,
            Setting::Show(show) => self.config.show_after = show,
        }
        tracing::debug!(line = lineno, setting = ?setting, "option changed");
        Ok(())
    }

    fn free_queue(&mut self, lineno: usize) -> Result<()> {
        ops::destroy(self.queue.take());

        let stats = self.tracker.stats();
        if stats.live_blocks() > 0 {
            let message = format!(
                "Freed queue, but {} blocks are still allocated",
                stats.live_blocks()
            );
            self.fail(lineno, &message)?;
        }
        if stats.over_released() > 0 {
            let message = format!(
                "Freed queue, but {} blocks were released twice",
                stats.over_released()
            );
            self.fail(lineno, &message)?;
        }
        Ok(())
    }

    /// Report an allocation failure; expected (not an error) while faults are injected.
    fn alloc_failed(&mut self, lineno: usize, what: &str) -> Result<()> {
        if self.faults.is_active() {
            writeln!(self.out, "Warning: {what} failed (allocation refused)")?;
            Ok(())
        } else {
            self.fail(lineno, &format!("{what} failed (out of memory)"))
        }
    }

    fn fail(&mut self, lineno: usize, message: &str) -> Result<()> {
        self.summary.errors += 1;
        if lineno > 0 {
            writeln!(self.out, "ERROR: line {lineno}: {message}")?;
        } else {
            writeln!(self.out, "ERROR: {message}")?;
        }
        Ok(())
    }

    fn show_after(&mut self) -> Result<()> {
        if self.config.show_after {
            self.show()?;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let Some(queue) = &self.queue else {
            writeln!(self.out, "q = NULL")?;
            return Ok(());
        };

        let shown: Vec<&str> = queue.iter().take(self.config.show_limit).collect();
        let elided = if queue.size() > shown.len() { " ..." } else { "" };
        writeln!(self.out, "q = [{}{elided}]", shown.join(" "))?;
        Ok(())
    }
}

/// Text up to the first NUL byte of a removal buffer.
fn terminated(buf: &[u8]) -> Cow<'_, str> {
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len])
}
