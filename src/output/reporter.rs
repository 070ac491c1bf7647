//! `TerminalReporter`: presentation-layer implementation of
//! `ProgressReporter`.
//!
//! Wraps `&OutputContext` so application services can emit progress events
//! without depending on any presentation type. On a TTY each `step()`
//! becomes a live spinner that the following `success()` resolves into a
//! `✓` line; off-TTY (and in verbose mode, where detail lines would fight
//! the spinner) steps print as plain `→` lines.

use std::sync::{Mutex, PoisonError};

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    verbose: bool,
    active: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext, verbose: bool) -> Self {
        Self {
            ctx,
            verbose,
            active: Mutex::new(None),
        }
    }

    /// Finish any in-flight spinner without a closing message. Callers run
    /// this before printing the summary or returning an error.
    pub fn clear(&self) {
        if let Some(pb) = self.take_active() {
            pb.finish_and_clear();
        }
    }

    fn take_active(&self) -> Option<ProgressBar> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn set_active(&self, pb: ProgressBar) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some(previous) = self.take_active() {
            previous.finish_and_clear();
        }
        if self.ctx.show_progress() && !self.verbose {
            self.set_active(progress::spinner(message));
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.header));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.take_active() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        let line = format!("  {} {message}", "⚠".style(self.ctx.styles.warning));
        let guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            // Print above the live spinner instead of through it.
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }

    fn detail(&self, message: &str) {
        if self.ctx.quiet || !self.verbose {
            return;
        }
        println!("    {}", message.style(self.ctx.styles.dim));
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
