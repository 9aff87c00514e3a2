//! Terminal output for the pdfstitch binary.
//!
//! [`OutputFormatter`] prints user-facing messages and respects quiet and
//! verbose modes. [`ProgressBar`] renders the merge progress on the
//! terminal and is plugged into the merger as its progress sink.

use pdfstitch::merge::{InputOutcome, MergeStatistics};
use pdfstitch::progress::ProgressSink;
use pdfstitch::{Config, QualityTier};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

/// Output formatter with configurable verbosity.
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Create a verbose formatter.
    #[cfg(test)]
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    fn should_use_color() -> bool {
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message. Always displayed.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message. Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a debug message. Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let (prefix, color_code) = match level {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Error => ("✗ ", "\x1b[31m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        };

        let line = if self.colored && !color_code.is_empty() {
            format!("{color_code}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        };

        match level {
            MessageLevel::Warning | MessageLevel::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a labelled value. Only shown in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a numbered list item. Suppressed in quiet mode.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }

    /// Print a blank line. Suppressed in quiet mode.
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// True unless quiet mode is enabled.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

const BAR_WIDTH: usize = 40;

/// Terminal progress bar driven by percent-complete values.
pub struct ProgressBar {
    percent: u8,
    message: Option<String>,
    start_time: Instant,
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar that draws only when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            percent: 0,
            message: None,
            start_time: Instant::now(),
            enabled: io::stdout().is_terminal(),
        }
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Set the message shown in front of the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Terminate the bar line.
    pub fn finish(&mut self) {
        if self.enabled {
            self.render();
            println!();
        }
    }

    fn render(&self) {
        if !self.enabled {
            return;
        }
        print!("\r{}", self.render_bar());
        io::stdout().flush().ok();
    }

    fn render_bar(&self) -> String {
        let filled = BAR_WIDTH * usize::from(self.percent) / 100;
        let empty = BAR_WIDTH - filled;

        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.saturating_sub(1)) + if filled > 0 { ">" } else { "" },
            " ".repeat(empty)
        );

        let mut parts = vec![
            bar,
            format!("{:>3}%", self.percent),
            format_duration(self.start_time.elapsed()),
        ];

        if let Some(ref msg) = self.message {
            parts.insert(0, msg.clone());
        }

        parts.join(" ")
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBar {
    fn report(&mut self, percent: u8) {
        self.percent = percent.min(100);
        self.render();
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.2} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Where the document was written; absent for dry and empty runs.
    pub output: Option<PathBuf>,
    /// Size of the written document in bytes.
    pub size_bytes: Option<u64>,
    /// Quality tier used.
    pub quality: QualityTier,
    /// Size estimate shown before the run.
    pub estimated_size: String,
    /// Pages in the output.
    pub total_pages: usize,
    /// Inputs replaced by placeholder pages.
    pub recovered: usize,
    /// Wall time of the merge in milliseconds.
    pub elapsed_ms: u64,
    /// Per-input results, in output order.
    pub inputs: Vec<InputSummary>,
}

/// One input in a [`RunSummary`].
#[derive(Debug, Serialize)]
pub struct InputSummary {
    /// Display name.
    pub name: String,
    /// Pages occupied in the output.
    pub pages: usize,
    /// Why the input was replaced, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    /// Summary of a run that produced no document.
    pub fn empty(quality: QualityTier, estimated_size: String) -> Self {
        Self {
            output: None,
            size_bytes: None,
            quality,
            estimated_size,
            total_pages: 0,
            recovered: 0,
            elapsed_ms: 0,
            inputs: Vec::new(),
        }
    }

    /// Fill in merge results.
    pub fn with_merge(mut self, outcomes: &[InputOutcome], statistics: &MergeStatistics) -> Self {
        self.total_pages = statistics.total_pages;
        self.recovered = statistics.recovered;
        self.elapsed_ms = statistics.elapsed.as_millis() as u64;
        self.inputs = outcomes
            .iter()
            .map(|outcome| InputSummary {
                name: outcome.name().to_string(),
                pages: outcome.pages(),
                error: match outcome {
                    InputOutcome::Recovered { error, .. } => Some(error.to_string()),
                    InputOutcome::Converted { .. } => None,
                },
            })
            .collect();
        self
    }
}
