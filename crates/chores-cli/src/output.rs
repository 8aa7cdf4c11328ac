//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use chores_core::{ErrorCode, Item, LockError, WriteReport};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, check boxes).
    Pretty,
    /// Tab-separated plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some(Self::Pretty),
            "text" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(mode) = format_env.and_then(OutputMode::parse) {
        return mode;
    }

    if let Some(mode) = config_output.and_then(OutputMode::parse) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, config, and TTY
/// defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        config_output,
        is_tty,
    )
}

/// Trait implemented by any CLI result type that can be rendered in all modes.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single self-contained JSON value.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row, columns matching [`table_headers`].
    ///
    /// [`table_headers`]: Renderable::table_headers
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a list of [`Renderable`] items.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn render_list_to<R: Renderable>(
    out: &mut dyn Write,
    items: &[R],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("\t"))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            writeln!(out, "\n]")?;
        }
    }
    Ok(())
}

/// A list entry together with its 1-based position in the full list.
#[derive(Debug, Serialize)]
pub struct ItemRow<'a> {
    pub position: usize,
    #[serde(flatten)]
    pub item: &'a Item,
}

impl Renderable for ItemRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let mark = if self.item.checked { "x" } else { " " };
        writeln!(
            w,
            "{:>3}. [{mark}] {}  (#{})",
            self.position, self.item.text, self.item.key
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.position,
            self.item.key,
            if self.item.checked { "done" } else { "pending" },
            self.item.text
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["POS", "KEY", "STATE", "TEXT"]
    }
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// An error carrying `code` and its stock hint.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// An error that has already been rendered; `main` only sets the exit code.
#[derive(Debug)]
pub struct Reported(pub CliError);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Reported {}

/// Render `error` and wrap it so callers can propagate it with `?`.
pub fn report(mode: OutputMode, error: CliError) -> anyhow::Error {
    if let Err(render_err) = render_error(mode, &error) {
        return render_err.context(error.message);
    }
    anyhow::Error::new(Reported(error))
}

impl From<&LockError> for CliError {
    fn from(err: &LockError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

/// Result of one mutating command.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    pub action: &'static str,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<&'a Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CliError>,
}

impl<'a> Outcome<'a> {
    pub const fn changed(action: &'static str, item: Option<&'a Item>) -> Self {
        Self {
            action,
            changed: true,
            item,
            detail: None,
            notice: None,
        }
    }

    /// A no-op outcome explained by `code`.
    pub fn unchanged(action: &'static str, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            action,
            changed: false,
            item: None,
            detail: None,
            notice: Some(CliError::from_code(code, message)),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Write an [`Outcome`]. `quiet` drops successful human output.
pub fn write_outcome(
    out: &mut dyn Write,
    mode: OutputMode,
    quiet: bool,
    outcome: &Outcome<'_>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, outcome)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            if let Some(notice) = &outcome.notice {
                writeln!(
                    out,
                    "unchanged\t{}\t{}",
                    notice.error_code.as_deref().unwrap_or("-"),
                    notice.message
                )?;
            } else if !quiet {
                write!(out, "{}", outcome.action)?;
                if let Some(item) = outcome.item {
                    write!(out, "\t{}\t{}", item.key, item.text)?;
                }
                if let Some(detail) = &outcome.detail {
                    write!(out, "\t{detail}")?;
                }
                writeln!(out)?;
            }
        }
        OutputMode::Pretty => {
            if let Some(notice) = &outcome.notice {
                writeln!(out, "! nothing changed: {}", notice.message)?;
                if let Some(suggestion) = &notice.suggestion {
                    writeln!(out, "  suggestion: {suggestion}")?;
                }
            } else if !quiet {
                let mut line = format!("✓ {}", outcome.action);
                if let Some(item) = outcome.item {
                    line.push_str(&format!(" \"{}\" (#{})", item.text, item.key));
                }
                if let Some(detail) = &outcome.detail {
                    line.push_str(&format!(" {detail}"));
                }
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

/// Render an [`Outcome`] to stdout.
pub fn render_outcome(mode: OutputMode, quiet: bool, outcome: &Outcome<'_>) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_outcome(&mut out, mode, quiet, outcome)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

fn write_error(
    out: &mut dyn Write,
    mode: OutputMode,
    label: &str,
    error: &CliError,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(label.to_string(), serde_json::to_value(error)?);
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "{label}[{code}]: {}", error.message)?,
                None => writeln!(out, "{label}: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, "error", error)
}

/// Report failed background writes on stderr. Never fails the command.
pub fn render_write_warning(mode: OutputMode, report: &WriteReport) -> anyhow::Result<()> {
    if report.is_clean() {
        return Ok(());
    }
    let mut message = format!(
        "{} of {} writes failed; changes may not have been saved",
        report.failed, report.attempted
    );
    if let Some(last) = &report.last_error {
        message.push_str(&format!(" (last error: {last})"));
    }
    let warning = CliError::from_code(ErrorCode::StorageWriteFailed, message);
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, "warning", &warning)
}
