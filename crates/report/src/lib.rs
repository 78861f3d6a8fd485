//! Skillgate output formatters.
//!
//! Every formatter is a pure function of a [`ValidationReport`] and a
//! [`FormatOptions`] value. None of them mutate the report, and each
//! produces well-formed output for an empty report.

pub mod console;
pub mod dashboard;
pub mod json;
pub mod junit;
pub mod listing;
pub mod markdown;
pub mod style;
pub mod tap;

use skillgate_common::{Error, Result};
use skillgate_schema::ValidationReport;
use std::fmt;
use std::str::FromStr;

pub use console::ConsoleFormatter;
pub use json::JsonFormatter;
pub use junit::JunitFormatter;
pub use markdown::MarkdownFormatter;
pub use style::Style;
pub use tap::TapFormatter;

/// Errors shown per failed bundle in the console and markdown views.
pub const MAX_INLINE_ERRORS: usize = 5;
/// Community items shown per bundle in the console view.
pub const MAX_INLINE_COMMUNITY: usize = 3;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Console,
    Json,
    Junit,
    Tap,
    Markdown,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Console,
        Format::Json,
        Format::Junit,
        Format::Tap,
        Format::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Console => "console",
            Format::Json => "json",
            Format::Junit => "junit",
            Format::Tap => "tap",
            Format::Markdown => "markdown",
        }
    }

    /// Human-oriented formats honour color and community toggles.
    pub fn is_human(&self) -> bool {
        matches!(self, Format::Console)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(Format::Console),
            "json" => Ok(Format::Json),
            "junit" | "xml" => Ok(Format::Junit),
            "tap" => Ok(Format::Tap),
            "markdown" | "md" => Ok(Format::Markdown),
            other => Err(Error::formatter(format!(
                "unsupported output format '{}' (expected console, json, junit, tap or markdown)",
                other
            ))),
        }
    }
}

/// Rendering toggles, passed explicitly into every formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub color: bool,
    /// Include community suggestions in the console view.
    pub show_community: bool,
    /// Untruncated errors plus warnings for every failed bundle.
    pub verbose: bool,
    /// Only failures and the summary.
    pub quiet: bool,
}

impl FormatOptions {
    pub fn style(&self) -> Style {
        Style::new(self.color)
    }
}

/// Turns a report into text.
pub trait Formatter {
    fn format(&self, report: &ValidationReport) -> Result<String>;
}

/// The formatter for `format`.
pub fn formatter(format: Format, options: FormatOptions) -> Box<dyn Formatter> {
    match format {
        Format::Console => Box::new(ConsoleFormatter::new(options)),
        Format::Json => Box::new(JsonFormatter::new()),
        Format::Junit => Box::new(JunitFormatter::new()),
        Format::Tap => Box::new(TapFormatter::new()),
        Format::Markdown => Box::new(MarkdownFormatter::new()),
    }
}

/// Render `report` in `format`.
pub fn render(report: &ValidationReport, format: Format, options: FormatOptions) -> Result<String> {
    formatter(format, options).format(report)
}

/// `"... and N more"` for lists cut at `shown`, or `None`.
pub(crate) fn overflow(total: usize, shown: usize) -> Option<String> {
    (total > shown).then(|| format!("... and {} more", total - shown))
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => result.push(c),
        }
    }
    result
}
