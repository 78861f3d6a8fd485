//! Interactive dashboard state and renderers.
//!
//! [`DashboardState`] holds what the foreground loop knows: progress while a
//! worker runs, then the finished report plus the user's filter, search and
//! selection. A [`Renderer`] turns that state into a screen of text.

use crate::{overflow, Style};
use skillgate_common::{Error, Result};
use skillgate_schema::{ValidationReport, ValidationResult};
use std::fmt::{self, Write};
use std::str::FromStr;

const DETAIL_WARNINGS: usize = 10;
const DETAIL_COMMUNITY: usize = 5;

/// Which results the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pass,
    Fail,
    /// Any result with at least one warning.
    Warn,
}

impl StatusFilter {
    pub fn matches(&self, result: &ValidationResult) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pass => result.passed(),
            StatusFilter::Fail => !result.passed(),
            StatusFilter::Warn => !result.warnings().is_empty(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pass => "pass",
            StatusFilter::Fail => "fail",
            StatusFilter::Warn => "warn",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pass" | "passed" => Ok(StatusFilter::Pass),
            "fail" | "failed" => Ok(StatusFilter::Fail),
            "warn" | "warnings" => Ok(StatusFilter::Warn),
            other => Err(Error::config(format!(
                "unknown filter '{}' (expected all, pass, fail or warn)",
                other
            ))),
        }
    }
}

/// Progress of a running validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub identifier: String,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    report: Option<ValidationReport>,
    progress: Option<Progress>,
    filter: StatusFilter,
    search: String,
    selected: Option<String>,
    status: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current report and wait for a new one.
    pub fn start_run(&mut self) {
        self.report = None;
        self.progress = None;
        self.status = Some("Validating...".to_string());
    }

    pub fn set_progress(&mut self, index: usize, total: usize, identifier: impl Into<String>) {
        self.progress = Some(Progress {
            index,
            total,
            identifier: identifier.into(),
        });
    }

    /// Install a finished report. Keeps the selection if it still exists.
    pub fn set_report(&mut self, report: ValidationReport) {
        if let Some(ref name) = self.selected {
            if !report.results().iter().any(|r| r.identifier() == name) {
                self.selected = None;
            }
        }
        self.status = Some(format!("Validated {} skills", report.validated_count()));
        self.report = Some(report);
        self.progress = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Case-insensitive substring match on identifiers; empty clears it.
    pub fn set_search(&mut self, query: &str) {
        self.search = query.trim().to_lowercase();
    }

    /// Select a result by identifier. Returns false if there is none.
    pub fn select(&mut self, identifier: &str) -> bool {
        let found = self
            .report
            .as_ref()
            .is_some_and(|r| r.results().iter().any(|res| res.identifier() == identifier));
        if found {
            self.selected = Some(identifier.to_string());
        }
        found
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Results passing the filter and search, in report order.
    pub fn visible(&self) -> Vec<&ValidationResult> {
        let Some(report) = self.report.as_ref() else {
            return Vec::new();
        };
        report
            .results()
            .iter()
            .filter(|r| self.filter.matches(r))
            .filter(|r| self.search.is_empty() || r.identifier().to_lowercase().contains(&self.search))
            .collect()
    }

    pub fn selected(&self) -> Option<&ValidationResult> {
        let name = self.selected.as_deref()?;
        self.report
            .as_ref()?
            .results()
            .iter()
            .find(|r| r.identifier() == name)
    }
}

/// Turns dashboard state into a screen of text.
pub trait Renderer {
    fn style(&self) -> Style;

    fn status_marker(&self, result: &ValidationResult) -> String;

    /// Text placed before the summary. Empty by default.
    fn header(&self) -> String {
        String::new()
    }

    fn render(&self, state: &DashboardState) -> String {
        let mut out = self.header();
        self.render_summary(&mut out, state);
        out.push('\n');
        self.render_list(&mut out, state);
        if let Some(result) = state.selected() {
            out.push('\n');
            self.render_detail(&mut out, result);
        }
        if let Some(status) = state.status() {
            let _ = writeln!(out, "\n{}", self.style().dim(status));
        }
        out
    }

    fn render_summary(&self, out: &mut String, state: &DashboardState) {
        let style = self.style();
        if let Some(progress) = state.progress() {
            let _ = writeln!(
                out,
                "Validating {}/{}: {}",
                progress.index + 1,
                progress.total,
                progress.identifier
            );
            return;
        }
        let Some(report) = state.report() else {
            let _ = writeln!(out, "No results yet");
            return;
        };
        let summary = report.summary();
        let _ = writeln!(
            out,
            "Total: {}  {}  {}  {}  Pass rate: {}%",
            summary.total,
            style.green(&format!("Passed: {}", summary.passed)),
            style.red(&format!("Failed: {}", summary.failed)),
            style.yellow(&format!("Pending: {}", summary.pending)),
            summary.pass_rate
        );
        let _ = writeln!(
            out,
            "Filter: {}{}",
            state.filter(),
            if state.search().is_empty() {
                String::new()
            } else {
                format!("  Search: {}", state.search())
            }
        );
    }

    fn render_list(&self, out: &mut String, state: &DashboardState) {
        let visible = state.visible();
        if state.report().is_some() && visible.is_empty() {
            let _ = writeln!(out, "  (no matching skills)");
        }
        for (i, result) in visible.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {} {:<32} {:>3} errors {:>3} warnings {:>3} suggestions",
                i + 1,
                self.status_marker(result),
                result.identifier(),
                result.errors().len(),
                result.warnings().len(),
                result.community().len()
            );
        }
    }

    fn render_detail(&self, out: &mut String, result: &ValidationResult) {
        let style = self.style();
        let _ = writeln!(out, "{}", style.bold(result.identifier()));
        let _ = writeln!(
            out,
            "Status: {}",
            if result.passed() {
                style.green("PASSED")
            } else {
                style.red("FAILED")
            }
        );

        if !result.errors().is_empty() {
            let _ = writeln!(out, "{}", style.red(&format!("Errors ({}):", result.errors().len())));
            for error in result.errors() {
                let _ = writeln!(out, "  - {}", error);
            }
        }

        if !result.warnings().is_empty() {
            let _ = writeln!(
                out,
                "{}",
                style.yellow(&format!("Warnings ({}):", result.warnings().len()))
            );
            for warning in result.warnings().iter().take(DETAIL_WARNINGS) {
                let _ = writeln!(out, "  - {}", warning);
            }
            if let Some(more) = overflow(result.warnings().len(), DETAIL_WARNINGS) {
                let _ = writeln!(out, "  {}", more);
            }
        }

        if !result.community().is_empty() {
            let _ = writeln!(
                out,
                "{}",
                style.cyan(&format!("Community ({}):", result.community().len()))
            );
            for suggestion in result.community().iter().take(DETAIL_COMMUNITY) {
                let _ = writeln!(out, "  - {}", suggestion);
            }
            if let Some(more) = overflow(result.community().len(), DETAIL_COMMUNITY) {
                let _ = writeln!(out, "  {}", more);
            }
        }
    }
}

/// Plain text with bracketed status words.
#[derive(Debug, Default)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn style(&self) -> Style {
        Style::plain()
    }

    fn status_marker(&self, result: &ValidationResult) -> String {
        if !result.passed() {
            "[FAIL]".to_string()
        } else if !result.warnings().is_empty() {
            "[WARN]".to_string()
        } else {
            "[PASS]".to_string()
        }
    }
}

/// ANSI color with status glyphs.
#[derive(Debug, Default)]
pub struct EnhancedRenderer;

impl Renderer for EnhancedRenderer {
    fn style(&self) -> Style {
        Style::new(true)
    }

    fn status_marker(&self, result: &ValidationResult) -> String {
        let style = self.style();
        if !result.passed() {
            style.red("✗")
        } else if !result.warnings().is_empty() {
            style.yellow("⚠")
        } else {
            style.green("✓")
        }
    }

    fn header(&self) -> String {
        format!("\x1b[2J\x1b[H{}\n\n", self.style().bold("skillgate dashboard"))
    }
}
