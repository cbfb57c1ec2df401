//! Output formatting for CLI commands.
//!
//! Every printer comes in two flavors selected by [`OutputMode`]:
//! human-readable text and JSON for programmatic use. Text printers write to
//! any [`Write`] so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::domain::{Issue, Sprint, TimeLog};
use crate::store::EntityStore;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{
    bold, colored_status_icon, colored_type_icon, colorize_id, colorize_priority,
    colorize_sprint_status, dimmed, running_marker,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `CADENCE_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `CADENCE_ASCII`: Set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `CADENCE_COLOR`: Set to "0" or "false" to disable colors
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("CADENCE_MAX_WIDTH") {
            Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "CADENCE_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("CADENCE_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "CADENCE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR (https://no-color.org/)
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("CADENCE_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

/// Render seconds as `1h 30m`, `12m 5s` or `45s`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    match (hours, minutes) {
        (0, 0) => format!("{secs}s"),
        (0, m) if secs > 0 => format!("{m}m {secs}s"),
        (0, m) => format!("{m}m"),
        (h, m) => format!("{h}h {m}m"),
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a list of issues in the specified format
pub fn print_issues(issues: &[&Issue], store: &EntityStore, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            print_issues_text(&mut handle, issues, store, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, &issues),
    }
}

/// Print an issue with full details (for the show command)
pub fn print_issue_details(issue: &Issue, store: &EntityStore, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            print_issue_details_text(&mut handle, issue, store, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, issue),
    }
}

/// Print sprints with their member counts
pub fn print_sprints(sprints: &[&Sprint], store: &EntityStore, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            print_sprints_text(&mut handle, sprints, store, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, &sprints),
    }
}

/// Print time logs
pub fn print_time_logs(logs: &[&TimeLog], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => print_time_logs_text(&mut handle, logs, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &logs),
    }
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_issues_text<W: Write>(
    w: &mut W,
    issues: &[&Issue],
    store: &EntityStore,
    config: &OutputConfig,
) -> io::Result<()> {
    if issues.is_empty() {
        writeln!(w, "No issues found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} issue(s):", issues.len())?;
    writeln!(w)?;

    for issue in issues {
        let done = store.is_done_status(&issue.project_id, &issue.status_id);
        write!(
            w,
            "{} {}  {}  {:<8} {}",
            colored_status_icon(done, config),
            colorize_id(issue.id.as_str(), config),
            colored_type_icon(issue.issue_type, config),
            colorize_priority(issue.priority, config),
            issue.title
        )?;
        if issue.time_spent > 0 {
            write!(w, "  {}", dimmed(&format_duration(issue.time_spent), config))?;
        }
        writeln!(w)?;
    }

    Ok(())
}

fn print_issue_details_text<W: Write>(
    w: &mut W,
    issue: &Issue,
    store: &EntityStore,
    config: &OutputConfig,
) -> io::Result<()> {
    let content_width = get_terminal_width().min(config.max_width);
    let done = store.is_done_status(&issue.project_id, &issue.status_id);
    let column = store
        .board_for_project(&issue.project_id)
        .and_then(|board| board.column(&issue.status_id))
        .map_or_else(|| issue.status_id.to_string(), |c| c.name.clone());

    writeln!(
        w,
        "{} {}: {}",
        colored_status_icon(done, config),
        colorize_id(issue.id.as_str(), config),
        issue.title
    )?;
    writeln!(
        w,
        "{}  {} {}    {}  {}    {}  {}",
        dimmed("Type:", config),
        colored_type_icon(issue.issue_type, config),
        issue.issue_type,
        dimmed("Column:", config),
        column,
        dimmed("Priority:", config),
        colorize_priority(issue.priority, config)
    )?;

    let container = match &issue.sprint_id {
        Some(id) => store
            .sprint(id)
            .map_or_else(|| id.to_string(), |s| format!("{} ({})", s.name, s.id)),
        None => "backlog".to_string(),
    };
    writeln!(w, "{} {}", dimmed("Planned in:", config), container)?;

    if let Some(release) = issue.release_id.as_ref().and_then(|id| store.release(id)) {
        writeln!(w, "{} {}", dimmed("Release:", config), release.name)?;
    }

    if !issue.assignee_ids.is_empty() {
        let names: Vec<&str> = issue.assignee_ids.iter().map(|id| id.as_str()).collect();
        writeln!(w, "{} {}", dimmed("Assignees:", config), names.join(", "))?;
    }

    writeln!(
        w,
        "{} {}",
        dimmed("Time spent:", config),
        format_duration(issue.time_spent)
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        issue.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        issue.updated_at.format("%Y-%m-%d %H:%M")
    )?;

    if !issue.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Description", config))?;
        for line in wrap_text(&issue.description, content_width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }

    if !issue.comments.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Comments", config), issue.comments.len())?;
        for comment in &issue.comments {
            writeln!(
                w,
                "  {} {}",
                info(comment.author_id.as_str(), config),
                dimmed(&comment.created_at.format("%Y-%m-%d %H:%M").to_string(), config)
            )?;
            for line in wrap_text(&comment.body, content_width.saturating_sub(4)) {
                writeln!(w, "    {line}")?;
            }
        }
    }

    Ok(())
}

fn print_sprints_text<W: Write>(
    w: &mut W,
    sprints: &[&Sprint],
    store: &EntityStore,
    config: &OutputConfig,
) -> io::Result<()> {
    if sprints.is_empty() {
        writeln!(w, "No sprints found.")?;
        return Ok(());
    }

    for sprint in sprints {
        let members = store.plan_members(&sprint.project_id, Some(&sprint.id)).len();
        let dates = match (sprint.start_date, sprint.end_date) {
            (Some(start), Some(end)) => format!("{start} .. {end}"),
            _ => String::new(),
        };
        writeln!(
            w,
            "{}  {:<10} {}  {} issue(s)  {}",
            colorize_id(sprint.id.as_str(), config),
            colorize_sprint_status(sprint.status, config),
            sprint.name,
            members,
            dimmed(&dates, config)
        )?;
        if !sprint.goal.is_empty() {
            writeln!(w, "  {} {}", dimmed("Goal:", config), sprint.goal)?;
        }
    }

    Ok(())
}

fn print_time_logs_text<W: Write>(
    w: &mut W,
    logs: &[&TimeLog],
    config: &OutputConfig,
) -> io::Result<()> {
    if logs.is_empty() {
        writeln!(w, "No time logged.")?;
        return Ok(());
    }

    for log in logs {
        let span = if log.is_open() {
            format!("{} running", running_marker(config))
        } else {
            format_duration(log.duration_seconds)
        };
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            colorize_id(log.id.as_str(), config),
            log.issue_id,
            log.user_id,
            log.start_time.format("%Y-%m-%d %H:%M"),
            span
        )?;
    }

    Ok(())
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(1))
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}
