//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (done columns, completed sprints)
//!   - Warning/Active: yellow  (active sprints, running timers, high priority)
//!   - Error:          red     (highest priority, bugs)
//!   - Info/Reference: cyan    (entity ids)
//!   - Muted:          dimmed  (field labels, planned sprints)
//!   - Emphasis:       bold    (section headers)

use crate::domain::{IssueType, Priority, SprintStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    info(id, config)
}

pub(crate) fn colorize_priority(priority: Priority, config: &OutputConfig) -> String {
    let text = priority.to_string();
    if !config.use_colors {
        return text;
    }
    match priority {
        Priority::Highest => text.red().bold().to_string(),
        Priority::High => text.yellow().to_string(),
        Priority::Medium => text,
        Priority::Low | Priority::Lowest => text.dimmed().to_string(),
    }
}

pub(crate) fn colorize_sprint_status(status: SprintStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        SprintStatus::Planned => text.dimmed().to_string(),
        SprintStatus::Active => text.yellow().to_string(),
        SprintStatus::Completed => text.green().to_string(),
    }
}

/// Icon for an issue's column: done columns get a check mark.
pub(crate) fn colored_status_icon(done: bool, config: &OutputConfig) -> String {
    let icon = match (done, config.use_ascii) {
        (true, true) => "+",
        (false, true) => "o",
        (true, false) => "✓",
        (false, false) => "○",
    };
    if done {
        success(icon, config)
    } else {
        icon.to_string()
    }
}

pub(crate) fn colored_type_icon(issue_type: IssueType, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match issue_type {
            IssueType::Story => "S",
            IssueType::Task => "T",
            IssueType::Bug => "B",
            IssueType::Epic => "E",
        }
    } else {
        match issue_type {
            IssueType::Story => "◆",
            IssueType::Task => "●",
            IssueType::Bug => "✗",
            IssueType::Epic => "★",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }
    match issue_type {
        IssueType::Bug => icon.red().to_string(),
        IssueType::Epic => icon.magenta().to_string(),
        IssueType::Story => icon.green().to_string(),
        IssueType::Task => icon.to_string(),
    }
}

/// Yellow marker for a running timer
pub(crate) fn running_marker(config: &OutputConfig) -> String {
    let marker = if config.use_ascii { "*" } else { "⏱" };
    warning(marker, config)
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}
