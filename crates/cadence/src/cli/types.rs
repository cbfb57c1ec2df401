//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{IssueType, Priority, Theme};

// ============================================================================
// Value Enums
// ============================================================================

/// Issue type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueTypeArg {
    /// User-facing story
    Story,
    /// General task
    #[default]
    Task,
    /// Bug fix
    Bug,
    /// Epic (parent issue)
    Epic,
}

/// Priority for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityArg {
    /// Drop everything
    Highest,
    /// Important
    High,
    /// Normal
    #[default]
    Medium,
    /// Nice to have
    Low,
    /// Someday
    Lowest,
}

/// UI theme for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
}

impl std::fmt::Display for IssueTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        IssueType::from(*self).fmt(f)
    }
}

impl std::fmt::Display for PriorityArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Priority::from(*self).fmt(f)
    }
}

// ============================================================================
// Domain Type Conversions
// ============================================================================

impl From<IssueTypeArg> for IssueType {
    fn from(arg: IssueTypeArg) -> Self {
        match arg {
            IssueTypeArg::Story => IssueType::Story,
            IssueTypeArg::Task => IssueType::Task,
            IssueTypeArg::Bug => IssueType::Bug,
            IssueTypeArg::Epic => IssueType::Epic,
        }
    }
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Highest => Priority::Highest,
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
            PriorityArg::Lowest => Priority::Lowest,
        }
    }
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}
