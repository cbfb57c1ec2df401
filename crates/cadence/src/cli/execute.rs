//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Each
//! mutating command goes through the [`Tracker`](crate::tracker::Tracker),
//! which persists the state before returning.

use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate, Utc};

use super::args::{
    ApplyArgs, BackupAction, BackupArgs, CreateArgs, InitArgs, IssueAction, IssueArgs, ListArgs,
    MoveArgs, ReleaseAction, ReleaseArgs, SprintAction, SprintArgs, ThemeArgs, TimeAction,
    TimeArgs, UpdateArgs,
};
use crate::app::App;
use crate::domain::{
    Issue, IssueId, IssueUpdate, NewIssue, ReleaseId, SprintEdit, SprintId, SprintStatus,
    StatusId, Theme, TimeLogId, UserId,
};
use crate::ordering::{Anchor, Destination};
use crate::output::{self, OutputMode, format_duration};
use crate::store::EntityStore;
use crate::tracker::{Command, Outcome};

/// Default sprint length when `sprint start` is given no end date
const DEFAULT_SPRINT_DAYS: u64 = 14;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N]: ");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let response = input.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init::{self, InitOptions};

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!(
            "Initializing cadence repository{}...",
            args.prefix
                .as_ref()
                .map(|p| format!(" with prefix '{p}'"))
                .unwrap_or_default()
        );
    }

    let result = init::init(
        &current_dir,
        InitOptions {
            prefix: args.prefix.as_deref(),
            user: args.user.as_deref(),
            project: args.project.as_deref(),
        },
    )
    .await?;

    if !args.quiet {
        println!("Initialized cadence in {}", result.cadence_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Data:   {}", result.data_dir.display());
        println!("  Issue prefix: {}", result.prefix);
        println!("  Project: {}", result.project);
        println!("  User: {}", result.user);
    }

    Ok(())
}

/// Execute the info command
pub fn execute_info(app: &App, output_mode: OutputMode) -> Result<()> {
    let tracker = app.tracker();
    let store = tracker.store();
    let project_id = tracker.current_project()?;
    let project = store.require_project(&project_id)?;

    let issues: Vec<&Issue> = store
        .issues()
        .filter(|issue| issue.project_id == project_id)
        .collect();
    let done = issues
        .iter()
        .filter(|issue| store.is_done_status(&project_id, &issue.status_id))
        .count();
    let backlog = store.plan_members(&project_id, None).len();
    let active: Vec<String> = store
        .active_sprints(&project_id)
        .iter()
        .map(|sprint| sprint.name.clone())
        .collect();
    let running = store.open_logs_for_user(tracker.user()).len();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "cadence_dir": app.cadence_dir().display().to_string(),
                "issue_prefix": tracker.prefix(),
                "user": tracker.user(),
                "project": { "id": project.id, "name": project.name, "key": project.key },
                "theme": tracker.state().theme,
                "issues": { "total": issues.len(), "done": done, "backlog": backlog },
                "active_sprints": active,
                "running_timers": running,
            }))?;
        }
        OutputMode::Text => {
            println!("Cadence Repository Information");
            println!("==============================");
            println!();
            println!("Directory:    {}", app.cadence_dir().display());
            println!("Issue prefix: {}", tracker.prefix());
            println!("User:         {}", tracker.user());
            println!("Project:      {} ({})", project.name, project.key);
            println!();
            println!(
                "Issues: {} total ({} done, {} in backlog)",
                issues.len(),
                done,
                backlog
            );
            if active.is_empty() {
                println!("Active sprint: none");
            } else {
                println!("Active sprint: {}", active.join(", "));
            }
            if running > 0 {
                println!("Running timers: {running}");
            }
        }
    }

    Ok(())
}

/// Execute the board command
pub fn execute_board(app: &App, output_mode: OutputMode) -> Result<()> {
    let tracker = app.tracker();
    let store = tracker.store();
    let project = tracker.current_project()?;
    let Some(board) = store.board_for_project(&project) else {
        bail!("Project {project} has no board");
    };

    match output_mode {
        OutputMode::Json => {
            let columns: Vec<_> = board
                .columns
                .iter()
                .map(|column| {
                    serde_json::json!({
                        "id": column.id,
                        "name": column.name,
                        "done": column.done,
                        "issues": store.column_members(&project, &column.id),
                    })
                })
                .collect();
            output::print_json(&serde_json::json!({ "board": board.name, "columns": columns }))?;
        }
        OutputMode::Text => {
            println!("{}", board.name);
            for column in &board.columns {
                let members = store.column_members(&project, &column.id);
                println!();
                println!("{} ({})", column.name, members.len());
                for id in &members {
                    if let Some(issue) = store.issue(id) {
                        println!("  {}  {}", issue.id, issue.title);
                    }
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Issues
// ============================================================================

/// Execute an `issue` subcommand
pub async fn execute_issue(app: &mut App, args: &IssueArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        IssueAction::Create(create) => execute_create(app, create, output_mode).await,
        IssueAction::List(list) => execute_list(app, list, output_mode),
        IssueAction::Show { issue_id } => {
            let store = app.tracker().store();
            let issue = store.require_issue(&IssueId::new(issue_id))?;
            output::print_issue_details(issue, store, output_mode)?;
            Ok(())
        }
        IssueAction::Update(update) => execute_update(app, update, output_mode).await,
        IssueAction::Move(mv) => execute_move(app, mv, output_mode).await,
        IssueAction::Delete { issue_id, force } => {
            let id = IssueId::new(issue_id);
            let issue = app.tracker().store().require_issue(&id)?;

            if !force && !confirm(&format!("Delete issue '{}' ({})?", issue.id, issue.title))? {
                println!("Deletion cancelled.");
                return Ok(());
            }

            let deleted = app.tracker_mut().delete_issue(&id).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": deleted.id,
                    "status": "success"
                }))?,
                OutputMode::Text => println!("Deleted issue: {}", deleted.id),
            }
            Ok(())
        }
        IssueAction::Comment { issue_id, body } => {
            let issue = app
                .tracker_mut()
                .add_comment(&IssueId::new(issue_id), body)
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&issue)?,
                OutputMode::Text => println!(
                    "Commented on {} ({} comment(s))",
                    issue.id,
                    issue.comments.len()
                ),
            }
            Ok(())
        }
    }
}

async fn execute_create(app: &mut App, args: &CreateArgs, output_mode: OutputMode) -> Result<()> {
    let tracker = app.tracker_mut();
    let new_issue = NewIssue {
        project_id: tracker.current_project()?,
        title: args.title.clone(),
        description: args.description.clone().unwrap_or_default(),
        issue_type: args.issue_type.into(),
        priority: args.priority.into(),
        status_id: args.column.as_deref().map(StatusId::new),
        sprint_id: args.sprint.as_deref().map(SprintId::new),
        assignee_ids: args.assignees.iter().map(UserId::new).collect(),
        reporter_id: Some(tracker.user().clone()),
    };

    let issue = tracker.create_issue(new_issue).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&issue)?,
        OutputMode::Text => println!("Created issue: {}", issue.id),
    }

    Ok(())
}

fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let tracker = app.tracker();
    let store = tracker.store();
    let project = tracker.current_project()?;

    let mut issues = if let Some(column) = &args.column {
        let status = StatusId::new(column);
        store.validate_status(&project, &status)?;
        resolve(store, &store.column_members(&project, &status))
    } else if let Some(sprint) = &args.sprint {
        let sprint = store.require_sprint(&SprintId::new(sprint))?;
        resolve(store, &store.plan_members(&project, Some(&sprint.id)))
    } else if args.backlog {
        resolve(store, &store.plan_members(&project, None))
    } else {
        let mut all: Vec<&Issue> = store
            .issues()
            .filter(|issue| issue.project_id == project)
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    };
    issues.truncate(args.limit);

    output::print_issues(&issues, store, output_mode)?;
    Ok(())
}

fn resolve<'a>(store: &'a EntityStore, ids: &[IssueId]) -> Vec<&'a Issue> {
    ids.iter().filter_map(|id| store.issue(id)).collect()
}

async fn execute_update(app: &mut App, args: &UpdateArgs, output_mode: OutputMode) -> Result<()> {
    let release_id = if args.clear_release {
        Some(None)
    } else {
        args.release.as_deref().map(|r| Some(ReleaseId::new(r)))
    };

    let updates = IssueUpdate {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority.map(Into::into),
        issue_type: args.issue_type.map(Into::into),
        assignee_ids: args
            .assignees
            .as_ref()
            .map(|users| users.iter().filter(|u| !u.is_empty()).map(UserId::new).collect()),
        release_id,
    };

    if updates == IssueUpdate::default() {
        bail!("No updates specified. Use --help to see available options.");
    }

    let issue = app
        .tracker_mut()
        .update_issue(&IssueId::new(&args.issue_id), updates)
        .await?;

    match output_mode {
        OutputMode::Json => output::print_json(&issue)?,
        OutputMode::Text => println!("Updated issue: {}", issue.id),
    }

    Ok(())
}

async fn execute_move(app: &mut App, args: &MoveArgs, output_mode: OutputMode) -> Result<()> {
    let destination = match (&args.column, &args.sprint) {
        (Some(column), _) => Destination::Column(StatusId::new(column)),
        (None, Some(sprint)) => Destination::Sprint(SprintId::new(sprint)),
        (None, None) => Destination::Backlog,
    };
    let anchor = args
        .before
        .as_deref()
        .map_or(Anchor::End, |id| Anchor::Before(IssueId::new(id)));
    let issue_id = IssueId::new(&args.issue_id);

    let order = app
        .tracker_mut()
        .reorder(&issue_id, &destination, &anchor)
        .await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "issue": issue_id,
            "destination": destination,
            "order": order,
        }))?,
        OutputMode::Text => {
            let target = match &destination {
                Destination::Column(status) => format!("column {status}"),
                Destination::Sprint(sprint) => format!("sprint {sprint}"),
                Destination::Backlog => "backlog".to_string(),
            };
            let position = order.iter().position(|id| *id == issue_id).map_or(0, |p| p + 1);
            println!(
                "Moved {issue_id} to {target} (position {position} of {})",
                order.len()
            );
        }
    }

    Ok(())
}

// ============================================================================
// Sprints
// ============================================================================

/// Execute a `sprint` subcommand
pub async fn execute_sprint(app: &mut App, args: &SprintArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        SprintAction::Create { name } => {
            let project = app.tracker().current_project()?;
            let sprint = app
                .tracker_mut()
                .create_sprint(&project, name.as_deref())
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&sprint)?,
                OutputMode::Text => println!("Created sprint: {} ({})", sprint.id, sprint.name),
            }
        }
        SprintAction::Start {
            sprint_id,
            start,
            end,
            goal,
        } => {
            let start = start.unwrap_or_else(today);
            let end = match end {
                Some(end) => *end,
                None => start
                    .checked_add_days(Days::new(DEFAULT_SPRINT_DAYS))
                    .context("Sprint end date out of range")?,
            };
            let sprint = app
                .tracker_mut()
                .start_sprint(&SprintId::new(sprint_id), start, end, goal)
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&sprint)?,
                OutputMode::Text => {
                    println!("Started sprint: {} ({} .. {})", sprint.name, start, end);
                }
            }
        }
        SprintAction::Edit {
            sprint_id,
            name,
            start,
            end,
            goal,
        } => {
            let id = SprintId::new(sprint_id);
            let current = app.tracker().store().require_sprint(&id)?;
            let edit = SprintEdit {
                name: name.clone().unwrap_or_else(|| current.name.clone()),
                start_date: start.or(current.start_date),
                end_date: end.or(current.end_date),
                goal: goal.clone().unwrap_or_else(|| current.goal.clone()),
            };
            let sprint = app.tracker_mut().edit_sprint(&id, edit).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&sprint)?,
                OutputMode::Text => println!("Updated sprint: {}", sprint.id),
            }
        }
        SprintAction::Complete { sprint_id } => {
            let report = app
                .tracker_mut()
                .complete_sprint(&SprintId::new(sprint_id))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&report)?,
                OutputMode::Text => println!(
                    "Completed sprint {sprint_id}: {} done, {} returned to backlog",
                    report.completed.len(),
                    report.returned_to_backlog.len()
                ),
            }
        }
        SprintAction::Delete { sprint_id } => {
            let returned = app
                .tracker_mut()
                .delete_sprint(&SprintId::new(sprint_id))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": sprint_id,
                    "returnedToBacklog": returned,
                }))?,
                OutputMode::Text => println!(
                    "Deleted sprint {sprint_id}: {} issue(s) returned to backlog",
                    returned.len()
                ),
            }
        }
        SprintAction::List { all } => {
            let tracker = app.tracker();
            let store = tracker.store();
            let project = tracker.current_project()?;
            let mut sprints: Vec<_> = store
                .sprints()
                .filter(|s| s.project_id == project)
                .filter(|s| *all || s.status != SprintStatus::Completed)
                .collect();
            sprints.sort_by(|a, b| {
                a.start_date
                    .is_none()
                    .cmp(&b.start_date.is_none())
                    .then_with(|| a.start_date.cmp(&b.start_date))
                    .then_with(|| a.name.cmp(&b.name))
            });
            output::print_sprints(&sprints, store, output_mode)?;
        }
    }

    Ok(())
}

// ============================================================================
// Time tracking
// ============================================================================

/// Execute a `time` subcommand
pub async fn execute_time(app: &mut App, args: &TimeArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TimeAction::Start { issue_id } => {
            let started = app.tracker_mut().start_timer(&IssueId::new(issue_id)).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&started)?,
                OutputMode::Text => {
                    for stopped in &started.auto_stopped {
                        println!(
                            "Stopped timer {} on {} ({})",
                            stopped.id,
                            stopped.issue_id,
                            format_duration(stopped.duration_seconds)
                        );
                    }
                    println!("Started timer {} on {issue_id}", started.log.id);
                }
            }
        }
        TimeAction::Stop { log_id } => {
            let ids = match log_id {
                Some(id) => vec![TimeLogId::new(id)],
                None => {
                    let tracker = app.tracker();
                    tracker.store().open_logs_for_user(tracker.user())
                }
            };
            if ids.is_empty() {
                bail!("No running timer");
            }

            let mut stopped = Vec::with_capacity(ids.len());
            for id in &ids {
                stopped.push(app.tracker_mut().stop_timer(id).await?);
            }
            match output_mode {
                OutputMode::Json => output::print_json(&stopped)?,
                OutputMode::Text => {
                    for log in &stopped {
                        println!(
                            "Stopped timer {} on {} ({})",
                            log.id,
                            log.issue_id,
                            format_duration(log.duration_seconds)
                        );
                    }
                }
            }
        }
        TimeAction::Log {
            issue_id,
            duration,
            date,
        } => {
            let log = app
                .tracker_mut()
                .log_manual_time(&IssueId::new(issue_id), *duration, date.unwrap_or_else(today))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&log)?,
                OutputMode::Text => println!(
                    "Logged {} on {} ({})",
                    format_duration(log.duration_seconds),
                    log.issue_id,
                    log.id
                ),
            }
        }
        TimeAction::Edit {
            log_id,
            duration,
            date,
        } => {
            let id = TimeLogId::new(log_id);
            let date = match date {
                Some(date) => *date,
                None => app
                    .tracker()
                    .store()
                    .require_time_log(&id)?
                    .start_time
                    .date_naive(),
            };
            let log = app.tracker_mut().edit_time_log(&id, *duration, date).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&log)?,
                OutputMode::Text => println!(
                    "Updated time log {}: {}",
                    log.id,
                    format_duration(log.duration_seconds)
                ),
            }
        }
        TimeAction::Delete { log_id } => {
            let log = app
                .tracker_mut()
                .delete_time_log(&TimeLogId::new(log_id))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&log)?,
                OutputMode::Text => println!("Deleted time log: {}", log.id),
            }
        }
        TimeAction::List { issue } => {
            let store = app.tracker().store();
            let mut logs = match issue {
                Some(issue) => {
                    let id = IssueId::new(issue);
                    store.require_issue(&id)?;
                    store.logs_for_issue(&id)
                }
                None => store.time_logs().collect(),
            };
            logs.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
            output::print_time_logs(&logs, output_mode)?;
        }
        TimeAction::Audit => {
            let drift = app.tracker().audit();
            match output_mode {
                OutputMode::Json => {
                    let rows: Vec<_> = drift
                        .iter()
                        .map(|(id, spent, logged)| {
                            serde_json::json!({ "issueId": id, "timeSpent": spent, "logged": logged })
                        })
                        .collect();
                    output::print_json(&rows)?;
                }
                OutputMode::Text if drift.is_empty() => {
                    println!("All time counters match their logs.");
                }
                OutputMode::Text => {
                    let config = output::OutputConfig::from_env();
                    for (id, spent, logged) in &drift {
                        println!(
                            "{}: time spent {} but logs sum to {}",
                            output::error(id.as_str(), &config),
                            format_duration(*spent),
                            format_duration(*logged)
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Releases, settings and backups
// ============================================================================

/// Execute a `release` subcommand
pub async fn execute_release(
    app: &mut App,
    args: &ReleaseArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        ReleaseAction::Create {
            name,
            description,
            date,
        } => {
            let project = app.tracker().current_project()?;
            let release = app
                .tracker_mut()
                .create_release(&project, name, description, *date)
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&release)?,
                OutputMode::Text => println!("Created release: {} ({})", release.id, release.name),
            }
        }
        ReleaseAction::Ship { release_id } => {
            let release = app
                .tracker_mut()
                .release_version(&ReleaseId::new(release_id))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&release)?,
                OutputMode::Text => println!("Released {}", release.name),
            }
        }
        ReleaseAction::Delete { release_id } => {
            let release = app
                .tracker_mut()
                .delete_release(&ReleaseId::new(release_id))
                .await?;
            match output_mode {
                OutputMode::Json => output::print_json(&release)?,
                OutputMode::Text => println!("Deleted release: {}", release.id),
            }
        }
        ReleaseAction::List => {
            let tracker = app.tracker();
            let project = tracker.current_project()?;
            let releases: Vec<_> = tracker
                .store()
                .releases()
                .filter(|r| r.project_id == project)
                .collect();
            match output_mode {
                OutputMode::Json => output::print_json(&releases)?,
                OutputMode::Text if releases.is_empty() => println!("No releases found."),
                OutputMode::Text => {
                    for release in releases {
                        let date = release
                            .release_date
                            .map(|d| d.to_string())
                            .unwrap_or_default();
                        let state = if release.released { "released" } else { "planned" };
                        println!("{}  {:<9} {}  {}", release.id, state, release.name, date);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Execute the theme command
pub async fn execute_theme(app: &mut App, args: &ThemeArgs, output_mode: OutputMode) -> Result<()> {
    let theme = app.tracker_mut().set_theme(args.theme.into()).await?;
    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "theme": theme }))?,
        OutputMode::Text => {
            let name = match theme {
                Theme::Light => "light",
                Theme::Dark => "dark",
            };
            println!("Theme set to {name}");
        }
    }
    Ok(())
}

/// Execute a `backup` subcommand
pub async fn execute_backup(app: &mut App, args: &BackupArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        BackupAction::Export { output: None } => {
            println!("{}", app.tracker().export_backup()?);
        }
        BackupAction::Export { output: Some(path) } => {
            let json = app.tracker().export_backup()?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "exported": path.display().to_string()
                }))?,
                OutputMode::Text => println!("Exported backup to {}", path.display()),
            }
        }
        BackupAction::Restore { file, force } => {
            let json = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read backup {}", file.display()))?;

            if !force && !confirm("Replace all data with the backup?")? {
                println!("Restore cancelled.");
                return Ok(());
            }

            let outcome = app
                .tracker_mut()
                .execute(Command::Restore { backup: json })
                .await?;
            match (output_mode, outcome) {
                (OutputMode::Json, outcome) => output::print_json(&outcome)?,
                (OutputMode::Text, Outcome::Restored { issues, sprints }) => {
                    println!("Restored {issues} issue(s) and {sprints} sprint(s)");
                }
                (OutputMode::Text, _) => println!("Restored backup"),
            }
        }
    }

    Ok(())
}

/// Execute the apply command
pub async fn execute_apply(app: &mut App, args: &ApplyArgs, output_mode: OutputMode) -> Result<()> {
    let input = if args.file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };

    let commands = parse_commands(&input)?;
    let mut outcomes = Vec::with_capacity(commands.len());
    for (index, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let outcome = app
            .tracker_mut()
            .execute(command)
            .await
            .with_context(|| format!("Command {} ({name}) failed", index + 1))?;
        if output_mode == OutputMode::Text {
            println!("{} {name}", output::success("ok", &output::OutputConfig::from_env()));
        }
        outcomes.push(outcome);
    }

    if output_mode == OutputMode::Json {
        output::print_json(&outcomes)?;
    }
    Ok(())
}

/// Parse one command object or an array of them.
fn parse_commands(input: &str) -> Result<Vec<Command>> {
    let value: serde_json::Value = serde_json::from_str(input).context("Input is not JSON")?;
    let commands = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_command() {
        let commands =
            parse_commands(r#"{"type": "startTimeLog", "issueId": "proj-a1b2"}"#).unwrap();
        assert_eq!(
            commands,
            vec![Command::StartTimeLog {
                issue_id: IssueId::new("proj-a1b2")
            }]
        );
    }

    #[test]
    fn test_parse_command_array() {
        let commands = parse_commands(
            r#"[
                {"type": "createSprint"},
                {"type": "completeSprint", "sprintId": "sprint-k3x9"}
            ]"#,
        )
        .unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].name(), "completeSprint");
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(parse_commands(r#"{"type": "launchRocket"}"#).is_err());
        assert!(parse_commands("not json").is_err());
    }
}
