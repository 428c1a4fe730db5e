//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled     |
//! |-------------|----------------------|
//! | `init`      | `Init`               |
//! | `board`     | `Board`              |
//! | `stats`     | `Stats`              |
//! | `project`   | `Project`            |
//! | `client`    | `Client`             |
//! | `task`      | `Task`               |
//! | `settings`  | `Settings`           |
//! | `business`  | `Business`           |
//! | `config`    | `Config`             |

pub mod board;
pub mod business;
pub mod client;
pub mod config;
pub mod init;
pub mod project;
pub mod settings;
pub mod stats;
pub mod task;

pub use board::cmd_board;
pub use business::cmd_business;
pub use client::cmd_client;
pub use config::cmd_config;
pub use init::cmd_init;
pub use project::cmd_project;
pub use settings::cmd_settings;
pub use stats::cmd_stats;
pub use task::cmd_task;

use anyhow::{Context, Result};
use std::path::Path;

use trackforge::config::{CliOverrides, TrackforgeConfig};
use trackforge::gateway::Gateway;
use trackforge::workspace::{SyncStatus, Workspace};
use trackforge_common::{format_timestamp, parse_timestamp};

use super::Cli;

pub(crate) type CliWorkspace = Workspace<Box<dyn Gateway>>;

pub(crate) fn load_config(cli: &Cli, project_dir: &Path) -> Result<TrackforgeConfig> {
    let overrides = CliOverrides {
        verbose: cli.verbose,
        guest: cli.guest,
        backend: cli.backend,
        user: cli.user.clone(),
    };
    TrackforgeConfig::new(project_dir.to_path_buf(), overrides)
}

pub(crate) async fn open_workspace(cli: &Cli, project_dir: &Path) -> Result<CliWorkspace> {
    let config = load_config(cli, project_dir)?;
    config.session.open_workspace(&config).await
}

/// Resolve a full id from an exact id or a unique prefix.
pub(crate) fn resolve_id<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    prefix: &str,
    what: &str,
) -> Result<String> {
    if prefix.trim().is_empty() {
        anyhow::bail!("{} id cannot be empty", what);
    }
    let mut matches = Vec::new();
    for id in ids {
        if id == prefix {
            return Ok(id.to_string());
        }
        if id.starts_with(prefix) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [] => anyhow::bail!("No {} matches '{}'", what, prefix),
        [id] => Ok(id.to_string()),
        _ => anyhow::bail!(
            "'{}' is ambiguous: it matches {} {}s",
            prefix,
            matches.len(),
            what
        ),
    }
}

/// Like [`resolve_id`], but a blank reference clears the assignment.
pub(crate) fn resolve_assignment<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    prefix: &str,
    what: &str,
) -> Result<String> {
    if prefix.trim().is_empty() {
        return Ok(String::new());
    }
    resolve_id(ids, prefix, what)
}

/// Report how a mutation was synced. Returns whether it changed anything.
pub(crate) fn check_status(status: &SyncStatus) -> Result<bool> {
    match status {
        SyncStatus::Persisted => Ok(true),
        SyncStatus::Skipped(reason) => {
            println!(
                "{} nothing changed ({})",
                console::style("Note:").yellow(),
                reason
            );
            Ok(false)
        }
        SyncStatus::Failed { error, policy } => {
            anyhow::bail!("Failed to save change ({} applied): {}", policy, error)
        }
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub(crate) fn parse_due(value: &str) -> Result<String> {
    if let Some(at) = parse_timestamp(value) {
        return Ok(format_timestamp(at));
    }
    let date = chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid due date '{}', expected YYYY-MM-DD", value))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid due date")?
        .and_utc();
    Ok(format_timestamp(midnight))
}

pub(crate) fn display_date(timestamp: &str) -> String {
    parse_timestamp(timestamp)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub(crate) fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{} cannot be empty", what);
    }
    Ok(trimmed.to_string())
}

/// Project values are money amounts: finite and not negative.
pub(crate) fn check_value(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("Value must be a number of zero or more, got {}", value);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_id_exact_and_prefix() {
        let ids = ["abc123", "abd456", "abc"];
        assert_eq!(resolve_id(ids, "abc", "project").unwrap(), "abc");
        assert_eq!(resolve_id(ids, "abd", "project").unwrap(), "abd456");
    }

    #[test]
    fn test_resolve_id_errors() {
        let ids = ["abc123", "abd456"];
        let err = resolve_id(ids, "ab", "task").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        let err = resolve_id(ids, "zz", "task").unwrap_err();
        assert!(err.to_string().contains("No task matches 'zz'"));
    }

    #[test]
    fn test_resolve_id_rejects_blank_prefix() {
        let ids = ["c0ffee-1234"];
        let err = resolve_id(ids, "", "client").unwrap_err();
        assert!(err.to_string().contains("client id cannot be empty"));
        assert!(resolve_id(ids, "  ", "client").is_err());
    }

    #[test]
    fn test_resolve_assignment_blank_unassigns() {
        let ids = ["c0ffee-1234", "beef-5678"];
        assert_eq!(resolve_assignment(ids, "", "client").unwrap(), "");
        assert_eq!(resolve_assignment(ids, " ", "client").unwrap(), "");
        assert_eq!(resolve_assignment(ids, "c0f", "client").unwrap(), "c0ffee-1234");
        assert!(resolve_assignment(ids, "zz", "client").is_err());
    }

    #[test]
    fn test_check_value() {
        assert_eq!(check_value(0.0).unwrap(), 0.0);
        assert_eq!(check_value(1500.5).unwrap(), 1500.5);
        assert!(check_value(-500.0).is_err());
        assert!(check_value(f64::NAN).is_err());
        assert!(check_value(f64::INFINITY).is_err());
        assert!(check_value(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_parse_due() {
        assert_eq!(parse_due("2026-03-01").unwrap(), "2026-03-01T00:00:00.000Z");
        assert_eq!(
            parse_due("2026-03-01T10:30:00.000Z").unwrap(),
            "2026-03-01T10:30:00.000Z"
        );
        assert!(parse_due("next week").is_err());
        assert_eq!(display_date("2026-03-01T10:30:00.000Z"), "2026-03-01");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("1"), "1");
    }
}
