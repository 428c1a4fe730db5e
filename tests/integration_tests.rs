//! Integration tests for TrackForge
//!
//! These drive the binary end to end against a temporary project directory.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a trackforge Command isolated from the caller's environment
fn trackforge(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("trackforge");
    cmd.current_dir(dir.path())
        .env_remove("TRACKFORGE_BACKEND")
        .env_remove("TRACKFORGE_USER")
        .env_remove("TRACKFORGE_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized project directory
fn init_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    trackforge(&dir).arg("init").assert().success();
    dir
}

/// Run a command and return its stdout.
fn stdout_of(dir: &TempDir, args: &[&str]) -> String {
    let output = trackforge(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Pull the short id out of an "Added <title> (<id>) ..." line.
fn added_id(stdout: &str) -> String {
    let start = stdout.find('(').unwrap() + 1;
    let end = start + stdout[start..].find(')').unwrap();
    stdout[start..end].to_string()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_trackforge_help() {
        let dir = TempDir::new().unwrap();
        trackforge(&dir).arg("--help").assert().success();
    }

    #[test]
    fn test_trackforge_version() {
        let dir = TempDir::new().unwrap();
        trackforge(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_init_creates_structure() {
        let dir = TempDir::new().unwrap();

        trackforge(&dir)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized"));

        assert!(dir.path().join(".trackforge/trackforge.toml").exists());
        assert!(dir.path().join(".trackforge/data").exists());
    }

    #[test]
    fn test_init_idempotent() {
        let dir = init_project();

        trackforge(&dir)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Already initialized"));
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = init_project();

        trackforge(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("on_failure = \"refetch\""))
            .stdout(predicate::str::contains("session = guest"));
    }

    #[test]
    fn test_project_dir_flag() {
        let dir = init_project();
        let elsewhere = TempDir::new().unwrap();

        trackforge(&elsewhere)
            .arg("--project-dir")
            .arg(dir.path())
            .arg("board")
            .assert()
            .success()
            .stdout(predicate::str::contains("Rebrand Landing"));
    }
}

// =============================================================================
// Guest Session Tests
// =============================================================================

mod guest {
    use super::*;

    #[test]
    fn test_guest_board_is_seeded_with_demo_data() {
        let dir = init_project();

        trackforge(&dir)
            .arg("board")
            .assert()
            .success()
            .stdout(predicate::str::contains("IN PROGRESS"))
            .stdout(predicate::str::contains("Rebrand Landing"))
            .stdout(predicate::str::contains("Pitch Deck Design"));

        assert!(dir.path().join(".trackforge/data/guest/demo-seeded").exists());
    }

    #[test]
    fn test_cleared_demo_data_stays_cleared() {
        let dir = init_project();
        stdout_of(&dir, &["business", "clear"]);

        trackforge(&dir)
            .args(["project", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No projects."));
    }

    #[test]
    fn test_stats_show_business_metrics() {
        let dir = init_project();

        trackforge(&dir)
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("Active Tasks"))
            .stdout(predicate::str::contains("Revenue Potential     $10900"))
            .stdout(predicate::str::contains("Weekly Rhythm"));
    }
}

// =============================================================================
// Project Board Tests
// =============================================================================

mod board {
    use super::*;

    #[test]
    fn test_reorder_persists_between_runs() {
        let dir = init_project();
        stdout_of(&dir, &["business", "clear"]);
        stdout_of(&dir, &["project", "add", "Alpha", "--stage", "review"]);
        stdout_of(&dir, &["project", "add", "Beta", "--stage", "review"]);

        stdout_of(&dir, &["project", "reorder", "review", "1", "0"]);

        let listed = stdout_of(&dir, &["project", "list", "--stage", "review"]);
        let alpha = listed.find("Alpha").unwrap();
        let beta = listed.find("Beta").unwrap();
        assert!(beta < alpha, "expected Beta before Alpha:\n{}", listed);
    }

    #[test]
    fn test_move_by_id_prefix() {
        let dir = init_project();
        stdout_of(&dir, &["business", "clear"]);
        let id = added_id(&stdout_of(&dir, &["project", "add", "Alpha"]));

        trackforge(&dir)
            .args(["project", "move", &id[..4], "done"])
            .assert()
            .success()
            .stdout(predicate::str::contains("is now #0 in done"));

        let listed = stdout_of(&dir, &["project", "list", "--stage", "done"]);
        assert!(listed.contains("Alpha"));
    }

    #[test]
    fn test_move_with_negative_index_lands_first() {
        let dir = init_project();
        let id = added_id(&stdout_of(&dir, &["project", "add", "Urgent"]));

        trackforge(&dir)
            .args(["project", "move", &id, "review", "--index", "-3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("is now #0 in review"));
    }

    #[test]
    fn test_move_to_unknown_stage_is_a_no_op() {
        let dir = init_project();

        trackforge(&dir)
            .args(["project", "move", "demo-proj-1", "archive"])
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing changed (unknown stage)"));

        let listed = stdout_of(&dir, &["project", "list", "--stage", "in-progress"]);
        assert!(listed.contains("Rebrand Landing"));
    }

    #[test]
    fn test_drag_into_other_column() {
        let dir = init_project();

        trackforge(&dir)
            .args(["project", "drag", "demo-proj-1", "review", "--slot", "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("is now #0 in review"));

        let listed = stdout_of(&dir, &["project", "list", "--stage", "review"]);
        let moved = listed.find("Rebrand Landing").unwrap();
        let other = listed.find("Pitch Deck Design").unwrap();
        assert!(moved < other);
    }

    #[test]
    fn test_reorder_out_of_range_is_a_no_op() {
        let dir = init_project();

        trackforge(&dir)
            .args(["project", "reorder", "done", "0", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("index out of range"));
    }

    #[test]
    fn test_invalid_stage_is_rejected() {
        let dir = init_project();

        trackforge(&dir)
            .args(["project", "add", "Alpha", "--stage", "archive"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid stage"));
    }

    #[test]
    fn test_unknown_project_id() {
        let dir = init_project();

        trackforge(&dir)
            .args(["project", "delete", "zzz"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No project matches 'zzz'"));
    }

    #[test]
    fn test_project_with_client() {
        let dir = init_project();

        stdout_of(
            &dir,
            &["project", "add", "Brochure", "--client", "demo-client-2", "--value", "900"],
        );

        trackforge(&dir)
            .args(["project", "list", "--stage", "all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Brochure"))
            .stdout(predicate::str::contains("Jane Doe"));
    }
}

// =============================================================================
// Task, Client and Settings Tests
// =============================================================================

mod records {
    use super::*;

    #[test]
    fn test_task_lifecycle() {
        let dir = init_project();
        let id = added_id(&stdout_of(&dir, &["task", "add", "Ship it", "--priority", "high"]));

        let pending = stdout_of(&dir, &["task", "list", "--pending"]);
        assert!(pending.contains("Ship it"));

        stdout_of(&dir, &["task", "toggle", &id]);
        let completed = stdout_of(&dir, &["task", "list", "--completed"]);
        assert!(completed.contains("Ship it"));

        stdout_of(&dir, &["task", "delete", &id]);
        let all = stdout_of(&dir, &["task", "list"]);
        assert!(!all.contains("Ship it"));
    }

    #[test]
    fn test_non_finite_project_value_is_rejected() {
        let dir = init_project();

        for value in ["NaN", "inf"] {
            trackforge(&dir)
                .args(["project", "add", "Broken", "--value", value])
                .assert()
                .failure()
                .stderr(predicate::str::contains("Value must be a number"));
        }

        let board = stdout_of(&dir, &["board"]);
        assert!(!board.contains("Broken"));
    }

    #[test]
    fn test_negative_project_value_is_rejected() {
        let dir = init_project();
        let id = added_id(&stdout_of(&dir, &["project", "add", "Priced", "--value", "100"]));

        trackforge(&dir)
            .args(["project", "add", "Neg", "--value=-500"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Value must be a number of zero or more"));
        trackforge(&dir)
            .args(["project", "update", &id, "--value=-1"])
            .assert()
            .failure();

        let listed = stdout_of(&dir, &["project", "list"]);
        assert!(!listed.contains("Neg"));
    }

    #[test]
    fn test_blank_client_unassigns_project() {
        let dir = init_project();
        stdout_of(&dir, &["business", "clear"]);
        let client = added_id(&stdout_of(
            &dir,
            &["client", "add", "Ada", "--email", "ada@example.com", "--company", "Engines"],
        ));
        let id = added_id(&stdout_of(
            &dir,
            &["project", "add", "Site", "--client", &client],
        ));

        trackforge(&dir)
            .args(["project", "update", &id, "--client", ""])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated"));
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let dir = init_project();

        trackforge(&dir)
            .args(["task", "toggle", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("task id cannot be empty"));
    }

    #[test]
    fn test_empty_task_title_is_rejected() {
        let dir = init_project();

        trackforge(&dir)
            .args(["task", "add", "   "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Title cannot be empty"));
    }

    #[test]
    fn test_client_add_and_update() {
        let dir = init_project();
        let id = added_id(&stdout_of(
            &dir,
            &["client", "add", "Initech", "--email", "bill@initech.test"],
        ));

        stdout_of(&dir, &["client", "update", &id, "--company", "Initech LLC"]);

        trackforge(&dir)
            .args(["client", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initech LLC"))
            .stdout(predicate::str::contains("Acme Corp"));
    }

    #[test]
    fn test_settings_persist() {
        let dir = init_project();
        stdout_of(&dir, &["settings", "density", "compact"]);
        stdout_of(&dir, &["settings", "animations"]);

        trackforge(&dir)
            .args(["settings", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("density = compact"))
            .stdout(predicate::str::contains("animations = off"));
    }

    #[test]
    fn test_business_toggle() {
        let dir = init_project();

        trackforge(&dir)
            .args(["business", "toggle"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Business mode off"));

        let stats = stdout_of(&dir, &["stats"]);
        assert!(!stats.contains("Revenue Potential"));
    }
}

// =============================================================================
// User Session Tests
// =============================================================================

mod users {
    use super::*;

    #[test]
    fn test_user_data_is_separate() {
        let dir = init_project();
        stdout_of(&dir, &["--user", "alice", "project", "add", "Alice Site"]);

        let alice = stdout_of(&dir, &["--user", "alice", "project", "list"]);
        assert!(alice.contains("Alice Site"));

        trackforge(&dir)
            .args(["--user", "bob", "project", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No projects."));

        let guest = stdout_of(&dir, &["project", "list"]);
        assert!(!guest.contains("Alice Site"));

        assert!(dir.path().join(".trackforge/data/trackforge.db").exists());
    }

    #[test]
    fn test_user_from_env() {
        let dir = init_project();
        trackforge(&dir)
            .env("TRACKFORGE_USER", "carol")
            .args(["task", "add", "Env task"])
            .assert()
            .success();

        let listed = stdout_of(&dir, &["--user", "carol", "task", "list"]);
        assert!(listed.contains("Env task"));
    }

    #[test]
    fn test_local_backend_for_user() {
        let dir = init_project();
        stdout_of(
            &dir,
            &["--user", "dave", "--backend", "local", "task", "add", "Local task"],
        );

        assert!(dir.path().join(".trackforge/data/users/dave/tasks.json").exists());
    }
}
