//! Integration tests for the guildboard CLI
//!
//! These tests drive the binary end to end against a database in a
//! temporary project directory.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to create a guildboard Command isolated from the caller's environment
fn guildboard() -> Command {
    let mut cmd = cargo_bin_cmd!("guildboard");
    cmd.env_remove("GUILDBOARD_DB")
        .env_remove("GUILDBOARD_LOG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a temporary project directory
fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn init_project(dir: &TempDir) {
    guildboard()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
}

/// Run a command with `--json` and parse stdout.
fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = guildboard()
        .current_dir(dir.path())
        .arg("--json")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn id_of(value: &Value) -> String {
    value["id"].as_i64().unwrap().to_string()
}

/// Creates a board and returns (board id, column ids).
fn board_with_columns(dir: &TempDir, title: &str) -> (String, Vec<String>) {
    let board = json(dir, &["board", "add", title]);
    let board_id = id_of(&board);
    let view = json(dir, &["board", "show", &board_id]);
    let columns = view["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| id_of(&c["column"]))
        .collect();
    (board_id, columns)
}

fn task_titles(view: &Value, column_index: usize) -> Vec<String> {
    view["columns"][column_index]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_guildboard_help() {
        guildboard().arg("--help").assert().success();
    }

    #[test]
    fn test_guildboard_version() {
        guildboard().arg("--version").assert().success();
    }

    #[test]
    fn test_init_creates_structure() {
        let dir = create_temp_project();

        guildboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Database ready"));

        assert!(dir.path().join(".guildboard/guildboard.toml").exists());
        assert!(dir.path().join(".guildboard/board.db").exists());
    }

    #[test]
    fn test_init_idempotent() {
        let dir = create_temp_project();
        init_project(&dir);

        guildboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Config already exists"));
    }

    #[test]
    fn test_board_list_empty() {
        let dir = create_temp_project();
        init_project(&dir);

        guildboard()
            .current_dir(dir.path())
            .args(["board", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No boards yet"));
    }
}

// =============================================================================
// Boards and Columns
// =============================================================================

mod boards {
    use super::*;

    #[test]
    fn test_board_add_creates_default_columns() {
        let dir = create_temp_project();
        init_project(&dir);

        let (board_id, _) = board_with_columns(&dir, "Quests");
        let view = json(&dir, &["board", "show", &board_id]);

        let titles: Vec<&str> = view["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["column"]["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
    }

    #[test]
    fn test_board_add_rejects_blank_title() {
        let dir = create_temp_project();
        init_project(&dir);

        guildboard()
            .current_dir(dir.path())
            .args(["board", "add", "   "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Title is required"));
    }

    #[test]
    fn test_board_move_and_list_order() {
        let dir = create_temp_project();
        init_project(&dir);
        let a = id_of(&json(&dir, &["board", "add", "alpha"]));
        json(&dir, &["board", "add", "beta"]);
        json(&dir, &["board", "add", "gamma"]);

        let outcome = json(&dir, &["board", "move", &a, "2"]);
        assert_eq!(outcome["to"]["position"], 2);

        let boards = json(&dir, &["board", "list"]);
        let titles: Vec<&str> = boards
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn test_board_edit_keeps_unspecified_fields() {
        let dir = create_temp_project();
        init_project(&dir);
        let id = id_of(&json(
            &dir,
            &["board", "add", "Quests", "--description", "guild hall"],
        ));

        let board = json(&dir, &["board", "edit", &id, "--title", "Errands"]);
        assert_eq!(board["title"], "Errands");
        assert_eq!(board["description"], "guild hall");
    }

    #[test]
    fn test_board_rm_compacts_remaining_boards() {
        let dir = create_temp_project();
        init_project(&dir);
        let a = id_of(&json(&dir, &["board", "add", "alpha"]));
        json(&dir, &["board", "add", "beta"]);

        json(&dir, &["board", "rm", &a]);

        let boards = json(&dir, &["board", "list"]);
        assert_eq!(boards.as_array().unwrap().len(), 1);
        assert_eq!(boards[0]["position"], 0);
    }

    #[test]
    fn test_board_rm_missing_fails() {
        let dir = create_temp_project();
        init_project(&dir);

        guildboard()
            .current_dir(dir.path())
            .args(["board", "rm", "42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Board 42 not found"));
    }

    #[test]
    fn test_column_add_move_rm() {
        let dir = create_temp_project();
        init_project(&dir);
        let (board_id, _) = board_with_columns(&dir, "Quests");

        let column = json(
            &dir,
            &["column", "add", &board_id, "Review", "--color", "#3b82f6"],
        );
        assert_eq!(column["position"], 3);
        let column_id = id_of(&column);

        json(&dir, &["column", "move", &column_id, "0"]);
        let view = json(&dir, &["board", "show", &board_id]);
        assert_eq!(view["columns"][0]["column"]["title"], "Review");

        json(&dir, &["column", "rm", &column_id]);
        let view = json(&dir, &["board", "show", &board_id]);
        assert_eq!(view["columns"][0]["column"]["title"], "To Do");
        assert_eq!(view["columns"][0]["column"]["position"], 0);
    }

    #[test]
    fn test_column_add_rejects_bad_color() {
        let dir = create_temp_project();
        init_project(&dir);
        let (board_id, _) = board_with_columns(&dir, "Quests");

        guildboard()
            .current_dir(dir.path())
            .args(["column", "add", &board_id, "Review", "--color", "blue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid color"));
    }
}

// =============================================================================
// Tasks
// =============================================================================

mod tasks {
    use super::*;

    fn add_task(dir: &TempDir, column: &str, title: &str) -> String {
        id_of(&json(dir, &["task", "add", column, title]))
    }

    #[test]
    fn test_task_add_appends() {
        let dir = create_temp_project();
        init_project(&dir);
        let (_, columns) = board_with_columns(&dir, "Quests");

        add_task(&dir, &columns[0], "first");
        let task = json(
            &dir,
            &[
                "task", "add", &columns[0], "second", "--priority", "high", "--due",
                "2026-11-01",
            ],
        );

        assert_eq!(task["position"], 1);
        assert_eq!(task["priority"], "high");
        assert_eq!(task["due_date"], "2026-11-01");
    }

    #[test]
    fn test_task_add_rejects_bad_due_date() {
        let dir = create_temp_project();
        init_project(&dir);
        let (_, columns) = board_with_columns(&dir, "Quests");

        guildboard()
            .current_dir(dir.path())
            .args(["task", "add", &columns[0], "late", "--due", "tomorrow"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid due date"));
    }

    #[test]
    fn test_task_reorder_within_column() {
        let dir = create_temp_project();
        init_project(&dir);
        let (board_id, columns) = board_with_columns(&dir, "Quests");
        for name in ["a", "b", "c"] {
            add_task(&dir, &columns[0], name);
        }
        let d = add_task(&dir, &columns[0], "d");

        json(&dir, &["task", "move", &d, "1"]);

        let view = json(&dir, &["board", "show", &board_id]);
        assert_eq!(task_titles(&view, 0), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_task_move_across_columns() {
        let dir = create_temp_project();
        init_project(&dir);
        let (board_id, columns) = board_with_columns(&dir, "Quests");
        add_task(&dir, &columns[0], "x");
        let y = add_task(&dir, &columns[0], "y");
        add_task(&dir, &columns[0], "z");
        add_task(&dir, &columns[1], "p");
        add_task(&dir, &columns[1], "q");

        guildboard()
            .current_dir(dir.path())
            .args(["task", "move", &y, "1", "--column", &columns[1]])
            .assert()
            .success()
            .stdout(predicate::str::contains("Moved task"));

        let view = json(&dir, &["board", "show", &board_id]);
        assert_eq!(task_titles(&view, 0), vec!["x", "z"]);
        assert_eq!(task_titles(&view, 1), vec!["p", "y", "q"]);

        guildboard()
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("All groups are dense"));
    }

    #[test]
    fn test_task_move_out_of_range_fails() {
        let dir = create_temp_project();
        init_project(&dir);
        let (_, columns) = board_with_columns(&dir, "Quests");
        let a = add_task(&dir, &columns[0], "a");
        add_task(&dir, &columns[0], "b");

        guildboard()
            .current_dir(dir.path())
            .args(["task", "move", &a, "5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("out of range"));
    }

    #[test]
    fn test_task_move_out_of_range_clamps_with_policy() {
        let dir = create_temp_project();
        init_project(&dir);
        fs::write(
            dir.path().join(".guildboard/guildboard.toml"),
            "[sequencer]\nposition_policy = \"clamp\"\n",
        )
        .unwrap();
        let (board_id, columns) = board_with_columns(&dir, "Quests");
        let a = add_task(&dir, &columns[0], "a");
        add_task(&dir, &columns[0], "b");

        let outcome = json(&dir, &["task", "move", &a, "5"]);
        assert_eq!(outcome["to"]["position"], 1);

        let view = json(&dir, &["board", "show", &board_id]);
        assert_eq!(task_titles(&view, 0), vec!["b", "a"]);
    }

    #[test]
    fn test_task_move_missing_fails() {
        let dir = create_temp_project();
        init_project(&dir);

        guildboard()
            .current_dir(dir.path())
            .args(["task", "move", "99", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Task 99 not found"));
    }

    #[test]
    fn test_task_edit_and_clear_due_date() {
        let dir = create_temp_project();
        init_project(&dir);
        let (_, columns) = board_with_columns(&dir, "Quests");
        let id = id_of(&json(
            &dir,
            &["task", "add", &columns[0], "scout", "--due", "2026-12-01"],
        ));

        let task = json(&dir, &["task", "edit", &id, "--priority", "low"]);
        assert_eq!(task["priority"], "low");
        assert_eq!(task["title"], "scout");
        assert_eq!(task["due_date"], "2026-12-01");

        let task = json(&dir, &["task", "edit", &id, "--no-due"]);
        assert!(task["due_date"].is_null());
    }

    #[test]
    fn test_task_rm_compacts_column() {
        let dir = create_temp_project();
        init_project(&dir);
        let (board_id, columns) = board_with_columns(&dir, "Quests");
        add_task(&dir, &columns[0], "a");
        let b = add_task(&dir, &columns[0], "b");
        add_task(&dir, &columns[0], "c");

        json(&dir, &["task", "rm", &b]);

        let view = json(&dir, &["board", "show", &board_id]);
        let positions: Vec<i64> = view["columns"][0]["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(task_titles(&view, 0), vec!["a", "c"]);
    }
}

// =============================================================================
// Configuration and Global Flags
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();

        guildboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No guildboard.toml found"))
            .stdout(predicate::str::contains("position_policy = \"strict\""));
    }

    #[test]
    fn test_config_show_reads_toml() {
        let dir = create_temp_project();
        init_project(&dir);
        fs::write(
            dir.path().join(".guildboard/guildboard.toml"),
            "[sequencer]\nposition_policy = \"clamp\"\nmax_retries = 9\n",
        )
        .unwrap();

        guildboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("position_policy = \"clamp\""))
            .stdout(predicate::str::contains("max_retries = 9"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        init_project(&dir);
        fs::write(
            dir.path().join(".guildboard/guildboard.toml"),
            "[logging]\nlevel = \"shouty\"\n",
        )
        .unwrap();

        guildboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("shouty"));
    }

    #[test]
    fn test_env_db_overrides_file() {
        let dir = create_temp_project();

        let output = guildboard()
            .current_dir(dir.path())
            .env("GUILDBOARD_DB", "from-env.db")
            .args(["--json", "config", "show"])
            .output()
            .unwrap();
        let value: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert!(value["db_path"].as_str().unwrap().ends_with("from-env.db"));
    }

    #[test]
    fn test_db_flag_overrides_env() {
        let dir = create_temp_project();
        let db = dir.path().join("flag.db");

        guildboard()
            .current_dir(dir.path())
            .env("GUILDBOARD_DB", "from-env.db")
            .arg("--db")
            .arg(&db)
            .args(["board", "add", "flagged"])
            .assert()
            .success();

        assert!(db.exists());
        assert!(!dir.path().join("from-env.db").exists());
    }

    #[test]
    fn test_json_logs_go_to_stderr() {
        let dir = create_temp_project();
        init_project(&dir);

        let output = guildboard()
            .current_dir(dir.path())
            .env("GUILDBOARD_LOG_JSON", "1")
            .args(["--json", "board", "add", "logged"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let board: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(board["title"], "logged");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("\"Board created\""));
    }
}

// =============================================================================
// Integrity Check
// =============================================================================

mod check {
    use super::*;

    #[test]
    fn test_check_fails_on_gap() {
        let dir = create_temp_project();
        init_project(&dir);
        let (_, columns) = board_with_columns(&dir, "Quests");
        json(&dir, &["task", "add", &columns[0], "a"]);
        json(&dir, &["task", "add", &columns[0], "b"]);

        open_gap_in_first_column(&dir);

        guildboard()
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Density violations"));
    }

    /// Push the last task of the first column up by one, bypassing the sequencer.
    fn open_gap_in_first_column(dir: &TempDir) {
        use guildboard::board::store::ItemPatch;
        use guildboard::board::{AtomicStore, BoardDb, Collection, OrderedCollection, Sequencer};

        let db = BoardDb::new(&dir.path().join(".guildboard/board.db"), Sequencer::default())
            .unwrap();
        let board = db.list_boards().unwrap().remove(0);
        let column = db.list_columns(board.board.id).unwrap().remove(0);
        let tasks = db.list_tasks(column.id).unwrap();
        let last = tasks.last().unwrap();
        db.collection(Collection::Tasks)
            .run_atomic(|tx| tx.update_one(last.id, ItemPatch::position(last.position + 1)))
            .unwrap();
    }
}
