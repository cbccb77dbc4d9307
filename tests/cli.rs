use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kitboard(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kitboard").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Fresh HOME with an initialized data dir and the demo dataset loaded.
fn demo_home() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("data");
    kitboard(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kitboard"));
    kitboard(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded demo data: 4 projects"));
    home
}

#[test]
fn test_commands_require_init() {
    let home = tempfile::tempdir().unwrap();
    kitboard(home.path())
        .arg("projects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kitboard init"));
}

#[test]
fn test_demo_only_loads_into_empty_database() {
    let home = demo_home();
    kitboard(home.path())
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has projects"));
}

#[test]
fn test_status_counts_rows() {
    let home = demo_home();
    kitboard(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects:     4"))
        .stdout(predicate::str::contains("last: demo"));
}

#[test]
fn test_projects_list_and_filters() {
    let home = demo_home();
    kitboard(home.path())
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("PRJ-001"))
        .stdout(predicate::str::contains("Rows 1-4 of 4 | Page 1/1"));

    kitboard(home.path())
        .args(["projects", "--country", "Uganda"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PRJ-002"))
        .stdout(predicate::str::contains("PRJ-001").not());

    kitboard(home.path())
        .args(["projects", "--status", "ACTIVE", "--page-size", "1", "--page", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows 2-2 of 2 | Page 2/2"));

    kitboard(home.path())
        .args(["projects", "--search", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results for search: \"zzz\"."));
}

#[test]
fn test_unknown_status_is_rejected() {
    let home = demo_home();
    kitboard(home.path())
        .args(["projects", "--status", "archived"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected one of"));
}

#[test]
fn test_project_kpis() {
    let home = demo_home();
    kitboard(home.path())
        .args(["project", "PRJ-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(placeholder)"))
        .stdout(predicate::str::contains("Milestones"));

    kitboard(home.path())
        .args(["project", "PRJ-002", "--budget", "250000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$250,000.00"))
        .stdout(predicate::str::contains("(placeholder)").not());

    kitboard(home.path())
        .args(["project", "PRJ-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown project: PRJ-404"));
}

#[test]
fn test_expenses_and_recent() {
    let home = demo_home();
    kitboard(home.path())
        .args(["expenses", "PRJ-001", "--category", "admin", "--sort", "amount"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Office & coordination"))
        .stdout(predicate::str::contains("Rows 1-6 of 6"));

    kitboard(home.path())
        .args(["recent", "--type", "donation", "--page-size", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows 1-3 of 18"))
        .stdout(predicate::str::contains("next: --page 2"));
}

#[test]
fn test_dashboard() {
    let home = demo_home();
    kitboard(home.path())
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Active projects"))
        .stdout(predicate::str::contains("Sessions by type"));

    kitboard(home.path())
        .args(["dashboard", "--month", "2025-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM"));
}

#[test]
fn test_beneficiaries_export() {
    let home = demo_home();
    let out = home.path().join("out");

    kitboard(home.path())
        .args(["beneficiaries", "PRJ-001", "--type", "formation"])
        .args(["--page-size", "2", "--export", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 6 sessions"));

    let csv = std::fs::read_to_string(out.join("beneficiaries_PRJ-001.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("\"session_id\",\"date\",\"type\",\"females\",\"males\",\"total\"")
    );
    assert_eq!(lines.count(), 6);
    assert!(csv.ends_with('\n'));

    kitboard(home.path())
        .args(["beneficiaries", "PRJ-001", "--session", "PRJ-001-SES-03D", "--output"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("prj-001-ses-03d.csv").exists());

    kitboard(home.path())
        .args(["beneficiaries", "PRJ-001", "--session", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown beneficiary session: nope"));
}

#[test]
fn test_import_rejects_duplicate_file() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("data");
    kitboard(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success();

    let file = home.path().join("program.json");
    std::fs::write(
        &file,
        r#"{"projects":[{"id":"P1","name":"Kits","organisation":"Org","location":"Mali, Bamako",
            "start_date":"2025-01-10","status":"active","budget":1000}],
           "beneficiary_sessions":[{"id":"S1","project_id":"P1","date":"2025-02-01",
            "session_type":"distribution","females":10,"males":2}]}"#,
    )
    .unwrap();

    kitboard(home.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 rows from program.json"));

    kitboard(home.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already imported: program.json"));

    kitboard(home.path())
        .args(["projects", "--country", "Mali"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P1"));
}

#[test]
fn test_dataset_flag_reads_without_database() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("program.json");
    std::fs::write(
        &file,
        r#"{"projects":[{"id":"P9","name":"Preview","organisation":"Org","location":"Chad",
            "start_date":"2024-05-01","status":"draft"}]}"#,
    )
    .unwrap();

    kitboard(home.path())
        .args(["projects", "--dataset"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("P9"))
        .stdout(predicate::str::contains("Chad"));

    kitboard(home.path())
        .args(["status", "--dataset"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects:     1"))
        .stdout(predicate::str::contains("Sessions:     0"))
        .stdout(predicate::str::contains("Database not found").not());
}

#[test]
fn test_load_requires_existing_database() {
    let home = tempfile::tempdir().unwrap();
    kitboard(home.path())
        .args(["load", "/definitely/not/a/kitboard/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No database found"));
}
