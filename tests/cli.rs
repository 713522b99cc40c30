//! End-to-end exit-code tests for the `ixctl` binary against a throwaway
//! SQLite catalog file (spec §6 "Exit codes").

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::NamedTempFile;

fn ixctl() -> Command {
    Command::cargo_bin("ixctl").expect("binary built by the test harness")
}

fn fresh_db_path() -> NamedTempFile {
    let file = NamedTempFile::new().expect("tmp file");
    std::fs::remove_file(file.path()).ok();
    file
}

#[test]
fn create_then_check_on_a_fresh_catalog_exits_success() {
    let db = fresh_db_path();

    ixctl().arg(db.path()).arg("--create").assert().success();
    ixctl().arg(db.path()).arg("--check").assert().success();
}

#[test]
fn check_orphaned_fails_the_run_when_a_finding_exists() {
    let db = fresh_db_path();

    ixctl().arg(db.path()).arg("--create").assert().success();

    ixctl()
        .arg(db.path())
        .args(["INSERT", "INTO", "uuids", "(jobUuid)", "VALUES", "('11111111-1111-1111-1111-111111111111')"])
        .assert()
        .success();
    ixctl()
        .arg(db.path())
        .args([
            "INSERT",
            "INTO",
            "entities",
            "(uuidId,",
            "jobUuid,",
            "created)",
            "VALUES",
            "(1,",
            "'11111111-1111-1111-1111-111111111111',",
            "0)",
        ])
        .assert()
        .success();
    // name='' violates "storages without a name or with an out-of-range
    // state" (spec §4.4 invariant 5).
    ixctl()
        .arg(db.path())
        .args([
            "INSERT",
            "INTO",
            "storages",
            "(uuidId,",
            "entityId,",
            "name,",
            "created,",
            "state)",
            "VALUES",
            "(1,",
            "1,",
            "'',",
            "0,",
            "0)",
        ])
        .assert()
        .success();

    ixctl().arg(db.path()).arg("--check-orphaned").assert().code(1);
}

#[test]
fn a_malformed_client_server_uri_exits_with_the_argument_error_code() {
    // Missing the required `<user>` segment (spec §6 URI grammar).
    ixctl().arg("mariadb:db.example.com").arg("--info").assert().code(2);
}

#[test]
fn pass_through_sql_prints_query_results() {
    let db = fresh_db_path();

    ixctl().arg(db.path()).arg("--create").assert().success();

    ixctl()
        .arg(db.path())
        .args(["SELECT", "COUNT(*)", "FROM", "entities"])
        .assert()
        .success()
        .stdout(contains("0"));
}
