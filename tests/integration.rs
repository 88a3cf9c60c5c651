use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn authwatch() -> Command {
    let mut cmd = Command::cargo_bin("authwatch").unwrap();
    // Keep host environment credentials from leaking into the tests.
    cmd.env_remove("SSH_AUTH_FILE")
        .env_remove("CONTACTS_FILE")
        .env_remove("TWILIO_ACCOUNT_SID")
        .env_remove("TWILIO_AUTH_TOKEN")
        .env_remove("TWILIO_MSG_SERVICE_SID");
    cmd
}

#[test]
fn test_help_output() {
    authwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SSH auth-log monitoring"));
}

#[test]
fn test_version_output() {
    authwatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("authwatch"));
}

#[test]
fn test_log_file_required() {
    authwatch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-file"));
}

#[test]
fn test_missing_credentials_enumerated() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "some log content").unwrap();
    temp_file.flush().unwrap();

    authwatch()
        .args(["--log-file", temp_file.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--contacts-file (CONTACTS_FILE)"))
        .stderr(predicate::str::contains("--account-sid (TWILIO_ACCOUNT_SID)"))
        .stderr(predicate::str::contains("--auth-token (TWILIO_AUTH_TOKEN)"))
        .stderr(predicate::str::contains(
            "--messaging-service-sid (TWILIO_MSG_SERVICE_SID)",
        ));
}

#[test]
fn test_dry_run_reports_matches() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        "Mar 1 00:00:01 host sshd[123]: pam_unix(sshd:session): session opened for user root"
    )
    .unwrap();
    writeln!(temp_file, "Mar 1 00:00:02 host sudo: alice : COMMAND=/bin/ls").unwrap();
    writeln!(temp_file, "Mar 1 00:00:03 host CRON[456]: pam_unix(cron:session)").unwrap();
    temp_file.flush().unwrap();

    authwatch()
        .args([
            "--log-file",
            temp_file.path().to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]").count(2))
        .stdout(predicate::str::contains("privileged command: 1 match(es)"))
        .stdout(predicate::str::contains("SSH session opened: 1 match(es)"))
        .stdout(predicate::str::contains("cron:session").not());
}

#[test]
fn test_dry_run_missing_log_file_fails() {
    authwatch()
        .args(["--log-file", "/nonexistent/auth.log", "--dry-run"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_lines_requiring_both_substrings() {
    // One substring of each class alone must not be reported.
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "host sudo: alice : TTY=pts/0").unwrap();
    writeln!(temp_file, "host login: session opened for user bob").unwrap();
    temp_file.flush().unwrap();

    authwatch()
        .args([
            "--log-file",
            temp_file.path().to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]").not())
        .stdout(predicate::str::contains("privileged command: 0 match(es)"))
        .stdout(predicate::str::contains("SSH session opened: 0 match(es)"));
}

#[test]
fn test_invalid_contacts_file_is_config_error() {
    let mut log_file = NamedTempFile::new().unwrap();
    writeln!(log_file, "content").unwrap();
    log_file.flush().unwrap();

    let mut contacts = NamedTempFile::new().unwrap();
    write!(contacts, "{{not json").unwrap();
    contacts.flush().unwrap();

    authwatch()
        .args([
            "--log-file",
            log_file.path().to_str().unwrap(),
            "--contacts-file",
            contacts.path().to_str().unwrap(),
            "--account-sid",
            "AC_test",
            "--auth-token",
            "token",
            "--messaging-service-sid",
            "MG_test",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not valid JSON"));
}
