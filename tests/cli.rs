use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pwvault"))
}

fn vault(store: &Path) -> Command {
    let mut cmd = bin();
    cmd.env("PWVAULT_PASSWORD", "pw")
        .env_remove("PWVAULT_PATH")
        .arg("--store")
        .arg(store);
    cmd
}

fn initialized() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let store = dir.path().join("test.pwv");
    vault(&store).arg("init").assert().success();
    (dir, store)
}

#[test]
fn init_creates_store_file() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("test.pwv");

    vault(&store)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("vault initialized"));

    assert!(store.exists());
}

#[test]
fn init_reads_confirmed_password_from_stdin() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("test.pwv");

    bin()
        .env_remove("PWVAULT_PASSWORD")
        .arg("--store")
        .arg(&store)
        .arg("init")
        .write_stdin("piped\npiped\n")
        .assert()
        .success();

    bin()
        .env_remove("PWVAULT_PASSWORD")
        .arg("--store")
        .arg(&store)
        .arg("list")
        .write_stdin("piped\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No passwords found."));
}

#[test]
fn init_rejects_mismatched_confirmation() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("test.pwv");

    bin()
        .env_remove("PWVAULT_PASSWORD")
        .arg("--store")
        .arg(&store)
        .arg("init")
        .write_stdin("one\ntwo\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("passwords do not match"));

    assert!(!store.exists());
}

#[test]
fn init_fails_if_store_exists() {
    let (_dir, store) = initialized();

    vault(&store)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pwvault store already exists"));
}

#[test]
fn actions_fail_if_store_not_exists() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("test.pwv");

    vault(&store)
        .args(["get", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("store does not exist"));
}

#[test]
fn save_and_get_roundtrip() {
    let (_dir, store) = initialized();

    vault(&store)
        .args([
            "save",
            "gmail",
            "--username",
            "user@example.com",
            "--password",
            "Hello, World!",
            "--url",
            "https://mail.google.com",
            "--tags",
            "mail, personal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("password 'gmail' saved"));

    vault(&store)
        .args(["get", "gmail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Password: Hello, World!"))
        .stdout(predicate::str::contains("Username: user@example.com"))
        .stdout(predicate::str::contains("Tags: mail, personal"));

    let raw = std::fs::read(&store).unwrap();
    assert!(!String::from_utf8_lossy(&raw).contains("Hello, World!"));
}

#[test]
fn save_reads_entry_password_from_stdin() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "piped"])
        .write_stdin("from-stdin\n")
        .assert()
        .success();

    vault(&store)
        .args(["find", "piped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Password: from-stdin"));
}

#[test]
fn save_existing_name_updates_entry() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "A", "--password", "B"])
        .assert()
        .success();

    vault(&store)
        .args(["save", "A", "--password", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("password 'A' updated"));

    vault(&store)
        .args(["get", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Password: C"));
}

#[test]
fn save_with_generated_password() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "gen", "--generate", "--length", "24", "--no-symbols"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generated password for 'gen'"));

    vault(&store)
        .args(["get", "gen"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Password: [A-Za-z0-9]{24}\n").unwrap());
}

#[test]
fn wrong_password_fails() {
    let (_dir, store) = initialized();

    bin()
        .env("PWVAULT_PASSWORD", "wrong_pw")
        .arg("--store")
        .arg(&store)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid master password"));
}

#[test]
fn get_unknown_entry_fails() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["get", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password 'ghost' not found"));
}

#[test]
fn get_help_explains_clipboard_ownership() {
    bin()
        .args(["get", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"takes\s+over\s+the\s+clipboard").unwrap());
}

#[test]
fn list_and_search() {
    let (_dir, store) = initialized();

    for (name, user) in [("github", "octo"), ("bank", "me"), ("gitlab", "fox")] {
        vault(&store)
            .args(["save", name, "--username", user, "--password", "pw"])
            .assert()
            .success();
    }

    vault(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 passwords"))
        .stdout(predicate::str::contains("Password:").not());

    vault(&store)
        .args(["search", "GIT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 passwords matching 'GIT'"))
        .stdout(predicate::str::contains("Name: bank").not());

    vault(&store)
        .args(["search", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No passwords found matching 'zzz'."));
}

#[test]
fn delete_entry_works() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "A", "--password", "B"])
        .assert()
        .success();

    vault(&store)
        .args(["delete", "A", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("password 'A' deleted"));

    vault(&store)
        .args(["get", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn delete_can_be_cancelled() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "A", "--password", "B"])
        .assert()
        .success();

    vault(&store)
        .args(["del", "A"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("deletion cancelled"));

    vault(&store).args(["get", "A"]).assert().success();
}

#[test]
fn delete_unknown_entry_fails() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["delete", "A", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password 'A' not found"));
}

#[test]
fn stats_reports_entry_count() {
    let (_dir, store) = initialized();

    vault(&store)
        .args(["save", "A", "--password", "B"])
        .assert()
        .success();

    vault(&store)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total passwords: 1"))
        .stdout(predicate::str::contains("Vault size:"));
}

#[test]
fn generate_does_not_need_a_vault() {
    bin()
        .env_remove("PWVAULT_PASSWORD")
        .args(["generate", "--length", "20"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\S{20}\n$").unwrap());
}

#[test]
fn generate_respects_character_flags() {
    bin()
        .args([
            "gen",
            "--length",
            "32",
            "--no-uppercase",
            "--no-symbols",
            "--no-numbers",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[a-z]{32}\n$").unwrap());
}

#[test]
fn generate_rejects_short_length() {
    bin()
        .args(["generate", "--length", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 8 and 128"));
}

#[test]
fn corrupted_vault_file_is_reported() {
    let (_dir, store) = initialized();
    std::fs::write(&store, b"garbage").unwrap();

    vault(&store)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a pwvault file"));
}
