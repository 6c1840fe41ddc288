use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `ytsum` isolated from the user's config, `.env` and API keys
fn ytsum(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ytsum").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("GOOGLE_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn summary_types_lists_all_four() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .arg("summary-types")
        .assert()
        .success()
        .stdout(predicate::str::contains("bullet-points"))
        .stdout(predicate::str::contains("detailed"))
        .stdout(predicate::str::contains("key-insights"))
        .stdout(predicate::str::contains("timeline"))
        .stdout(predicate::str::contains("~500 words"));
}

#[test]
fn analyze_rejects_invalid_url() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .env("GOOGLE_API_KEY", "dummy")
        .args(["analyze", "not a url", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid YouTube URL"));
}

#[test]
fn analyze_requires_api_key() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .args(["analyze", "https://youtu.be/dQw4w9WgXcQ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
}

#[test]
fn batch_without_urls_fails() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .env("GOOGLE_API_KEY", "dummy")
        .args(["batch", "--file", "-"])
        .write_stdin("\n   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No URLs given"));
}

#[test]
fn batch_of_invalid_urls_reports_each_failure() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .env("GOOGLE_API_KEY", "dummy")
        .args(["batch", "not a url", "https://youtu.be/short", "-f", "json", "-q"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error_kind\": \"invalid_url\"").count(2))
        .stderr(predicate::str::contains("All 2 videos failed"));
}

#[test]
fn config_is_created_on_first_run() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemma-3-27b-it"));

    assert!(home
        .path()
        .join(".config")
        .join("yt-summarizer")
        .join("config.yaml")
        .exists());
}

#[test]
fn local_config_file_wins() {
    let home = TempDir::new().unwrap();
    fs_err::write(
        home.path().join("config.yaml"),
        "generation:\n  model: local-test-model\n",
    )
    .unwrap();

    ytsum(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local-test-model"));
}

#[test]
fn batch_save_writes_default_export_file() {
    let home = TempDir::new().unwrap();
    ytsum(&home)
        .env("GOOGLE_API_KEY", "dummy")
        .args(["batch", "not a url", "https://youtu.be/short", "--save", "-f", "json", "-q"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("batch_results.json"));

    let written = fs_err::read_to_string(home.path().join("batch_results.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[0]["status"], "failed");
    assert_eq!(records[1]["error_kind"], "invalid_url");
}
