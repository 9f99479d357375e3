use std::process::Command;

const RUN_ENV_VARS: &[&str] = &[
    "PR_NUMBER",
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "LLM_PROVIDER",
    "OPENAI_API_KEY",
    "GOOGLE_API_KEY",
    "MODEL_NAME",
    "TEMPERATURE",
    "VERBOSE",
];

/// Build a kestrel invocation with a scrubbed environment and a temp cwd,
/// so neither ambient CI variables nor a stray .kestrel.toml leak in.
fn kestrel(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kestrel"));
    cmd.current_dir(dir);
    for var in RUN_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn missing_token_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GitHub token"), "stderr was: {stderr}");
}

#[test]
fn missing_pr_number_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args(["--github-token", "ghp_test"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PR number"), "stderr was: {stderr}");
}

#[test]
fn missing_repo_name_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args(["--github-token", "ghp_test", "--pr-number", "1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("repository name"), "stderr was: {stderr}");
}

#[test]
fn malformed_repo_name_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args([
            "--github-token",
            "ghp_test",
            "--pr-number",
            "1",
            "--repo-name",
            "not-a-repo",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid repository name"), "stderr was: {stderr}");
}

#[test]
fn missing_provider_key_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args([
            "--github-token",
            "ghp_test",
            "--pr-number",
            "1",
            "--repo-name",
            "octocat/hello-world",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No API key"), "stderr was: {stderr}");
    assert!(stderr.contains("OPENAI_API_KEY"), "stderr was: {stderr}");
}

#[test]
fn google_provider_requires_google_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args([
            "--github-token",
            "ghp_test",
            "--pr-number",
            "1",
            "--repo-name",
            "octocat/hello-world",
            "--llm-provider",
            "google",
            // Having the other provider's key must not help.
            "--openai-api-key",
            "sk-test",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GOOGLE_API_KEY"), "stderr was: {stderr}");
}

#[test]
fn unknown_provider_is_rejected_at_parse_time() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path())
        .args(["--llm-provider", "anthropic"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported LLM provider"), "stderr was: {stderr}");
}

#[test]
fn help_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kestrel(dir.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--pr-number"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn invalid_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".kestrel.toml"), "{{not toml}}").unwrap();

    let output = kestrel(dir.path()).output().unwrap();
    assert!(!output.status.success());
}
