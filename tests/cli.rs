use assert_cmd::Command;

#[test]
fn help_lists_pipeline_subcommands() {
    let mut cmd = Command::cargo_bin("qa-engine").unwrap();
    let assert = cmd.arg("--help").assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for subcommand in ["crawl", "plan", "execute", "run", "coverage"] {
        assert!(output.contains(subcommand), "expected --help to mention `{subcommand}`");
    }
}

#[test]
fn coverage_show_on_a_fresh_workspace_reports_zero_coverage() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("qa.config.json");
    std::fs::write(&config_path, r#"{"target_url": "https://example.test"}"#).unwrap();

    let mut cmd = Command::cargo_bin("qa-engine").unwrap();
    cmd.current_dir(dir.path());
    cmd.args(["--config", config_path.to_str().unwrap(), "coverage", "show"]);
    cmd.assert().success();
}
