#![cfg(unix)]

use core_test_support::sample_log;
use core_test_support::test_mql_exec::test_mql_exec;
use core_test_support::toolchain::FakeToolchain;
use predicates::str::contains;

fn user_config(tc: &FakeToolchain, retain: bool) -> String {
    format!(
        "wine_path = '{}'\nmetaeditor4_path = '{}'\nretain_compilation_log_file = {retain}\n",
        tc.wine.display(),
        tc.metaeditor.display()
    )
}

#[test]
fn paths_come_from_user_config() {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Scalper.mq4");
    tc.wine_writes_log(&sample_log("Scalper.mq4"), 1);
    test.write_config(&user_config(&tc, false));

    test.cmd()
        .args(["--platform", "linux", "--color", "never"])
        .arg(&source)
        .assert()
        .success()
        .stdout(contains("Result: 0 errors, 0 warnings"));
    assert!(!tc.log_path().exists());
}

#[test]
fn project_config_overrides_user_config() -> anyhow::Result<()> {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Scalper.mq4");
    tc.wine_writes_log(&sample_log("Scalper.mq4"), 1);
    test.write_config(&user_config(&tc, false));
    // `mql.toml` at the root of the tree applies to every source below it.
    std::fs::write(
        tc.root().join("mql.toml"),
        "retain_compilation_log_file = true\n",
    )?;

    test.cmd()
        .args(["--platform", "linux", "--color", "never"])
        .arg(&source)
        .assert()
        .success();
    assert!(tc.log_path().exists());
    Ok(())
}

#[test]
fn dash_c_overrides_file_layers() {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Scalper.mq4");
    tc.wine_writes_log(&sample_log("Scalper.mq4"), 1);
    test.write_config(&user_config(&tc, false));

    test.cmd()
        .args(["-c", "retain_compilation_log_file=true"])
        .args(["--platform", "linux", "--color", "never"])
        .arg(&source)
        .assert()
        .success();
    assert!(tc.log_path().exists());
}

#[test]
fn empty_path_setting_counts_as_unconfigured() {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Scalper.mq4");
    test.write_config(&user_config(&tc, false));

    test.cmd()
        .args(["-c", "metaeditor4_path=''"])
        .args(["--platform", "linux", "--color", "never"])
        .arg(&source)
        .assert()
        .code(1)
        .stderr(contains("MetaEditor 4 path is not configured in the settings."));
}

#[test]
fn malformed_config_names_the_file() {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Scalper.mq4");
    test.write_config("wine_path = [unterminated\n");

    test.cmd()
        .args(["--platform", "linux"])
        .arg(&source)
        .assert()
        .failure()
        .stderr(contains("failed to parse config"))
        .stderr(contains("config.toml"));
}
