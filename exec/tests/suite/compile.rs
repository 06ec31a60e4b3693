#![cfg(unix)]

use core_test_support::sample_log;
use core_test_support::test_mql_exec::test_mql_exec;
use core_test_support::toolchain::FakeToolchain;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn compiles_and_prints_the_log() -> anyhow::Result<()> {
    let test = test_mql_exec();
    let tc = FakeToolchain::new();
    let source = tc.source("Breakout.mq5");
    tc.wine_writes_log(&sample_log("Breakout.mq5"), 1);

    test.cmd()
        .args(["--platform", "linux", "--color", "never", "--wine"])
        .arg(&tc.wine)
        .arg("--metaeditor5")
        .arg(&tc.metaeditor)
        .arg(&source)
        .assert()
        .success()
        .stdout(contains("Compiling \"Breakout.mq5\" in directory:"))
        .stdout(contains("/compile:\"Breakout.mq5\" /log:\"mqlcompile.log\""))
        .stdout(contains("Result: 0 errors, 0 warnings"))
        .stderr(contains("Compilation completed. Check the log for details."))
        .stderr(contains("compile finished in"));

    assert!(!tc.log_path().exists());
    Ok(())
}

#[test]
fn missing_file_argument_exits_non_zero() {
    test_mql_exec()
        .cmd()
        .args(["--color", "never"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("No active editor window"));
}

#[test]
fn missing_file_ignores_broken_config() {
    let test = test_mql_exec();
    test.write_config("wine_path = ");

    test.cmd()
        .args(["--color", "never"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("No active editor window"))
        .stderr(contains("failed to parse config").not());
}

#[test]
fn unsupported_extension_exits_non_zero() {
    let tc = FakeToolchain::new();
    let header = tc.source("Defines.mqh");

    test_mql_exec()
        .cmd()
        .args(["--platform", "linux", "--color", "never"])
        .arg(&header)
        .assert()
        .code(1)
        .stderr(contains("MQL compilation only supports .mq4 and .mq5 files"))
        .stderr(contains("compile aborted"));
    assert!(!tc.log_path().exists());
}

#[test]
fn unconfigured_wine_aborts_on_linux() {
    let tc = FakeToolchain::new();
    let source = tc.source("Grid.mq4");

    test_mql_exec()
        .cmd()
        .args(["--platform", "linux", "--color", "never", "--metaeditor4"])
        .arg(&tc.metaeditor)
        .arg(&source)
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains(
            "Wine path is not configured in the settings. \
             Compilation cannot proceed without Wine on macOS or Linux.",
        ));
}

#[test]
fn windows_ignores_wine_setting() -> anyhow::Result<()> {
    let tc = FakeToolchain::new();
    let source = tc.source("Grid.mq4");
    // No Wine on Windows: MetaEditor itself is launched through the shell.
    let metaeditor = tc.root().join("metaeditor.sh");
    std::fs::write(&metaeditor, "#!/bin/sh\nexit 0\n")?;
    core_test_support::toolchain::make_executable(&metaeditor);

    test_mql_exec()
        .cmd()
        .args(["--platform", "windows", "--color", "never", "--wine"])
        .arg(tc.root().join("no-such-wine"))
        .arg("--metaeditor4")
        .arg(&metaeditor)
        .arg(&source)
        .assert()
        .success()
        .stdout(contains("Command: \"").and(contains("no-such-wine").not()));
    Ok(())
}

#[test]
fn retain_flag_keeps_the_log() {
    let tc = FakeToolchain::new();
    let source = tc.source("Breakout.mq5");
    tc.wine_writes_log("Result: 2 errors, 0 warnings\r\n", 1);

    test_mql_exec()
        .cmd()
        .args(["--platform", "linux", "--color", "never", "--retain-log", "--wine"])
        .arg(&tc.wine)
        .arg("--metaeditor5")
        .arg(&tc.metaeditor)
        .arg(&source)
        .assert()
        // Compiler errors live in the log; the run itself succeeded.
        .success()
        .stdout(contains("Result: 2 errors, 0 warnings"))
        .stderr(contains("log kept at"));

    assert!(tc.log_path().exists());
}
