use std::path::PathBuf;

use core_test_support::sample_log;
use core_test_support::toolchain::FakeToolchain;
use mql_core::HostPlatform;
use mql_core::compile_file;
use mql_core::config::Config;
use mql_core::config::ConfigOverrides;
use mql_core::config::ConfigToml;
use mql_core::exec::ShellProcessRunner;
use mql_core::sink::Transcript;
use pretty_assertions::assert_eq;

fn linux_config(tc: &FakeToolchain, retain: bool) -> Config {
    Config::load_from_base_config_with_overrides(
        ConfigToml {
            wine_path: Some(tc.wine.clone()),
            metaeditor5_path: Some(tc.metaeditor.clone()),
            retain_compilation_log_file: Some(retain),
            ..Default::default()
        },
        ConfigOverrides::default(),
        PathBuf::from("/unused"),
    )
}

#[tokio::test]
async fn wine_failure_exit_still_surfaces_the_log() -> anyhow::Result<()> {
    let tc = FakeToolchain::new();
    let source = tc.source("Breakout.mq5");
    let log_text = sample_log("Breakout.mq5");
    tc.wine_writes_log(&log_text, 1);
    let config = linux_config(&tc, false);
    let mut sink = Transcript::new();
    let mut notices = Transcript::new();

    let outcome = compile_file(
        Some(&source),
        HostPlatform::Linux,
        &config,
        &ShellProcessRunner,
        &mut sink,
        &mut notices,
    )
    .await;

    assert!(outcome.is_completed());
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.log, Some(format!("\u{feff}{log_text}")));
    assert!(!tc.log_path().exists());

    // Paths with spaces reach Wine as single arguments.
    let args = std::fs::read_to_string(tc.source_dir.join("wine-args.txt"))?;
    let metaeditor = tc.metaeditor.to_string_lossy();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec![
            &*metaeditor,
            "/compile:Breakout.mq5",
            "/log:mqlcompile.log",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn retained_log_is_left_for_the_user() -> anyhow::Result<()> {
    let tc = FakeToolchain::new();
    let source = tc.source("Grid.mq5");
    tc.wine_writes_log("Result: 1 errors, 0 warnings\r\n", 0);
    let config = linux_config(&tc, true);
    let mut sink = Transcript::new();
    let mut notices = Transcript::new();

    let outcome = compile_file(
        Some(&source),
        HostPlatform::Linux,
        &config,
        &ShellProcessRunner,
        &mut sink,
        &mut notices,
    )
    .await;

    assert!(outcome.is_completed());
    assert!(outcome.log_retained);
    assert_eq!(
        core_test_support::read_utf16_fixture(&tc.log_path()),
        "\u{feff}Result: 1 errors, 0 warnings\r\n"
    );
    assert_eq!(
        sink.log_lines().last().copied(),
        Some("\u{feff}Result: 1 errors, 0 warnings\r\n")
    );
    Ok(())
}
