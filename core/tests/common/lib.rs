#![expect(clippy::expect_used)]

use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use mql_core::COMPILATION_LOG_FILE_NAME;
use mql_core::exec::ProcessExit;
use mql_core::exec::ProcessRunner;
use tokio::sync::Mutex;


/// Encodes `text` the way MetaEditor writes its log: UTF-16LE with a BOM.
pub fn metaeditor_log_bytes(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xff, 0xfe];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

/// A typical successful MetaEditor log.
pub fn sample_log(file_name: &str) -> String {
    format!(
        "{file_name} : information: compiling '{file_name}'\r\n\
         {file_name} : information: code generated\r\n\
         Result: 0 errors, 0 warnings, 812 msec elapsed\r\n"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLaunch {
    pub command: String,
    pub cwd: PathBuf,
    /// Size of `mqlcompile.log` at the moment of launch.
    pub log_len_at_launch: Option<u64>,
}

/// Stands in for Wine + MetaEditor: records each launch, writes `log_text`
/// to `mqlcompile.log` in the working directory, and exits with a non-zero
/// code like Wine does.
pub struct FakeMetaEditor {
    log_text: Option<String>,
    exit_code: i32,
    launches: Mutex<Vec<RecordedLaunch>>,
}

impl FakeMetaEditor {
    pub fn writing(log_text: impl Into<String>) -> Self {
        Self {
            log_text: Some(log_text.into()),
            exit_code: 1,
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Deletes the log instead of writing it.
    pub fn removing_log() -> Self {
        Self {
            log_text: None,
            exit_code: 1,
            launches: Mutex::new(Vec::new()),
        }
    }

    pub async fn launches(&self) -> Vec<RecordedLaunch> {
        self.launches.lock().await.clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeMetaEditor {
    async fn run(&self, command: &str, cwd: &Path) -> io::Result<ProcessExit> {
        let log_path = cwd.join(COMPILATION_LOG_FILE_NAME);
        let log_len_at_launch = tokio::fs::metadata(&log_path).await.ok().map(|m| m.len());
        self.launches.lock().await.push(RecordedLaunch {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            log_len_at_launch,
        });

        match &self.log_text {
            Some(text) => tokio::fs::write(&log_path, metaeditor_log_bytes(text)).await?,
            None => tokio::fs::remove_file(&log_path).await?,
        }

        Ok(ProcessExit {
            exit_code: Some(self.exit_code),
            duration: Duration::from_millis(5),
        })
    }
}

/// Panics if `path` cannot be read; handy for asserting on fixtures.
pub fn read_utf16_fixture(path: &Path) -> String {
    let bytes = std::fs::read(path).expect("read fixture");
    mql_core::compile_log::decode_utf16le(&bytes)
}
