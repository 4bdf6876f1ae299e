//! Status sources.
//!
//! The real source runs `wg show all dump`. The static source returns fixed
//! output and stands in for `wg` in tests.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors that can occur while fetching the status dump.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },
    /// The program exited unsuccessfully.
    #[error("{program} exited with {code:?}: {stderr}")]
    Status {
        /// Program that was run.
        program: String,
        /// Exit code, `None` if killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },
    /// The program ran past the configured timeout.
    #[error("{program} did not finish within {timeout:?}")]
    Timeout {
        /// Program that was run.
        program: String,
        /// Timeout that expired.
        timeout: Duration,
    },
    /// Standard output was not valid UTF-8.
    #[error("{program} printed non UTF-8 output: {source}")]
    Utf8 {
        /// Program that was run.
        program: String,
        /// Underlying decoding error.
        source: std::string::FromUtf8Error,
    },
}

/// Trait for status dump providers.
///
/// Implementations must be cheap to share between concurrent scrapes.
pub trait StatusSource: Send + Sync + 'static {
    /// Returns the raw dump text.
    fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Runs the `wg` binary and captures its standard output.
#[derive(Debug, Clone)]
pub struct WgCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for WgCommand {
    fn default() -> Self {
        Self {
            program: "wg".to_string(),
            args: vec!["show".into(), "all".into(), "dump".into()],
            timeout: Duration::from_secs(5),
        }
    }
}

impl WgCommand {
    /// Creates a source running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Upper bound on a single invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl StatusSource for WgCommand {
    async fn fetch(&self) -> Result<String, FetchError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FetchError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Status {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|source| FetchError::Utf8 {
            program: self.program.clone(),
            source,
        })
    }
}

/// Source returning a fixed dump, or failing if constructed with
/// [`StaticStatus::failing`].
#[derive(Debug, Clone, Default)]
pub struct StaticStatus {
    output: Option<String>,
}

impl StaticStatus {
    /// A source whose every fetch returns `output`.
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
        }
    }

    /// A source whose every fetch fails as if the binary exited with 1.
    pub fn failing() -> Self {
        Self { output: None }
    }
}

impl StatusSource for StaticStatus {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.output.clone().ok_or_else(|| FetchError::Status {
            program: "static".to_string(),
            code: Some(1),
            stderr: "no output configured".to_string(),
        })
    }
}
