//! The real engine: a subprocess speaking the positional CLI protocol.
//!
//! The engine must exit 0 and print exactly one decimal float to stdout.
//! Locating the executable is re-done on every call so a binary compiled
//! after process start is picked up without a restart.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{ComputationEngine, EngineCall, EngineError};
use crate::consts::{DEFAULT_ENGINE_PATH, DEFAULT_ENGINE_TIMEOUT_SECS, DEFAULT_MAX_ENGINE_PROCESSES};

/// How to reach the engine when the compiled binary is absent: a generic
/// source-run tool plus its leading arguments, e.g.
/// `dotnet run --project ./engine --`.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRunner {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Engine configuration, resolved once at startup and injected. No PATH
/// probing happens after construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the compiled engine binary. Preferred when it exists.
    pub binary: PathBuf,
    /// Optional source-run fallback for development environments.
    pub fallback: Option<FallbackRunner>,
    /// Hard wall-clock limit; the child is killed on expiry.
    pub timeout: Duration,
    /// Cap on concurrent engine processes.
    pub max_processes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_ENGINE_PATH),
            fallback: None,
            timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
            max_processes: DEFAULT_MAX_ENGINE_PROCESSES,
        }
    }
}

/// The concrete invocation the locator settled on for one call: program
/// plus prefix arguments, ahead of the category tag and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub prefix: Vec<String>,
}

pub struct SubprocessEngine {
    config: EngineConfig,
    permits: Semaphore,
}

impl SubprocessEngine {
    pub fn new(config: EngineConfig) -> Self {
        let permits = Semaphore::new(config.max_processes);
        Self { config, permits }
    }

    /// Choose binary vs fallback. Never fails: when the binary is missing
    /// and no fallback is configured, the binary path is returned anyway
    /// and the spawn reports the failure.
    pub fn locate(&self) -> EngineCommand {
        if !self.config.binary.exists()
            && let Some(runner) = &self.config.fallback
        {
            return EngineCommand {
                program: runner.program.clone(),
                prefix: runner.args.clone(),
            };
        }
        EngineCommand {
            program: self.config.binary.clone(),
            prefix: Vec::new(),
        }
    }
}

#[async_trait]
impl ComputationEngine for SubprocessEngine {
    async fn evaluate(&self, call: &EngineCall) -> Result<f64, EngineError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EngineError::Spawn("engine limiter closed".to_string()))?;

        let located = self.locate();
        let mut command = Command::new(&located.program);
        command
            .args(&located.prefix)
            .arg(call.tag)
            .args(&call.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Timing out drops the output future; make that kill the child.
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, command.output())
            .await
            .map_err(|_| EngineError::TimedOut(self.config.timeout))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::Unavailable,
                _ => EngineError::Spawn(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let token = stdout.trim();
        token
            .parse::<f64>()
            .map_err(|_| EngineError::Malformed(token.to_string()))
    }
}
