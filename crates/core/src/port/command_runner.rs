// Command Runner Port
// Abstraction for running the external packaging tools

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// External command to run to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of running a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the command with inherited stdio
/// - RecordingRunner: records commands without spawning (tests)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to exit
    ///
    /// A non-zero exit is reported as `ExecutionStatus::Failed`, not as an error.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the program cannot be started
    /// - ExecutionError::IoError if waiting on the process fails
    async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    type SideEffect = Box<dyn Fn(&CommandSpec) + Send + Sync>;

    /// Mock runner behavior for a given program
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with code 0
        Success,
        /// Exit with the given non-zero code
        ExitCode(i32),
        /// Fail to spawn
        SpawnFail(String),
    }

    /// Records every command instead of running it
    pub struct RecordingRunner {
        calls: Arc<Mutex<Vec<CommandSpec>>>,
        behaviors: Mutex<Vec<(String, MockBehavior)>>,
        side_effect: Option<SideEffect>,
    }

    impl RecordingRunner {
        /// Every command succeeds
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                behaviors: Mutex::new(Vec::new()),
                side_effect: None,
            }
        }

        /// Override the behavior of commands whose program equals `program`
        pub fn with_behavior(self, program: impl Into<String>, behavior: MockBehavior) -> Self {
            self.behaviors
                .lock()
                .unwrap()
                .push((program.into(), behavior));
            self
        }

        /// Run `effect` for every successful command (e.g. create the artifact)
        pub fn with_side_effect(
            mut self,
            effect: impl Fn(&CommandSpec) + Send + Sync + 'static,
        ) -> Self {
            self.side_effect = Some(Box::new(effect));
            self
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }

        fn behavior_for(&self, program: &str) -> MockBehavior {
            self.behaviors
                .lock()
                .unwrap()
                .iter()
                .find(|(p, _)| p == program)
                .map(|(_, b)| b.clone())
                .unwrap_or(MockBehavior::Success)
        }
    }

    impl Default for RecordingRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult, ExecutionError> {
            self.calls.lock().unwrap().push(spec.clone());

            match self.behavior_for(&spec.program) {
                MockBehavior::Success => {
                    if let Some(effect) = &self.side_effect {
                        effect(spec);
                    }
                    Ok(ExecutionResult {
                        status: ExecutionStatus::Success,
                        exit_code: Some(0),
                        duration_ms: 1,
                    })
                }
                MockBehavior::ExitCode(code) => Ok(ExecutionResult {
                    status: ExecutionStatus::Failed,
                    exit_code: Some(code),
                    duration_ms: 1,
                }),
                MockBehavior::SpawnFail(msg) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }
    }
}
