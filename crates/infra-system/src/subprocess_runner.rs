// Subprocess runner implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{info, warn};

use eclips_core::port::command_runner::{
    CommandRunner, CommandSpec, ExecutionError, ExecutionResult, ExecutionStatus,
};

/// Subprocess runner
/// Runs packaging tools with inherited stdio so their output reaches the user
#[derive(Debug, Default, Clone)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Spawn child process and wait for it to exit
    async fn spawn_and_wait(
        &self,
        spec: &CommandSpec,
    ) -> Result<std::process::ExitStatus, ExecutionError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", spec.program, e)))?;

        child
            .wait()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Build execution result from exit status
    fn build_result(&self, status: std::process::ExitStatus, duration_ms: i64) -> ExecutionResult {
        let execution_status = if status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        ExecutionResult {
            status: execution_status,
            exit_code: status.code(),
            duration_ms,
        }
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult, ExecutionError> {
        let start = Instant::now();

        info!(
            command = %spec,
            working_dir = ?spec.working_dir,
            "Starting subprocess"
        );

        let status = self.spawn_and_wait(spec).await?;
        let duration_ms = start.elapsed().as_millis() as i64;
        let result = self.build_result(status, duration_ms);

        if result.status == ExecutionStatus::Success {
            info!(
                program = %spec.program,
                duration_ms = %duration_ms,
                "Subprocess completed"
            );
        } else {
            warn!(
                program = %spec.program,
                duration_ms = %duration_ms,
                exit_code = ?result.exit_code,
                "Subprocess failed"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_success() {
        let runner = SubprocessRunner::new();
        let result = runner.run(&CommandSpec::new("true")).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(result.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let runner = SubprocessRunner::new();
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let result = runner.run(&spec).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_in_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = SubprocessRunner::new();
        let spec = CommandSpec::new("sh")
            .args(["-c", "touch marker"])
            .current_dir(tmp.path());

        runner.run(&spec).await.unwrap();
        assert!(tmp.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = SubprocessRunner::new();
        let result = runner
            .run(&CommandSpec::new("eclips-definitely-not-a-real-program"))
            .await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
    }
}
