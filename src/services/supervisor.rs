//! Lifecycle of the recognition loop as a subordinate process.
//!
//! The configuration surface does not share memory with the running loop;
//! the only state between them is the binding document, read once at loop
//! startup. This supervisor is the whole contract: start, stop, is it
//! running. Both mutations are idempotent and return without blocking on
//! the child.

use camino::Utf8PathBuf;
use thiserror::Error;
use tokio::process::{Child, Command};

/// Errors from managing the recognition process.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("failed to launch recognition process {program}")]
    Spawn {
        program: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to terminate recognition process")]
    Terminate(#[source] std::io::Error),
}

/// Spawns and terminates the recognition loop process.
///
/// Must be used within a tokio runtime. The child is killed when the
/// supervisor is dropped.
pub struct RecognitionSupervisor {
    program: Utf8PathBuf,
    args: Vec<String>,
    child: Option<Child>,
}

impl RecognitionSupervisor {
    pub fn new<P: Into<Utf8PathBuf>>(program: P, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Spawn the recognition process if it is not already running.
    ///
    /// Returns `Ok(true)` when a process was started, `Ok(false)` when one
    /// was already running (a no-op, not an error).
    pub fn start(&mut self) -> Result<bool, SupervisorError> {
        if self.is_running() {
            tracing::debug!("recognition process already running");
            return Ok(false);
        }

        let child = Command::new(self.program.as_str())
            .args(&self.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::info!(
            "recognition process started (pid {:?})",
            child.id()
        );
        self.child = Some(child);
        Ok(true)
    }

    /// Terminate the recognition process if one is running.
    ///
    /// Returns `Ok(true)` when a process was terminated, `Ok(false)` when
    /// nothing was running. Terminating an already-stopped process is a
    /// no-op.
    pub async fn stop(&mut self) -> Result<bool, SupervisorError> {
        let Some(mut child) = self.child.take() else {
            return Ok(false);
        };

        if let Ok(Some(status)) = child.try_wait() {
            tracing::debug!("recognition process had already exited: {}", status);
            return Ok(false);
        }

        child.kill().await.map_err(SupervisorError::Terminate)?;
        tracing::info!("recognition process terminated");
        Ok(true)
    }

    /// Whether the recognition process is currently alive.
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!("recognition process exited: {}", status);
                    self.child = None;
                    false
                }
                Ok(None) => true,
                Err(err) => {
                    tracing::warn!("could not poll recognition process: {}", err);
                    false
                }
            },
            None => false,
        }
    }
}
