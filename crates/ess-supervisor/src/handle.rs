//! Spawns a `DeviceSupervisor` as its own task and gives the owner a
//! bounded-grace shutdown path (§4.C step 3, §5 cancellation semantics).

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::SupervisorError;
use crate::supervisor::{DeviceSupervisor, SupervisorControl};

pub struct SupervisorHandle {
    control: SupervisorControl,
    join: JoinHandle<Result<(), SupervisorError>>,
    finish_timeout: Duration,
}

impl SupervisorHandle {
    pub fn spawn(supervisor: DeviceSupervisor, finish_timeout: Duration) -> Self {
        let control = supervisor.control();
        let join = tokio::spawn(supervisor.run());
        Self { control, join, finish_timeout }
    }

    pub fn control(&self) -> SupervisorControl {
        self.control.clone()
    }

    /// Requests shutdown and waits up to `finish_timeout` for the read loop
    /// to notice, clean up, and exit before hard-cancelling the task.
    pub async fn shutdown(self) -> Result<(), SupervisorError> {
        self.control.request_shutdown();
        let abort_handle = self.join.abort_handle();
        match tokio::time::timeout(self.finish_timeout, self.join).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                tracing::error!(error = %join_error, "supervisor task panicked");
                Ok(())
            }
            Err(_) => {
                tracing::warn!("supervisor task exceeded the telemetry-loop-finish-timeout; hard-cancelling");
                abort_handle.abort();
                Ok(())
            }
        }
    }
}
