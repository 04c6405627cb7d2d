//! Reload signaling for the dependent telldusd daemon.
//!
//! The daemon re-reads tellstick.conf only on startup, so after a rewrite
//! it is sent SIGTERM and the process supervisor restarts it. Delivery
//! failure is never fatal; the engine retries on a later cycle.

use crate::error::{CloudSyncError, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

/// Seam for the reload side effect, so tests can count or fail signals.
#[async_trait]
pub trait ReloadNotifier: Send + Sync {
    async fn notify_reload(&self) -> Result<()>;
}

/// Signals the daemon via `pkill -TERM <process>`.
pub struct TelldusdNotifier {
    process_name: String,
}

impl TelldusdNotifier {
    pub fn new(process_name: impl Into<String>) -> Self {
        TelldusdNotifier {
            process_name: process_name.into(),
        }
    }
}

#[async_trait]
impl ReloadNotifier for TelldusdNotifier {
    async fn notify_reload(&self) -> Result<()> {
        info!("Signaling {} restart", self.process_name);

        let output = Command::new("pkill")
            .arg("-TERM")
            .arg(&self.process_name)
            .output()
            .await
            .map_err(|e| CloudSyncError::Notify(format!("failed to run pkill: {}", e)))?;

        if output.status.success() {
            info!("Signaled {} to restart", self.process_name);
            Ok(())
        } else {
            // Exit code 1 means no matching process was running
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CloudSyncError::Notify(format!(
                "pkill exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// No-op notifier for tests and dry runs.
pub struct NoopNotifier;

#[async_trait]
impl ReloadNotifier for NoopNotifier {
    async fn notify_reload(&self) -> Result<()> {
        Ok(())
    }
}
