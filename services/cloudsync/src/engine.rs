//! Fetch-compare-act reconciliation engine.
//!
//! One cycle: fetch the cloud device list, load the on-disk baseline,
//! decide whether a meaningful change occurred, and only then rewrite the
//! conf file and signal a reload. Cycles are independent; the conf file is
//! the only state carried between them, except for a pending-reload flag
//! covering the "write succeeded, notify did not" gap.

use crate::cloud::DeviceSource;
use crate::error::{CloudSyncError, Result};
use crate::notify::ReloadNotifier;
use std::collections::HashMap;
use std::path::PathBuf;
use tellstick_conf::{read_config, write_config, Device};
use tracing::{debug, info, warn};

/// What a completed cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Cloud and local state already match
    Unchanged,
    /// Conf file rewritten from cloud state
    Updated { device_count: usize },
}

pub struct SyncEngine {
    source: Box<dyn DeviceSource>,
    notifier: Box<dyn ReloadNotifier>,
    conf_path: PathBuf,
    /// A write landed but its reload signal has not been delivered yet.
    /// Retried on later cycles even when no diff is found. In-process
    /// only: a crash between write and notify still loses the reload.
    reload_pending: bool,
}

impl SyncEngine {
    pub fn new(
        source: Box<dyn DeviceSource>,
        notifier: Box<dyn ReloadNotifier>,
        conf_path: PathBuf,
    ) -> Self {
        SyncEngine {
            source,
            notifier,
            conf_path,
            reload_pending: false,
        }
    }

    /// Run a single fetch-compare-act cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        debug!("Fetching devices from Telldus Live");
        let cloud_devices = self.source.list_devices().await?;
        info!("Found {} devices in cloud", cloud_devices.len());

        // Cloud is the source of truth; a lost baseline only costs one
        // extra rewrite.
        let baseline = match read_config(&self.conf_path) {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Could not read existing conf, treating baseline as empty: {}", e);
                Vec::new()
            },
        };
        debug!("Current conf has {} devices", baseline.len());

        if update_required(&cloud_devices, &baseline) {
            write_config(&cloud_devices, &self.conf_path)
                .map_err(|e| CloudSyncError::ConfWrite(e.to_string()))?;
            info!(
                "Generated {} with {} devices",
                self.conf_path.display(),
                cloud_devices.len()
            );
            self.reload_pending = true;
            self.try_notify().await;
            Ok(CycleOutcome::Updated {
                device_count: cloud_devices.len(),
            })
        } else {
            debug!("No changes detected");
            if self.reload_pending {
                self.try_notify().await;
            }
            Ok(CycleOutcome::Unchanged)
        }
    }

    /// True while a successful write still awaits its reload signal.
    pub fn reload_pending(&self) -> bool {
        self.reload_pending
    }

    async fn try_notify(&mut self) {
        match self.notifier.notify_reload().await {
            Ok(()) => self.reload_pending = false,
            Err(e) => warn!("Reload signal not delivered, will retry next cycle: {}", e),
        }
    }
}

/// Decide whether the conf file must be regenerated.
///
/// Keyed by device id, not list position; reordering alone never triggers
/// an update. Per-device comparison uses the normalized projection.
pub fn update_required(cloud: &[Device], local: &[Device]) -> bool {
    if cloud.len() != local.len() {
        info!("Device count changed: {} -> {}", local.len(), cloud.len());
        return true;
    }

    let cloud_by_id: HashMap<i64, &Device> = cloud.iter().map(|d| (d.id, d)).collect();
    let local_by_id: HashMap<i64, &Device> = local.iter().map(|d| (d.id, d)).collect();

    if cloud_by_id.len() != local_by_id.len()
        || !cloud_by_id.keys().all(|id| local_by_id.contains_key(id))
    {
        info!("Device ids changed");
        return true;
    }

    for (id, cloud_device) in &cloud_by_id {
        if cloud_device.normalized() != local_by_id[id].normalized() {
            info!("Device {} changed", id);
            return true;
        }
    }

    false
}
