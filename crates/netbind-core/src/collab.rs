// ── Platform collaborators ──
//
// Narrow contracts for the parts of the compute platform the orchestrator
// talks to besides the network service: the per-instance network-info
// cache and the security-group subsystem.

use async_trait::async_trait;
use tracing::info;

use crate::error::CoreError;
use crate::model::{Instance, NetworkInfo};

/// Per-instance cache of the last built attachment snapshot.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// The cached snapshot, or `None` when nothing was ever stored.
    async fn load_network_info(&self, instance_uuid: &str)
    -> Result<Option<NetworkInfo>, CoreError>;

    async fn save_network_info(
        &self,
        instance_uuid: &str,
        info: &NetworkInfo,
    ) -> Result<(), CoreError>;
}

/// Receives security-group membership changes.
#[async_trait]
pub trait SecurityGroupNotifier: Send + Sync {
    /// Members of `group_ids` changed; rules referencing them need a refresh.
    async fn refresh_members(&self, group_ids: &[String]) -> Result<(), CoreError>;

    /// `instance` joined security group `group_name`.
    async fn instance_added(&self, instance: &Instance, group_name: &str)
    -> Result<(), CoreError>;

    /// `instance` left security group `group_name`.
    async fn instance_removed(
        &self,
        instance: &Instance,
        group_name: &str,
    ) -> Result<(), CoreError>;
}

/// Notifier that only records events in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl SecurityGroupNotifier for LoggingNotifier {
    async fn refresh_members(&self, group_ids: &[String]) -> Result<(), CoreError> {
        info!(?group_ids, "security group members changed");
        Ok(())
    }

    async fn instance_added(
        &self,
        instance: &Instance,
        group_name: &str,
    ) -> Result<(), CoreError> {
        info!(instance = %instance.uuid, group = group_name, "instance added to security group");
        Ok(())
    }

    async fn instance_removed(
        &self,
        instance: &Instance,
        group_name: &str,
    ) -> Result<(), CoreError> {
        info!(instance = %instance.uuid, group = group_name, "instance removed from security group");
        Ok(())
    }
}
