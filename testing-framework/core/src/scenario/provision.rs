use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{descriptor::NodeLabel, error::ScenarioError};
use crate::config::{ConfigError, ScenarioConfig};

/// Request for a node pool whose members each carry `device_count` local
/// SSDs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolRequest {
    pub pool_name: String,
    pub cluster_name: String,
    pub device_count: u32,
}

impl PoolRequest {
    #[must_use]
    pub fn new(
        pool_name: impl Into<String>,
        cluster_name: impl Into<String>,
        device_count: u32,
    ) -> Self {
        Self {
            pool_name: pool_name.into(),
            cluster_name: cluster_name.into(),
            device_count,
        }
    }

    #[must_use]
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self::new(
            config.pool_name.clone(),
            config.cluster_name.clone(),
            config.local_ssd_count,
        )
    }
}

/// Failures reported by a [`NodePoolProvisioner`].
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with status {status:?}\n{output}")]
    Failed {
        command: String,
        status: Option<i32>,
        output: String,
    },
}

/// Creates node pools with locally attached SSDs.
#[async_trait]
pub trait NodePoolProvisioner: Send + Sync {
    /// Blocks until the pool exists. Returns the tool's combined output.
    async fn create_pool_with_local_devices(
        &self,
        request: &PoolRequest,
    ) -> Result<String, ProvisionError>;

    /// Label carried by every node of pools this provisioner creates.
    fn node_label(&self) -> NodeLabel {
        NodeLabel::local_ssd()
    }
}

/// A pool that was created successfully, along with the label its nodes
/// advertise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionedPool {
    pub name: String,
    pub node_label: NodeLabel,
}

/// Create the pool described by `request`. Any failure is fatal to the
/// scenario; nothing is retried or cleaned up here.
pub async fn provision<P>(
    provisioner: &P,
    request: &PoolRequest,
) -> Result<ProvisionedPool, ScenarioError>
where
    P: NodePoolProvisioner + ?Sized,
{
    if request.pool_name.trim().is_empty() {
        return Err(ConfigError::EmptyPoolName.into());
    }

    info!(
        pool = %request.pool_name,
        cluster = %request.cluster_name,
        local_ssd_count = request.device_count,
        "creating node pool with local SSDs"
    );

    let output = provisioner
        .create_pool_with_local_devices(request)
        .await
        .map_err(|source| ScenarioError::Provisioning {
            pool: request.pool_name.clone(),
            source,
        })?;

    let node_label = provisioner.node_label();
    info!(
        pool = %request.pool_name,
        label_key = %node_label.key,
        label_value = %node_label.value,
        "successfully created node pool:\n{output}"
    );

    Ok(ProvisionedPool {
        name: request.pool_name.clone(),
        node_label,
    })
}
