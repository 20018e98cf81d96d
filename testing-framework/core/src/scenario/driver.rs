use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{
    NodePoolProvisioner, WorkloadCluster,
    descriptor::build,
    error::ScenarioError,
    expectation::{ContainerOutput, OutputExpectation},
    harness::{RunOptions, run_and_verify_with},
    provision::{PoolRequest, provision},
};
use crate::{
    config::ScenarioConfig,
    constants::{WRITE_READ_PAYLOAD, write_read_command},
};

#[derive(Debug)]
pub enum ScenarioOutcome {
    Passed(ContainerOutput),
    /// The configured provider cannot offer local SSD node pools.
    Skipped { provider: String },
}

impl ScenarioOutcome {
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }
}

/// Write to and read back from a node-local SSD: provision, describe, run,
/// assert. Strictly sequential.
pub struct LocalSsdScenario<'a, P: ?Sized, C: ?Sized> {
    config: ScenarioConfig,
    provisioner: &'a P,
    cluster: &'a C,
    require_success: bool,
}

impl<'a, P, C> LocalSsdScenario<'a, P, C>
where
    P: NodePoolProvisioner + ?Sized,
    C: WorkloadCluster + ?Sized,
{
    #[must_use]
    pub const fn new(config: ScenarioConfig, provisioner: &'a P, cluster: &'a C) -> Self {
        Self {
            config,
            provisioner,
            cluster,
            require_success: false,
        }
    }

    #[must_use]
    pub const fn require_success(mut self, enabled: bool) -> Self {
        self.require_success = enabled;
        self
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<ScenarioOutcome, ScenarioError> {
        if !self.config.provider_supported() {
            warn!(
                provider = %self.config.provider,
                "local SSD scenario only runs on gke; skipping"
            );
            return Ok(ScenarioOutcome::Skipped {
                provider: self.config.provider.clone(),
            });
        }
        self.config.validate()?;

        info!(
            cluster = %self.config.cluster_name,
            pool = %self.config.pool_name,
            "start local SSD test"
        );

        let pool = provision(self.provisioner, &PoolRequest::from_config(&self.config)).await?;

        let descriptor = build(&write_read_command());
        if !descriptor.schedulable_on(&pool.node_label) {
            warn!(
                workload = descriptor.name(),
                pool = %pool.name,
                "workload placement does not match the provisioned pool"
            );
            return Err(ScenarioError::PlacementDrift {
                name: descriptor.name().to_owned(),
                pool: pool.name,
                required: descriptor
                    .node_selector()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
                advertised: pool.node_label,
            });
        }

        let options = RunOptions::new(self.config.wait)
            .require_success(self.require_success)
            .with_cancellation(cancel);
        let expectation = OutputExpectation::new([WRITE_READ_PAYLOAD]);

        let output =
            run_and_verify_with(self.cluster, &descriptor, &expectation, &options).await?;

        info!(workload = %output.name, phase = %output.phase, "local SSD test passed");
        Ok(ScenarioOutcome::Passed(output))
    }
}
