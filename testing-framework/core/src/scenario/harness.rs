use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    WorkloadCluster, WorkloadDescriptor, WorkloadPhase,
    error::ScenarioError,
    expectation::{ContainerOutput, OutputExpectation},
    wait::wait_for_terminal_phase,
};
use crate::config::PollSettings;

/// Knobs for a single submit/wait/verify cycle.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub wait: PollSettings,
    /// Treat a `Failed` terminal phase as fatal before looking at output.
    pub require_success: bool,
    pub cancel: CancellationToken,
}

impl RunOptions {
    #[must_use]
    pub fn new(wait: PollSettings) -> Self {
        Self {
            wait,
            require_success: false,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn require_success(mut self, enabled: bool) -> Self {
        self.require_success = enabled;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(PollSettings::default())
    }
}

/// Submit `descriptor`, wait for it to finish and check its stdout contains
/// `expected_lines` in order.
pub async fn run_and_verify<C>(
    cluster: &C,
    descriptor: &WorkloadDescriptor,
    expected_lines: &[&str],
) -> Result<ContainerOutput, ScenarioError>
where
    C: WorkloadCluster + ?Sized,
{
    run_and_verify_with(
        cluster,
        descriptor,
        &OutputExpectation::new(expected_lines.iter().copied()),
        &RunOptions::default(),
    )
    .await
}

pub async fn run_and_verify_with<C>(
    cluster: &C,
    descriptor: &WorkloadDescriptor,
    expectation: &OutputExpectation,
    options: &RunOptions,
) -> Result<ContainerOutput, ScenarioError>
where
    C: WorkloadCluster + ?Sized,
{
    let name = descriptor.name();
    info!(
        workload = name,
        image = descriptor.image(),
        node_selector = ?descriptor.node_selector(),
        "submitting workload"
    );
    debug!(
        workload = name,
        descriptor = %serde_json::to_string(descriptor).unwrap_or_default(),
        "workload descriptor"
    );

    cluster
        .submit(descriptor)
        .await
        .map_err(|source| ScenarioError::cluster("submit", name, source))?;

    let output = verify_submitted(cluster, descriptor, expectation, options).await?;

    // Failed runs keep the workload around for diagnostics.
    if let Err(err) = cluster.delete(name).await {
        warn!(workload = name, error = ?err, "failed to delete workload");
    }

    Ok(output)
}

async fn verify_submitted<C>(
    cluster: &C,
    descriptor: &WorkloadDescriptor,
    expectation: &OutputExpectation,
    options: &RunOptions,
) -> Result<ContainerOutput, ScenarioError>
where
    C: WorkloadCluster + ?Sized,
{
    let name = descriptor.name();
    let phase = wait_for_terminal_phase(cluster, name, options.wait, &options.cancel).await?;

    let stdout = cluster
        .container_output(name, descriptor.container_name())
        .await
        .map_err(|source| ScenarioError::cluster("log retrieval", name, source))?;
    let output = ContainerOutput {
        name: name.to_owned(),
        phase,
        stdout,
    };

    if phase == WorkloadPhase::Failed {
        warn!(
            workload = name,
            output = %output.stdout,
            "workload finished in phase Failed"
        );
        if options.require_success {
            return Err(ScenarioError::WorkloadFailed {
                name: output.name,
                output: output.stdout,
            });
        }
    }

    expectation.evaluate(&output)?;
    info!(
        workload = name,
        lines = expectation.lines().len(),
        "container output matched"
    );

    Ok(output)
}
