use std::time::Duration;

use thiserror::Error;

use super::{DynError, WorkloadPhase, descriptor::NodeLabel, provision::ProvisionError};
use crate::config::ConfigError;

/// Scenario-fatal failures. None of these are recovered locally.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to create node pool {pool}: {source}")]
    Provisioning {
        pool: String,
        #[source]
        source: ProvisionError,
    },
    #[error(
        "workload {name} does not target pool {pool}: requires {required:?}, pool advertises {}={}",
        .advertised.key,
        .advertised.value
    )]
    PlacementDrift {
        name: String,
        pool: String,
        required: Vec<(String, String)>,
        advertised: NodeLabel,
    },
    #[error("workload {name} did not reach a terminal phase within {timeout:?} (last phase: {last_phase})")]
    SchedulingTimeout {
        name: String,
        timeout: Duration,
        last_phase: WorkloadPhase,
    },
    #[error("wait for workload {name} was cancelled (last phase: {last_phase})")]
    Cancelled {
        name: String,
        last_phase: WorkloadPhase,
    },
    #[error("workload {name} finished in phase Failed\noutput:\n{output}")]
    WorkloadFailed { name: String, output: String },
    #[error(
        "expected {expected:?} in container output of {name}\nexpected lines:\n{}\nactual output:\n{actual}",
        .expected.join("\n")
    )]
    OutputMismatch {
        name: String,
        expected: Vec<String>,
        actual: String,
    },
    #[error("cluster {operation} failed for workload {name}: {source}")]
    Cluster {
        operation: &'static str,
        name: String,
        #[source]
        source: DynError,
    },
}

impl ScenarioError {
    pub(crate) fn cluster(operation: &'static str, name: &str, source: DynError) -> Self {
        Self::Cluster {
            operation,
            name: name.to_owned(),
            source,
        }
    }
}
