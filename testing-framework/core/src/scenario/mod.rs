//! The local SSD write/read scenario: provision a pool, describe a pod pinned
//! to it, run the pod and check what it printed.

mod cluster;
mod descriptor;
mod driver;
mod error;
mod expectation;
mod harness;
mod provision;
mod wait;

pub use cluster::{WorkloadCluster, WorkloadPhase};
pub use descriptor::{NodeLabel, RestartPolicy, VolumeMount, WorkloadDescriptor, build};
pub use driver::{LocalSsdScenario, ScenarioOutcome};
pub use error::ScenarioError;
pub use expectation::{ContainerOutput, OutputExpectation};
pub use harness::{RunOptions, run_and_verify, run_and_verify_with};
pub use provision::{NodePoolProvisioner, PoolRequest, ProvisionError, ProvisionedPool, provision};
pub use wait::wait_for_terminal_phase;

/// Error type collaborators hand back across the trait seams.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
