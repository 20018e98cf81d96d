mod deployer;
mod infrastructure;
mod lifecycle;

pub use deployer::{K8sRunnerError, K8sScenarioRunner};
pub use infrastructure::{
    cluster::{KubeWorkloadCluster, ensure_namespace, namespace_for_run},
    gcloud::GcloudProvisioner,
    pod::pod_from_descriptor,
};
pub use lifecycle::{cleanup::NamespaceCleanup, logs::dump_namespace_logs};
