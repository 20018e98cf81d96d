use kube::Client;
use localssd_core::{
    config::ScenarioConfig,
    scenario::{LocalSsdScenario, ScenarioError, ScenarioOutcome},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    infrastructure::{
        cluster::{KubeWorkloadCluster, ensure_namespace, namespace_for_run},
        gcloud::GcloudProvisioner,
    },
    lifecycle::{cleanup::NamespaceCleanup, logs::dump_namespace_logs},
};

/// Runs the local SSD scenario against the cluster in the current kubeconfig,
/// provisioning through `gcloud`.
#[derive(Clone, Debug)]
pub struct K8sScenarioRunner {
    config: ScenarioConfig,
    provisioner: GcloudProvisioner,
    require_success: bool,
}

#[derive(Debug, thiserror::Error)]
/// High-level runner failures returned to the caller.
pub enum K8sRunnerError {
    #[error("failed to initialise kubernetes client: {source}")]
    ClientInit {
        #[source]
        source: kube::Error,
    },
    #[error("failed to prepare namespace {namespace}: {source}")]
    Namespace {
        namespace: String,
        #[source]
        source: kube::Error,
    },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

impl K8sScenarioRunner {
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            provisioner: GcloudProvisioner::default(),
            require_success: false,
        }
    }

    #[must_use]
    /// Fail as soon as the pod ends in phase `Failed`, before checking output.
    pub const fn require_success(mut self, enabled: bool) -> Self {
        self.require_success = enabled;
        self
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<ScenarioOutcome, K8sRunnerError> {
        if !self.config.provider_supported() {
            warn!(provider = %self.config.provider, "only supported on gke; skipping");
            return Ok(ScenarioOutcome::Skipped {
                provider: self.config.provider.clone(),
            });
        }
        self.config.validate().map_err(ScenarioError::from)?;

        let client = Client::try_default()
            .await
            .map_err(|source| K8sRunnerError::ClientInit { source })?;

        let (namespace, generated) = namespace_for_run(&self.config.namespace_base);
        let created = ensure_namespace(&client, &namespace)
            .await
            .map_err(|source| K8sRunnerError::Namespace {
                namespace: namespace.clone(),
                source,
            })?;
        let preserve = localssd_env::k8s_runner_preserve() || !(generated && created);
        let cleanup = NamespaceCleanup::new(client.clone(), namespace.clone(), preserve);

        info!(
            cluster = %self.config.cluster_name,
            pool = %self.config.pool_name,
            %namespace,
            "starting local SSD scenario"
        );

        let cluster = KubeWorkloadCluster::new(client.clone(), &namespace);
        let result = LocalSsdScenario::new(self.config.clone(), &self.provisioner, &cluster)
            .require_success(self.require_success)
            .run(cancel)
            .await;

        if let Err(err) = &result {
            error!(
                error = %err,
                %namespace,
                "local SSD scenario failed; collecting diagnostics"
            );
            dump_namespace_logs(&client, &namespace).await;
        }

        cleanup.run().await;
        Ok(result?)
    }
}
