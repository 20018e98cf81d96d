use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::{
    api::core::v1::{Namespace, Pod},
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use kube::{
    Api, Client,
    api::{DeleteParams, LogParams, PostParams},
};
use localssd_core::scenario::{DynError, WorkloadCluster, WorkloadDescriptor, WorkloadPhase};
use tracing::{debug, info};
use uuid::Uuid;

use super::pod::{MANAGED_BY_LABEL, MANAGED_BY_VALUE, pod_from_descriptor};

/// Label enforcing the pod security level; hostPath volumes need `privileged`.
const POD_SECURITY_ENFORCE_LABEL: &str = "pod-security.kubernetes.io/enforce";
const POD_SECURITY_LEVEL: &str = "privileged";

/// Pods in one namespace, driven through the Kubernetes API.
#[derive(Clone)]
pub struct KubeWorkloadCluster {
    pods: Api<Pod>,
    namespace: String,
}

impl KubeWorkloadCluster {
    #[must_use]
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            pods: Api::namespaced(client, namespace),
            namespace: namespace.to_owned(),
        }
    }
}

#[async_trait]
impl WorkloadCluster for KubeWorkloadCluster {
    async fn submit(&self, descriptor: &WorkloadDescriptor) -> Result<(), DynError> {
        let pod = pod_from_descriptor(descriptor, &self.namespace);
        self.pods.create(&PostParams::default(), &pod).await?;
        info!(pod = descriptor.name(), namespace = %self.namespace, "pod created");
        Ok(())
    }

    async fn phase(&self, name: &str) -> Result<WorkloadPhase, DynError> {
        let pod = self.pods.get(name).await?;
        let phase = pod.status.as_ref().and_then(|status| status.phase.as_deref());
        debug!(pod = name, ?phase, "polled pod phase");
        Ok(WorkloadPhase::from_pod_phase(phase))
    }

    async fn container_output(&self, name: &str, container: &str) -> Result<String, DynError> {
        let params = LogParams {
            container: Some(container.to_owned()),
            follow: false,
            ..Default::default()
        };
        Ok(self.pods.logs(name, &params).await?)
    }

    async fn delete(&self, name: &str) -> Result<(), DynError> {
        self.pods.delete(name, &DeleteParams::default()).await?;
        info!(pod = name, namespace = %self.namespace, "pod delete requested");
        Ok(())
    }
}

/// Namespace for this run and whether the runner generated it.
///
/// `K8S_RUNNER_NAMESPACE` pins an existing namespace; otherwise a fresh
/// `<base>-<uuid>` is used.
#[must_use]
pub fn namespace_for_run(base: &str) -> (String, bool) {
    if let Some(namespace) = localssd_env::k8s_runner_namespace() {
        return (namespace, false);
    }

    let run_id = Uuid::new_v4().simple().to_string();
    (format!("{base}-{run_id}"), true)
}

/// Create `namespace` with privileged pod security. Returns `false` when it
/// already existed.
pub async fn ensure_namespace(client: &Client, namespace: &str) -> Result<bool, kube::Error> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let object = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_owned()),
            labels: Some(BTreeMap::from([
                (
                    POD_SECURITY_ENFORCE_LABEL.to_owned(),
                    POD_SECURITY_LEVEL.to_owned(),
                ),
                (MANAGED_BY_LABEL.to_owned(), MANAGED_BY_VALUE.to_owned()),
            ])),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &object).await {
        Ok(_) => {
            info!(namespace, "created namespace");
            Ok(true)
        }
        Err(kube::Error::Api(response)) if response.code == 409 => {
            info!(namespace, "namespace already exists; reusing it");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
