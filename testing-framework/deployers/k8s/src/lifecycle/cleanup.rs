use std::{fmt::Debug, future::Future, time::Duration};

use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, api::DeleteParams};
use localssd_core::{adjust_timeout, config::PollSettings};
use tokio::{
    process::Command,
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

const DELETE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const KUBECTL_DELETE_TIMEOUT: Duration = Duration::from_secs(60);
const TERMINATION_POLL_INTERVAL: Duration = Duration::from_secs(1);
const TERMINATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Deletes the run namespace (and the pod in it) once the scenario is done.
/// The node pool is left alone.
pub struct NamespaceCleanup {
    namespaces: Api<Namespace>,
    namespace: String,
    preserve: bool,
    termination: PollSettings,
}

impl NamespaceCleanup {
    /// `preserve` skips deletion when true.
    pub fn new(client: Client, namespace: String, preserve: bool) -> Self {
        debug_assert!(!namespace.is_empty(), "cleanup requires a namespace");
        Self {
            namespaces: Api::all(client),
            namespace,
            preserve,
            termination: PollSettings::new(
                TERMINATION_POLL_INTERVAL,
                adjust_timeout(TERMINATION_TIMEOUT),
            ),
        }
    }

    pub async fn run(self) {
        let namespace = self.namespace.as_str();
        if self.preserve {
            info!(namespace, "preserving k8s namespace");
            return;
        }

        if !self.request_deletion().await {
            warn!(namespace, "namespace left behind; delete it manually");
            return;
        }

        let gone = await_namespace_gone(self.termination, || self.namespace_present()).await;
        if gone {
            info!(namespace, "namespace deleted");
        } else {
            warn!(
                namespace,
                timeout_secs = self.termination.timeout.as_secs(),
                "namespace still terminating; giving up on the wait"
            );
        }
    }

    /// Ask the API server to delete the namespace, then fall back to
    /// `kubectl` if the request errors or hangs.
    async fn request_deletion(&self) -> bool {
        let namespace = self.namespace.as_str();
        let params = DeleteParams::default();
        let request = self.namespaces.delete(namespace, &params);

        match timeout(DELETE_REQUEST_TIMEOUT, request).await {
            Ok(Ok(_)) => {
                info!(namespace, "namespace delete requested");
                return true;
            }
            Ok(Err(kube::Error::Api(response))) if response.code == 404 => {
                info!(namespace, "namespace already gone");
                return true;
            }
            Ok(Err(err)) => warn!(namespace, error = ?err, "namespace delete via API failed"),
            Err(_) => warn!(
                namespace,
                timeout_secs = DELETE_REQUEST_TIMEOUT.as_secs(),
                "namespace delete via API timed out"
            ),
        }

        self.delete_with_kubectl().await
    }

    async fn delete_with_kubectl(&self) -> bool {
        let namespace = self.namespace.as_str();
        info!(namespace, "retrying namespace delete with kubectl");

        let mut cmd = Command::new("kubectl");
        cmd.args(["delete", "namespace", namespace, "--ignore-not-found", "--wait=false"])
            .kill_on_drop(true);

        match timeout(KUBECTL_DELETE_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => true,
            Ok(Ok(output)) => {
                warn!(
                    namespace,
                    status = ?output.status.code(),
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "kubectl delete namespace failed"
                );
                false
            }
            Ok(Err(err)) => {
                warn!(namespace, error = ?err, "failed to spawn kubectl");
                false
            }
            Err(_) => {
                warn!(namespace, "kubectl delete namespace timed out");
                false
            }
        }
    }

    async fn namespace_present(&self) -> Result<bool, kube::Error> {
        let found = self.namespaces.get_opt(&self.namespace).await?;
        if let Some(phase) = found
            .as_ref()
            .and_then(|ns| ns.status.as_ref())
            .and_then(|status| status.phase.as_deref())
        {
            debug!(namespace = %self.namespace, phase, "namespace still present");
        }
        Ok(found.is_some())
    }
}

/// Poll `present` until it reports the namespace gone. Lookup errors are
/// logged and polled again; only the deadline ends the wait early.
async fn await_namespace_gone<F, Fut, E>(settings: PollSettings, mut present: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Debug,
{
    let poll = async {
        loop {
            match present().await {
                Ok(false) => return,
                Ok(true) => {}
                Err(err) => debug!(error = ?err, "namespace lookup failed; polling again"),
            }
            sleep(settings.interval).await;
        }
    };

    timeout(settings.timeout, poll).await.is_ok()
}
