use k8s_openapi::api::core::v1::Pod;
use kube::{
    Api, Client,
    api::{ListParams, LogParams},
};
use tracing::{info, warn};

const LOG_TAIL_LINES: i64 = 500;

/// Print the tail of every container log in `namespace`.
pub async fn dump_namespace_logs(client: &Client, namespace: &str) {
    let pods = match list_pods(client, namespace).await {
        Ok(pods) => pods,
        Err(err) => {
            warn!(%namespace, error = ?err, "failed to list pods for log dump");
            return;
        }
    };

    for pod in pods {
        let Some(pod_name) = pod.metadata.name.as_deref() else {
            continue;
        };
        let phase = pod
            .status
            .as_ref()
            .and_then(|status| status.phase.as_deref())
            .unwrap_or("Unknown");
        info!(pod = pod_name, phase, "pod status at failure");

        let containers: Vec<String> = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        for container in containers {
            stream_container_logs(client, namespace, pod_name, &container).await;
        }
    }
}

async fn list_pods(client: &Client, namespace: &str) -> Result<Vec<Pod>, kube::Error> {
    let list = Api::<Pod>::namespaced(client.clone(), namespace)
        .list(&ListParams::default())
        .await?;
    Ok(list.items)
}

async fn stream_container_logs(client: &Client, namespace: &str, pod_name: &str, container: &str) {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let params = LogParams {
        container: Some(container.to_owned()),
        follow: false,
        tail_lines: Some(LOG_TAIL_LINES),
        ..Default::default()
    };

    match pods.logs(pod_name, &params).await {
        Ok(log) => info!(pod = pod_name, container, "container logs:\n{log}"),
        Err(err) => warn!(pod = pod_name, container, error = ?err, "failed to fetch container logs"),
    }
}
