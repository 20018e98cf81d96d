use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{
        Container, HostPathVolumeSource, Pod, PodSpec, Volume, VolumeMount as PodVolumeMount,
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use localssd_core::scenario::WorkloadDescriptor;

pub(crate) const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub(crate) const MANAGED_BY_VALUE: &str = "localssd-e2e";

/// Render the descriptor as a pod with a `hostPath` volume.
pub fn pod_from_descriptor(descriptor: &WorkloadDescriptor, namespace: &str) -> Pod {
    let volume = descriptor.volume();

    let container = Container {
        name: descriptor.container_name().to_owned(),
        image: Some(descriptor.image().to_owned()),
        command: Some(descriptor.command().to_vec()),
        args: Some(descriptor.args().to_vec()),
        volume_mounts: Some(vec![PodVolumeMount {
            name: volume.name.clone(),
            mount_path: volume.mount_path.clone(),
            ..Default::default()
        }]),
        ..Default::default()
    };

    Pod {
        metadata: ObjectMeta {
            name: Some(descriptor.name().to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_owned(),
                MANAGED_BY_VALUE.to_owned(),
            )])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            restart_policy: Some(descriptor.restart_policy().as_str().to_owned()),
            volumes: Some(vec![Volume {
                name: volume.name.clone(),
                host_path: Some(HostPathVolumeSource {
                    path: volume.host_path.clone(),
                    type_: None,
                }),
                ..Default::default()
            }]),
            node_selector: Some(descriptor.node_selector().clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
