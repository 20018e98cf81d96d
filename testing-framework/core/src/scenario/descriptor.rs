use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::constants::{
    DEFAULT_WORKLOAD_IMAGE, LOCAL_SSD_LABEL_KEY, LOCAL_SSD_LABEL_VALUE, LOCAL_SSD_MOUNT_PATH,
    WORKLOAD_CONTAINER_NAME, WORKLOAD_NAME_PREFIX, WORKLOAD_SHELL, WORKLOAD_VOLUME_NAME,
};

/// A single node label, used both as what a pool advertises and as what a
/// workload requires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeLabel {
    pub key: String,
    pub value: String,
}

impl NodeLabel {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The label GKE sets on nodes backed by local SSDs.
    #[must_use]
    pub fn local_ssd() -> Self {
        Self::new(LOCAL_SSD_LABEL_KEY, LOCAL_SSD_LABEL_VALUE)
    }
}

/// Host directory passed straight through into the container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub host_path: String,
    pub mount_path: String,
}

impl VolumeMount {
    #[must_use]
    pub fn host_passthrough(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            host_path: path.clone(),
            mount_path: path,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RestartPolicy {
    #[default]
    Never,
}

impl RestartPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "Never",
        }
    }
}

/// Immutable description of the single-container workload submitted to the
/// cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDescriptor {
    name: String,
    container_name: String,
    image: String,
    command: Vec<String>,
    args: Vec<String>,
    volume: VolumeMount,
    node_selector: BTreeMap<String, String>,
    restart_policy: RestartPolicy,
}

impl WorkloadDescriptor {
    fn new(command: &str, placement: &NodeLabel) -> Self {
        let node_selector =
            BTreeMap::from([(placement.key.clone(), placement.value.clone())]);

        Self {
            name: format!("{WORKLOAD_NAME_PREFIX}{}", Uuid::new_v4()),
            container_name: WORKLOAD_CONTAINER_NAME.to_owned(),
            image: DEFAULT_WORKLOAD_IMAGE.to_owned(),
            command: vec![WORKLOAD_SHELL.to_owned()],
            args: vec!["-c".to_owned(), command.to_owned()],
            volume: VolumeMount::host_passthrough(WORKLOAD_VOLUME_NAME, LOCAL_SSD_MOUNT_PATH),
            node_selector,
            restart_policy: RestartPolicy::Never,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub const fn volume(&self) -> &VolumeMount {
        &self.volume
    }

    #[must_use]
    pub const fn node_selector(&self) -> &BTreeMap<String, String> {
        &self.node_selector
    }

    #[must_use]
    pub const fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
    }

    /// Whether every node carrying `label` satisfies this workload's
    /// placement constraint.
    #[must_use]
    pub fn schedulable_on(&self, label: &NodeLabel) -> bool {
        self.node_selector.len() == 1
            && self.node_selector.get(&label.key) == Some(&label.value)
    }
}

/// Describe a pod running `command` via `/bin/sh -c` on a local SSD node.
#[must_use]
pub fn build(command: &str) -> WorkloadDescriptor {
    WorkloadDescriptor::new(command, &NodeLabel::local_ssd())
}
