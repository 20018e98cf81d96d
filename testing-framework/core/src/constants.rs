use std::time::Duration;

/// Node label GKE puts on members of a pool created with local SSDs.
pub const LOCAL_SSD_LABEL_KEY: &str = "cloud.google.com/gke-local-ssd";

/// Value advertised under [`LOCAL_SSD_LABEL_KEY`].
pub const LOCAL_SSD_LABEL_VALUE: &str = "true";

/// Host path of the first local SSD slot; mounted into the container as-is.
pub const LOCAL_SSD_MOUNT_PATH: &str = "/mnt/disks/ssd0";

/// Pinned base image running the write/read pipeline.
pub const DEFAULT_WORKLOAD_IMAGE: &str = "ubuntu:14.04";

pub const WORKLOAD_CONTAINER_NAME: &str = "test-container";

pub const WORKLOAD_VOLUME_NAME: &str = "test-ssd-volume";

pub const WORKLOAD_NAME_PREFIX: &str = "pod-";

pub const WORKLOAD_SHELL: &str = "/bin/sh";

/// Provider the scenario is gated on.
pub const SUPPORTED_PROVIDER: &str = "gke";

pub const DEFAULT_POOL_NAME: &str = "np-ssd";

pub const DEFAULT_LOCAL_SSD_COUNT: u32 = 1;

/// Base name used when generating per-run namespaces.
pub const DEFAULT_NAMESPACE_BASE: &str = "localssd";

/// Payload written to the SSD and expected back on stdout.
pub const WRITE_READ_PAYLOAD: &str = "hello world";

/// How long a pod may take to reach a terminal phase.
pub const DEFAULT_POD_START_TIMEOUT: Duration = Duration::from_secs(300);

/// Upper bound accepted for the pod start timeout.
pub const MAX_POD_START_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Interval between pod phase polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Shell pipeline writing [`WRITE_READ_PAYLOAD`] to the SSD and reading it
/// back.
#[must_use]
pub fn write_read_command() -> String {
    let data = format!("{LOCAL_SSD_MOUNT_PATH}/data");
    format!("echo '{WRITE_READ_PAYLOAD}' > {data} && sleep 1 && cat {data}")
}
