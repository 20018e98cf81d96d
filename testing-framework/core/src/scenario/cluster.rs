use std::fmt;

use async_trait::async_trait;

use super::{DynError, descriptor::WorkloadDescriptor};

/// Lifecycle phase of a submitted workload as observed on the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl WorkloadPhase {
    /// Map a pod `status.phase` string. Anything unrecognised is `Unknown`.
    #[must_use]
    pub fn from_pod_phase(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for WorkloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Control-plane surface the harness drives.
#[async_trait]
pub trait WorkloadCluster: Send + Sync {
    async fn submit(&self, descriptor: &WorkloadDescriptor) -> Result<(), DynError>;

    async fn phase(&self, name: &str) -> Result<WorkloadPhase, DynError>;

    /// Full stdout of `container` in workload `name`.
    async fn container_output(&self, name: &str, container: &str) -> Result<String, DynError>;

    async fn delete(&self, _name: &str) -> Result<(), DynError> {
        Ok(())
    }
}
