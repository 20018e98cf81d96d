use std::process::Stdio;

use async_trait::async_trait;
use localssd_core::scenario::{NodePoolProvisioner, PoolRequest, ProvisionError};
use tokio::process::Command;
use tracing::{debug, info};

const GCLOUD_PROGRAM: &str = "gcloud";

/// Creates node pools through `gcloud alpha container node-pools create`.
#[derive(Clone, Debug)]
pub struct GcloudProvisioner {
    program: String,
}

impl Default for GcloudProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl GcloudProvisioner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: GCLOUD_PROGRAM.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub(crate) fn build_create_command(&self, request: &PoolRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("alpha")
            .arg("container")
            .arg("node-pools")
            .arg("create")
            .arg(&request.pool_name)
            .arg(format!("--cluster={}", request.cluster_name))
            .arg(format!("--local-ssd-count={}", request.device_count))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl NodePoolProvisioner for GcloudProvisioner {
    async fn create_pool_with_local_devices(
        &self,
        request: &PoolRequest,
    ) -> Result<String, ProvisionError> {
        let command = format!(
            "{} alpha container node-pools create {}",
            self.program, request.pool_name
        );
        info!(
            pool = %request.pool_name,
            cluster = %request.cluster_name,
            local_ssd_count = request.device_count,
            "issuing node pool create"
        );

        let cmd = self.build_create_command(request);
        let output = run_gcloud_command(cmd, &command).await?;
        maybe_log_output(&command, &output);

        Ok(output)
    }
}

/// Run `cmd` to completion and return stdout followed by stderr.
pub(crate) async fn run_gcloud_command(
    mut cmd: Command,
    command: &str,
) -> Result<String, ProvisionError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let output = cmd.output().await.map_err(|source| ProvisionError::Spawn {
        command: command.to_owned(),
        source,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(combined)
    } else {
        Err(ProvisionError::Failed {
            command: command.to_owned(),
            status: output.status.code(),
            output: combined,
        })
    }
}

fn maybe_log_output(command: &str, output: &str) {
    if !localssd_env::k8s_runner_debug() {
        return;
    }

    debug!(command, output, "gcloud output");
}
