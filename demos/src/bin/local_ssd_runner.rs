use std::process;

use anyhow::{Context as _, Result};
use localssd_core::{config::ScenarioConfig, scenario::ScenarioOutcome};
use localssd_demos::{cancel_on_ctrl_c, init_tracing};
use localssd_runner_k8s::{K8sRunnerError, K8sScenarioRunner};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run_local_ssd_case().await {
        warn!("local SSD runner failed: {err:#}");
        process::exit(1);
    }
}

async fn run_local_ssd_case() -> Result<()> {
    let config = ScenarioConfig::from_env().context("resolving scenario config")?;
    info!(
        provider = %config.provider,
        cluster = %config.cluster_name,
        pool = %config.pool_name,
        timeout_secs = config.wait.timeout.as_secs(),
        "starting local SSD runner"
    );

    let cancel = CancellationToken::new();
    let signal = cancel_on_ctrl_c(cancel.clone());

    let outcome = K8sScenarioRunner::new(config).run(cancel).await;
    signal.abort();

    match outcome {
        Ok(ScenarioOutcome::Passed(output)) => {
            info!(workload = %output.name, phase = %output.phase, "local SSD write/read verified");
        }
        Ok(ScenarioOutcome::Skipped { provider }) => {
            info!(%provider, "local SSD scenario not applicable; skipped");
        }
        Err(K8sRunnerError::ClientInit { source }) => {
            warn!("Kubernetes cluster unavailable ({source}); skipping");
        }
        Err(err) => {
            return Err(anyhow::Error::new(err)).context("running local SSD scenario failed");
        }
    }

    Ok(())
}
