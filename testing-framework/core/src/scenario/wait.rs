use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{WorkloadCluster, WorkloadPhase, error::ScenarioError};
use crate::{
    config::{ConfigError, PollSettings},
    constants::MAX_POD_START_TIMEOUT,
};

/// Poll `name` every `settings.interval` until it reaches a terminal phase.
///
/// Gives up with [`ScenarioError::SchedulingTimeout`] once `settings.timeout`
/// has elapsed and with [`ScenarioError::Cancelled`] as soon as `cancel`
/// fires. A lookup that hangs past the deadline counts as a timeout; a lookup
/// that errors aborts the wait.
pub async fn wait_for_terminal_phase<C>(
    cluster: &C,
    name: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<WorkloadPhase, ScenarioError>
where
    C: WorkloadCluster + ?Sized,
{
    let Some(deadline) = Instant::now().checked_add(settings.timeout) else {
        return Err(ConfigError::TimeoutTooLarge {
            timeout: settings.timeout,
            max: MAX_POD_START_TIMEOUT,
        }
        .into());
    };
    let mut last_phase = WorkloadPhase::Unknown;

    info!(
        workload = name,
        timeout_secs = settings.timeout.as_secs_f32(),
        poll_ms = settings.interval.as_millis(),
        "waiting for workload to reach a terminal phase"
    );

    loop {
        let lookup = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ScenarioError::Cancelled { name: name.to_owned(), last_phase });
            }
            lookup = timeout_at(deadline, cluster.phase(name)) => lookup,
        };
        let Ok(phase) = lookup else {
            break;
        };
        let phase = phase.map_err(|source| ScenarioError::cluster("phase lookup", name, source))?;

        if phase != last_phase {
            debug!(workload = name, %phase, "workload phase changed");
        }
        last_phase = phase;

        if phase.is_terminal() {
            info!(workload = name, %phase, "workload reached terminal phase");
            return Ok(phase);
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }

        let pause = settings.interval.min(deadline - now);
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ScenarioError::Cancelled { name: name.to_owned(), last_phase });
            }
            () = sleep(pause) => {}
        }
    }

    Err(ScenarioError::SchedulingTimeout {
        name: name.to_owned(),
        timeout: settings.timeout,
        last_phase,
    })
}
