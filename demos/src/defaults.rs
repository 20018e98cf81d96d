use std::{future::Future, io, process};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status used when the operator interrupts twice.
const FORCED_EXIT_CODE: i32 = 130;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// Cancel `token` on the first Ctrl-C and exit the process on the second,
/// without waiting for cleanup.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if relay_interrupts(token, tokio::signal::ctrl_c).await {
            warn!("second interrupt received; exiting without cleanup");
            process::exit(FORCED_EXIT_CODE);
        }
    })
}

/// Cancel `token` when `interrupt` first resolves. Returns `true` once it
/// resolves a second time, `false` if listening fails.
pub async fn relay_interrupts<F, Fut>(token: CancellationToken, mut interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(err) = interrupt().await {
        warn!(error = ?err, "unable to listen for ctrl-c");
        return false;
    }
    info!("interrupt received; cancelling scenario (interrupt again to exit)");
    token.cancel();

    match interrupt().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = ?err, "unable to listen for a second ctrl-c");
            false
        }
    }
}
