pub mod config;
pub mod constants;
pub mod scenario;

use std::{sync::LazyLock, time::Duration};

static IS_SLOW_TEST_ENV: LazyLock<bool> = LazyLock::new(localssd_env::slow_test_env);

/// In slow test environments like shared CI runners, use 2x timeout.
#[must_use]
pub fn adjust_timeout(d: Duration) -> Duration {
    if *IS_SLOW_TEST_ENV {
        d.saturating_mul(2)
    } else {
        d
    }
}
