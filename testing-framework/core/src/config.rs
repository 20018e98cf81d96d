use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::{
    adjust_timeout,
    constants::{
        DEFAULT_LOCAL_SSD_COUNT, DEFAULT_NAMESPACE_BASE, DEFAULT_POD_START_TIMEOUT,
        DEFAULT_POLL_INTERVAL, DEFAULT_POOL_NAME, MAX_POD_START_TIMEOUT, SUPPORTED_PROVIDER,
    },
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cluster name is not set (export LOCAL_SSD_CLUSTER)")]
    MissingCluster,
    #[error("node pool name must be non-empty")]
    EmptyPoolName,
    #[error("local SSD count must be at least 1")]
    ZeroDeviceCount,
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    #[error("pod start timeout must be non-zero")]
    ZeroTimeout,
    #[error("pod start timeout {timeout:?} exceeds the {max:?} limit")]
    TimeoutTooLarge { timeout: Duration, max: Duration },
}

/// Fixed interval and overall deadline for a bounded poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, adjust_timeout(DEFAULT_POD_START_TIMEOUT))
    }
}

/// Everything the scenario needs to know about its environment. Resolved once
/// at startup and threaded through explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub provider: String,
    pub cluster_name: String,
    pub pool_name: String,
    pub local_ssd_count: u32,
    pub namespace_base: String,
    pub wait: PollSettings,
}

impl ScenarioConfig {
    /// Config targeting `cluster_name` on GKE with the default pool name and
    /// timeouts.
    #[must_use]
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            provider: SUPPORTED_PROVIDER.to_owned(),
            cluster_name: cluster_name.into(),
            pool_name: DEFAULT_POOL_NAME.to_owned(),
            local_ssd_count: DEFAULT_LOCAL_SSD_COUNT,
            namespace_base: DEFAULT_NAMESPACE_BASE.to_owned(),
            wait: PollSettings::default(),
        }
    }

    /// Resolve the config from `LOCAL_SSD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cluster = localssd_env::local_ssd_cluster().ok_or(ConfigError::MissingCluster)?;
        let mut config = Self::new(cluster);

        if let Some(provider) = localssd_env::local_ssd_provider() {
            config.provider = provider;
        }
        if let Some(pool) = localssd_env::local_ssd_pool_name() {
            config.pool_name = pool;
        }
        if let Some(secs) = localssd_env::local_ssd_poll_interval_secs() {
            config.wait.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = localssd_env::local_ssd_pod_start_timeout_secs() {
            config.wait.timeout = adjust_timeout(Duration::from_secs(secs));
        }

        debug!(?config, "resolved scenario config from environment");
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    #[must_use]
    pub fn with_pool_name(mut self, pool_name: impl Into<String>) -> Self {
        self.pool_name = pool_name.into();
        self
    }

    #[must_use]
    pub const fn with_wait(mut self, wait: PollSettings) -> Self {
        self.wait = wait;
        self
    }

    /// Whether the scenario applies to the configured provider.
    #[must_use]
    pub fn provider_supported(&self) -> bool {
        self.provider.eq_ignore_ascii_case(SUPPORTED_PROVIDER)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster_name.trim().is_empty() {
            return Err(ConfigError::MissingCluster);
        }
        if self.pool_name.trim().is_empty() {
            return Err(ConfigError::EmptyPoolName);
        }
        if self.local_ssd_count == 0 {
            return Err(ConfigError::ZeroDeviceCount);
        }
        if self.wait.interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.wait.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.wait.timeout > MAX_POD_START_TIMEOUT {
            return Err(ConfigError::TimeoutTooLarge {
                timeout: self.wait.timeout,
                max: MAX_POD_START_TIMEOUT,
            });
        }
        Ok(())
    }
}
