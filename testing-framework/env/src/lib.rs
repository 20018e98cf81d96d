use std::env;

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

#[must_use]
pub fn local_ssd_provider() -> Option<String> {
    non_empty("LOCAL_SSD_PROVIDER")
}

#[must_use]
pub fn local_ssd_cluster() -> Option<String> {
    non_empty("LOCAL_SSD_CLUSTER")
}

#[must_use]
pub fn local_ssd_pool_name() -> Option<String> {
    non_empty("LOCAL_SSD_POOL_NAME")
}

#[must_use]
pub fn local_ssd_pod_start_timeout_secs() -> Option<u64> {
    env::var("LOCAL_SSD_POD_START_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

#[must_use]
pub fn local_ssd_poll_interval_secs() -> Option<u64> {
    env::var("LOCAL_SSD_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

#[must_use]
pub fn k8s_runner_namespace() -> Option<String> {
    non_empty("K8S_RUNNER_NAMESPACE")
}

#[must_use]
pub fn k8s_runner_preserve() -> bool {
    env::var("K8S_RUNNER_PRESERVE").is_ok()
}

#[must_use]
pub fn k8s_runner_debug() -> bool {
    env::var("K8S_RUNNER_DEBUG").is_ok()
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
