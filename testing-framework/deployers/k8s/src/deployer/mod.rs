mod orchestrator;

pub use orchestrator::{K8sRunnerError, K8sScenarioRunner};
