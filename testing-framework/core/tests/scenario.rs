use std::{
    collections::VecDeque,
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use localssd_core::{
    config::{PollSettings, ScenarioConfig},
    scenario::{
        DynError, LocalSsdScenario, NodeLabel, NodePoolProvisioner, OutputExpectation,
        PoolRequest, ProvisionError, RunOptions, ScenarioError, ScenarioOutcome, WorkloadCluster,
        WorkloadDescriptor, WorkloadPhase, build, provision, run_and_verify, run_and_verify_with,
        wait_for_terminal_phase,
    },
};
use tokio_util::sync::CancellationToken;

const FAST_POLL: PollSettings =
    PollSettings::new(Duration::from_millis(10), Duration::from_millis(200));

/// In-memory cluster replaying a scripted phase sequence; the last phase
/// repeats forever.
struct FakeCluster {
    phases: Mutex<VecDeque<WorkloadPhase>>,
    stdout: String,
    submitted: Mutex<Vec<WorkloadDescriptor>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeCluster {
    fn new(phases: &[WorkloadPhase], stdout: &str) -> Self {
        Self {
            phases: Mutex::new(phases.iter().copied().collect()),
            stdout: stdout.to_owned(),
            submitted: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    fn succeeding(stdout: &str) -> Self {
        Self::new(
            &[
                WorkloadPhase::Pending,
                WorkloadPhase::Running,
                WorkloadPhase::Succeeded,
            ],
            stdout,
        )
    }

    fn submitted(&self) -> Vec<WorkloadDescriptor> {
        self.submitted.lock().unwrap().clone()
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkloadCluster for FakeCluster {
    async fn submit(&self, descriptor: &WorkloadDescriptor) -> Result<(), DynError> {
        self.submitted.lock().unwrap().push(descriptor.clone());
        Ok(())
    }

    async fn phase(&self, name: &str) -> Result<WorkloadPhase, DynError> {
        if !self.submitted().iter().any(|d| d.name() == name) {
            return Err(format!("workload {name} not found").into());
        }
        let mut phases = self.phases.lock().unwrap();
        let phase = if phases.len() > 1 {
            phases.pop_front()
        } else {
            phases.front().copied()
        };
        Ok(phase.unwrap_or(WorkloadPhase::Pending))
    }

    async fn container_output(&self, _name: &str, container: &str) -> Result<String, DynError> {
        assert_eq!(container, "test-container");
        Ok(self.stdout.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), DynError> {
        self.deleted.lock().unwrap().push(name.to_owned());
        Ok(())
    }
}

enum FakeOutcome {
    Created(&'static str),
    Rejected { status: i32, output: &'static str },
}

struct FakeProvisioner {
    outcome: FakeOutcome,
    node_label: NodeLabel,
    requests: Mutex<Vec<PoolRequest>>,
}

impl FakeProvisioner {
    fn new(outcome: FakeOutcome) -> Self {
        Self {
            outcome,
            node_label: NodeLabel::local_ssd(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn advertising(mut self, node_label: NodeLabel) -> Self {
        self.node_label = node_label;
        self
    }

    fn requests(&self) -> Vec<PoolRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodePoolProvisioner for FakeProvisioner {
    async fn create_pool_with_local_devices(
        &self,
        request: &PoolRequest,
    ) -> Result<String, ProvisionError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.outcome {
            FakeOutcome::Created(output) => Ok(output.to_owned()),
            FakeOutcome::Rejected { status, output } => Err(ProvisionError::Failed {
                command: "gcloud alpha container node-pools create".to_owned(),
                status: Some(status),
                output: output.to_owned(),
            }),
        }
    }

    fn node_label(&self) -> NodeLabel {
        self.node_label.clone()
    }
}

fn fast_config() -> ScenarioConfig {
    ScenarioConfig::new("e2e-cluster").with_wait(FAST_POLL)
}

#[tokio::test(start_paused = true)]
async fn matching_output_passes() {
    let cluster = FakeCluster::succeeding("hello world\n");
    let descriptor = build("echo 'hello world'");

    let output = run_and_verify(&cluster, &descriptor, &["hello world"])
        .await
        .expect("output should match");

    assert_eq!(output.phase, WorkloadPhase::Succeeded);
    assert_eq!(output.lines().collect::<Vec<_>>(), ["hello world"]);
    assert_eq!(cluster.deleted(), [descriptor.name().to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn mismatched_output_names_expected_and_actual() {
    let cluster = FakeCluster::succeeding("goodbye world\n");
    let descriptor = build("echo 'goodbye world'");

    let err = run_and_verify(&cluster, &descriptor, &["hello world"])
        .await
        .unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, ScenarioError::OutputMismatch { .. }), "{err:?}");
    assert!(message.contains("hello world"), "{message}");
    assert!(message.contains("goodbye world"), "{message}");
}

#[tokio::test(start_paused = true)]
async fn stuck_workload_times_out() {
    let cluster = FakeCluster::new(&[WorkloadPhase::Pending], "");
    let descriptor = build("sleep infinity");
    let options = RunOptions::new(PollSettings::new(
        Duration::from_secs(2),
        Duration::from_secs(30),
    ));

    let err = run_and_verify_with(
        &cluster,
        &descriptor,
        &OutputExpectation::new(["hello world"]),
        &options,
    )
    .await
    .unwrap_err();

    match err {
        ScenarioError::SchedulingTimeout {
            timeout,
            last_phase,
            ..
        } => {
            assert_eq!(timeout, Duration::from_secs(30));
            assert_eq!(last_phase, WorkloadPhase::Pending);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(cluster.deleted().is_empty(), "failed workloads stay for diagnostics");
}

#[tokio::test]
async fn cancellation_interrupts_wait() {
    let cluster = FakeCluster::new(&[WorkloadPhase::Running], "");
    let descriptor = build("sleep infinity");
    let cancel = CancellationToken::new();
    let options = RunOptions::new(PollSettings::new(
        Duration::from_millis(20),
        Duration::from_secs(600),
    ))
    .with_cancellation(cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let err = run_and_verify_with(
        &cluster,
        &descriptor,
        &OutputExpectation::new(["hello world"]),
        &options,
    )
    .await
    .unwrap_err();
    trigger.await.unwrap();

    assert!(
        matches!(
            err,
            ScenarioError::Cancelled {
                last_phase: WorkloadPhase::Running,
                ..
            }
        ),
        "{err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn failed_phase_still_checks_output() {
    let cluster = FakeCluster::new(&[WorkloadPhase::Failed], "hello world\n");
    let descriptor = build("echo 'hello world'; exit 1");

    let output = run_and_verify_with(
        &cluster,
        &descriptor,
        &OutputExpectation::new(["hello world"]),
        &RunOptions::new(FAST_POLL),
    )
    .await
    .expect("output is inspected despite the failed phase");

    assert_eq!(output.phase, WorkloadPhase::Failed);
}

#[tokio::test]
async fn failed_phase_is_fatal_when_success_required() {
    let cluster = FakeCluster::new(&[WorkloadPhase::Failed], "hello world\n");
    let descriptor = build("echo 'hello world'; exit 1");

    let err = run_and_verify_with(
        &cluster,
        &descriptor,
        &OutputExpectation::new(["hello world"]),
        &RunOptions::new(FAST_POLL).require_success(true),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScenarioError::WorkloadFailed { .. }), "{err:?}");
}

#[tokio::test]
async fn provisioning_failure_carries_tool_output() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Rejected {
        status: 1,
        output: "ERROR: quota exceeded",
    });

    let err = provision(&provisioner, &PoolRequest::new("np-ssd", "e2e-cluster", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Provisioning { .. }));
    assert!(err.to_string().contains("quota exceeded"), "{err}");
}

#[tokio::test]
async fn scenario_writes_and_reads_local_ssd() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Created("Created [np-ssd]."));
    let cluster = FakeCluster::succeeding("hello world\n");

    let outcome = LocalSsdScenario::new(fast_config(), &provisioner, &cluster)
        .run(CancellationToken::new())
        .await
        .expect("scenario should pass");

    assert!(outcome.is_passed());
    assert_eq!(
        provisioner.requests(),
        [PoolRequest::new("np-ssd", "e2e-cluster", 1)]
    );

    let submitted = cluster.submitted();
    assert_eq!(submitted.len(), 1);
    let descriptor = &submitted[0];
    assert_eq!(
        descriptor.args()[1],
        "echo 'hello world' > /mnt/disks/ssd0/data && sleep 1 && cat /mnt/disks/ssd0/data"
    );
    assert_eq!(descriptor.volume().host_path, descriptor.volume().mount_path);
    assert_eq!(
        descriptor
            .node_selector()
            .get("cloud.google.com/gke-local-ssd")
            .map(String::as_str),
        Some("true")
    );
}

#[tokio::test]
async fn provisioning_failure_stops_before_submission() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Rejected {
        status: 1,
        output: "quota exceeded",
    });
    let cluster = FakeCluster::succeeding("hello world\n");

    let err = LocalSsdScenario::new(fast_config(), &provisioner, &cluster)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Provisioning { .. }));
    assert!(cluster.submitted().is_empty());
}

#[tokio::test]
async fn other_providers_are_skipped() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Created(""));
    let cluster = FakeCluster::succeeding("hello world\n");

    let outcome = LocalSsdScenario::new(fast_config().with_provider("aws"), &provisioner, &cluster)
        .run(CancellationToken::new())
        .await
        .expect("skip is not an error");

    assert!(matches!(outcome, ScenarioOutcome::Skipped { ref provider } if provider == "aws"));
    assert!(provisioner.requests().is_empty());
    assert!(cluster.submitted().is_empty());
}

#[tokio::test]
async fn empty_pool_name_is_rejected_before_provisioning() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Created(""));

    let err = provision(&provisioner, &PoolRequest::new("", "e2e-cluster", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::InvalidConfig(_)), "{err:?}");
    assert!(provisioner.requests().is_empty());
}

#[tokio::test]
async fn label_mismatch_stops_before_submission() {
    let provisioner = FakeProvisioner::new(FakeOutcome::Created("Created [np-ssd]."))
        .advertising(NodeLabel::new("cloud.google.com/gke-local-ssd", "false"));
    let cluster = FakeCluster::succeeding("hello world\n");

    let err = LocalSsdScenario::new(fast_config(), &provisioner, &cluster)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ScenarioError::PlacementDrift {
            pool,
            required,
            advertised,
            ..
        } => {
            assert_eq!(pool, "np-ssd");
            assert_eq!(
                required,
                [(
                    "cloud.google.com/gke-local-ssd".to_owned(),
                    "true".to_owned()
                )]
            );
            assert_eq!(advertised.value, "false");
        }
        other => panic!("expected placement drift, got {other:?}"),
    }
    assert_eq!(provisioner.requests().len(), 1);
    assert!(cluster.submitted().is_empty());
}

#[tokio::test]
async fn unrepresentable_timeout_is_rejected_without_panicking() {
    let cluster = FakeCluster::new(&[WorkloadPhase::Pending], "");
    let descriptor = build("true");
    cluster.submit(&descriptor).await.unwrap();

    let err = wait_for_terminal_phase(
        &cluster,
        descriptor.name(),
        PollSettings::new(Duration::from_secs(2), Duration::from_secs(u64::MAX)),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScenarioError::InvalidConfig(_)), "{err:?}");
}
