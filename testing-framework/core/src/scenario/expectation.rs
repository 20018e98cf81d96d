use super::{WorkloadPhase, error::ScenarioError};

/// What the workload printed, and the phase it ended in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerOutput {
    pub name: String,
    pub phase: WorkloadPhase,
    pub stdout: String,
}

impl ContainerOutput {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines()
    }
}

/// Ordered lines that must show up in a container's stdout.
///
/// Each expected line has to be contained in some captured line, and the
/// matches must occur in the same order as the expected lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputExpectation {
    lines: Vec<String>,
}

impl OutputExpectation {
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn matches(&self, stdout: &str) -> bool {
        let mut captured = stdout.lines();
        self.lines
            .iter()
            .all(|expected| captured.any(|line| line.contains(expected.as_str())))
    }

    pub fn evaluate(&self, output: &ContainerOutput) -> Result<(), ScenarioError> {
        if self.matches(&output.stdout) {
            return Ok(());
        }

        Err(ScenarioError::OutputMismatch {
            name: output.name.clone(),
            expected: self.lines.clone(),
            actual: output.stdout.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str) -> ContainerOutput {
        ContainerOutput {
            name: "pod-test".to_owned(),
            phase: WorkloadPhase::Succeeded,
            stdout: stdout.to_owned(),
        }
    }

    #[test]
    fn exact_output_matches() {
        let expectation = OutputExpectation::new(["hello world"]);

        assert!(expectation.evaluate(&output("hello world\n")).is_ok());
    }

    #[test]
    fn mismatch_reports_both_sides() {
        let expectation = OutputExpectation::new(["hello world"]);

        let err = expectation
            .evaluate(&output("goodbye world\n"))
            .unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ScenarioError::OutputMismatch { .. }));
        assert!(message.contains("hello world"), "{message}");
        assert!(message.contains("goodbye world"), "{message}");
    }

    #[test]
    fn lines_must_appear_in_order() {
        let expectation = OutputExpectation::new(["first", "second"]);

        assert!(expectation.matches("first\nnoise\nsecond\n"));
        assert!(!expectation.matches("second\nfirst\n"));
    }

    #[test]
    fn expected_line_may_be_part_of_captured_line() {
        let expectation = OutputExpectation::new(["hello"]);

        assert!(expectation.matches("> hello world"));
        assert!(!expectation.matches(""));
    }

    #[test]
    fn empty_expectation_always_matches() {
        assert!(OutputExpectation::new(Vec::<String>::new()).matches(""));
    }
}
