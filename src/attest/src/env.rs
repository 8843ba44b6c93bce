//! The per-test run environment.
//!
//! An [`Environment`] accumulates the failures and benchmark results of the
//! test case currently running. The "this test failed, stop here" signal is
//! modeled as an ordinary [`Result`] ([`Flow`]) and propagated with `?`; the
//! driver catches it at the test-case boundary.

use crate::bench::BenchmarkResult;

/// A single recorded assertion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
}

/// Marker for an aborted test case. Carries no data; the failure details are
/// already recorded in the [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stopped;

/// The control-flow result of a test body or a single assertion.
pub type Flow = Result<(), Stopped>;

/// State shared by all assertions and benchmarks of one test case.
pub struct Environment {
    /// When set, the first failing assertion aborts the test case. Individual
    /// assertions can also request this regardless of the policy.
    pub stop_on_failure: bool,
    /// False as soon as any assertion of the current test case failed.
    pub success: bool,
    pub failures: Vec<Failure>,
    pub benchmarks: Vec<BenchmarkResult>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            stop_on_failure: true,
            success: true,
            failures: Vec::new(),
            benchmarks: Vec::new(),
        }
    }

    /// Record a failure message and clear the success flag.
    pub fn record_failure(&mut self, message: String) {
        self.success = false;
        self.failures.push(Failure { message });
    }

    /// Clear per-test state. The `stop_on_failure` policy is configuration
    /// and survives the reset.
    pub fn reset(&mut self) {
        self.success = true;
        self.failures.clear();
        self.benchmarks.clear();
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
