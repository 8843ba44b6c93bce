//! The sequential test run loop.
//!
//! [`run_tests`] walks a [`Registry`] suite by suite, runs every enabled
//! test against a shared [`Environment`], and reports progress through an
//! observer callback. The observer owns all presentation; the command-line
//! reporter in [`cli`] is one implementation.

use crate::bench::BenchmarkResult;
use crate::env::{Environment, Failure};
use crate::suite::{Registry, Suite, Test};

pub mod cli;

/// A progress event of a test run.
pub enum RunState<'a> {
    RunningSuite {
        suite: &'a Suite,
    },
    FinishedSuite {
        suite: &'a Suite,
        successful: usize,
        count: usize,
    },
    RunningTest {
        suite: &'a Suite,
        test: &'a Test,
        /// One-based position among the suite's enabled tests.
        index: usize,
        count: usize,
    },
    TestSuccess {
        test: &'a Test,
        benchmarks: &'a [BenchmarkResult],
    },
    TestFailed {
        test: &'a Test,
        failures: &'a [Failure],
    },
}

/// The summary of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl Report {
    fn new(successful: usize, total: usize) -> Self {
        Self {
            total,
            successful,
            failed: total - successful,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful == self.total
    }
}

/// Run every enabled test, reporting progress through `observer`.
///
/// Suites without enabled tests are skipped entirely, including their setup
/// and teardown hooks. The environment is reset between test cases; an
/// aborted test case ends at its first stopping failure and the run simply
/// moves on to the next test.
pub fn run_tests(
    registry: &Registry,
    environment: &mut Environment,
    mut observer: impl FnMut(&RunState),
) -> Report {
    let mut total = 0;
    let mut total_successful = 0;
    for suite in registry.suites() {
        let count = suite.enabled_count();
        if count == 0 {
            continue;
        }
        observer(&RunState::RunningSuite { suite });
        suite.run_setup();

        let mut successful = 0;
        let mut index = 0;
        for test in suite.tests.iter().filter(|test| test.enabled) {
            index += 1;
            observer(&RunState::RunningTest {
                suite,
                test,
                index,
                count,
            });
            // A stopping failure has already been recorded; the aborted
            // test case needs no further handling.
            let _ = test.run(environment);
            if environment.success {
                observer(&RunState::TestSuccess {
                    test,
                    benchmarks: &environment.benchmarks,
                });
                successful += 1;
            } else {
                observer(&RunState::TestFailed {
                    test,
                    failures: &environment.failures,
                });
            }
            environment.reset();
        }

        total += count;
        total_successful += successful;
        suite.run_teardown();
        observer(&RunState::FinishedSuite {
            suite,
            successful,
            count,
        });
    }
    Report::new(total_successful, total)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::check::{equal, value};
    use crate::env::Environment;
    use crate::suite::{Registry, Suite, Test};

    use super::{run_tests, RunState};

    #[test]
    fn failures_are_contained_to_their_test_case() {
        let mut registry = Registry::new();
        registry.register(
            Suite::new("demo")
                .test(Test::new("fails", "Always fails.", |env| {
                    crate::expect!(env, equal(1, 2))?;
                    unreachable!("the stopping failure aborts the test case");
                }))
                .test(Test::new("passes", "Always passes.", |env| {
                    crate::expect!(env, value(true))
                })),
        );
        registry.enable_all();

        let mut environment = Environment::new();
        let mut failed = Vec::new();
        let mut succeeded = Vec::new();
        let report = run_tests(&registry, &mut environment, |state| match state {
            RunState::TestFailed { test, failures } => {
                assert_eq!(failures.len(), 1);
                failed.push(test.name.clone());
            }
            RunState::TestSuccess { test, .. } => succeeded.push(test.name.clone()),
            _ => {}
        });

        assert_eq!(failed, ["fails"]);
        assert_eq!(succeeded, ["passes"]);
        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_successful());
        assert!(environment.success, "the environment is reset after a run");
    }

    #[test]
    fn suites_without_enabled_tests_are_skipped() {
        let hooks = Rc::new(Cell::new(0));
        let (setup, teardown) = (Rc::clone(&hooks), Rc::clone(&hooks));
        let mut registry = Registry::new();
        registry.register(
            Suite::new("silent")
                .setup(move || setup.set(setup.get() + 1))
                .teardown(move || teardown.set(teardown.get() + 1))
                .test(Test::new("dormant", "Never enabled.", |_| Ok(()))),
        );

        let mut environment = Environment::new();
        let report = run_tests(&registry, &mut environment, |_| {});
        assert_eq!(report.total, 0);
        assert!(report.is_successful());
        assert_eq!(hooks.get(), 0);

        registry.enable_all();
        let report = run_tests(&registry, &mut environment, |_| {});
        assert_eq!(report.total, 1);
        assert_eq!(hooks.get(), 2, "setup and teardown ran once each");
    }
}
