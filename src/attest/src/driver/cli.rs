//! The command-line test driver.
//!
//! Turns a populated [`Registry`] into a runnable test binary: parses
//! flags and filters, enables the selected tests, runs them with a console
//! reporter, and returns a process exit code.

use std::io::Write as _;

use clap::Parser;
use thiserror::Error;

use crate::env::Environment;
use crate::suite::Registry;

use super::{run_tests, Report, RunState};

/// Command-line options of a test binary.
#[derive(Parser, Debug, Default)]
pub struct Options {
    /// Continue after failed assertions.
    #[arg(short = 'c', long = "continue")]
    pub continue_on_failure: bool,

    /// Stop after failed assertions.
    #[arg(long, env = "ATTEST_STOP")]
    pub stop: bool,

    /// Suite names, test names, or #tag filters selecting what to run.
    pub filters: Vec<String>,
}

/// Errors raised while resolving command-line filters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown tag '#{0}'.")]
    UnknownTag(String),
    #[error("Unknown flag or test name '{0}'.")]
    UnknownName(String),
}

/// Enable the tests selected by the given filters. A filter starting with
/// `#` selects a tag; anything else names a suite (enabling its tests
/// except those tagged `benchmark` or `skip`) or an individual test.
pub fn apply_filters(registry: &mut Registry, filters: &[String]) -> Result<(), FilterError> {
    for filter in filters {
        if let Some(tag) = filter.strip_prefix('#') {
            if !registry.enable_tag(tag) {
                return Err(FilterError::UnknownTag(tag.to_string()));
            }
        } else if !registry.enable_suite(filter) && !registry.enable_test(filter) {
            return Err(FilterError::UnknownName(filter.clone()));
        }
    }
    Ok(())
}

/// Parse the process arguments and run the selected tests.
///
/// Returns the process exit code: zero when the run succeeded or only the
/// overview was printed, nonzero for unknown filters or failed tests.
pub fn run_command_line(registry: &mut Registry) -> i32 {
    run_with_options(registry, Options::parse())
}

/// Run the tests selected by `options` with the console reporter.
pub fn run_with_options(registry: &mut Registry, options: Options) -> i32 {
    if options.filters.is_empty() {
        print_overview(registry);
        return 0;
    }
    if let Err(error) = apply_filters(registry, &options.filters) {
        println!("{error}\nUse '--help' for help.");
        return 1;
    }

    let mut environment = Environment::new();
    if options.continue_on_failure {
        environment.stop_on_failure = false;
    }
    if options.stop {
        environment.stop_on_failure = true;
    }

    let report = run_tests(registry, &mut environment, console_reporter);
    print_tally(&report);
    i32::from(!report.is_successful())
}

/// List the registered suites, tests, and tags.
fn print_overview(registry: &Registry) {
    println!("Test Suites:");
    let mut tags: Vec<&str> = Vec::new();
    for suite in registry.suites() {
        println!("  {}    Enable all tests in the suite.", suite.name);
        for test in &suite.tests {
            print!("    {}    {}", test.name, test.description);
            for tag in &test.tags {
                if !tags.contains(&tag.as_str()) {
                    tags.push(tag);
                }
                print!(" ({tag})");
            }
            println!();
        }
    }
    if !tags.is_empty() {
        println!("\nTags:");
        for tag in tags {
            println!("  #{tag}");
        }
    }
}

fn console_reporter(state: &RunState) {
    match state {
        RunState::RunningSuite { suite } => {
            println!("\nRunning test suite {}.", suite.name);
        }
        RunState::FinishedSuite {
            successful, count, ..
        } => {
            println!("Successful: {successful}/{count}");
        }
        RunState::RunningTest {
            test, index, count, ..
        } => {
            print!("  Running test {} ({index}/{count}) ... ", test.name);
            let _ = std::io::stdout().flush();
        }
        RunState::TestSuccess { benchmarks, .. } => {
            println!("success.");
            for benchmark in *benchmarks {
                println!("    Benchmark results on line {}:", benchmark.line);
                println!("        Iterations: {}", benchmark.iterations);
                println!("        Total time: {} (ns)", benchmark.total_time);
                println!("         Mean time: {} (ns)", benchmark.mean_time);
                println!("      Distribution: min -[Q1 - median - Q3]- max");
                println!(
                    "        {} -[{} - {} - {}]- {} (ns)",
                    benchmark.min_time,
                    benchmark.q1_time,
                    benchmark.median_time,
                    benchmark.q3_time,
                    benchmark.max_time
                );
            }
        }
        RunState::TestFailed { failures, .. } => {
            println!("failure.");
            for failure in *failures {
                println!("    {}", failure.message);
            }
        }
    }
}

fn print_tally(report: &Report) {
    if report.is_successful() {
        println!("\nAll tests passed.");
    } else {
        println!("\n{} tests failed.", report.failed);
    }
}

#[cfg(test)]
mod tests {
    use crate::suite::{Registry, Suite, Test};

    use super::{apply_filters, FilterError, Options};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            Suite::new("arithmetic")
                .test(Test::new("addition", "Adds numbers.", |_| Ok(())))
                .test(Test::new("timing", "Times additions.", |_| Ok(())).tag("benchmark")),
        );
        registry
    }

    #[test]
    fn filters_resolve_suites_tests_and_tags() {
        let mut registry = registry();
        apply_filters(
            &mut registry,
            &["arithmetic".into(), "#benchmark".into()],
        )
        .expect("known filters");
        assert!(registry.suites()[0].tests.iter().all(|test| test.enabled));
    }

    #[test]
    fn unknown_filters_are_reported() {
        let mut registry = registry();
        assert_eq!(
            apply_filters(&mut registry, &["#missing".into()]),
            Err(FilterError::UnknownTag("missing".into()))
        );
        assert_eq!(
            apply_filters(&mut registry, &["missing".into()]),
            Err(FilterError::UnknownName("missing".into()))
        );
    }

    #[test]
    fn options_parse_flags_and_filters() {
        use clap::Parser;

        let options =
            Options::try_parse_from(["tests", "-c", "arithmetic", "#benchmark"]).expect("parse");
        assert!(options.continue_on_failure);
        assert!(!options.stop);
        assert_eq!(options.filters, ["arithmetic", "#benchmark"]);
    }
}
