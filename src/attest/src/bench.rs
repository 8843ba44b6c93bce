//! Micro-benchmarking of code snippets inside test cases.
//!
//! A [`Benchmark`] repeats its body adaptively: at least 16 iterations, then
//! until either one second of total run time or 1024 iterations is reached.
//! The distribution of per-iteration times is summarized into a
//! [`BenchmarkResult`] recorded in the test environment. Benchmarks respect
//! failed preconditions: if an assertion earlier in the test case failed,
//! the body is never run.
//!
//! Tag benchmark test cases with `benchmark` so that suite-wide runs skip
//! them; see [`Registry::enable_suite`](crate::suite::Registry::enable_suite).

use std::time::Instant;

use crate::env::Environment;

/// The timing summary of one benchmark site. All times are in nanoseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkResult {
    /// The line number of the benchmark site.
    pub line: u32,
    pub iterations: usize,
    pub total_time: u64,
    /// Total time over iterations, truncating.
    pub mean_time: u64,
    pub median_time: u64,
    pub min_time: u64,
    pub max_time: u64,
    /// First quartile of the sorted iteration times.
    pub q1_time: u64,
    /// Third quartile of the sorted iteration times.
    pub q3_time: u64,
    /// Per-iteration times in run order.
    pub times: Vec<u64>,
}

impl BenchmarkResult {
    pub(crate) fn compute(line: u32, times: Vec<u64>, total_time: u64) -> Self {
        let mut sorted = times.clone();
        sorted.sort_unstable();
        let half = sorted.len() / 2;
        let quarter = sorted.len() / 4;
        Self {
            line,
            iterations: times.len(),
            total_time,
            mean_time: total_time / times.len() as u64,
            median_time: sorted[half],
            min_time: sorted[0],
            max_time: sorted[sorted.len() - 1],
            q1_time: sorted[quarter],
            q3_time: sorted[sorted.len() - 1 - quarter],
            times,
        }
    }
}

/// One benchmark site inside a test case. Usually created through the
/// [`benchmark!`](crate::benchmark) macro.
pub struct Benchmark<'e> {
    environment: &'e mut Environment,
    line: u32,
    times: Vec<u64>,
    total_time: u64,
}

impl<'e> Benchmark<'e> {
    pub fn new(environment: &'e mut Environment, line: u32) -> Self {
        Self {
            environment,
            line,
            times: Vec::new(),
            total_time: 0,
        }
    }

    fn should_continue(&self) -> bool {
        let iterations = self.times.len();
        iterations < 16 || (self.total_time <= 1_000_000_000 && iterations < 1024)
    }

    /// Run `body` repeatedly, then record the timing summary in the
    /// environment. Does nothing when the environment has already failed.
    pub fn run(mut self, mut body: impl FnMut()) {
        if !self.environment.success {
            // Preconditions failed: do not benchmark
            return;
        }
        while self.should_continue() {
            let start = Instant::now();
            body();
            let elapsed = start.elapsed().as_nanos() as u64;
            self.times.push(elapsed);
            self.total_time += elapsed;
        }
        self.environment
            .benchmarks
            .push(BenchmarkResult::compute(self.line, self.times, self.total_time));
    }
}

/// Benchmark a snippet of code inside a test case.
///
/// The first argument is the `&mut Environment` of the running test; the
/// second is the expression or block to time.
#[macro_export]
macro_rules! benchmark {
    ($env:expr, $body:expr $(,)?) => {
        $crate::Benchmark::new($env, line!()).run(|| {
            $body;
        })
    };
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;

    use super::{Benchmark, BenchmarkResult};

    #[test]
    fn quartiles_over_one_through_ten() {
        let times: Vec<u64> = (1..=10).collect();
        let total = times.iter().sum();
        let result = BenchmarkResult::compute(42, times.clone(), total);
        assert_eq!(result.line, 42);
        assert_eq!(result.iterations, 10);
        assert_eq!(result.total_time, 55);
        assert_eq!(result.mean_time, 5);
        assert_eq!(result.median_time, 6);
        assert_eq!(result.q1_time, 3);
        assert_eq!(result.q3_time, 8);
        assert_eq!(result.min_time, 1);
        assert_eq!(result.max_time, 10);
        assert_eq!(result.times, times);
    }

    #[test]
    fn iteration_count_stays_within_bounds() {
        let mut env = Environment::new();
        let mut count = 0usize;
        Benchmark::new(&mut env, 1).run(|| count += 1);
        assert_eq!(env.benchmarks.len(), 1);
        let result = &env.benchmarks[0];
        assert_eq!(result.iterations, count);
        assert!((16..=1024).contains(&result.iterations));
        assert_eq!(result.times.len(), result.iterations);
    }

    #[test]
    fn failed_preconditions_skip_the_body() {
        let mut env = Environment::new();
        env.record_failure("precondition".into());
        let mut count = 0usize;
        Benchmark::new(&mut env, 1).run(|| count += 1);
        assert_eq!(count, 0);
        assert!(env.benchmarks.is_empty());
    }
}
