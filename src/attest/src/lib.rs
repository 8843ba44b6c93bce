//! A unit-testing library with a composable matcher DSL, a micro-benchmarking
//! harness, and an explicit suite driver.
//!
//! To write tests:
//!
//! 1. Build [`Test`] cases and group them into [`Suite`]s registered in a
//!    [`Registry`]. Test bodies receive the run [`Environment`] and assert
//!    with the [`expect!`] and [`assert_that!`] macros.
//! 2. Run the registry: from a binary, hand it to
//!    [`run_command_line`](driver::cli::run_command_line), which parses
//!    suite/test/`#tag` filters and prints a console report; or drive it
//!    programmatically with [`run_tests`](driver::run_tests).
//!
//! Assertions take any [`Check`]: plain comparisons ([`check`]), approximate
//! float comparisons ([`check::approx`]), panic expectations, or a match
//! expression built with [`that`] and the matchers in [`matchers`]. Match
//! expressions chain conditions onto one subject value and report which
//! condition failed.
//!
//! # Example
//!
//! ```
//! use attest::check::equal;
//! use attest::matchers::{in_range, is_even};
//! use attest::{expect, that, Environment, Registry, Suite, Test};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Suite::new("arithmetic").test(Test::new(
//!         "addition",
//!         "Checks integer addition.",
//!         |env| {
//!             expect!(env, equal(2 + 2, 4))?;
//!             expect!(env, that(2 + 2) | in_range(1, 5) & is_even())?;
//!             Ok(())
//!         },
//!     )),
//! );
//! registry.enable_all();
//!
//! let mut environment = Environment::new();
//! let report = attest::driver::run_tests(&registry, &mut environment, |_| {});
//! assert!(report.is_successful());
//! ```

pub mod bench;
pub mod check;
pub mod driver;
pub mod env;
pub mod eval;
pub mod matching;
pub mod suite;

pub use crate::bench::{Benchmark, BenchmarkResult};
pub use crate::check::{Check, CheckExt};
pub use crate::driver::{run_tests, Report, RunState};
pub use crate::env::{Environment, Failure, Flow, Stopped};
pub use crate::eval::Eval;
pub use crate::matching::builder::{that, Subject};
pub use crate::matching::{matchers, MatchError, Matcher, MatcherKind};
pub use crate::suite::{Registry, Suite, Test};
