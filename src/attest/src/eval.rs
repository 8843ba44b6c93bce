//! Assertion sites.
//!
//! An [`Eval`] binds a [`Check`] to the environment of the running test and
//! the source location of the assertion. Use it through the [`expect!`] and
//! [`assert_that!`] macros, which capture `file!()` and `line!()`; the only
//! difference between the two is whether a failure aborts the test case.

use std::fs;

use crate::check::Check;
use crate::env::{Environment, Flow, Stopped};

/// A single assertion site.
pub struct Eval<'e> {
    environment: &'e mut Environment,
    file: &'static str,
    line: u32,
    stop_on_failure: bool,
}

impl<'e> Eval<'e> {
    pub fn new(
        environment: &'e mut Environment,
        file: &'static str,
        line: u32,
        stop_on_failure: bool,
    ) -> Self {
        Self {
            environment,
            file,
            line,
            stop_on_failure,
        }
    }

    /// Evaluate `check`, recording a failure in the environment if it does
    /// not hold. Returns `Err(Stopped)` when either the assertion or the
    /// environment policy requests aborting the test case.
    pub fn check(self, mut check: impl Check) -> Flow {
        if check.evaluate() {
            return Ok(());
        }
        let mut message = message_prefix(self.file, self.line);
        if let Some(text) = check.message() {
            message.push_str(text);
            message.push_str(": ");
        }
        message.push_str(&check.fail_message());
        self.environment.record_failure(message);
        if self.stop_on_failure || self.environment.stop_on_failure {
            Err(Stopped)
        } else {
            Ok(())
        }
    }
}

/// Compose the location prefix of a failure message, quoting the assertion's
/// source line when the file is readable. The quote is cosmetic; any read
/// failure is ignored silently.
fn message_prefix(file: &str, line: u32) -> String {
    let source = fs::read_to_string(file)
        .ok()
        .and_then(|contents| {
            contents
                .lines()
                .nth(line as usize - 1)
                .map(|text| text.trim().to_string())
        })
        .unwrap_or_default();
    if source.is_empty() {
        format!("Failure on line {line}, ")
    } else {
        format!("Failure on line {line}: `{source}`, ")
    }
}

/// Evaluate a check against the current test environment, recording any
/// failure and continuing the test case unless the environment policy says
/// otherwise.
///
/// The first argument is the `&mut Environment` of the running test; the
/// second is any [`Check`].
#[macro_export]
macro_rules! expect {
    ($env:expr, $check:expr $(,)?) => {
        $crate::Eval::new($env, file!(), line!(), false).check($check)
    };
}

/// Evaluate a check against the current test environment, aborting the test
/// case on failure regardless of the environment policy.
#[macro_export]
macro_rules! assert_that {
    ($env:expr, $check:expr $(,)?) => {
        $crate::Eval::new($env, file!(), line!(), true).check($check)
    };
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::check::{equal, CheckExt};
    use crate::env::Environment;

    use super::{message_prefix, Eval};

    #[test]
    fn prefix_quotes_the_trimmed_source_line() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "first line").expect("write");
        writeln!(file, "    expect!(env, equal(counter, 3));   ").expect("write");
        let path = file.path().to_str().expect("utf8 path").to_string();

        assert_eq!(
            message_prefix(&path, 2),
            "Failure on line 2: `expect!(env, equal(counter, 3));`, "
        );
    }

    #[test]
    fn prefix_degrades_without_a_readable_line() {
        assert_eq!(
            message_prefix("/nonexistent/file.rs", 7),
            "Failure on line 7, "
        );

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "only line").expect("write");
        let path = file.path().to_str().expect("utf8 path").to_string();
        assert_eq!(message_prefix(&path, 12), "Failure on line 12, ");
    }

    #[test]
    fn failures_record_the_user_message() {
        let mut env = Environment::new();
        env.stop_on_failure = false;
        let flow = Eval::new(&mut env, "/nonexistent/file.rs", 3, false)
            .check(equal(1, 2).msg("the counters must agree"));
        assert_eq!(flow, Ok(()));
        assert!(!env.success);
        assert_eq!(
            env.failures[0].message,
            "Failure on line 3, the counters must agree: 1 is not equal to 2."
        );
    }

    #[test]
    fn stopping_assertions_yield_an_error() {
        let mut env = Environment::new();
        env.stop_on_failure = false;
        let flow = Eval::new(&mut env, "/nonexistent/file.rs", 3, true).check(equal(1, 2));
        assert!(flow.is_err());

        let mut env = Environment::new();
        let flow = Eval::new(&mut env, "/nonexistent/file.rs", 3, false).check(equal(1, 2));
        assert!(flow.is_err(), "the environment policy also stops");
    }
}
