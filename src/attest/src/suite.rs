//! Test cases, suites, and the registry that holds them.
//!
//! Registration is explicit: tests are plain values pushed into a
//! [`Registry`] owned by the caller, so there is no global state and a
//! registry can be built, filtered, and run entirely inside a test.
//!
//! Tests start out disabled; the `enable_*` family selects what a run
//! covers. The tags `benchmark` and `skip` exclude a test from suite-wide
//! enablement, so that timing-heavy or known-broken tests only run when
//! named directly or selected by tag.

use crate::env::{Environment, Flow};

/// Tags excluding a test from suite-wide enablement.
const SKIP_TAGS: [&str; 2] = ["benchmark", "skip"];

/// A single test case.
pub struct Test {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub enabled: bool,
    body: Box<dyn Fn(&mut Environment) -> Flow>,
}

impl Test {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl Fn(&mut Environment) -> Flow + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
            enabled: false,
            body: Box::new(body),
        }
    }

    /// Attach a tag. Tags are selectable from the command line with `#tag`.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Run the test body against `environment`.
    pub fn run(&self, environment: &mut Environment) -> Flow {
        (self.body)(environment)
    }

    fn skipped_by_default(&self) -> bool {
        self.tags.iter().any(|tag| SKIP_TAGS.contains(&tag.as_str()))
    }
}

/// A named group of test cases with optional setup and teardown hooks.
pub struct Suite {
    pub name: String,
    pub tests: Vec<Test>,
    setup: Option<Box<dyn Fn()>>,
    teardown: Option<Box<dyn Fn()>>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            setup: None,
            teardown: None,
        }
    }

    /// Add a test case.
    pub fn test(mut self, test: Test) -> Self {
        self.tests.push(test);
        self
    }

    /// Set a hook run once before the suite's tests.
    pub fn setup(mut self, setup: impl Fn() + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Set a hook run once after the suite's tests.
    pub fn teardown(mut self, teardown: impl Fn() + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// The number of currently enabled tests.
    pub fn enabled_count(&self) -> usize {
        self.tests.iter().filter(|test| test.enabled).count()
    }

    pub(crate) fn run_setup(&self) {
        if let Some(setup) = &self.setup {
            setup();
        }
    }

    pub(crate) fn run_teardown(&self) {
        if let Some(teardown) = &self.teardown {
            teardown();
        }
    }
}

/// All registered suites of a test binary.
#[derive(Default)]
pub struct Registry {
    suites: Vec<Suite>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, suite: Suite) {
        self.suites.push(suite);
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Enable every test not tagged `benchmark` or `skip`.
    pub fn enable_all(&mut self) {
        for suite in &mut self.suites {
            for test in &mut suite.tests {
                if !test.skipped_by_default() {
                    test.enabled = true;
                }
            }
        }
    }

    /// Enable all tests of the named suite, except those tagged `benchmark`
    /// or `skip`. Returns whether the suite exists.
    pub fn enable_suite(&mut self, name: &str) -> bool {
        for suite in &mut self.suites {
            if suite.name == name {
                for test in &mut suite.tests {
                    if !test.skipped_by_default() {
                        test.enabled = true;
                    }
                }
                return true;
            }
        }
        false
    }

    /// Enable the first test with the given name, regardless of its tags.
    /// Returns whether such a test exists.
    pub fn enable_test(&mut self, name: &str) -> bool {
        for suite in &mut self.suites {
            for test in &mut suite.tests {
                if test.name == name {
                    test.enabled = true;
                    return true;
                }
            }
        }
        false
    }

    /// Enable every test carrying the given tag, regardless of whether the
    /// tag otherwise excludes it from suite-wide runs. Returns whether any
    /// test carries the tag.
    pub fn enable_tag(&mut self, tag: &str) -> bool {
        let mut found = false;
        for suite in &mut self.suites {
            for test in &mut suite.tests {
                if test.tags.iter().any(|candidate| candidate == tag) {
                    test.enabled = true;
                    found = true;
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::{Registry, Suite, Test};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            Suite::new("arithmetic")
                .test(Test::new("addition", "Adds numbers.", |_| Ok(())))
                .test(Test::new("timing", "Times additions.", |_| Ok(())).tag("benchmark"))
                .test(Test::new("division", "Divides numbers.", |_| Ok(())).tag("skip")),
        );
        registry.register(
            Suite::new("strings")
                .test(Test::new("concat", "Concatenates.", |_| Ok(())).tag("slow")),
        );
        registry
    }

    fn enabled(registry: &Registry) -> Vec<&str> {
        registry
            .suites()
            .iter()
            .flat_map(|suite| &suite.tests)
            .filter(|test| test.enabled)
            .map(|test| test.name.as_str())
            .collect()
    }

    #[test]
    fn suite_enablement_skips_special_tags() {
        let mut registry = registry();
        assert!(registry.enable_suite("arithmetic"));
        assert_eq!(enabled(&registry), ["addition"]);
        assert!(!registry.enable_suite("unknown"));
    }

    #[test]
    fn enable_all_covers_every_suite() {
        let mut registry = registry();
        registry.enable_all();
        assert_eq!(enabled(&registry), ["addition", "concat"]);
    }

    #[test]
    fn named_tests_and_tags_override_special_tags() {
        let mut registry = registry();
        assert!(registry.enable_test("timing"));
        assert_eq!(enabled(&registry), ["timing"]);
        assert!(registry.enable_tag("skip"));
        assert_eq!(enabled(&registry), ["timing", "division"]);
        assert!(!registry.enable_tag("missing"));
        assert!(!registry.enable_test("missing"));
    }
}
