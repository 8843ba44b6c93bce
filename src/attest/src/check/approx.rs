//! Approximate floating-point checks.
//!
//! Exact float comparison is almost always a bug in a test; these checks
//! compare under an absolute tolerance instead. The default tolerance is
//! [`DEFAULT_TOLERANCE`]; override it per check with
//! [`tolerance`](NearEqual::tolerance).

use super::Check;

/// The absolute tolerance used when none is set explicitly.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Checks that two floats differ by at most a tolerance.
pub struct NearEqual {
    lhs: f64,
    rhs: f64,
    tolerance: f64,
}

/// Checks that `lhs` and `rhs` are equal within the default tolerance.
pub fn near_equal(lhs: f64, rhs: f64) -> NearEqual {
    NearEqual {
        lhs,
        rhs,
        tolerance: DEFAULT_TOLERANCE,
    }
}

impl NearEqual {
    /// Override the tolerance of the comparison.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Check for NearEqual {
    fn evaluate(&mut self) -> bool {
        (self.lhs - self.rhs).abs() <= self.tolerance
    }

    fn fail_message(&self) -> String {
        format!("{:?} is not nearly equal to {:?}.", self.lhs, self.rhs)
    }
}

/// Checks that two floats differ by more than a tolerance.
pub struct NearNotEqual {
    lhs: f64,
    rhs: f64,
    tolerance: f64,
}

/// Checks that `lhs` and `rhs` differ by more than the default tolerance.
pub fn near_not_equal(lhs: f64, rhs: f64) -> NearNotEqual {
    NearNotEqual {
        lhs,
        rhs,
        tolerance: DEFAULT_TOLERANCE,
    }
}

impl NearNotEqual {
    /// Override the tolerance of the comparison.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Check for NearNotEqual {
    fn evaluate(&mut self) -> bool {
        (self.lhs - self.rhs).abs() > self.tolerance
    }

    fn fail_message(&self) -> String {
        format!("{:?} is nearly equal to {:?}.", self.lhs, self.rhs)
    }
}

/// Checks that a float lies within a range whose bounds are widened by a
/// tolerance.
pub struct WithinRange {
    lower: f64,
    value: f64,
    upper: f64,
    tolerance: f64,
}

/// Checks that `value` lies within `[lower - tolerance, upper + tolerance]`
/// with the default tolerance.
pub fn within_range(lower: f64, value: f64, upper: f64) -> WithinRange {
    WithinRange {
        lower,
        value,
        upper,
        tolerance: DEFAULT_TOLERANCE,
    }
}

impl WithinRange {
    /// Override the tolerance of the comparison.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Check for WithinRange {
    fn evaluate(&mut self) -> bool {
        self.lower - self.tolerance <= self.value && self.value <= self.upper + self.tolerance
    }

    fn fail_message(&self) -> String {
        format!(
            "{:?} is not within the range of {:?}, {:?} within {:?}.",
            self.value, self.lower, self.upper, self.tolerance
        )
    }
}
