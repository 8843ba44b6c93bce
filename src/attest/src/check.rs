//! Plain assertion checks.
//!
//! A [`Check`] is anything an assertion site can evaluate: the comparison
//! checks defined here, the approximate float checks in [`approx`], and
//! match expressions built with [`that`](crate::matching::builder::that).
//! Checks compose their own failure text; an optional user message is
//! attached with [`CheckExt::msg`].

use std::any::Any;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub mod approx;

/// A single evaluable assertion.
pub trait Check {
    /// Evaluate the check, consuming whatever one-shot state it carries.
    fn evaluate(&mut self) -> bool;

    /// The text to report when the evaluation failed.
    fn fail_message(&self) -> String;

    /// An optional user-supplied message describing the expectation.
    fn message(&self) -> Option<&str> {
        None
    }
}

/// Attaching a user message to any check.
pub trait CheckExt: Check + Sized {
    /// Wrap the check with a message reported alongside its failure text.
    fn msg(self, message: impl Into<String>) -> WithMessage<Self> {
        WithMessage {
            check: self,
            message: message.into(),
        }
    }
}

impl<C: Check> CheckExt for C {}

/// A check carrying a user-supplied message.
pub struct WithMessage<C> {
    check: C,
    message: String,
}

impl<C: Check> Check for WithMessage<C> {
    fn evaluate(&mut self) -> bool {
        self.check.evaluate()
    }

    fn fail_message(&self) -> String {
        self.check.fail_message()
    }

    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

// Comparison checks
// =================

macro_rules! comparison {
    ($(#[$docs:meta])* $fn_name:ident, $name:ident, $bound:ident, $op:tt, $text:literal) => {
        $(#[$docs])*
        pub struct $name<T> {
            lhs: T,
            rhs: T,
        }

        $(#[$docs])*
        pub fn $fn_name<T>(lhs: T, rhs: T) -> $name<T>
        where
            T: $bound + Debug,
        {
            $name { lhs, rhs }
        }

        impl<T> Check for $name<T>
        where
            T: $bound + Debug,
        {
            fn evaluate(&mut self) -> bool {
                self.lhs $op self.rhs
            }

            fn fail_message(&self) -> String {
                format!(concat!("{:?} ", $text, " {:?}."), self.lhs, self.rhs)
            }
        }
    };
}

comparison! {
    /// Checks that two values are equal.
    equal, Equal, PartialEq, ==, "is not equal to"
}
comparison! {
    /// Checks that two values are not equal.
    not_equal, NotEqual, PartialEq, !=, "is equal to"
}
comparison! {
    /// Checks that `lhs` is less than `rhs`.
    less, Less, PartialOrd, <, "is not less than"
}
comparison! {
    /// Checks that `lhs` is less than or equal to `rhs`.
    less_equal, LessEqual, PartialOrd, <=, "is not less than or equal to"
}
comparison! {
    /// Checks that `lhs` is greater than `rhs`.
    greater, Greater, PartialOrd, >, "is not greater than"
}
comparison! {
    /// Checks that `lhs` is greater than or equal to `rhs`.
    greater_equal, GreaterEqual, PartialOrd, >=, "is not greater than or equal to"
}

/// Checks that a value lies within a range with independently inclusive or
/// exclusive bounds.
pub struct Range<T> {
    lower: T,
    lower_included: bool,
    value: T,
    upper: T,
    upper_included: bool,
}

/// Checks that `value` lies within the range from `lower` to `upper`, with
/// each bound included or excluded as flagged.
pub fn range<T>(lower: T, lower_included: bool, value: T, upper: T, upper_included: bool) -> Range<T>
where
    T: PartialOrd + Debug,
{
    Range {
        lower,
        lower_included,
        value,
        upper,
        upper_included,
    }
}

/// Checks that `value` lies within `[lower, upper]`.
pub fn inclusive_range<T>(lower: T, value: T, upper: T) -> Range<T>
where
    T: PartialOrd + Debug,
{
    range(lower, true, value, upper, true)
}

/// Checks that `value` lies within `(lower, upper)`.
pub fn exclusive_range<T>(lower: T, value: T, upper: T) -> Range<T>
where
    T: PartialOrd + Debug,
{
    range(lower, false, value, upper, false)
}

impl<T> Check for Range<T>
where
    T: PartialOrd + Debug,
{
    fn evaluate(&mut self) -> bool {
        let above = if self.lower_included {
            self.lower <= self.value
        } else {
            self.lower < self.value
        };
        let below = if self.upper_included {
            self.value <= self.upper
        } else {
            self.value < self.upper
        };
        above && below
    }

    fn fail_message(&self) -> String {
        let bounds = match (self.lower_included, self.upper_included) {
            (true, true) => "inclusive",
            (false, false) => "exclusive",
            (true, false) => "inclusive, exclusive",
            (false, true) => "exclusive, inclusive",
        };
        format!(
            "{:?} is not within the range of {:?}, {:?} ({bounds}).",
            self.value, self.lower, self.upper
        )
    }
}

/// Checks that a boolean result is true.
pub struct Value {
    value: bool,
}

/// Checks that `value` is true.
pub fn value(value: bool) -> Value {
    Value { value }
}

impl Check for Value {
    fn evaluate(&mut self) -> bool {
        self.value
    }

    fn fail_message(&self) -> String {
        String::from("Result evaluated to false.")
    }
}

// Panic checks
// ============

type PanicBody = Option<Box<dyn FnOnce()>>;

fn take_body(body: &mut PanicBody) -> Box<dyn FnOnce()> {
    body.take().expect("a panic check evaluates its body once")
}

/// Checks that the body panics with any payload.
pub struct Panics {
    body: PanicBody,
}

/// Checks that `body` panics.
pub fn panics(body: impl FnOnce() + 'static) -> Panics {
    Panics {
        body: Some(Box::new(body)),
    }
}

impl Check for Panics {
    fn evaluate(&mut self) -> bool {
        catch_unwind(AssertUnwindSafe(take_body(&mut self.body))).is_err()
    }

    fn fail_message(&self) -> String {
        String::from("The expression did not produce any panic.")
    }
}

/// Checks that the body panics with a payload of type `E`.
pub struct PanicsWith<E> {
    body: PanicBody,
    wrong_payload: bool,
    _payload: PhantomData<E>,
}

/// Checks that `body` panics with a payload downcastable to `E`.
///
/// Note that `panic!` with a formatting string produces a `String` payload
/// while `panic!` with a bare literal produces a `&'static str` payload.
pub fn panics_with<E: Any>(body: impl FnOnce() + 'static) -> PanicsWith<E> {
    PanicsWith {
        body: Some(Box::new(body)),
        wrong_payload: false,
        _payload: PhantomData,
    }
}

impl<E: Any> Check for PanicsWith<E> {
    fn evaluate(&mut self) -> bool {
        match catch_unwind(AssertUnwindSafe(take_body(&mut self.body))) {
            Err(payload) if payload.is::<E>() => true,
            Err(_) => {
                self.wrong_payload = true;
                false
            }
            Ok(()) => false,
        }
    }

    fn fail_message(&self) -> String {
        if self.wrong_payload {
            format!(
                "The expression produced a panic that was not a(n) {} panic.",
                std::any::type_name::<E>()
            )
        } else {
            String::from("The expression did not produce any panic.")
        }
    }
}

/// Checks that the body runs to completion without panicking.
pub struct NoPanic {
    body: PanicBody,
}

/// Checks that `body` does not panic.
pub fn no_panic(body: impl FnOnce() + 'static) -> NoPanic {
    NoPanic {
        body: Some(Box::new(body)),
    }
}

impl Check for NoPanic {
    fn evaluate(&mut self) -> bool {
        catch_unwind(AssertUnwindSafe(take_body(&mut self.body))).is_ok()
    }

    fn fail_message(&self) -> String {
        String::from("The expression produced a panic.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_messages() {
        let mut check = equal(1, 2);
        assert!(!check.evaluate());
        assert_eq!(check.fail_message(), "1 is not equal to 2.");

        let mut check = not_equal("a", "a");
        assert!(!check.evaluate());
        assert_eq!(check.fail_message(), "\"a\" is equal to \"a\".");

        let mut check = less_equal(3, 2);
        assert!(!check.evaluate());
        assert_eq!(check.fail_message(), "3 is not less than or equal to 2.");

        assert!(less(1, 2).evaluate());
        assert!(greater(2, 1).evaluate());
        assert!(greater_equal(2, 2).evaluate());
    }

    #[test]
    fn range_bounds() {
        assert!(inclusive_range(1, 1, 5).evaluate());
        assert!(inclusive_range(1, 5, 5).evaluate());
        assert!(!exclusive_range(1, 1, 5).evaluate());
        assert!(!exclusive_range(1, 5, 5).evaluate());
        assert!(range(1, true, 1, 5, false).evaluate());
        assert!(range(1, false, 5, 5, true).evaluate());
        assert!(!range(1, false, 1, 5, true).evaluate());

        let mut check = exclusive_range(1, 5, 5);
        check.evaluate();
        assert_eq!(
            check.fail_message(),
            "5 is not within the range of 1, 5 (exclusive)."
        );

        let mut check = range(1, true, 0, 5, false);
        check.evaluate();
        assert_eq!(
            check.fail_message(),
            "0 is not within the range of 1, 5 (inclusive, exclusive)."
        );
    }

    #[test]
    fn boolean_value() {
        assert!(value(true).evaluate());
        let mut check = value(false);
        assert!(!check.evaluate());
        assert_eq!(check.fail_message(), "Result evaluated to false.");
    }

    #[test]
    fn user_message_passes_through() {
        let mut check = equal(1, 2).msg("the counters must agree");
        assert!(!check.evaluate());
        assert_eq!(check.message(), Some("the counters must agree"));
        assert_eq!(check.fail_message(), "1 is not equal to 2.");
    }

    #[test]
    fn panic_checks() {
        assert!(panics(|| panic!("boom")).evaluate());
        assert!(!panics(|| ()).evaluate());
        assert!(no_panic(|| ()).evaluate());
        assert!(!no_panic(|| panic!("boom")).evaluate());
    }

    #[test]
    fn panic_payload_type_is_distinguished() {
        assert!(panics_with::<String>(|| panic!("{}", "boom")).evaluate());

        let mut check = panics_with::<String>(|| panic!("boom"));
        assert!(!check.evaluate());
        assert!(check
            .fail_message()
            .contains("a panic that was not a(n) alloc::string::String panic"));

        let mut check = panics_with::<String>(|| ());
        assert!(!check.evaluate());
        assert_eq!(
            check.fail_message(),
            "The expression did not produce any panic."
        );
    }
}
