//! The builtin matcher library.
//!
//! Each function returns a fresh [`Matcher`] leaf. Matchers are generic over
//! the subject type where the check itself is generic; the float
//! classification matchers work for any type with IEEE-style division
//! semantics, and the collection matchers accept anything that exposes a
//! slice.

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::fmt::Write as _;
use std::ops::{Div, Rem};
use std::rc::Rc;

use super::Matcher;

// Scalar matchers
// ===============

/// Matches values inside the inclusive range `[lower, upper]`.
pub fn in_range<T>(lower: T, upper: T) -> Matcher<T>
where
    T: PartialOrd + Debug + Clone + 'static,
{
    let (lo, hi) = (lower.clone(), upper.clone());
    Matcher::value(
        move |value: &T| lo <= *value && *value <= hi,
        move |value, _| format!("{value:?} is not in the range of {lower:?}, {upper:?}."),
    )
}

/// Matches even values.
pub fn is_even<T>() -> Matcher<T>
where
    T: Copy + Debug + Rem<Output = T> + PartialEq + From<u8> + 'static,
{
    Matcher::value(
        |value: &T| *value % T::from(2u8) == T::from(0u8),
        |value, _| format!("{value:?} is not even."),
    )
}

// Option matchers
// ===============

/// Matches `None`.
pub fn is_none<T: Debug + 'static>() -> Matcher<Option<T>> {
    Matcher::value(
        |value: &Option<T>| value.is_none(),
        |value, _| format!("{value:?} is not None."),
    )
}

/// Matches `Some(_)`.
pub fn is_some<T: Debug + 'static>() -> Matcher<Option<T>> {
    Matcher::value(
        |value: &Option<T>| value.is_some(),
        |_, _| String::from("the value is None."),
    )
}

// Float classification matchers
// =============================
//
// NaN is the unique value that differs from itself, and `v / v` is NaN
// exactly when `v` is NaN or infinite (and for signed zero). This keeps the
// matchers generic over `f32`, `f64` and wrappers with the same division
// semantics, at the cost of classifying zero as non-finite.

/// Matches NaN values.
pub fn is_nan<T>() -> Matcher<T>
where
    T: Copy + PartialEq + Debug + 'static,
{
    Matcher::value(
        |value: &T| *value != *value,
        |value, _| format!("{value:?} is not NaN."),
    )
}

/// Matches anything except NaN.
pub fn is_not_nan<T>() -> Matcher<T>
where
    T: Copy + PartialEq + Debug + 'static,
{
    Matcher::value(
        |value: &T| *value == *value,
        |value, _| format!("{value:?} is NaN."),
    )
}

/// Matches non-zero finite values.
pub fn is_finite<T>() -> Matcher<T>
where
    T: Copy + PartialEq + Div<Output = T> + Debug + 'static,
{
    Matcher::value(
        |value: &T| {
            let ratio = *value / *value;
            *value == *value && ratio == ratio
        },
        |value, _| format!("{value:?} is not finite."),
    )
}

/// Matches positive or negative infinity.
pub fn is_infinite<T>() -> Matcher<T>
where
    T: Copy + PartialEq + Div<Output = T> + Debug + 'static,
{
    Matcher::value(
        |value: &T| {
            let ratio = *value / *value;
            *value == *value && ratio != ratio
        },
        |value, _| format!("{value:?} is not infinite."),
    )
}

// Collection matchers
// ===================

/// Matches collections in which every element satisfies the predicate. The
/// explanation lists the failing indices, truncated after eleven entries.
pub fn each<C, E>(predicate: impl Fn(&E) -> bool + 'static) -> Matcher<C>
where
    C: AsRef<[E]> + 'static,
    E: 'static,
{
    let predicate = Rc::new(predicate);
    let explain_predicate = Rc::clone(&predicate);
    Matcher::value(
        move |value: &C| value.as_ref().iter().all(|item| predicate(item)),
        move |value, _| {
            let mut text = String::from("Element(s) ");
            let mut count = 0;
            for (index, item) in value.as_ref().iter().enumerate() {
                if explain_predicate(item) {
                    continue;
                }
                if count > 10 {
                    text.push_str(" ...");
                    break;
                }
                if count > 0 {
                    text.push_str(", ");
                }
                let _ = write!(text, "{index}");
                count += 1;
            }
            text.push_str(" did not match.");
            text
        },
    )
}

/// Matches collections with exactly `count` elements satisfying the
/// predicate. The explanation reports the actual count.
pub fn has<C, E>(predicate: impl Fn(&E) -> bool + 'static, count: usize) -> Matcher<C>
where
    C: AsRef<[E]> + 'static,
    E: 'static,
{
    let predicate = Rc::new(predicate);
    let explain_predicate = Rc::clone(&predicate);
    Matcher::value(
        move |value: &C| value.as_ref().iter().filter(|item| predicate(item)).count() == count,
        move |value, _| {
            let actual = value
                .as_ref()
                .iter()
                .filter(|item| explain_predicate(item))
                .count();
            format!("expected {count} matching elements, found {actual}.")
        },
    )
}

/// Matches collections containing at least one element satisfying the
/// predicate. On success the explanation names the first matching index.
pub fn contains<C, E>(predicate: impl Fn(&E) -> bool + 'static) -> Matcher<C>
where
    C: AsRef<[E]> + 'static,
    E: 'static,
{
    let predicate = Rc::new(predicate);
    let explain_predicate = Rc::clone(&predicate);
    Matcher::value(
        move |value: &C| value.as_ref().iter().any(|item| predicate(item)),
        move |value, success| {
            if success {
                let index = value
                    .as_ref()
                    .iter()
                    .position(|item| explain_predicate(item))
                    .unwrap_or_default();
                format!("the element at index {index} matches.")
            } else {
                String::from("no element matches the given condition.")
            }
        },
    )
}

// String matchers
// ===============

/// Matches strings starting with the given prefix.
pub fn begins_with<S>(prefix: impl Into<String>) -> Matcher<S>
where
    S: AsRef<str> + Debug + 'static,
{
    let prefix = prefix.into();
    Matcher::value(
        {
            let prefix = prefix.clone();
            move |value: &S| value.as_ref().starts_with(&prefix)
        },
        move |value, _| format!("{value:?} does not begin with {prefix:?}."),
    )
}

/// Matches strings ending with the given suffix.
pub fn ends_with<S>(suffix: impl Into<String>) -> Matcher<S>
where
    S: AsRef<str> + Debug + 'static,
{
    let suffix = suffix.into();
    Matcher::value(
        {
            let suffix = suffix.clone();
            move |value: &S| value.as_ref().ends_with(&suffix)
        },
        move |value, _| format!("{value:?} does not end with {suffix:?}."),
    )
}

/// Matches strings containing the given substring.
pub fn contains_str<S>(needle: impl Into<String>) -> Matcher<S>
where
    S: AsRef<str> + Debug + 'static,
{
    let needle = needle.into();
    Matcher::value(
        {
            let needle = needle.clone();
            move |value: &S| value.as_ref().contains(&needle)
        },
        move |value, _| format!("{value:?} does not contain {needle:?}."),
    )
}

// Type matchers
// =============

/// Matches boxed values whose concrete runtime type is exactly `U`.
pub fn is_a<U: Any>() -> Matcher<Box<dyn Any>> {
    Matcher::value(
        |value: &Box<dyn Any>| (**value).type_id() == TypeId::of::<U>(),
        |_, _| {
            format!(
                "the value is not a(n) {}.",
                std::any::type_name::<U>()
            )
        },
    )
}
