//! Matcher expressions: composable boolean conditions over a subject value.
//!
//! A [`Matcher`] is one node of an expression tree. Leaf nodes carry a
//! predicate and an explanation function; composite nodes combine two
//! children with AND/OR/XOR semantics, or negate a single child. Trees are
//! built bottom-up with single ownership: a composite always owns its
//! children, so no reference counting is needed and teardown is automatic.
//!
//! Matchers compose with the `&`, `^` and `!` operators. The `|` operator
//! has two roles taken from the chain syntax: piping another matcher records
//! it as a *pending right sibling* (a follow-up check that the
//! [`Subject`](crate::matching::builder::Subject) unfolds into its own
//! top-level term when a boolean application consumes this node), and piping
//! a string appends display text to the node.

use std::fmt::Write as _;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use thiserror::Error;

pub mod builder;
pub mod matchers;

// Errors
// ======

/// Errors raised while assembling a matcher chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A boolean operator was applied while the chain was not composable,
    /// i.e. the most recent `|` attached a plain message, not a matcher.
    #[error("malformed matcher expression: `{0}` must follow a matcher, not a message")]
    Malformed(&'static str),
    /// A `|` sibling was recorded but never folded in by a boolean
    /// application; evaluating the expression would silently skip it.
    #[error("malformed matcher expression: a `|` sibling was never applied; chain it on the subject or combine it with a boolean operator")]
    DanglingSibling,
    /// The pending node of a `|` chain sits where the splicing rewrite
    /// cannot reach it without discarding part of the expression.
    #[error("malformed matcher expression: a `|` chain is nested too deeply for `{0}` to splice; regroup the expression")]
    Unspliceable(&'static str),
}

// Data model
// ==========

/// The discriminant of a [`Matcher`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Value,
    Not,
    And,
    Or,
    Xor,
}

type Predicate<T> = Box<dyn Fn(&T) -> bool>;
type Explain<T> = Box<dyn Fn(&T, bool) -> String>;

/// Runs a value node's cleanup callback exactly once, when the node (or the
/// tree containing it) is dropped.
struct CleanupGuard(Option<Box<dyn FnOnce()>>);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Some(cleanup) = self.0.take() {
            cleanup();
        }
    }
}

enum Payload<T> {
    Value {
        predicate: Predicate<T>,
        explain: Explain<T>,
        cleanup: CleanupGuard,
    },
    Not(Box<Matcher<T>>),
    And(Box<Matcher<T>>, Box<Matcher<T>>),
    Or(Box<Matcher<T>>, Box<Matcher<T>>),
    Xor(Box<Matcher<T>>, Box<Matcher<T>>),
}

/// The cached result of evaluating a node against a subject. Composite
/// nodes only compose an explanation for failures; a leaf caches whatever
/// its explanation function produced for the result.
struct Outcome {
    success: bool,
    explanation: String,
}

/// Fields of a composite node besides its children, detached during
/// tree rewriting and restored when the node is reassembled.
pub(crate) struct Shell {
    message: String,
    message_taken: bool,
    last_expression: bool,
}

/// One evaluable condition over a subject value of type `T`.
pub struct Matcher<T> {
    payload: Payload<T>,
    /// Display text accumulated from `| "text"` applications.
    message: String,
    /// Matcher terms attached via `|`, waiting to be unfolded into separate
    /// top-level terms by the next boolean application.
    right: Vec<Matcher<T>>,
    has_right: bool,
    /// Whether the most recent `|` attached a matcher (true) or a plain
    /// message (false).
    last_expression: bool,
    message_taken: bool,
    outcome: Option<Outcome>,
}

impl<T> Matcher<T> {
    /// Create a leaf node from a predicate and an explanation function.
    ///
    /// The explanation function receives the subject and the cached success
    /// flag of the evaluation it explains.
    pub fn value(
        predicate: impl Fn(&T) -> bool + 'static,
        explain: impl Fn(&T, bool) -> String + 'static,
    ) -> Self {
        Self::new(Payload::Value {
            predicate: Box::new(predicate),
            explain: Box::new(explain),
            cleanup: CleanupGuard(None),
        })
    }

    /// Attach a cleanup callback to a leaf node. The callback runs exactly
    /// once, when the node is dropped. Has no effect on composite nodes.
    pub fn with_cleanup(mut self, cleanup: impl FnOnce() + 'static) -> Self {
        if let Payload::Value { cleanup: guard, .. } = &mut self.payload {
            guard.0 = Some(Box::new(cleanup));
        }
        self
    }

    fn new(payload: Payload<T>) -> Self {
        Self {
            payload,
            message: String::new(),
            right: Vec::new(),
            has_right: false,
            last_expression: true,
            message_taken: false,
            outcome: None,
        }
    }

    pub(crate) fn combine(kind: MatcherKind, lhs: Matcher<T>, rhs: Matcher<T>) -> Self {
        let payload = match kind {
            MatcherKind::And => Payload::And(Box::new(lhs), Box::new(rhs)),
            MatcherKind::Or => Payload::Or(Box::new(lhs), Box::new(rhs)),
            MatcherKind::Xor => Payload::Xor(Box::new(lhs), Box::new(rhs)),
            MatcherKind::Value | MatcherKind::Not => {
                unreachable!("combine requires a binary matcher kind")
            }
        };
        Self::new(payload)
    }

    pub fn kind(&self) -> MatcherKind {
        match self.payload {
            Payload::Value { .. } => MatcherKind::Value,
            Payload::Not(_) => MatcherKind::Not,
            Payload::And(..) => MatcherKind::And,
            Payload::Or(..) => MatcherKind::Or,
            Payload::Xor(..) => MatcherKind::Xor,
        }
    }

    pub fn has_right(&self) -> bool {
        self.has_right
    }

    pub fn last_expression(&self) -> bool {
        self.last_expression
    }

    /// Detach the pending right siblings accumulated via `|`.
    pub(crate) fn take_right(&mut self) -> Vec<Matcher<T>> {
        self.has_right = false;
        std::mem::take(&mut self.right)
    }

    /// Whether this subtree still carries `|` siblings that no boolean
    /// application has consumed. Such siblings would never be evaluated.
    pub(crate) fn has_pending_rights(&self) -> bool {
        if !self.right.is_empty() {
            return true;
        }
        match &self.payload {
            Payload::Value { .. } => false,
            Payload::Not(child) => child.has_pending_rights(),
            Payload::And(lhs, rhs) | Payload::Or(lhs, rhs) | Payload::Xor(lhs, rhs) => {
                lhs.has_pending_rights() || rhs.has_pending_rights()
            }
        }
    }

    /// Collect the display text of this subtree, once. Repeated calls return
    /// an empty string so that shared description fragments are never
    /// reported twice.
    pub(crate) fn take_description(&mut self) -> String {
        if self.message_taken {
            return String::new();
        }
        self.message_taken = true;
        let own = self.message.clone();
        match &mut self.payload {
            Payload::Value { .. } | Payload::Not(_) => own,
            Payload::And(lhs, rhs) | Payload::Or(lhs, rhs) | Payload::Xor(lhs, rhs) => {
                let mut text = lhs.take_description();
                text.push_str(&own);
                text.push_str(&rhs.take_description());
                text
            }
        }
    }

    /// Decompose a binary node into its kind, children and remaining fields.
    pub(crate) fn into_parts(self) -> (MatcherKind, Matcher<T>, Matcher<T>, Shell) {
        let kind = self.kind();
        let shell = Shell {
            message: self.message,
            message_taken: self.message_taken,
            last_expression: self.last_expression,
        };
        match self.payload {
            Payload::And(lhs, rhs) | Payload::Or(lhs, rhs) | Payload::Xor(lhs, rhs) => {
                (kind, *lhs, *rhs, shell)
            }
            Payload::Value { .. } | Payload::Not(_) => {
                unreachable!("into_parts requires a binary matcher kind")
            }
        }
    }

    /// Reassemble a binary node previously taken apart by [`into_parts`].
    ///
    /// [`into_parts`]: Matcher::into_parts
    pub(crate) fn from_parts(
        kind: MatcherKind,
        lhs: Matcher<T>,
        rhs: Matcher<T>,
        shell: Shell,
    ) -> Self {
        let mut node = Self::combine(kind, lhs, rhs);
        node.message = shell.message;
        node.message_taken = shell.message_taken;
        node.last_expression = shell.last_expression;
        node
    }

    // Evaluation
    // ==========

    /// Evaluate the node against a subject, caching the result and (on
    /// failure) the composed explanation. Composite evaluation is
    /// left-to-right with AND/OR short-circuiting; XOR always evaluates both
    /// children.
    pub fn evaluate(&mut self, value: &T) -> bool {
        let (success, explanation) = match &mut self.payload {
            Payload::Value {
                predicate, explain, ..
            } => {
                let success = predicate(value);
                (success, explain(value, success))
            }
            Payload::Not(child) => {
                if child.evaluate(value) {
                    (false, String::from("(NOT: result true.)"))
                } else {
                    (true, String::new())
                }
            }
            Payload::And(lhs, rhs) => {
                if !lhs.evaluate(value) {
                    // The right side was never evaluated.
                    (false, format!("{} (AND) ...", lhs.fail_message()))
                } else if !rhs.evaluate(value) {
                    (false, format!("... (AND) {}", rhs.fail_message()))
                } else {
                    (true, String::new())
                }
            }
            Payload::Or(lhs, rhs) => {
                if lhs.evaluate(value) || rhs.evaluate(value) {
                    (true, String::new())
                } else {
                    let mut text = String::new();
                    let _ = write!(text, "{} (OR) {}", lhs.fail_message(), rhs.fail_message());
                    (false, text)
                }
            }
            Payload::Xor(lhs, rhs) => {
                let left = lhs.evaluate(value);
                let right = rhs.evaluate(value);
                if !left && !right {
                    let mut text = String::new();
                    let _ = write!(text, "{} (XOR) {}", lhs.fail_message(), rhs.fail_message());
                    (false, text)
                } else if left && right {
                    (false, String::from("(XOR: both succeeded.)"))
                } else {
                    (true, String::new())
                }
            }
        };
        self.outcome = Some(Outcome {
            success,
            explanation,
        });
        success
    }

    /// The explanation cached by a failed [`evaluate`](Matcher::evaluate).
    ///
    /// # Panics
    ///
    /// Explanations exist only for failed evaluations; requesting one before
    /// evaluating, or after a successful evaluation, is a bug in the caller
    /// and panics.
    pub fn fail_message(&self) -> &str {
        let outcome = self
            .outcome
            .as_ref()
            .expect("fail message requested before evaluation");
        assert!(
            !outcome.success,
            "fail message requested for a matcher that succeeded"
        );
        &outcome.explanation
    }

    /// Whether the node was evaluated and failed.
    pub(crate) fn failed(&self) -> bool {
        self.outcome.as_ref().is_some_and(|outcome| !outcome.success)
    }
}

// Operators
// =========

impl<T> BitOr for Matcher<T> {
    type Output = Matcher<T>;

    /// Record `other` as a pending right sibling of this node.
    fn bitor(mut self, other: Matcher<T>) -> Matcher<T> {
        self.right.push(other);
        self.last_expression = true;
        self.has_right = true;
        self
    }
}

impl<T> BitOr<&str> for Matcher<T> {
    type Output = Matcher<T>;

    /// Append display text to this node.
    fn bitor(mut self, message: &str) -> Matcher<T> {
        self.message.push_str(message);
        self.last_expression = false;
        self.has_right = true;
        self
    }
}

impl<T> BitOr<String> for Matcher<T> {
    type Output = Matcher<T>;

    fn bitor(self, message: String) -> Matcher<T> {
        self | message.as_str()
    }
}

impl<T> BitAnd for Matcher<T> {
    type Output = Matcher<T>;

    fn bitand(self, other: Matcher<T>) -> Matcher<T> {
        Matcher::combine(MatcherKind::And, self, other)
    }
}

impl<T> BitXor for Matcher<T> {
    type Output = Matcher<T>;

    fn bitxor(self, other: Matcher<T>) -> Matcher<T> {
        Matcher::combine(MatcherKind::Xor, self, other)
    }
}

impl<T> Not for Matcher<T> {
    type Output = Matcher<T>;

    fn not(self) -> Matcher<T> {
        Matcher::new(Payload::Not(Box::new(self)))
    }
}

impl<T> Matcher<T> {
    /// Combine with `other` into an OR node. The `|` operator is taken by
    /// sibling chaining, so disjunction is spelled as a method.
    pub fn or(self, other: Matcher<T>) -> Matcher<T> {
        Matcher::combine(MatcherKind::Or, self, other)
    }
}
