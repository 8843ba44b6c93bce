//! The match expression builder.
//!
//! A [`Subject`] pairs the value under test with an ordered list of top-level
//! matcher terms. Terms are introduced with `|` and combined with boolean
//! applications (`&`, `^`, [`and`](Subject::and), [`or`](Subject::or),
//! [`xor`](Subject::xor)), which fold the incoming matcher into the existing
//! terms.
//!
//! A boolean application does more than wrap the last term: the incoming
//! operand may itself carry pending right siblings recorded by `|` deep
//! inside its tree. The application locates the first such node in
//! depth-first, left-first order, splices the subtree it completes into the
//! last term, unfolds the pending siblings into new top-level terms, and
//! re-applies the node's remaining ancestors as further boolean
//! applications. This is what makes
//! `(that(v) | a).and(b | c | d)` read as "a and b, then c, then d".
//!
//! Siblings only unfold through a boolean application on the subject. A
//! matcher operand like `a & (b | c | d)` hides its siblings from the
//! builder, so evaluating a subject that still carries them panics instead
//! of silently skipping the checks.

use std::fmt::Debug;
use std::fmt::Write as _;
use std::ops::{BitAnd, BitOr, BitXor};

use crate::check::Check;

use super::{MatchError, Matcher, MatcherKind};

/// Start a match expression for `value`.
pub fn that<T>(value: T) -> Subject<T> {
    Subject {
        value,
        terms: Vec::new(),
        message: String::new(),
        composable: false,
        error: None,
    }
}

/// A boolean application folding a matcher into a [`Subject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
    Xor,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
        }
    }

    fn kind(self) -> MatcherKind {
        match self {
            Op::And => MatcherKind::And,
            Op::Or => MatcherKind::Or,
            Op::Xor => MatcherKind::Xor,
        }
    }

    /// The composite kinds the pending-right search descends through.
    fn descends(self, kind: MatcherKind) -> bool {
        match self {
            Op::And | Op::Xor => kind == MatcherKind::And,
            Op::Or => kind == MatcherKind::And || kind == MatcherKind::Or,
        }
    }

    fn from_kind(kind: MatcherKind) -> Self {
        match kind {
            MatcherKind::And => Op::And,
            MatcherKind::Or => Op::Or,
            MatcherKind::Xor => Op::Xor,
            MatcherKind::Value | MatcherKind::Not => {
                unreachable!("binary matcher kind expected")
            }
        }
    }
}

/// The result of searching an operand tree for its first pending-right node.
enum Unzip<T> {
    /// No pending rights anywhere; the operand is folded in as a whole.
    Whole(Matcher<T>),
    /// A pending-right node was found.
    Spliced {
        /// The subtree the node completes, extended upward through every
        /// ancestor reached by a right edge.
        tree: Matcher<T>,
        /// The node's pending right siblings, to become top-level terms.
        rights: Vec<Matcher<T>>,
        /// Whether the node's latest `|` attached a matcher.
        composable: bool,
        /// Ancestors entered through their left edge, nearest first; each is
        /// re-applied as a fresh boolean application of its right child.
        continuations: Vec<(Op, Matcher<T>)>,
    },
    /// The pending node sits below both a left edge and a right edge; the
    /// surrounding expression cannot be rebuilt without discarding the
    /// right-edge ancestor's left subtree.
    Tangled,
}

/// Locate the first pending-right node of `node` in depth-first, left-first
/// order, descending only through the composite kinds `op` folds over.
fn unzip<T>(op: Op, mut node: Matcher<T>) -> Unzip<T> {
    if node.has_right() {
        let composable = node.last_expression();
        let rights = node.take_right();
        return Unzip::Spliced {
            tree: node,
            rights,
            composable,
            continuations: Vec::new(),
        };
    }
    if !op.descends(node.kind()) {
        return Unzip::Whole(node);
    }
    let (kind, lhs, rhs, shell) = node.into_parts();
    match unzip(op, lhs) {
        Unzip::Spliced {
            tree,
            rights,
            composable,
            mut continuations,
        } => {
            continuations.push((Op::from_kind(kind), rhs));
            Unzip::Spliced {
                tree,
                rights,
                composable,
                continuations,
            }
        }
        Unzip::Whole(lhs) => match unzip(op, rhs) {
            Unzip::Spliced {
                tree,
                rights,
                composable,
                continuations,
            } => {
                // A right-edge ancestor extends the spliced subtree only as
                // long as the search below it never crossed a left edge;
                // rebuilding across both edge kinds would have to discard
                // this ancestor's left subtree.
                if !continuations.is_empty() {
                    return Unzip::Tangled;
                }
                Unzip::Spliced {
                    tree: Matcher::from_parts(kind, lhs, tree, shell),
                    rights,
                    composable,
                    continuations,
                }
            }
            Unzip::Whole(rhs) => Unzip::Whole(Matcher::from_parts(kind, lhs, rhs, shell)),
            Unzip::Tangled => Unzip::Tangled,
        },
        Unzip::Tangled => Unzip::Tangled,
    }
}

/// Combine `node` and `add` under `kind`, flattening into the rightmost
/// same-kind tail so that repeated applications stay right-leaning instead
/// of nesting leftward.
fn graft<T>(kind: MatcherKind, node: Matcher<T>, add: Matcher<T>) -> Matcher<T> {
    if node.kind() == kind {
        let (_, lhs, rhs, shell) = node.into_parts();
        Matcher::from_parts(kind, lhs, graft(kind, rhs, add), shell)
    } else {
        Matcher::combine(kind, node, add)
    }
}

/// The value under test together with the matcher terms applied to it.
///
/// Every term must match for the subject to match. Created by [`that`].
pub struct Subject<T> {
    value: T,
    terms: Vec<Matcher<T>>,
    message: String,
    /// Whether a boolean application may follow, i.e. the latest `|`
    /// attached a matcher rather than a message.
    composable: bool,
    error: Option<MatchError>,
}

impl<T> Subject<T> {
    /// Fold `matcher` into the last term with AND semantics.
    pub fn and(self, matcher: Matcher<T>) -> Self {
        self.apply(Op::And, matcher)
    }

    /// Fold `matcher` into the last term with OR semantics.
    pub fn or(self, matcher: Matcher<T>) -> Self {
        self.apply(Op::Or, matcher)
    }

    /// Fold `matcher` into the last term with XOR semantics.
    pub fn xor(self, matcher: Matcher<T>) -> Self {
        self.apply(Op::Xor, matcher)
    }

    /// The error that poisoned this subject, if any.
    pub fn error(&self) -> Option<&MatchError> {
        self.error.as_ref()
    }

    /// The number of top-level terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    fn apply(mut self, op: Op, mut operand: Matcher<T>) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.message.push_str(&operand.take_description());
        if !self.composable {
            self.error = Some(MatchError::Malformed(op.name()));
            return self;
        }
        match unzip(op, operand) {
            Unzip::Whole(tree) => {
                self.attach(op, tree);
                self.composable = true;
            }
            Unzip::Spliced {
                tree,
                rights,
                composable,
                continuations,
            } => {
                self.attach(op, tree);
                for mut right in rights {
                    self.message.push_str(&right.take_description());
                    self.terms.push(right);
                }
                self.composable = composable;
                for (next, operand) in continuations {
                    self = self.apply(next, operand);
                }
            }
            Unzip::Tangled => {
                self.error = Some(MatchError::Unspliceable(op.name()));
            }
        }
        self
    }

    fn attach(&mut self, op: Op, tree: Matcher<T>) {
        let last = self
            .terms
            .pop()
            .expect("a composable subject has at least one term");
        self.terms.push(graft(op.kind(), last, tree));
    }
}

impl<T> BitOr<Matcher<T>> for Subject<T> {
    type Output = Subject<T>;

    /// Append `matcher` as a new top-level term.
    fn bitor(mut self, mut matcher: Matcher<T>) -> Subject<T> {
        if self.error.is_some() {
            return self;
        }
        self.message.push_str(&matcher.take_description());
        self.terms.push(matcher);
        self.composable = true;
        self
    }
}

impl<T> BitOr<&str> for Subject<T> {
    type Output = Subject<T>;

    /// Append display text describing the expectation.
    fn bitor(mut self, message: &str) -> Subject<T> {
        self.message.push_str(message);
        self.composable = false;
        self
    }
}

impl<T> BitOr<String> for Subject<T> {
    type Output = Subject<T>;

    fn bitor(self, message: String) -> Subject<T> {
        self | message.as_str()
    }
}

impl<T> BitAnd<Matcher<T>> for Subject<T> {
    type Output = Subject<T>;

    fn bitand(self, matcher: Matcher<T>) -> Subject<T> {
        self.and(matcher)
    }
}

impl<T> BitXor<Matcher<T>> for Subject<T> {
    type Output = Subject<T>;

    fn bitxor(self, matcher: Matcher<T>) -> Subject<T> {
        self.xor(matcher)
    }
}

impl<T: Debug> Check for Subject<T> {
    /// Evaluate every term against the subject value.
    ///
    /// # Panics
    ///
    /// Panics if the expression was malformed, or if a term still carries
    /// `|` siblings that no boolean application consumed; the assertion
    /// site is the right place for a broken expression to fail loudly.
    fn evaluate(&mut self) -> bool {
        if let Some(error) = &self.error {
            panic!("{error}");
        }
        if self.terms.iter().any(Matcher::has_pending_rights) {
            panic!("{}", MatchError::DanglingSibling);
        }
        let value = &self.value;
        let mut success = true;
        for term in &mut self.terms {
            if !term.evaluate(value) {
                success = false;
            }
        }
        success
    }

    fn fail_message(&self) -> String {
        let mut text = format!("{:?} did not match the set conditions.", self.value);
        for (index, term) in self.terms.iter().enumerate() {
            if term.failed() {
                let _ = write!(
                    text,
                    "\n    Condition {} failed: {}",
                    index + 1,
                    term.fail_message()
                );
            }
        }
        text
    }

    fn message(&self) -> Option<&str> {
        if self.message.is_empty() {
            None
        } else {
            Some(&self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::check::Check;
    use crate::matching::{MatchError, Matcher, MatcherKind};

    use super::that;

    fn tag(name: &'static str) -> Matcher<i32> {
        Matcher::value(|_| true, move |_, _| format!("{name} failed."))
    }

    /// Render the tree structure of a matcher for shape assertions.
    fn shape<T>(matcher: Matcher<T>) -> String {
        match matcher.kind() {
            MatcherKind::Value => "v".into(),
            MatcherKind::Not => "!".into(),
            kind => {
                let symbol = match kind {
                    MatcherKind::And => '&',
                    MatcherKind::Or => '|',
                    MatcherKind::Xor => '^',
                    _ => unreachable!(),
                };
                let (_, lhs, rhs, _) = matcher.into_parts();
                format!("({} {symbol} {})", shape(lhs), shape(rhs))
            }
        }
    }

    fn shapes<T>(subject: super::Subject<T>) -> Vec<String> {
        subject.terms.into_iter().map(shape).collect()
    }

    #[test]
    fn and_wraps_the_last_term() {
        let subject = that(4) | tag("a") | tag("b");
        let subject = subject.and(tag("c"));
        assert_eq!(shapes(subject), ["v", "(v & v)"]);
    }

    #[test]
    fn and_flattens_into_the_rightmost_tail() {
        let subject = (that(4) | tag("a")).and(tag("b")).and(tag("c")).and(tag("d"));
        assert_eq!(shapes(subject), ["(v & (v & (v & v)))"]);
    }

    #[test]
    fn or_wraps_an_and_term() {
        let subject = (that(4) | tag("a")).and(tag("b")).or(tag("c"));
        assert_eq!(shapes(subject), ["((v & v) | v)"]);
    }

    #[test]
    fn application_unfolds_pending_siblings_into_terms() {
        let subject = (that(4) | tag("a")).and(tag("b") | tag("c") | tag("d"));
        assert_eq!(shapes(subject), ["(v & v)", "v", "v"]);
    }

    #[test]
    fn application_splices_inside_a_composite_operand() {
        let operand = (tag("x") | tag("p")) & tag("y");
        let subject = (that(4) | tag("a")).and(operand);
        assert_eq!(shapes(subject), ["(v & v)", "(v & v)"]);
    }

    #[test]
    fn right_edge_ancestors_extend_the_spliced_subtree() {
        let operand = tag("m") & (tag("n") | tag("r"));
        let subject = (that(4) | tag("a")).and(operand);
        assert_eq!(shapes(subject), ["(v & (v & v))", "v"]);
    }

    #[test]
    fn application_after_a_message_is_malformed() {
        let subject = (that(4) | tag("a") | "must hold").and(tag("b"));
        assert_eq!(subject.error(), Some(&MatchError::Malformed("and")));
    }

    #[test]
    fn application_without_a_term_is_malformed() {
        let subject = that(4).or(tag("a"));
        assert_eq!(subject.error(), Some(&MatchError::Malformed("or")));
    }

    #[test]
    #[should_panic(expected = "malformed matcher expression")]
    fn evaluating_a_malformed_subject_panics() {
        let mut subject = that(4).and(tag("a"));
        subject.evaluate();
    }

    #[test]
    fn unreachable_nested_siblings_poison_the_subject() {
        // The pending node under q sits below a left edge, with a
        // right-edge ancestor above it holding p.
        let operand = tag("p") & ((tag("q") | tag("r")) & tag("s"));
        let subject = (that(4) | tag("a")).and(operand);
        assert_eq!(subject.error(), Some(&MatchError::Unspliceable("and")));
    }

    #[test]
    fn messages_accumulate_without_duplication() {
        let described = tag("a") | "first" | tag("b");
        let subject = (that(4) | described).and(tag("c") | " second");
        assert_eq!(subject.message(), Some("first second"));
    }

    #[test]
    fn evaluation_reports_every_failing_term() {
        let failing = |name: &'static str| {
            Matcher::<i32>::value(|_| false, move |_, _| format!("{name} failed."))
        };
        let mut subject = (that(4) | failing("a") | tag("ok")).and(failing("b") | failing("c"));
        assert!(!subject.evaluate());
        assert_eq!(
            subject.fail_message(),
            indoc::indoc! {"
                4 did not match the set conditions.
                    Condition 1 failed: a failed.
                    Condition 2 failed: ... (AND) b failed.
                    Condition 3 failed: c failed."}
        );
    }
}
