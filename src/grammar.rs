//! The Paper grammar, defined purely in terms of the combinator engine.
//!
//! A program is one or more lines of expressions separated by linebreaks. At
//! each position the token alternatives are tried in a fixed order, so the
//! more specific forms must precede the general ones: the bare-character
//! `instruction` fallback is gated by a negative lookahead over every other
//! token class, which guarantees the alternatives partition the character
//! space with no overlap.

use miette::SourceSpan;

use crate::ast::{Clause, Node, Program};
use crate::combinators::{
    self, any, char, choice, digit, lazy, not, optional, sequence, some, Expression, Match, Parsed,
};
use crate::errors::{ErrorKind, PaperError, SourceContext};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse Paper source text into a [`Program`].
///
/// Succeeds only when the whole input is consumed. Driver failures come back
/// as a [`PaperError`] whose span points at the offset where parsing stopped.
pub fn parse(source_text: &str, source_context: SourceContext) -> Result<Program, PaperError> {
    match combinators::parse(&program(), source_text) {
        Ok(value) => Ok(build_program(value)),
        Err(kind) => {
            let span = error_span(source_text, &kind);
            Err(source_context.report(kind, span))
        }
    }
}

/// The top-level program expression:
/// `program := line (linebreak+ line)*` with `line := expression+`.
pub fn program() -> Expression {
    sequence(vec![
        some(expression()),
        optional(some(sequence(vec![linebreak(), some(expression())]))),
    ])
}

// ============================================================================
// TOKEN ALTERNATIVES
// ============================================================================

/// One Paper expression. Ordered choice: literals and block openers claim
/// their characters before the instruction fallback may.
fn expression() -> Expression {
    choice(vec![
        string_literal(),
        char_literal(),
        integer_literal(),
        digit_literal(),
        map_block(),
        repeat_block(),
        decision_block(),
        block_literal(),
        instruction(),
    ])
    .named("expression")
}

/// One or more `\n`/`\r` characters, collapsed as a unit.
fn linebreak() -> Expression {
    some(choice(vec![char('\n'), char('\r')])).named("linebreak")
}

/// `"` then zero or more non-quote characters then `"`.
fn string_literal() -> Expression {
    sequence(vec![
        char('"'),
        optional(some(sequence(vec![not(char('"')), any()]))),
        char('"'),
    ])
    .map("string_literal", |value| {
        let mut text = String::new();
        if let Some(Parsed::Seq(pairs)) = seq_items(value).into_iter().nth(1) {
            for pair in pairs {
                if let Some(Parsed::Char(c)) = seq_items(pair).into_iter().nth(1) {
                    text.push(c);
                }
            }
        }
        Parsed::Node(Node::StringLiteral(text))
    })
}

/// `'` followed by exactly one character, as a length-1 string literal.
fn char_literal() -> Expression {
    sequence(vec![char('\''), any()]).map("char_literal", |value| {
        match seq_items(value).into_iter().nth(1) {
            Some(Parsed::Char(c)) => Parsed::Node(Node::StringLiteral(c.to_string())),
            // char(any) always captures exactly one character.
            other => unreachable!("char_literal yielded {other:?}"),
        }
    })
}

/// `#` followed by one or more digits. A digit run whose value does not fit
/// an `i64` is not a match.
fn integer_literal() -> Expression {
    let body = sequence(vec![char('#'), some(digit())]);
    Expression::new("integer_literal", move |source, pos| {
        Ok(body
            .apply(source, pos)?
            .into_iter()
            .filter_map(|m| {
                let digits = match seq_items(m.value).into_iter().nth(1) {
                    Some(Parsed::Seq(digits)) => digits,
                    _ => Vec::new(),
                };
                fold_digits(digits).map(|n| Match {
                    value: Parsed::Node(Node::IntegerLiteral(n)),
                    pos: m.pos,
                })
            })
            .collect())
    })
}

/// A single bare digit as an integer literal.
fn digit_literal() -> Expression {
    digit().map("digit_literal", |value| {
        let n = match value {
            Parsed::Char(c) => c.to_digit(10).map_or(0, i64::from),
            _ => 0,
        };
        Parsed::Node(Node::IntegerLiteral(n))
    })
}

fn map_block() -> Expression {
    block('M').map("map_block", |value| {
        Parsed::Node(Node::MapBlock(block_clauses(value)))
    })
}

fn repeat_block() -> Expression {
    block('R').map("repeat_block", |value| {
        Parsed::Node(Node::RepeatBlock(block_clauses(value)))
    })
}

fn decision_block() -> Expression {
    block('?').map("decision_block", |value| {
        Parsed::Node(Node::DecisionBlock(block_clauses(value)))
    })
}

fn block_literal() -> Expression {
    block('{').map("block_literal", |value| {
        Parsed::Node(Node::BlockLiteral(block_clauses(value)))
    })
}

/// Marker, one or more expressions, zero or more `|`-prefixed clauses, `}`.
/// Block contents are `some`, not `optional`: a block must contain at least
/// one expression per clause.
fn block(marker: char) -> Expression {
    sequence(vec![
        char(marker),
        some(lazy("expression", expression)),
        optional(some(sequence(vec![
            char('|'),
            some(lazy("expression", expression)),
        ]))),
        char('}'),
    ])
}

/// Fallback: any single character that no other token class claims.
fn instruction() -> Expression {
    sequence(vec![
        not(choice(vec![
            char('M'),
            char('R'),
            char('?'),
            char('{'),
            char('|'),
            char('}'),
            char('"'),
            char('\''),
            char('#'),
            digit(),
            char('\n'),
            char('\r'),
        ])),
        any(),
    ])
    .map("instruction", |value| {
        match seq_items(value).into_iter().nth(1) {
            Some(Parsed::Char(c)) => Parsed::Node(Node::Instruction(c)),
            // The gate is zero-width, so the second element is the character.
            other => unreachable!("instruction yielded {other:?}"),
        }
    })
}

// ============================================================================
// MATCH VALUE UNWRAPPING
// ============================================================================

fn seq_items(value: Parsed) -> Vec<Parsed> {
    match value {
        Parsed::Seq(items) => items,
        // `sequence` and `some` always wrap their results in a Seq value.
        other => unreachable!("expected a sequence value, found {other:?}"),
    }
}

/// Folds a digit run into an integer. `None` when the value overflows `i64`.
fn fold_digits(digits: Vec<Parsed>) -> Option<i64> {
    digits
        .into_iter()
        .filter_map(|v| match v {
            Parsed::Char(c) => c.to_digit(10),
            _ => None,
        })
        .try_fold(0_i64, |acc, d| {
            acc.checked_mul(10)?.checked_add(i64::from(d))
        })
}

/// Flatten the raw program match value into ordered lines of nodes.
/// Shape: `Seq([first_line, Null | Seq(Seq([linebreak, line])...)])`.
fn build_program(value: Parsed) -> Program {
    let mut parts = seq_items(value).into_iter();
    let mut lines = vec![line_nodes(parts.next())];
    if let Some(Parsed::Seq(groups)) = parts.next() {
        for group in groups {
            lines.push(line_nodes(seq_items(group).into_iter().nth(1)));
        }
    }
    Program { lines }
}

fn line_nodes(value: Option<Parsed>) -> Vec<Node> {
    match value {
        Some(Parsed::Seq(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Parsed::Node(node) => Some(node),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn block_clauses(value: Parsed) -> Vec<Clause> {
    let mut parts = seq_items(value).into_iter();
    parts.next(); // marker character
    let mut clauses = vec![line_nodes(parts.next())];
    if let Some(Parsed::Seq(groups)) = parts.next() {
        for group in groups {
            clauses.push(line_nodes(seq_items(group).into_iter().nth(1)));
        }
    }
    clauses
}

fn error_span(source: &str, kind: &ErrorKind) -> SourceSpan {
    match kind {
        ErrorKind::NoContentParsed => (0, 0).into(),
        ErrorKind::UnconsumedInput { rest } | ErrorKind::SequenceElementFailed { rest, .. } => {
            let start = source.len().saturating_sub(rest.len());
            (start, rest.len()).into()
        }
    }
}
