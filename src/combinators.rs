//! Backtracking parser combinators for the Paper language.
//!
//! An [`Expression`] pairs a pure matching function with a descriptive label
//! used in failure messages. Applying an expression at a position yields a
//! match set: every candidate match pairs a semantic [`Parsed`] value with the
//! offset of the unconsumed remainder. An empty match set means the expression
//! did not match at that position; callers only ever commit to the first
//! candidate of a non-empty set.

use std::fmt;
use std::rc::Rc;

use crate::errors::ErrorKind;

/// Semantic value produced by a successful match.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Char(char),
    Text(String),
    Int(i64),
    Node(crate::ast::Node),
    /// Ordered sub-results of `sequence` and `some`.
    Seq(Vec<Parsed>),
    /// Zero-width result of the `and`/`not` lookaheads.
    Empty,
    /// An `optional` that did not match. Distinct from [`Parsed::Empty`].
    Null,
}

/// A successful match: the parsed value and the offset of the unconsumed
/// remainder within the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub value: Parsed,
    pub pos: usize,
}

/// Ordered candidate matches at a position. Empty means "no match".
pub type Matches = Vec<Match>;

/// Result of applying an expression. `Err` carries a
/// [`ErrorKind::SequenceElementFailed`] raised by a partially matched
/// sequence; only `choice` recovers from it.
pub type MatchResult = Result<Matches, ErrorKind>;

type Matcher = dyn Fn(&str, usize) -> MatchResult;

/// A composable matching expression: a pure function from a source position to
/// a match set, tagged with a label for diagnostics.
///
/// Expressions never mutate shared state and may be applied any number of
/// times with the same input, which is what makes speculative matching in
/// `sequence`/`choice`/`some` safe.
#[derive(Clone)]
pub struct Expression {
    matcher: Rc<Matcher>,
    label: String,
}

impl Expression {
    pub fn new(
        label: impl Into<String>,
        matcher: impl Fn(&str, usize) -> MatchResult + 'static,
    ) -> Self {
        Self {
            matcher: Rc::new(matcher),
            label: label.into(),
        }
    }

    /// The descriptive label used in failure messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Apply this expression to `source` at byte offset `pos`.
    pub fn apply(&self, source: &str, pos: usize) -> MatchResult {
        (self.matcher)(source, pos)
    }

    /// Same matching behavior under a new label.
    pub fn named(self, label: impl Into<String>) -> Self {
        Self {
            matcher: self.matcher,
            label: label.into(),
        }
    }

    /// Same matching behavior, new semantic value and label.
    pub fn map(self, label: impl Into<String>, f: impl Fn(Parsed) -> Parsed + 'static) -> Self {
        Expression::new(label, move |source, pos| {
            Ok(self
                .apply(source, pos)?
                .into_iter()
                .map(|m| Match {
                    value: f(m.value),
                    pos: m.pos,
                })
                .collect())
        })
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DRIVER
// ============================================================================

/// Run `expression` against the whole of `input`.
///
/// Succeeds only when the first candidate match consumed every byte of the
/// input. A matchless result is [`ErrorKind::NoContentParsed`]; a match that
/// left input behind is [`ErrorKind::UnconsumedInput`] carrying the leftover
/// text.
pub fn parse(expression: &Expression, input: &str) -> Result<Parsed, ErrorKind> {
    let matches = expression.apply(input, 0)?;
    match matches.into_iter().next() {
        Some(m) if m.pos >= input.len() => Ok(m.value),
        Some(m) => Err(ErrorKind::UnconsumedInput {
            rest: input[m.pos..].to_string(),
        }),
        None => Err(ErrorKind::NoContentParsed),
    }
}

// ============================================================================
// AGGREGATING & LOGICAL EXPRESSIONS
// ============================================================================

/// Match every expression in order, threading the remainder through.
///
/// The value of a successful match is the ordered sequence of the element
/// values. A failure of the first element fails the whole sequence silently;
/// a failure after an earlier element already matched raises
/// [`ErrorKind::SequenceElementFailed`] naming the failed element's label and
/// the remaining input. There is no backtracking into earlier elements.
pub fn sequence(items: Vec<Expression>) -> Expression {
    let label = format!(
        "sequence({})",
        items.iter().map(Expression::label).collect::<Vec<_>>().join(", ")
    );
    Expression::new(label, move |source, pos| {
        let mut values = Vec::with_capacity(items.len());
        let mut at = pos;
        for (index, item) in items.iter().enumerate() {
            match item.apply(source, at)?.into_iter().next() {
                Some(m) => {
                    values.push(m.value);
                    at = m.pos;
                }
                None if index == 0 => return Ok(vec![]),
                None => {
                    return Err(ErrorKind::SequenceElementFailed {
                        label: item.label().to_string(),
                        rest: source[at..].to_string(),
                    });
                }
            }
        }
        Ok(vec![Match {
            value: Parsed::Seq(values),
            pos: at,
        }])
    })
}

/// Try each expression in listed order at the same position and return the
/// match set of the first that produces any match. Strict ordered choice:
/// listing order resolves ties, and a sibling's `SequenceElementFailed` is
/// caught and discarded so the next alternative can be tried.
pub fn choice(items: Vec<Expression>) -> Expression {
    let label = format!(
        "choice({})",
        items.iter().map(Expression::label).collect::<Vec<_>>().join(", ")
    );
    Expression::new(label, move |source, pos| {
        for item in &items {
            match item.apply(source, pos) {
                Ok(matches) if !matches.is_empty() => return Ok(matches),
                Ok(_) | Err(_) => {}
            }
        }
        Ok(vec![])
    })
}

/// Match `item` if possible; otherwise succeed without consuming input,
/// yielding [`Parsed::Null`]. Never fails.
pub fn optional(item: Expression) -> Expression {
    let label = format!("optional({})", item.label());
    Expression::new(label, move |source, pos| {
        let matches = item.apply(source, pos)?;
        if matches.is_empty() {
            Ok(vec![Match {
                value: Parsed::Null,
                pos,
            }])
        } else {
            Ok(matches)
        }
    })
}

/// Zero-width positive lookahead: succeed without consuming input exactly
/// when `item` matches.
pub fn and(item: Expression) -> Expression {
    let label = format!("and({})", item.label());
    Expression::new(label, move |source, pos| {
        let matches = item.apply(source, pos)?;
        Ok(matches
            .into_iter()
            .map(|_| Match {
                value: Parsed::Empty,
                pos,
            })
            .collect())
    })
}

/// Zero-width negative lookahead: succeed without consuming input exactly
/// when `item` fails.
pub fn not(item: Expression) -> Expression {
    let label = format!("not({})", item.label());
    Expression::new(label, move |source, pos| {
        let matches = item.apply(source, pos)?;
        if matches.is_empty() {
            Ok(vec![Match {
                value: Parsed::Empty,
                pos,
            }])
        } else {
            Ok(vec![])
        }
    })
}

/// Greedy one-or-more repetition. Applies `item` to the remainder until it
/// fails, collecting every value in order; fails if `item` never matched.
/// Iterative rather than recursive: once a repetition is consumed it is never
/// given back, even if a later combinator in an enclosing sequence fails.
pub fn some(item: Expression) -> Expression {
    let label = format!("some({})", item.label());
    Expression::new(label, move |source, pos| {
        let mut values = Vec::new();
        let mut at = pos;
        loop {
            match item.apply(source, at)?.into_iter().next() {
                Some(m) => {
                    let advanced = m.pos > at;
                    values.push(m.value);
                    at = m.pos;
                    // A zero-width repetition would repeat forever.
                    if !advanced {
                        break;
                    }
                }
                None => break,
            }
        }
        if values.is_empty() {
            Ok(vec![])
        } else {
            Ok(vec![Match {
                value: Parsed::Seq(values),
                pos: at,
            }])
        }
    })
}

/// Defer construction of an expression until match time. Breaks the mutual
/// recursion between `expression` and the block parsers in the grammar.
pub fn lazy(label: impl Into<String>, build: fn() -> Expression) -> Expression {
    Expression::new(label, move |source, pos| build().apply(source, pos))
}

// ============================================================================
// PRIMITIVE EXPRESSIONS
// ============================================================================

/// Match exactly the character `expected`.
pub fn char(expected: char) -> Expression {
    Expression::new(format!("char('{expected}')"), move |source, pos| {
        Ok(match source[pos..].chars().next() {
            Some(c) if c == expected => vec![Match {
                value: Parsed::Char(c),
                pos: pos + c.len_utf8(),
            }],
            _ => vec![],
        })
    })
}

/// Match any single character, failing only at end of input.
pub fn any() -> Expression {
    Expression::new("char(any)", |source, pos| {
        Ok(match source[pos..].chars().next() {
            Some(c) => vec![Match {
                value: Parsed::Char(c),
                pos: pos + c.len_utf8(),
            }],
            None => vec![],
        })
    })
}

/// Match the literal string `expected`, consuming exactly its length.
pub fn string(expected: impl Into<String>) -> Expression {
    let expected = expected.into();
    Expression::new(format!("string('{expected}')"), move |source, pos| {
        Ok(if source[pos..].starts_with(&expected) {
            vec![Match {
                value: Parsed::Text(expected.clone()),
                pos: pos + expected.len(),
            }]
        } else {
            vec![]
        })
    })
}

/// Match a single base-10 digit.
pub fn digit() -> Expression {
    Expression::new("digit", |source, pos| {
        Ok(match source[pos..].chars().next() {
            Some(c) if c.is_ascii_digit() => vec![Match {
                value: Parsed::Char(c),
                pos: pos + c.len_utf8(),
            }],
            _ => vec![],
        })
    })
}

/// Match a natural number with no leading zero and yield its integer value.
///
/// The leading `'0'` is rejected by a negative lookahead before one or more
/// digits are required, so a bare `"0"` does not parse as a `nat`. A digit
/// run whose value does not fit an `i64` is not a match.
pub fn nat() -> Expression {
    let body = sequence(vec![not(char('0')), some(digit())]);
    Expression::new("nat", move |source, pos| {
        Ok(body
            .apply(source, pos)?
            .into_iter()
            .filter_map(|m| {
                let digits = match m.value {
                    Parsed::Seq(parts) => match parts.into_iter().nth(1) {
                        Some(Parsed::Seq(digits)) => digits,
                        _ => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                digits
                    .into_iter()
                    .filter_map(|v| match v {
                        Parsed::Char(c) => c.to_digit(10),
                        _ => None,
                    })
                    .try_fold(0_i64, |acc, d| {
                        acc.checked_mul(10)?.checked_add(i64::from(d))
                    })
                    .map(|value| Match {
                        value: Parsed::Int(value),
                        pos: m.pos,
                    })
            })
            .collect())
    })
}
