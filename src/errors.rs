//! Error handling for the Paper parser.
//!
//! Grammar-internal non-matches are silent and never surface here; the error
//! surface covers only what reaches the caller of `parse`: nothing matched at
//! all, a match left input behind, or a partially matched sequence failed
//! with no enclosing choice to recover.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting: the name and content of the text a
/// parse ran against, used to render diagnostics with spans.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to a NamedSource for miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Wrap an error kind into a full diagnostic against this source.
    pub fn report(&self, kind: ErrorKind, span: SourceSpan) -> PaperError {
        PaperError {
            kind,
            src: self.to_named_source(),
            span,
        }
    }
}

/// What went wrong, as seen by the caller of `parse`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// The top-level expression produced no match at all.
    #[error("no content parsed")]
    NoContentParsed,

    /// A match was found but left a non-empty remainder.
    #[error("unconsumed input: '{rest}'")]
    UnconsumedInput { rest: String },

    /// A sequence element failed after an earlier element already matched.
    /// Carries the failing element's label and the remaining input.
    #[error("failed to match `{label}` at '{rest}'")]
    SequenceElementFailed { label: String, rest: String },
}

impl ErrorKind {
    /// Error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::NoContentParsed => "no_content_parsed",
            Self::UnconsumedInput { .. } => "unconsumed_input",
            Self::SequenceElementFailed { .. } => "sequence_element_failed",
        }
    }

    fn help_text(&self) -> &'static str {
        match self {
            Self::NoContentParsed => "the input does not begin with any Paper expression",
            Self::UnconsumedInput { .. } => {
                "parsing stopped early; the leftover text does not start a valid expression"
            }
            Self::SequenceElementFailed { .. } => {
                "an opened construct was not completed; check for a missing closing '}' or quote"
            }
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::NoContentParsed => "nothing parsed here",
            Self::UnconsumedInput { .. } => "unconsumed input starts here",
            Self::SequenceElementFailed { .. } => "failed to match here",
        }
    }
}

/// The user-visible parse error: an [`ErrorKind`] tied to the source it was
/// raised against, rendered by miette with a labeled span.
#[derive(Debug, Error)]
#[error("Parse error: {kind}")]
pub struct PaperError {
    pub kind: ErrorKind,
    pub src: Arc<NamedSource<String>>,
    pub span: SourceSpan,
}

impl Diagnostic for PaperError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("paper::parse::{}", self.kind.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.help_text()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.span,
        ))))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.src)
    }
}
