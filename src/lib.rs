pub use crate::errors::{ErrorKind, PaperError, SourceContext};
pub use crate::grammar::parse;

pub mod ast;
pub mod combinators;
pub mod errors;
pub mod grammar;
