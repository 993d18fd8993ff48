//! Errors that cross the lowering boundary (§7).
//!
//! Out-of-memory from allocator/interner failure is left to propagate as
//! an ordinary Rust allocation failure and is not modeled here. The only
//! recoverable error this crate raises is a fatal unsupported-construct
//! diagnostic; everything else the spec calls "unreachable" is a genuine
//! invariant violation and panics instead of returning a `LowerError`.

use std::fmt;

use crate::ast::Span;

pub type LowerResult<T> = Result<T, LowerError>;

/// A fatal, unrecoverable condition raised while lowering a translation
/// unit. The driver treats any `LowerError` as translation-unit failure;
/// there is no local recovery (§7).
#[derive(Debug, Clone, PartialEq)]
pub enum LowerError {
    /// A node kind or cast kind lowering does not implement yet, e.g.
    /// complex arithmetic, computed goto, case ranges, aggregate
    /// initializers, generic selections, stmt-expressions.
    Unsupported { message: String, span: Option<Span> },
}

impl LowerError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        LowerError::Unsupported { message: message.into(), span: None }
    }

    pub fn unsupported_at(message: impl Into<String>, span: Span) -> Self {
        LowerError::Unsupported { message: message.into(), span: Some(span) }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::Unsupported { message, span: Some(span) } => {
                write!(f, "unsupported construct: {message} (at {span:?})")
            }
            LowerError::Unsupported { message, span: None } => {
                write!(f, "unsupported construct: {message}")
            }
        }
    }
}

impl std::error::Error for LowerError {}

/// Report a fatal unsupported construct with no source location attached,
/// matching the `fatal_no_src` diagnostics collaborator described in §6.
pub fn fatal_no_src(message: impl Into<String>) -> LowerError {
    let message = message.into();
    log::warn!("fatal_no_src: {message}");
    LowerError::unsupported(message)
}
