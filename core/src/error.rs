//! Diagnostic types shared across every compiler stage.
//!
//! Every stage-specific error (lex, parse, semantic, codegen) carries an
//! optional source [`Location`] and a human-readable message naming the
//! offending lexeme, per the `{ message, optional_token_location }` shape
//! all compiler errors take. The top-level [`CompileError`] wraps whichever
//! stage failed so callers can match on `core::error::CompileError` without
//! caring which stage produced it.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// A `(line, column)` pair pointing at the token that triggered a
/// diagnostic. 1-indexed, matching the lexer's own numbering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single diagnostic: a message plus the location it occurred at, if any.
/// Top-level failures with no specific token (e.g. an I/O error while
/// writing the output directory) carry `location: None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}: {}", loc, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Failure raised while lexing source text into tokens.
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct LexError(pub Diagnostic);

/// Failure raised by the recursive-descent parser. spec.md §4.2: "every
/// syntactic error aborts parsing" — there is never more than one of these
/// in flight at once.
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub Diagnostic);

impl ParseError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self(Diagnostic::at(message, location))
    }
}

/// Failure raised while resolving names and types. spec.md §4.3: "all
/// semantic errors abort analysis" — the analyzer is fail-fast, not
/// accumulating, so this also wraps a single diagnostic. See DESIGN.md for
/// the rationale for diverging from the teacher's multi-error
/// `CompileErrors` accumulator here.
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct SemanticError(pub Diagnostic);

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Diagnostic::new(message))
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self(Diagnostic::at(message, location))
    }
}

/// Failure raised while lowering a validated AST to C. These should be rare
/// in practice (codegen runs only after semantic analysis succeeds) but can
/// still occur for break/continue outside a loop and similarly
/// structural errors that analysis does not itself check.
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct CodegenError(pub Diagnostic);

impl CodegenError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Diagnostic::new(message))
    }
}

/// The union of every way a compile can fail. `core`'s public functions
/// return `Result<_, CompileError>`; the CLI (which depends on `anyhow`)
/// wraps this in `anyhow::Context` for presentation, matching the
/// teacher's split of `thiserror` in the library and `anyhow` in the binary.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("code generation error: {0}")]
    Codegen(#[from] CodegenError),
    #[error("I/O error: {0}")]
    Io(
        #[serde(skip)]
        #[from]
        std::io::Error,
    ),
}

impl CompileError {
    /// The single diagnostic carried by this error, if it has one. `Io`
    /// errors have no source location to report.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Lex(e) => Some(&e.0),
            Self::Parse(e) => Some(&e.0),
            Self::Semantic(e) => Some(&e.0),
            Self::Codegen(e) => Some(&e.0),
            Self::Io(_) => None,
        }
    }
}
