use std::{fmt, io};
use thiserror::Error;
use crate::serialize::SerializeError;


/// Boxed error produced by host code: partial providers, lambdas, stringifiers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;


/// Defect found while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unmatched open tag")]
    UnmatchedOpenTag,

    #[error("empty tag")]
    EmptyTag,

    #[error("section {0} has no closing tag")]
    UnclosedSection(String),

    #[error("interleaved closing tag: {0}")]
    InterleavedClosingTag(String),

    #[error("unmatched close tag")]
    UnmatchedCloseTag,

    #[error("invalid meta tag")]
    InvalidMetaTag,
}


#[derive(Debug, Error)]
pub enum Error {
    /// Structural error, always fatal. `line` is 1-based.
    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: SyntaxError },

    #[error("missing variable {0:?}")]
    MissingVariable(String),

    #[error("partial {name:?}: {source}")]
    Partial { name: String, source: BoxError },

    #[error("no partial provider for {0:?}")]
    NoPartialProvider(String),

    #[error("lambda failed: {0}")]
    Lambda(BoxError),

    #[error("cannot stringify value: {0}")]
    Stringify(BoxError),

    #[error(transparent)]
    Value(#[from] SerializeError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("formatter error")]
    Fmt(#[from] fmt::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, kind: SyntaxError) -> Self {
        Error::Parse { line, kind }
    }

    /// The syntax error kind, for errors raised while compiling.
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Parse { kind, .. } => Some(kind),
            _ => None
        }
    }
}
