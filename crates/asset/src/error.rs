//! Typed failures of mesh loading.

use std::{fmt, io};

use thiserror::Error;

/// Which of the two input streams a line came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Geometry,
    Material,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Geometry => f.write_str("geometry"),
            SourceKind::Material => f.write_str("material"),
        }
    }
}

/// Error returned by [`crate::build_mesh`] and the parsers. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{origin} line {line}: cannot parse number '{token}'")]
    BadNumber {
        origin: SourceKind,
        line: usize,
        token: String,
    },

    #[error("{origin} line {line}: index '{token}' out of range ({len} entries declared so far)")]
    IndexOutOfRange {
        origin: SourceKind,
        line: usize,
        token: String,
        len: usize,
    },

    #[error("{origin} line {line}: malformed face element '{token}'")]
    MalformedFace {
        origin: SourceKind,
        line: usize,
        token: String,
    },

    #[error("{origin} line {line}: '{directive}' is missing its argument")]
    MissingArgument {
        origin: SourceKind,
        line: usize,
        directive: String,
    },

    #[error("geometry line {line}: more unique vertices than a u32 index buffer can address")]
    TooManyVertices { line: usize },

    #[error("resource not found: {path}")]
    ResourceNotFound { path: String },

    #[error("{origin} line {line}: read failed")]
    Io {
        origin: SourceKind,
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    /// Line the error points at, if it is bound to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::BadNumber { line, .. }
            | ParseError::IndexOutOfRange { line, .. }
            | ParseError::MalformedFace { line, .. }
            | ParseError::MissingArgument { line, .. }
            | ParseError::TooManyVertices { line }
            | ParseError::Io { line, .. } => Some(*line),
            ParseError::ResourceNotFound { .. } => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse one float token; `None` (token missing) is reported as a bad number too.
pub(crate) fn parse_f32(
    token: Option<&str>,
    origin: SourceKind,
    line: usize,
) -> ParseResult<f32> {
    let token = token.unwrap_or("");
    token.parse::<f32>().map_err(|_| ParseError::BadNumber {
        origin,
        line,
        token: token.to_owned(),
    })
}
