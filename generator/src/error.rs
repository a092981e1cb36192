use std::io;

use codespan_reporting::diagnostic::Diagnostic;
use ego::Pos;
use ego::parser::ParseError;
use thiserror::Error;

/// Errors raised while generating a package.
#[derive(Debug, Error)]
pub enum Error {
    /// A template has no declaration block.
    #[error("template {path}: declaration block required")]
    DeclarationRequired { path: String },

    #[error("package name required")]
    PackageNameRequired,

    /// The package name is not a single identifier.
    #[error("invalid package name {name:?}: must be a single identifier")]
    InvalidPackageName { name: String },

    /// The merged header text is not a valid import-only file.
    #[error("invalid header declarations: {error}\n{header_text}")]
    HeaderParse {
        #[source]
        error: ParseError,
        /// The merged header text the error's span points into.
        header_text: String,
        /// Template path and position of the offending header block.
        origin: Option<(String, Pos)>,
    },

    /// A non-empty text block was rendered without a literal id.
    #[error("template {path}: text block at {pos} has no literal assigned")]
    UnassignedLiteral { path: String, pos: Pos },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Convert to a codespan-reporting Diagnostic for display.
    ///
    /// Header parse labels refer to file id 0, which callers should bind to
    /// [`Error::header_text`].
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        match self {
            Error::HeaderParse { error, .. } => error.to_diagnostic(),
            other => Diagnostic::error().with_message(other.to_string()),
        }
    }

    pub fn header_text(&self) -> Option<&str> {
        match self {
            Error::HeaderParse { header_text, .. } => Some(header_text),
            _ => None,
        }
    }
}
