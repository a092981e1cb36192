pub mod error;
mod imports;

pub use error::ParseError;
pub use imports::{ImportFile, ImportSpec, is_identifier, is_valid_import_path};

/// Parser for header declarations in import-only mode.
///
/// Only the package clause and the leading import declarations are parsed;
/// anything after the last import declaration is left unexamined and its
/// offset is reported in [`ImportFile::rest`].
pub struct HeaderParser<'a> {
    source: &'a str,
    file_id: usize,
}

impl<'a> HeaderParser<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        HeaderParser { source, file_id }
    }

    pub fn parse(&self) -> Result<ImportFile, ParseError> {
        imports::parse_import_file(self.source, self.file_id)
    }
}
