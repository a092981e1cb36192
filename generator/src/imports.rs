use std::collections::HashSet;
use std::io::{self, Write};
use std::ops::Range;

use ego::parser::{HeaderParser, ImportSpec};
use ego::{Package, Pos};
use tracing::{debug, warn};

use crate::error::Error;
use crate::options::RenderOptions;

/// File id used for header parse diagnostics.
pub const HEADER_FILE_ID: usize = 0;

/// The consolidated top of the generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedHeader {
    pub package: String,
    /// Import specs with duplicate `(alias, path)` pairs removed,
    /// in first-seen order.
    pub imports: Vec<ImportSpec>,
}

/// A header block's slice of the merged header text.
struct HeaderSource<'a> {
    range: Range<usize>,
    template: &'a str,
    pos: &'a Pos,
}

/// Merge the header blocks of every template into one import list.
pub fn merge_imports(package: &Package) -> Result<MergedHeader, Error> {
    let mut text = format!("package {}\n", package.name);
    let mut sources = Vec::new();
    for template in &package.templates {
        for block in template.header_blocks() {
            let start = text.len();
            text.push_str(block.content());
            text.push('\n');
            sources.push(HeaderSource {
                range: start..text.len(),
                template: &template.path,
                pos: block.pos(),
            });
        }
    }

    let origin_of = |offset: usize| sources.iter().rev().find(|s| s.range.start <= offset);

    let parsed = HeaderParser::new(&text, HEADER_FILE_ID).parse();
    let file = match parsed {
        Ok(file) => file,
        Err(mut error) => {
            let origin = origin_of(error.span.start);
            if let Some(source) = origin {
                let location = if source.pos.is_known() {
                    source.pos.to_string()
                } else {
                    source.template.to_string()
                };
                error = error.with_note(format!("in header block at {}", location));
            }
            return Err(Error::HeaderParse {
                error,
                origin: origin.map(|s| (s.template.to_string(), s.pos.clone())),
                header_text: text,
            });
        }
    };

    if let Some(offset) = file.rest {
        let template = origin_of(offset).map_or("<unknown>", |s| s.template);
        warn!(
            template,
            "header contains declarations other than imports; everything from here on is dropped"
        );
    }

    let mut seen = HashSet::new();
    let total = file.imports.len();
    let imports: Vec<ImportSpec> = file
        .imports
        .into_iter()
        .filter(|spec| seen.insert((spec.alias.clone(), spec.path.clone())))
        .collect();
    debug!(
        imports = imports.len(),
        duplicates = total - imports.len(),
        "merged header imports"
    );

    Ok(MergedHeader {
        package: file.package,
        imports,
    })
}

impl MergedHeader {
    /// Write the generated-file banner, the package clause and the import group.
    pub fn write_to<W: Write>(&self, w: &mut W, options: &RenderOptions) -> io::Result<()> {
        writeln!(w, "// Generated by {} on {}.", options.tool, options.timestamp())?;
        writeln!(w, "// DO NOT EDIT")?;
        writeln!(w)?;
        writeln!(w, "package {}", self.package)?;
        writeln!(w)?;

        if self.imports.is_empty() {
            return Ok(());
        }
        writeln!(w, "import (")?;
        for spec in &self.imports {
            match &spec.alias {
                Some(alias) => writeln!(w, "\t{} {}", alias, spec.literal)?,
                None => writeln!(w, "\t{}", spec.literal)?,
            }
        }
        writeln!(w, ")")?;
        writeln!(w)
    }
}
