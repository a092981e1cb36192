use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use ego::Package;

use crate::quote::go_quote;

/// Identifier of a deduplicated text literal. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralId(usize);

impl LiteralId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Renders as the Go identifier bound to the literal: `__1`, `__2`, ...
impl fmt::Display for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__{}", self.0)
    }
}

/// Strip leading newlines and spaces and trailing newlines from text content.
pub fn trim_text(content: &str) -> &str {
    content
        .trim_start_matches(['\n', ' '])
        .trim_end_matches('\n')
}

/// The package-wide literal table.
///
/// Every distinct trimmed text payload gets one id, assigned in
/// first-occurrence order across all templates. Text blocks are never
/// mutated; the id of a block is looked up by its
/// `(template index, block index)` pair.
#[derive(Debug, Clone, Default)]
pub struct LiteralTable {
    /// Literal contents; id `n` lives at index `n - 1`.
    literals: Vec<String>,
    by_content: HashMap<String, LiteralId>,
    by_block: HashMap<(usize, usize), LiteralId>,
}

impl LiteralTable {
    pub fn build(package: &Package) -> Self {
        let mut table = LiteralTable::default();
        for (template_index, template) in package.templates.iter().enumerate() {
            for (block_index, block) in template.text_blocks() {
                let text = trim_text(block.content());
                if text.is_empty() {
                    continue;
                }
                let id = table.intern(text);
                table.by_block.insert((template_index, block_index), id);
            }
        }
        table
    }

    fn intern(&mut self, text: &str) -> LiteralId {
        if let Some(&id) = self.by_content.get(text) {
            return id;
        }
        self.literals.push(text.to_string());
        let id = LiteralId(self.literals.len());
        self.by_content.insert(text.to_string(), id);
        id
    }

    /// The literal assigned to a text block, if any.
    pub fn id_of(&self, template_index: usize, block_index: usize) -> Option<LiteralId> {
        self.by_block.get(&(template_index, block_index)).copied()
    }

    pub fn literal(&self, id: LiteralId) -> Option<&str> {
        id.0
            .checked_sub(1)
            .and_then(|i| self.literals.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Literals in id order.
    pub fn iter(&self) -> impl Iterator<Item = (LiteralId, &str)> {
        self.literals
            .iter()
            .enumerate()
            .map(|(i, text)| (LiteralId(i + 1), text.as_str()))
    }

    /// Write the grouped `var ( ... )` block. Writes nothing for an empty table.
    pub fn write_declarations<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(w, "var (")?;
        for (id, text) in self.iter() {
            writeln!(w, "\t{} = []byte({})", id, go_quote(text))?;
        }
        writeln!(w, ")")?;
        writeln!(w)
    }
}
