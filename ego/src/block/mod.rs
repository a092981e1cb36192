use std::fmt;

use crate::pos::Pos;

/// One typed fragment of a template, as handed over by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Function signature without braces: `func Hello(c *Context)`
    Declaration { content: String, pos: Pos },
    /// Top-level declarations, merged package-wide (notably imports).
    Header { content: String, pos: Pos },
    /// Literal text written byte-for-byte at runtime.
    Text { content: String, pos: Pos },
    /// Statement-level code, copied through verbatim.
    Code { content: String, pos: Pos },
    /// Expression whose value is escaped before being written.
    Print { content: String, pos: Pos },
    /// Expression whose value is written raw.
    Write { content: String, pos: Pos },
}

/// The kind of a [`Block`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Declaration,
    Header,
    Text,
    Code,
    Print,
    Write,
}

impl Block {
    pub fn declaration(content: impl Into<String>, pos: Pos) -> Self {
        Block::Declaration {
            content: content.into(),
            pos,
        }
    }

    pub fn header(content: impl Into<String>, pos: Pos) -> Self {
        Block::Header {
            content: content.into(),
            pos,
        }
    }

    pub fn text(content: impl Into<String>, pos: Pos) -> Self {
        Block::Text {
            content: content.into(),
            pos,
        }
    }

    pub fn code(content: impl Into<String>, pos: Pos) -> Self {
        Block::Code {
            content: content.into(),
            pos,
        }
    }

    pub fn print(content: impl Into<String>, pos: Pos) -> Self {
        Block::Print {
            content: content.into(),
            pos,
        }
    }

    pub fn write(content: impl Into<String>, pos: Pos) -> Self {
        Block::Write {
            content: content.into(),
            pos,
        }
    }

    /// Build a block of the given kind.
    pub fn new(kind: BlockKind, content: impl Into<String>, pos: Pos) -> Self {
        match kind {
            BlockKind::Declaration => Block::declaration(content, pos),
            BlockKind::Header => Block::header(content, pos),
            BlockKind::Text => Block::text(content, pos),
            BlockKind::Code => Block::code(content, pos),
            BlockKind::Print => Block::print(content, pos),
            BlockKind::Write => Block::write(content, pos),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Declaration { .. } => BlockKind::Declaration,
            Block::Header { .. } => BlockKind::Header,
            Block::Text { .. } => BlockKind::Text,
            Block::Code { .. } => BlockKind::Code,
            Block::Print { .. } => BlockKind::Print,
            Block::Write { .. } => BlockKind::Write,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Block::Declaration { content, .. }
            | Block::Header { content, .. }
            | Block::Text { content, .. }
            | Block::Code { content, .. }
            | Block::Print { content, .. }
            | Block::Write { content, .. } => content,
        }
    }

    pub fn pos(&self) -> &Pos {
        match self {
            Block::Declaration { pos, .. }
            | Block::Header { pos, .. }
            | Block::Text { pos, .. }
            | Block::Code { pos, .. }
            | Block::Print { pos, .. }
            | Block::Write { pos, .. } => pos,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Block::Text { .. })
    }

    /// Declaration and header blocks are not part of the function body.
    pub fn is_body(&self) -> bool {
        !matches!(self, Block::Declaration { .. } | Block::Header { .. })
    }
}

impl BlockKind {
    pub const ALL: [BlockKind; 6] = [
        BlockKind::Declaration,
        BlockKind::Header,
        BlockKind::Text,
        BlockKind::Code,
        BlockKind::Print,
        BlockKind::Write,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Declaration => "declaration",
            BlockKind::Header => "header",
            BlockKind::Text => "text",
            BlockKind::Code => "code",
            BlockKind::Print => "print",
            BlockKind::Write => "write",
        }
    }

    /// Case-insensitive lookup by [`BlockKind::name`].
    pub fn from_name(name: &str) -> Option<BlockKind> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
