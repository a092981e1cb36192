use crate::block::Block;

/// An entire template: one input file's worth of blocks.
///
/// A template needs exactly one declaration block to render; that is
/// checked by the generator, not at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Source path, used for error attribution only.
    pub path: String,
    pub blocks: Vec<Block>,
}

impl Template {
    pub fn new(path: impl Into<String>, blocks: Vec<Block>) -> Self {
        Template {
            path: path.into(),
            blocks,
        }
    }

    /// The block supplying the generated function's signature.
    pub fn declaration_block(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| matches!(b, Block::Declaration { .. }))
    }

    pub fn header_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Header { .. }))
    }

    /// Text blocks paired with their index in [`Template::blocks`].
    pub fn text_blocks(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.blocks.iter().enumerate().filter(|(_, b)| b.is_text())
    }

    /// Blocks making up the function body, paired with their index.
    pub fn non_header_blocks(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.blocks.iter().enumerate().filter(|(_, b)| b.is_body())
    }

    /// Join runs of adjacent text blocks into one.
    ///
    /// The merged block keeps the position of the first block in the run.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Block> = Vec::with_capacity(self.blocks.len());
        for block in std::mem::take(&mut self.blocks) {
            if let Block::Text { content, .. } = &block {
                if let Some(Block::Text { content: acc, .. }) = merged.last_mut() {
                    acc.push_str(content);
                    continue;
                }
            }
            merged.push(block);
        }
        self.blocks = merged;
    }
}
