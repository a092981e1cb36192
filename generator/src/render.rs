use std::io::{self, Write};

use ego::{Block, Pos, Template};

use crate::error::Error;
use crate::literals::{LiteralTable, trim_text};
use crate::options::RenderOptions;
use crate::quote::comment_lines;

/// Name of the write-sink parameter generated functions write through.
pub const SINK: &str = "c";
/// Escaping function applied to print blocks, supplied by the runtime.
pub const ESCAPE_FN: &str = "Escape";

/// Everything a block needs to render inside one template.
pub struct RenderContext<'a> {
    pub template_index: usize,
    pub path: &'a str,
    pub literals: &'a LiteralTable,
    pub options: &'a RenderOptions,
}

/// Write a template's function to `w`.
///
/// The function is rendered into a buffer first; `w` sees nothing unless
/// every block rendered.
pub fn write_template<W: Write>(
    template: &Template,
    template_index: usize,
    literals: &LiteralTable,
    options: &RenderOptions,
    w: &mut W,
) -> Result<(), Error> {
    let ctx = RenderContext {
        template_index,
        path: &template.path,
        literals,
        options,
    };

    let decl = template
        .declaration_block()
        .ok_or_else(|| Error::DeclarationRequired {
            path: template.path.clone(),
        })?;

    let mut buf = Vec::new();
    render_block(decl, 0, &ctx, &mut buf)?;
    for (index, block) in template.non_header_blocks() {
        render_block(block, index, &ctx, &mut buf)?;
    }
    writeln!(buf, "}}")?;
    writeln!(buf)?;

    w.write_all(&buf)?;
    Ok(())
}

/// Render a single block. `index` is the block's position in its template.
pub fn render_block(
    block: &Block,
    index: usize,
    ctx: &RenderContext<'_>,
    buf: &mut Vec<u8>,
) -> Result<(), Error> {
    if let Block::Text { content, .. } = block {
        if trim_text(content).is_empty() {
            return Ok(());
        }
    }

    if ctx.options.line_markers {
        write_line_marker(block.pos(), buf)?;
    }

    match block {
        Block::Declaration { content, .. } => writeln!(buf, "{} {{", content)?,
        Block::Header { content, .. } | Block::Code { content, .. } => {
            writeln!(buf, "{}", content)?
        }
        Block::Text { pos, .. } => {
            let (id, text) = ctx
                .literals
                .id_of(ctx.template_index, index)
                .and_then(|id| Some((id, ctx.literals.literal(id)?)))
                .ok_or_else(|| Error::UnassignedLiteral {
                    path: ctx.path.to_string(),
                    pos: pos.clone(),
                })?;
            writeln!(buf, "// {}", comment_lines(text))?;
            writeln!(buf, "{}.Write({})", SINK, id)?;
        }
        Block::Print { content, .. } => {
            writeln!(buf, "{}.Write({}({}))", SINK, ESCAPE_FN, content)?
        }
        Block::Write { content, .. } => writeln!(buf, "{}.Write({})", SINK, content)?,
    }
    Ok(())
}

fn write_line_marker(pos: &Pos, buf: &mut Vec<u8>) -> io::Result<()> {
    if pos.is_known() {
        writeln!(buf, "//line {}", pos)?;
    }
    Ok(())
}
