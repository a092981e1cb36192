use ego::{Block, BlockKind, Package, Pos, Template};
use generator::RenderOptions;
use serde::Deserialize;

/// A package as handed over by the scanner: templates already split
/// into typed blocks.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Name for the generated package clause.
    pub package: String,

    #[serde(default)]
    pub options: ManifestOptions,

    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestOptions {
    /// Emit `//line` markers before blocks with a known position.
    #[serde(default)]
    pub line_markers: bool,

    /// Tool name for the generated-file banner. Defaults to "ego".
    #[serde(default)]
    pub tool: Option<String>,

    /// Merge adjacent text blocks before generating. Defaults to true.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        ManifestOptions {
            line_markers: false,
            tool: None,
            normalize: default_normalize(),
        }
    }
}

fn default_normalize() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TemplateEntry {
    /// Template source path, used in errors and line markers.
    pub path: String,

    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BlockEntry {
    /// One of: declaration, header, text, code, print, write.
    pub kind: String,

    #[serde(default)]
    pub content: String,

    /// 1-based source line; 0 or absent means unknown.
    #[serde(default)]
    pub line: usize,
}

impl Manifest {
    pub fn from_toml(source: &str) -> Result<Manifest, String> {
        toml::from_str(source).map_err(|e| format!("TOML parse error: {}", e))
    }

    pub fn render_options(&self) -> RenderOptions {
        let options = RenderOptions::default().with_line_markers(self.options.line_markers);
        match &self.options.tool {
            Some(tool) => options.with_tool(tool.as_str()),
            None => options,
        }
    }

    /// Build the package model, normalizing it when the manifest asks for it.
    pub fn to_package(&self) -> Result<Package, String> {
        let mut templates = Vec::with_capacity(self.templates.len());
        for entry in &self.templates {
            let mut blocks = Vec::with_capacity(entry.blocks.len());
            for (i, block) in entry.blocks.iter().enumerate() {
                let kind = BlockKind::from_name(&block.kind).ok_or_else(|| {
                    format!(
                        "{}: block {}: unknown kind '{}' (expected one of: {})",
                        entry.path,
                        i + 1,
                        block.kind,
                        BlockKind::ALL.map(BlockKind::name).join(", ")
                    )
                })?;
                let pos = Pos::new(entry.path.as_str(), block.line);
                blocks.push(Block::new(kind, block.content.as_str(), pos));
            }
            templates.push(Template::new(entry.path.as_str(), blocks));
        }

        let mut package = Package::new(self.package.as_str(), templates);
        if self.options.normalize {
            package.normalize();
        }
        Ok(package)
    }
}
