use chrono::{Local, NaiveDateTime};

/// `time.ANSIC` layout: `Mon Jan  2 15:04:05 2006`.
const ANSIC: &str = "%a %b %e %H:%M:%S %Y";

/// Knobs for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Tool name written into the generated-file banner.
    pub tool: String,
    /// Emit `//line path:n` markers before blocks with a known position.
    pub line_markers: bool,
    /// Banner timestamp; the current local time when unset.
    pub generated_at: Option<NaiveDateTime>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            tool: "ego".to_string(),
            line_markers: false,
            generated_at: None,
        }
    }
}

impl RenderOptions {
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_line_markers(mut self, line_markers: bool) -> Self {
        self.line_markers = line_markers;
        self
    }

    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn timestamp(&self) -> String {
        self.generated_at
            .unwrap_or_else(|| Local::now().naive_local())
            .format(ANSIC)
            .to_string()
    }
}
