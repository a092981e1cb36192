pub mod error;
pub mod imports;
pub mod literals;
pub mod options;
pub mod quote;
pub mod render;
pub mod writer;

pub use error::Error;
pub use imports::{MergedHeader, merge_imports};
pub use literals::{LiteralId, LiteralTable};
pub use options::RenderOptions;
pub use render::write_template;
pub use writer::write_package;
