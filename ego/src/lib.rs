pub mod block;
pub mod package;
pub mod parser;
pub mod pos;
pub mod template;

pub use block::{Block, BlockKind};
pub use package::Package;
pub use pos::Pos;
pub use template::Template;
