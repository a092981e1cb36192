use std::fmt;

/// A position in a template source file.
///
/// An empty path or a zero line number means the position is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    pub path: String,
    /// 1-based line number.
    pub line: usize,
}

impl Pos {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Pos {
            path: path.into(),
            line,
        }
    }

    pub fn unknown() -> Self {
        Pos::default()
    }

    pub fn is_known(&self) -> bool {
        !self.path.is_empty() && self.line > 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}
