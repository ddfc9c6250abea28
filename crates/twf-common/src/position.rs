use serde::Serialize;

/// A 1-based (line, column) source position.
///
/// Unlike a byte-offset span, a `Position` is produced directly by the
/// lexer as it scans rather than computed on demand from an offset, so
/// there is no companion line-index type here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        debug_assert!(line >= 1 && column >= 1, "positions are 1-based");
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(Position::new(3, 7).to_string(), "3:7");
    }

    #[test]
    fn ordering_is_line_then_column() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(2, 1) < Position::new(2, 2));
    }
}
