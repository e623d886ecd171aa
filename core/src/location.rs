
/// A 1-based line/column position inside a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Location {
    /// The file in which the location is found.
    pub file: String,
    /// The line number of the location.
    pub line: usize,
    /// The column number of the location.
    pub column: usize,
}

impl Location {
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    /// Builds a location from a pest position inside `file`.
    pub fn from_position(file: &str, pos: pest::Position<'_>) -> Self {
        let (line, column) = pos.line_col();
        Self::new(file.to_string(), line, column)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Start and end location of a syntax node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn from_pest(file: &str, span: pest::Span<'_>) -> Self {
        Self {
            start: Location::from_position(file, span.start_pos()),
            end: Location::from_position(file, span.end_pos()),
        }
    }

    /// Number of columns covered when the span sits on a single line.
    pub fn width_on_line(&self) -> usize {
        if self.start.line == self.end.line {
            self.end.column.saturating_sub(self.start.column).max(1)
        } else {
            1
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
