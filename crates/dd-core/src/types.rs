use serde::{Deserialize, Serialize};

/// One-based line/column location, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    /// Zero-width span at one location.
    pub fn at(location: SourceLocation) -> Self {
        Self {
            end: location.clone(),
            start: location,
        }
    }
}

/// Zero-based row/column point inside a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SourcePoint {
    pub row: usize,
    pub column: usize,
}

impl SourcePoint {
    pub fn to_location(self) -> SourceLocation {
        SourceLocation {
            line: self.row + 1,
            column: self.column + 1,
        }
    }
}

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn points_convert_to_one_based_locations() {
        let location = SourcePoint { row: 2, column: 4 }.to_location();
        assert_eq!(location, SourceLocation { line: 3, column: 5 });
        let span = SourceSpan::at(location.clone());
        assert_eq!(span.start, location);
        assert_eq!(span.end, location);
    }

    #[test]
    fn byte_range_length() {
        assert_eq!(ByteRange::new(4, 20).len(), 16);
        assert!(ByteRange::new(3, 3).is_empty());
    }
}
