//! Byte-offset to line/column conversion.
//!
//! The parser works in byte offsets (`TextSize`/`TextRange`); editor queries
//! speak rows and columns. `LineIndex` is the conversion table, built once per
//! file text and cached alongside the parse.

use text_size::{TextRange, TextSize};

use super::position::{Point, Range};

/// Newline table for one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Always starts with 0.
    line_starts: Vec<u32>,
    /// Total length of the text in bytes.
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Convert a byte offset into a row/column point.
    ///
    /// Offsets past the end of the text clamp to the last position.
    pub fn point(&self, offset: TextSize) -> Point {
        let offset = u32::from(offset).min(self.len);
        let row = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        Point {
            row: row as u32,
            column: offset - self.line_starts[row],
        }
    }

    /// Convert a row/column point back into a byte offset.
    ///
    /// Returns `None` when the row does not exist. Columns past the line end
    /// clamp to the next line start.
    pub fn offset(&self, point: Point) -> Option<TextSize> {
        let start = *self.line_starts.get(point.row as usize)?;
        let line_end = self
            .line_starts
            .get(point.row as usize + 1)
            .copied()
            .unwrap_or(self.len);
        Some(TextSize::new((start + point.column).min(line_end)))
    }

    /// Convert a byte range into a point range.
    pub fn range(&self, range: TextRange) -> Range {
        Range {
            start: self.point(range.start()),
            end: self.point(range.end()),
        }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion() {
        let index = LineIndex::new("abc\ndef\n\nxyz");
        assert_eq!(index.point(TextSize::new(0)), Point::new(0, 0));
        assert_eq!(index.point(TextSize::new(2)), Point::new(0, 2));
        assert_eq!(index.point(TextSize::new(4)), Point::new(1, 0));
        assert_eq!(index.point(TextSize::new(8)), Point::new(2, 0));
        assert_eq!(index.point(TextSize::new(12)), Point::new(3, 3));
    }

    #[test]
    fn test_offset_roundtrip() {
        let text = "one\ntwo\nthree";
        let index = LineIndex::new(text);
        for i in 0..=text.len() as u32 {
            let offset = TextSize::new(i);
            assert_eq!(index.offset(index.point(offset)), Some(offset));
        }
    }

    #[test]
    fn test_missing_row() {
        let index = LineIndex::new("one line");
        assert_eq!(index.offset(Point::new(4, 0)), None);
    }
}
