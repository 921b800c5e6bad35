//! Cursor, selection and span types

/// Zero-indexed cursor position. `col` is a gap position: 0 is before the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// An inclusive column span on a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    /// Inclusive end column
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Build a span from a half-open byte range, as returned by `regex`.
    /// Returns `None` for empty ranges.
    pub fn from_range(range: std::ops::Range<usize>) -> Option<Self> {
        if range.end > range.start {
            Some(Self::new(range.start, range.end - 1))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn contains(&self, col: usize) -> bool {
        self.start <= col && col <= self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Distance from `col` to the nearest edge of the span, zero when contained
    pub fn distance(&self, col: usize) -> usize {
        if col < self.start {
            self.start - col
        } else if col > self.end {
            col - self.end
        } else {
            0
        }
    }

    /// Half-open byte range for slicing
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end + 1
    }
}

/// Host selection bounds, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Cursor,
    pub end: Cursor,
    /// Rectangular selection: the same column bounds apply to every row
    pub block: bool,
}

impl Selection {
    pub fn linear(start: Cursor, end: Cursor) -> Self {
        Self::normalized(start, end, false)
    }

    pub fn block(start: Cursor, end: Cursor) -> Self {
        Self::normalized(start, end, true)
    }

    fn normalized(a: Cursor, b: Cursor, block: bool) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, block }
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start.row..=self.end.row
    }

    /// Inclusive column bounds of the selection on `row` for a line of `line_len` bytes.
    /// Returns `None` when the selection covers no byte of that line.
    pub fn columns(&self, row: usize, line_len: usize) -> Option<(usize, usize)> {
        if line_len == 0 || !self.rows().contains(&row) {
            return None;
        }
        let last = line_len - 1;
        let (from, to) = if self.block {
            let lo = self.start.col.min(self.end.col);
            let hi = self.start.col.max(self.end.col);
            (lo, hi)
        } else {
            let from = if row == self.start.row { self.start.col } else { 0 };
            let to = if row == self.end.row { self.end.col } else { last };
            (from, to)
        };
        if from > last || from > to {
            return None;
        }
        Some((from, to.min(last)))
    }
}
