use std::ops::Range;

/// A byte range in the text that was handed to the lexer
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub const EMPTY: Span = Span { start: 0, len: 0 };

    /// Creates a new `Span` from the starting byte and its length
    pub fn new(start: usize, len: usize) -> Self {
        Span { start, len }
    }

    /// Returns the start of this span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end of this span
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns the length of this span
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns, whether this span is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Constructs a new span which ranges from the start of this span to the end of the other span
    pub fn until(&self, other: Span) -> Self {
        Span::new(self.start, other.end().saturating_sub(self.start))
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Converts this byte span into a `(start, end)` pair of char offsets into `text`
    pub fn char_bounds(&self, text: &str) -> (usize, usize) {
        let start = text
            .get(..self.start)
            .map_or(text.chars().count(), |prefix| prefix.chars().count());
        let width = text
            .get(self.as_range())
            .map_or(0, |slice| slice.chars().count());
        (start, start + width)
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Span::new(value.start, value.end.saturating_sub(value.start))
    }
}

#[cfg(test)]
mod tests {

    use crate::Span;

    #[test]
    fn span_correct() {
        let span = Span::new(0, 1);

        assert_eq!(span.start(), 0);
        assert_eq!(span.end(), 1);
        assert_eq!(span.len(), 1);
        assert_eq!(span.as_range(), 0..1);
    }

    #[test]
    fn span_until() {
        let a = Span::new(2, 3);
        let b = Span::new(8, 2);
        assert_eq!(a.until(b), Span::new(2, 8));
    }

    #[test]
    fn char_bounds_counts_chars() {
        let text = "äb c";
        // `c` starts at byte 4 but char 3
        assert_eq!(Span::new(4, 1).char_bounds(text), (3, 4));
    }
}
