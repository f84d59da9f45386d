//! Byte spans attached to tokens and AST nodes

/// A value together with the byte range it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Start byte offset in the source text
    pub start: usize,
    /// End byte offset in the source text (exclusive)
    pub end: usize,
}

impl<T> Spanned<T> {
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self { value, start, end }
    }

    /// Replace the value, keeping the range
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.start, self.end)
    }
}

pub mod helpers {
    use super::Spanned;

    /// A value covering the range from the start of `first` to the end of `last`
    pub fn between<A, B, T>(first: &Spanned<A>, last: &Spanned<B>, value: T) -> Spanned<T> {
        Spanned::new(value, first.start, last.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_covers_both_ranges() {
        let operand = Spanned::new("a", 2, 3);
        let other = Spanned::new("b", 7, 9);
        let joined = helpers::between(&operand, &other, ()).map(|()| "a + b");
        assert_eq!((joined.start, joined.end, joined.value), (2, 9, "a + b"));
    }
}
