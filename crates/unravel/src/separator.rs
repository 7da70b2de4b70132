//! Separator sets.
//!
//! A `SeparatorSet` is a small set of delimiter characters. Splitting yields
//! the non-empty maximal substrings between delimiters; pair-splitting cuts
//! at the first delimiter. The empty set is special: its split is a no-op
//! returning the input as a single element, which is what lets the default
//! key-chain configuration behave as plain single-key lookup.

/// A set of delimiter runes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeparatorSet {
    runes: Vec<char>,
}

impl SeparatorSet {
    pub fn new(runes: impl IntoIterator<Item = char>) -> Self {
        SeparatorSet {
            runes: runes.into_iter().collect(),
        }
    }

    /// The no-op set.
    pub fn empty() -> Self {
        SeparatorSet::default()
    }

    fn check(&self, c: char) -> bool {
        self.runes.contains(&c)
    }

    /// Split into non-empty maximal substrings separated by any rune in the
    /// set. Empty input yields an empty sequence. An empty set yields the
    /// input as a single element, verbatim.
    pub fn split<'s>(&self, s: &'s str) -> Vec<&'s str> {
        if self.runes.is_empty() {
            return vec![s];
        }
        s.split(|c| self.check(c))
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Split at the first rune in the set into `(prefix, suffix)`. If no
    /// rune matches, the suffix is empty.
    pub fn pair<'s>(&self, s: &'s str) -> (&'s str, &'s str) {
        match s.char_indices().find(|(_, c)| self.check(*c)) {
            Some((idx, c)) => (&s[..idx], &s[idx + c.len_utf8()..]),
            None => (s, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_empty_parts() {
        let set = SeparatorSet::new(['&', ';']);
        assert_eq!(set.split("a&b;c"), ["a", "b", "c"]);
        assert_eq!(set.split("&&a&&b&&"), ["a", "b"]);
        assert_eq!(set.split("&&&"), Vec::<&str>::new());
        assert_eq!(set.split(""), Vec::<&str>::new());
    }

    #[test]
    fn pair_cuts_at_first_match() {
        let set = SeparatorSet::new(['=']);
        assert_eq!(set.pair("a=b=c"), ("a", "b=c"));
        assert_eq!(set.pair("=b"), ("", "b"));
        assert_eq!(set.pair("abc"), ("abc", ""));
        assert_eq!(set.pair(""), ("", ""));
    }

    #[test]
    fn pair_handles_multibyte_separators() {
        let set = SeparatorSet::new(['三']);
        assert_eq!(set.pair("ab三cd"), ("ab", "cd"));
    }

    #[test]
    fn empty_set_is_a_noop_split() {
        let set = SeparatorSet::empty();
        assert_eq!(set.split("a.b.c"), ["a.b.c"]);
        assert_eq!(set.split(""), [""]);
        assert_eq!(set.pair("a.b"), ("a.b", ""));
    }
}
