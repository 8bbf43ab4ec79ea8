//! Word extraction over lowercased book text.
//!
//! A token is a maximal run of characters from the indexing alphabet: the 26
//! lowercase ASCII letters plus the accented Latin letters that occur in the
//! French portion of the corpus. Everything else is a separator. Matching is
//! byte-exact on that alphabet; no Unicode normalization is performed, so
//! `"café"` and `"cafe"` index as distinct terms.
//!
//! Callers lowercase the text once (`str::to_lowercase`) and hand the result
//! to [`tokens`], which walks it lazily and yields `&str` slices. The
//! concatenation of the yielded tokens and the skipped separators reproduces
//! the lowercased input exactly.

/// Accented letters admitted into terms, alongside `a`-`z`.
pub const ACCENTED_LETTERS: [char; 16] = [
    'à', 'â', 'ç', 'é', 'è', 'ê', 'ë', 'î', 'ï', 'ô', 'û', 'ù', 'ü', 'ÿ', 'ñ', 'œ',
];

/// Is `c` part of the indexing alphabet?
#[inline]
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || ACCENTED_LETTERS.contains(&c)
}

/// Lazy iterator over the tokens of a lowercased string.
///
/// Yields non-empty `&str` slices in left-to-right order of appearance.
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self
            .rest
            .char_indices()
            .find(|&(_, c)| is_token_char(c))
            .map(|(i, _)| i)?;
        let tail = &self.rest[start..];
        let end = tail
            .char_indices()
            .find(|&(_, c)| !is_token_char(c))
            .map_or(tail.len(), |(i, _)| i);
        self.rest = &tail[end..];
        Some(&tail[..end])
    }
}

/// Tokenize a string that has already been lowercased.
///
/// Uppercase letters are separators here, which is why lowercasing must come
/// first. `build_inverted_index` and the vocabulary extraction both go
/// through this function, so index terms and graph vocabularies agree.
pub fn tokens(lowered: &str) -> Tokens<'_> {
    Tokens { rest: lowered }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<&str> {
        tokens(text).collect()
    }

    #[test]
    fn test_splits_on_punctuation_and_whitespace() {
        assert_eq!(collect("alice, in wonderland!"), vec!["alice", "in", "wonderland"]);
    }

    #[test]
    fn test_digits_are_separators() {
        assert_eq!(collect("chapter 42 begins"), vec!["chapter", "begins"]);
    }

    #[test]
    fn test_accented_letters_stay_inside_tokens() {
        assert_eq!(collect("le cœur était là"), vec!["le", "cœur", "était", "là"]);
    }

    #[test]
    fn test_uppercase_is_a_separator() {
        // Input contract: callers lowercase first. Raw uppercase splits.
        assert_eq!(collect("aBc"), vec!["a", "c"]);
    }

    #[test]
    fn test_empty_and_separator_only_inputs() {
        assert!(collect("").is_empty());
        assert!(collect(" .,;:!? 123 ").is_empty());
    }

    #[test]
    fn test_no_empty_tokens() {
        assert!(collect("--a--b--").iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_reconstruction_contract() {
        let lowered = "il était une fois, 3 petits cochons...";
        let mut rebuilt = String::new();
        let mut rest = lowered;
        for tok in tokens(lowered) {
            let at = rest.find(tok).unwrap();
            rebuilt.push_str(&rest[..at]);
            rebuilt.push_str(tok);
            rest = &rest[at + tok.len()..];
        }
        rebuilt.push_str(rest);
        assert_eq!(rebuilt, lowered);
    }
}
