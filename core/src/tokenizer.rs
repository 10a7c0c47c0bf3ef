use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anything that is not an ASCII lowercase letter, a digit or whitespace.
    static ref NON_TERM: Regex = Regex::new(r"[^a-z0-9\s]").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Lowercase `text`, blank out every character outside `[a-z0-9]` and whitespace,
/// collapse whitespace runs to a single space and trim.
///
/// Digits are kept as term characters. Index build and query parsing both go
/// through this function, so the two sides always agree on what a term is.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let stripped = NON_TERM.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Split normalized text into terms. Never yields an empty term.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The cat, the HAT!");
        assert_eq!(t, vec!["the", "cat", "the", "hat"]);
    }

    #[test]
    fn punctuation_becomes_a_separator() {
        assert_eq!(tokenize("don't"), vec!["don", "t"]);
        assert_eq!(normalize("  a--b\n\tc  "), "a b c");
    }

    #[test]
    fn empty_and_all_punctuation_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("?!... ,;").is_empty());
        assert_eq!(normalize("   "), "");
    }
}
