use tfidf_core::tokenizer::{normalize, tokenize};

#[test]
fn it_lowercases_and_strips_punctuation() {
    let toks = tokenize("Hello, WORLD! It's 2024.");
    assert_eq!(toks, vec!["hello", "world", "it", "s", "2024"]);
}

#[test]
fn it_drops_non_ascii_letters() {
    // Accented letters fall outside [a-z] and split the word.
    assert_eq!(normalize("Café au lait"), "caf au lait");
}

#[test]
fn it_is_deterministic() {
    let text = "The  quick\tbrown\n\nfox -- jumps.";
    assert_eq!(tokenize(text), tokenize(text));
    assert_eq!(normalize(text), "the quick brown fox jumps");
}
