use std::collections::HashMap;
use tfidf_core::tokenizer::tokenize;
use tfidf_core::{search, Corpus, DocId, Document, IndexSnapshot, DEFAULT_K};

const TEXTS: &[&str] = &[
    "Rust is a systems programming language focused on safety.",
    "Python is a popular programming language for data science.",
    "The borrow checker keeps Rust programs memory safe.",
    "",
    "Cats sleep most of the day; cats are lazy.",
];

fn index() -> IndexSnapshot {
    IndexSnapshot::build(TEXTS.iter().enumerate().map(|(i, t)| (i as DocId, *t)))
}

#[test]
fn term_frequencies_sum_to_token_count() {
    let idx = index();
    let mut per_doc: HashMap<DocId, u64> = HashMap::new();
    for (_, plist) in idx.terms() {
        for (&doc_id, &tf) in plist {
            assert!(tf >= 1);
            *per_doc.entry(doc_id).or_insert(0) += tf as u64;
        }
    }
    for (i, text) in TEXTS.iter().enumerate() {
        let expected = tokenize(text).len() as u64;
        assert_eq!(per_doc.get(&(i as DocId)).copied().unwrap_or(0), expected);
    }
}

#[test]
fn document_frequency_and_idf_bounds() {
    let idx = index();
    for (term, _) in idx.terms() {
        let df = idx.document_frequency(term) as usize;
        assert!(df >= 1 && df <= idx.num_docs());
        assert!(idx.idf(term).unwrap() > 0.0);
    }
}

#[test]
fn rebuilding_is_idempotent() {
    assert_eq!(index(), index());
}

#[test]
fn adding_documents_never_lowers_document_frequency() {
    let mut corpus = Corpus::new("growing");
    corpus.add(Document::new("a", "rust language")).unwrap();
    let before = corpus.index();
    corpus.add(Document::new("b", "rust rust rust")).unwrap();
    let after = corpus.index();
    assert_eq!(after.document_frequency("rust"), before.document_frequency("rust") + 1);
    assert_eq!(after.document_frequency("language"), before.document_frequency("language"));
    assert!(after.idf("rust").unwrap() <= before.idf("rust").unwrap());
}

#[test]
fn self_query_ranks_first() {
    let idx = index();
    for (i, text) in TEXTS.iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        let hits = search(&idx, text, DEFAULT_K);
        assert_eq!(hits[0].doc_id, i as DocId, "query {text:?}");
    }
}

#[test]
fn results_are_sorted_and_reproducible() {
    let idx = index();
    let hits = search(&idx, "rust programming language", 10);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(hits, search(&idx, "rust programming language", 10));
    // doc 0 mentions all three terms
    assert_eq!(hits[0].doc_id, 0);
}

#[test]
fn empty_document_is_never_returned() {
    let idx = index();
    assert_eq!(idx.norm(3), 0.0);
    for q in ["rust", "the", "cats", "programming language"] {
        assert!(search(&idx, q, 10).iter().all(|h| h.doc_id != 3));
    }
}

#[test]
fn absent_term_returns_nothing() {
    assert!(search(&index(), "kubernetes", DEFAULT_K).is_empty());
}

#[test]
fn empty_corpus_returns_nothing() {
    let idx = IndexSnapshot::build(std::iter::empty());
    assert!(search(&idx, "anything at all", DEFAULT_K).is_empty());
}

#[test]
fn shared_readers_see_one_snapshot() {
    let mut corpus = Corpus::new("shared");
    for t in TEXTS {
        corpus.add(Document::new("", *t)).unwrap();
    }
    let corpus = std::sync::Arc::new(corpus);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = std::sync::Arc::clone(&corpus);
            std::thread::spawn(move || c.rank("rust", 3))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert!(std::sync::Arc::ptr_eq(&corpus.index(), &corpus.index()));
}
