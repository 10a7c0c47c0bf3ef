//! Corpus-level statistics, the author registry and regex views over raw document text.

use crate::document::Document;
use crate::index::{DocId, IndexSnapshot};
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermStat {
    pub term: String,
    /// Occurrences across the whole corpus.
    pub tf: u64,
    /// Number of documents containing the term.
    pub df: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocStats {
    pub doc_id: DocId,
    pub words: usize,
    pub sentences: usize,
    pub chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcordanceLine {
    pub doc_id: DocId,
    pub left: String,
    pub matched: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorStats {
    pub name: String,
    pub documents: usize,
    /// Mean text length in characters.
    pub mean_text_len: f64,
}

/// Vocabulary table, most frequent terms first.
pub fn vocabulary(index: &IndexSnapshot) -> Vec<TermStat> {
    let mut table: Vec<TermStat> = index
        .terms()
        .map(|(term, plist)| TermStat {
            term: term.to_string(),
            tf: plist.values().map(|&tf| tf as u64).sum(),
            df: index.document_frequency(term),
        })
        .collect();
    table.sort_by(|a, b| b.tf.cmp(&a.tf).then_with(|| a.term.cmp(&b.term)));
    table
}

/// Word, sentence and character counts per document, on the raw text.
/// Sentences are approximated by the number of periods.
pub fn document_stats<'a, I>(docs: I) -> Vec<DocStats>
where
    I: IntoIterator<Item = (DocId, &'a Document)>,
{
    docs.into_iter()
        .map(|(doc_id, doc)| DocStats {
            doc_id,
            words: doc.text.split_whitespace().count(),
            sentences: doc.text.matches('.').count(),
            chars: doc.text.chars().count(),
        })
        .collect()
}

/// Case-insensitive matches of `pattern` with up to `context` characters either side.
pub fn concordance<'a, I>(docs: I, pattern: &str, context: usize) -> Result<Vec<ConcordanceLine>>
where
    I: IntoIterator<Item = (DocId, &'a Document)>,
{
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid concordance pattern {pattern:?}"))?;

    let mut lines = Vec::new();
    for (doc_id, doc) in docs {
        let text = doc.text.as_str();
        for m in re.find_iter(text) {
            if m.as_str().is_empty() {
                continue;
            }
            lines.push(ConcordanceLine {
                doc_id,
                left: tail_chars(&text[..m.start()], context),
                matched: m.as_str().to_string(),
                right: text[m.end()..].chars().take(context).collect(),
            });
        }
    }
    Ok(lines)
}

/// All matches of `pattern` in `text`, case-sensitive.
pub fn find_all(text: &str, pattern: &str) -> Result<Vec<String>> {
    let re = Regex::new(pattern).with_context(|| format!("invalid pattern {pattern:?}"))?;
    Ok(re.find_iter(text).map(|m| m.as_str().to_string()).collect())
}

/// Author registry: each name with the ids of its documents, in id order.
pub fn authors<'a, I>(docs: I) -> BTreeMap<String, Vec<DocId>>
where
    I: IntoIterator<Item = (DocId, &'a Document)>,
{
    let mut registry: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
    for (doc_id, doc) in docs {
        for name in doc.authors() {
            registry.entry(name.to_string()).or_default().push(doc_id);
        }
    }
    registry
}

/// Document count and mean text length for one author, `None` if they wrote nothing.
pub fn author_stats<'a, I>(docs: I, name: &str) -> Option<AuthorStats>
where
    I: IntoIterator<Item = (DocId, &'a Document)>,
{
    let lengths: Vec<usize> = docs
        .into_iter()
        .filter(|(_, doc)| doc.authors().contains(&name))
        .map(|(_, doc)| doc.text.chars().count())
        .collect();
    if lengths.is_empty() {
        return None;
    }
    Some(AuthorStats {
        name: name.to_string(),
        documents: lengths.len(),
        mean_text_len: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
    })
}

fn tail_chars(s: &str, n: usize) -> String {
    let skip = s.chars().count().saturating_sub(n);
    s.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_sorted_by_frequency() {
        let idx = IndexSnapshot::build([(0, "b a a"), (1, "a c b")]);
        let vocab = vocabulary(&idx);
        assert_eq!(vocab[0], TermStat { term: "a".into(), tf: 3, df: 2 });
        assert_eq!(vocab[1], TermStat { term: "b".into(), tf: 2, df: 2 });
        assert_eq!(vocab[2], TermStat { term: "c".into(), tf: 1, df: 1 });
    }

    #[test]
    fn counts_words_sentences_chars() {
        let doc = Document::new("t", "One two. Three été.");
        let stats = document_stats([(4, &doc)]);
        assert_eq!(stats[0], DocStats { doc_id: 4, words: 4, sentences: 2, chars: 19 });
    }

    #[test]
    fn concordance_with_context() {
        let doc = Document::new("t", "The quick brown fox jumps over the lazy dog");
        let lines = concordance([(0, &doc)], "FOX", 6).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].left, "brown ");
        assert_eq!(lines[0].matched, "fox");
        assert_eq!(lines[0].right, " jumps");

        assert_eq!(concordance([(0, &doc)], "the", 100).unwrap().len(), 2);
        assert!(concordance([(0, &doc)], "(", 5).is_err());
    }

    #[test]
    fn co_authors_are_counted_individually() {
        let solo = Document::new("a", "123456").with_author("kim");
        let paper = Document::new("b", "12").with_kind(crate::DocKind::Arxiv {
            co_authors: vec!["kim".into(), "lee".into()],
        });
        let docs = [(0, &solo), (1, &paper)];

        let registry = authors(docs);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry["kim"], vec![0, 1]);
        assert_eq!(registry["lee"], vec![1]);

        let kim = author_stats(docs, "kim").unwrap();
        assert_eq!(kim.documents, 2);
        assert_eq!(kim.mean_text_len, 4.0);
        assert_eq!(author_stats(docs, "lee").unwrap().mean_text_len, 2.0);
        assert!(author_stats(docs, "park").is_none());
    }

    #[test]
    fn find_all_is_case_sensitive() {
        assert_eq!(find_all("Rust rust RUST", "rust").unwrap(), vec!["rust"]);
        assert_eq!(find_all("a1 b22 c333", r"\d+").unwrap(), vec!["1", "22", "333"]);
    }
}
