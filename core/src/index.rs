use crate::tokenizer::tokenize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type DocId = u32;

/// Term frequencies of one term, keyed by document.
pub type PostingList = BTreeMap<DocId, u32>;

/// Immutable result of one index build: postings, idf and per-document norms.
///
/// Postings are kept in ordered maps so the norm of every document is summed in
/// the same order on every build.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexSnapshot {
    postings: BTreeMap<String, PostingList>,
    df: HashMap<String, u32>,
    idf: HashMap<String, f64>,
    norms: HashMap<DocId, f64>,
    num_docs: usize,
}

impl IndexSnapshot {
    /// Build from `(doc_id, text)` pairs. Ids are expected to be unique.
    pub fn build<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = (DocId, &'a str)>,
    {
        let mut postings: BTreeMap<String, PostingList> = BTreeMap::new();
        let mut df: HashMap<String, u32> = HashMap::new();
        let mut num_docs = 0usize;

        for (doc_id, text) in docs {
            num_docs += 1;
            let terms = tokenize(text);
            let mut seen_in_doc: HashSet<&str> = HashSet::new();
            for term in &terms {
                *postings.entry(term.clone()).or_default().entry(doc_id).or_insert(0) += 1;
                if seen_in_doc.insert(term.as_str()) {
                    *df.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        let n = num_docs as f64;
        let idf: HashMap<String, f64> = df
            .iter()
            .map(|(term, &df_t)| (term.clone(), smoothed_idf(n, df_t as f64)))
            .collect();

        let mut sums: HashMap<DocId, f64> = HashMap::new();
        for (term, plist) in &postings {
            let w_idf = idf[term];
            for (&doc_id, &tf) in plist {
                let w = tf as f64 * w_idf;
                *sums.entry(doc_id).or_insert(0.0) += w * w;
            }
        }
        let norms: HashMap<DocId, f64> = sums
            .into_iter()
            .filter(|(_, s)| *s > 0.0)
            .map(|(doc_id, s)| (doc_id, s.sqrt()))
            .collect();

        tracing::debug!(num_docs, num_terms = postings.len(), "index built");
        Self { postings, df, idf, norms, num_docs }
    }

    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(term)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Euclidean norm of the document's tf-idf vector, 0.0 for documents without terms.
    pub fn norm(&self, doc_id: DocId) -> f64 {
        self.norms.get(&doc_id).copied().unwrap_or(0.0)
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Terms with their posting lists, in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &PostingList)> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p))
    }
}

/// `ln((1 + n) / (1 + df)) + 1`, strictly positive whenever `df <= n`.
fn smoothed_idf(n: f64, df: f64) -> f64 {
    ((1.0 + n) / (1.0 + df)).ln() + 1.0
}
