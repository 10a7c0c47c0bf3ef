use crate::index::{DocId, IndexSnapshot};
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Number of results returned when the caller does not ask for a specific count.
pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl ScoredDoc {
    /// Score rounded to `places` decimals, for display only.
    pub fn rounded(&self, places: i32) -> f64 {
        let scale = 10f64.powi(places);
        (self.score * scale).round() / scale
    }
}

/// Rank documents of `index` against `query` by cosine similarity of tf-idf vectors.
///
/// Returns at most `k` results, best first, ties broken by ascending document id.
/// A query without any indexed term yields no results.
pub fn search(index: &IndexSnapshot, query: &str, k: usize) -> Vec<ScoredDoc> {
    if k == 0 {
        return Vec::new();
    }

    // Query terms unknown to the index carry no weight on either side.
    let mut tf_q: BTreeMap<String, u32> = BTreeMap::new();
    for term in tokenize(query) {
        if index.idf(&term).is_some() {
            *tf_q.entry(term).or_insert(0) += 1;
        }
    }
    if tf_q.is_empty() {
        return Vec::new();
    }

    let q_weights: Vec<(&str, f64, f64)> = tf_q
        .iter()
        .filter_map(|(term, &tf)| {
            let idf = index.idf(term)?;
            Some((term.as_str(), idf, tf as f64 * idf))
        })
        .collect();
    let q_norm = q_weights.iter().map(|(_, _, w)| w * w).sum::<f64>().sqrt();
    if q_norm == 0.0 {
        return Vec::new();
    }

    // Only documents sharing a term with the query are visited.
    let mut dots: HashMap<DocId, f64> = HashMap::new();
    for (term, idf, q_w) in &q_weights {
        let Some(plist) = index.postings(term) else { continue };
        for (&doc_id, &tf) in plist {
            *dots.entry(doc_id).or_insert(0.0) += (tf as f64 * idf) * q_w;
        }
    }

    let mut scored: Vec<ScoredDoc> = dots
        .into_iter()
        .filter_map(|(doc_id, dot)| {
            let d_norm = index.norm(doc_id);
            if dot == 0.0 || d_norm == 0.0 {
                return None;
            }
            Some(ScoredDoc { doc_id, score: dot / (d_norm * q_norm) })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    scored.truncate(k);
    scored
}
