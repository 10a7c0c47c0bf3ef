use crate::document::Document;
use crate::index::{DocId, IndexSnapshot};
use crate::query::{self, ScoredDoc};
use crate::stats::{self, AuthorStats, ConcordanceLine, DocStats, TermStat};
use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const EXCERPT_CHARS: usize = 200;
const SCORE_PLACES: i32 = 4;

/// Derived index state. Mutations only ever swap in `Stale`.
#[derive(Debug, Default)]
enum IndexState {
    #[default]
    Stale,
    Built(Arc<IndexSnapshot>),
}

/// One ranked result with the metadata a presentation layer shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub author: String,
    pub excerpt: String,
}

/// A named set of documents keyed by id, with a lazily built search index.
#[derive(Debug, Default)]
pub struct Corpus {
    name: String,
    docs: BTreeMap<DocId, Document>,
    /// One past the largest id ever stored; may exceed `DocId::MAX`.
    next_id: u64,
    index: RwLock<IndexState>,
}

impl Corpus {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(&id)
    }

    /// Documents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.docs.iter().map(|(id, d)| (*id, d))
    }

    /// Store `doc` under a free id and return that id.
    ///
    /// Ids grow past the largest one ever stored. Once the top of the id space
    /// is taken, the lowest unused id is handed out instead.
    pub fn add(&mut self, doc: Document) -> Result<DocId> {
        let id = match DocId::try_from(self.next_id) {
            Ok(id) => id,
            Err(_) => self.lowest_free_id().ok_or_else(|| anyhow!("document id space exhausted"))?,
        };
        self.insert(id, doc);
        Ok(id)
    }

    /// Store `doc` under `id`, returning the document it replaces.
    pub fn insert(&mut self, id: DocId, doc: Document) -> Option<Document> {
        self.next_id = self.next_id.max(u64::from(id) + 1);
        let previous = self.docs.insert(id, doc);
        self.invalidate();
        previous
    }

    pub fn remove(&mut self, id: DocId) -> Option<Document> {
        let removed = self.docs.remove(&id);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    /// Replace the text of document `id`. Returns false when there is no such document.
    pub fn set_text(&mut self, id: DocId, text: impl Into<String>) -> bool {
        match self.docs.get_mut(&id) {
            Some(doc) => {
                doc.text = text.into();
                self.invalidate();
                true
            }
            None => false,
        }
    }

    pub fn is_index_built(&self) -> bool {
        matches!(*self.index.read(), IndexState::Built(_))
    }

    /// Current index snapshot, built on first use after a mutation.
    pub fn index(&self) -> Arc<IndexSnapshot> {
        if let IndexState::Built(snapshot) = &*self.index.read() {
            return Arc::clone(snapshot);
        }
        let mut state = self.index.write();
        // Another reader may have built it while we waited for the lock.
        if let IndexState::Built(snapshot) = &*state {
            return Arc::clone(snapshot);
        }
        let snapshot = Arc::new(IndexSnapshot::build(
            self.docs.iter().map(|(id, d)| (*id, d.text.as_str())),
        ));
        tracing::info!(
            corpus = %self.name,
            num_docs = snapshot.num_docs(),
            num_terms = snapshot.num_terms(),
            "search index rebuilt"
        );
        *state = IndexState::Built(Arc::clone(&snapshot));
        snapshot
    }

    /// Ranked `(id, score)` pairs, unrounded.
    pub fn rank(&self, query: &str, k: usize) -> Vec<ScoredDoc> {
        query::search(&self.index(), query, k)
    }

    /// Ranked results joined with title, author and a text excerpt.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        self.rank(query, k)
            .into_iter()
            .filter_map(|hit| {
                let doc = self.docs.get(&hit.doc_id);
                debug_assert!(doc.is_some(), "index refers to unknown document {}", hit.doc_id);
                let doc = doc?;
                Some(SearchHit {
                    doc_id: hit.doc_id,
                    score: hit.rounded(SCORE_PLACES),
                    title: doc.title.clone(),
                    author: doc.author_line(),
                    excerpt: excerpt(&doc.text),
                })
            })
            .collect()
    }

    pub fn vocabulary(&self) -> Vec<TermStat> {
        stats::vocabulary(&self.index())
    }

    pub fn document_stats(&self) -> Vec<DocStats> {
        stats::document_stats(self.iter())
    }

    pub fn concordance(&self, pattern: &str, context: usize) -> Result<Vec<ConcordanceLine>> {
        stats::concordance(self.iter(), pattern, context)
    }

    /// All document texts joined by a single space, in id order.
    pub fn joined_text(&self) -> String {
        self.docs.values().map(|d| d.text.as_str()).collect::<Vec<_>>().join(" ")
    }

    /// Every match of `pattern` (case-sensitive) in the joined corpus text.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<String>> {
        stats::find_all(&self.joined_text(), pattern)
    }

    /// Author name to the ids of the documents they wrote. arXiv co-authors count individually.
    pub fn authors(&self) -> BTreeMap<String, Vec<DocId>> {
        stats::authors(self.iter())
    }

    pub fn num_authors(&self) -> usize {
        self.authors().len()
    }

    pub fn author_stats(&self, name: &str) -> Option<AuthorStats> {
        stats::author_stats(self.iter(), name)
    }

    /// Documents ordered by title, ties by id, limited to `n` when given.
    pub fn by_title(&self, n: Option<usize>) -> Vec<(DocId, &Document)> {
        let mut docs: Vec<_> = self.iter().collect();
        docs.sort_by(|a, b| a.1.title.cmp(&b.1.title).then(a.0.cmp(&b.0)));
        docs.truncate(n.unwrap_or(docs.len()));
        docs
    }

    /// Documents newest first. Dates that do not parse sort as the epoch.
    pub fn by_date(&self, n: Option<usize>) -> Vec<(DocId, &Document)> {
        let mut docs: Vec<_> = self.iter().map(|(id, d)| (d.timestamp(), id, d)).collect();
        docs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        docs.truncate(n.unwrap_or(docs.len()));
        docs.into_iter().map(|(_, id, d)| (id, d)).collect()
    }

    fn lowest_free_id(&self) -> Option<DocId> {
        let mut expected: DocId = 0;
        for &id in self.docs.keys() {
            if id != expected {
                return Some(expected);
            }
            expected = expected.checked_add(1)?;
        }
        Some(expected)
    }

    fn invalidate(&mut self) {
        *self.index.get_mut() = IndexState::Stale;
    }
}

fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    out = out.replace('\n', " ");
    if text.chars().nth(EXCERPT_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
