//! In-memory TF-IDF document search: normalization, inverted index, cosine ranking.

pub mod document;
pub mod index;
pub mod persist;
pub mod query;
pub mod stats;
pub mod store;
pub mod tokenizer;

pub use document::{DocKind, Document};
pub use index::{DocId, IndexSnapshot, PostingList};
pub use query::{search, ScoredDoc, DEFAULT_K};
pub use store::{Corpus, SearchHit};
