//! Known-issue retrieval for ticket triage.
//!
//! Public API:
//! - [`KbStore`]: process-wide handle; `load`/`load_from_path` build a new
//!   [`KbIndex`] and swap it in atomically, `search` runs against the current
//!   snapshot.
//! - [`KbIndex`]: immutable record list + TF-IDF matrix, top-k cosine search
//!   with a keyword-overlap fallback when no matrix could be built.

pub mod errors;
pub mod index;
pub mod io_json;
pub mod record;
pub mod store;
pub mod tfidf;
pub mod tokenize;

pub use errors::KbError;
pub use index::{KbIndex, SearchHit};
pub use record::KnownIssueRecord;
pub use store::KbStore;

/// Result alias for KB operations.
pub type KbResult<T> = Result<T, KbError>;
