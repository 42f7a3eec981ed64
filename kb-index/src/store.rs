//! Process-wide KB handle with atomically swapped snapshots.
//!
//! Writers build a complete [`KbIndex`] without holding the lock and then
//! replace the `Arc`. Readers clone the `Arc` and search without the lock,
//! so a reload never disturbs a search already in flight.

use std::{
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::info;

use crate::{
    KbResult,
    errors::KbError,
    index::{KbIndex, SearchHit},
    io_json::read_records,
    record::{KnownIssueRecord, ensure_unique_ids},
};

#[derive(Debug, Default)]
pub struct KbStore {
    current: RwLock<Arc<KbIndex>>,
}

impl KbStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole index with one built from `records`.
    ///
    /// On error the previous snapshot stays in place.
    pub fn load(&self, records: Vec<KnownIssueRecord>) -> KbResult<usize> {
        ensure_unique_ids(&records)?;
        let next = Arc::new(KbIndex::build(records));
        let count = next.len();
        let vocab = next.vocabulary_len();

        let mut guard = self.current.write().map_err(|_| KbError::Poisoned)?;
        *guard = next;
        drop(guard);

        info!(records = count, vocabulary = vocab, "KB snapshot swapped");
        Ok(count)
    }

    /// Loads records from a JSON file.
    ///
    /// Returns `Ok(None)` and leaves the current snapshot untouched when the
    /// file does not exist.
    pub fn load_from_path(&self, path: &Path) -> KbResult<Option<usize>> {
        match read_records(path)? {
            Some(records) => self.load(records).map(Some),
            None => Ok(None),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> KbResult<Arc<KbIndex>> {
        self.current
            .read()
            .map(|g| Arc::clone(&*g))
            .map_err(|_| KbError::Poisoned)
    }

    pub fn search(&self, query: &str, k: usize) -> KbResult<Vec<SearchHit>> {
        Ok(self.snapshot()?.search(query, k))
    }

    pub fn len(&self) -> KbResult<usize> {
        Ok(self.snapshot()?.len())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rec(id: &str, title: &str) -> KnownIssueRecord {
        KnownIssueRecord {
            id: id.into(),
            title: title.into(),
            symptoms: vec![],
            content: String::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = KbStore::new();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.search("anything", 3).unwrap().is_empty());
    }

    #[test]
    fn reload_replaces_wholesale() {
        let store = KbStore::new();
        store.load(vec![rec("A", "checkout error"), rec("B", "login")]).unwrap();
        assert_eq!(store.len().unwrap(), 2);

        store.load(vec![rec("C", "export timeout")]).unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.records()[0].id, "C");
    }

    #[test]
    fn old_snapshot_survives_reload() {
        let store = KbStore::new();
        store.load(vec![rec("A", "checkout error")]).unwrap();
        let before = store.snapshot().unwrap();

        store.load(vec![rec("B", "login"), rec("C", "export")]).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before.search("checkout", 3)[0].record.id, "A");
    }

    #[test]
    fn duplicate_ids_keep_previous_snapshot() {
        let store = KbStore::new();
        store.load(vec![rec("A", "checkout")]).unwrap();
        let err = store.load(vec![rec("B", "x"), rec("B", "y")]).unwrap_err();
        assert!(matches!(err, KbError::DuplicateId(_)));
        assert_eq!(store.snapshot().unwrap().records()[0].id, "A");
    }

    #[test]
    fn load_from_missing_path_is_tolerated() {
        let store = KbStore::new();
        store.load(vec![rec("A", "checkout")]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store.load_from_path(&dir.path().join("kb.json")).unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn load_from_path_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"[{{"id":"A","title":"Checkout 500","symptoms":["500"],"content":""}}]"#)
            .unwrap();
        let store = KbStore::new();
        assert_eq!(store.load_from_path(f.path()).unwrap(), Some(1));
        assert_eq!(store.search("500", 1).unwrap()[0].record.id, "A");
    }

    #[test]
    fn concurrent_readers_during_reload() {
        let store = Arc::new(KbStore::new());
        store.load(vec![rec("A", "checkout error")]).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let hits = s.search("checkout", 3).unwrap();
                        assert!(hits.len() <= 2);
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let recs = if i % 2 == 0 {
                vec![rec("A", "checkout error"), rec("B", "checkout slow")]
            } else {
                vec![rec("A", "checkout error")]
            };
            store.load(recs).unwrap();
        }
        for r in readers {
            r.join().unwrap();
        }
    }
}
