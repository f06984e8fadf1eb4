//! Persistence plumbing: the in-memory store and the save debouncer.
//!
//! The real backend is an opaque platform key/value store reached through
//! [`PersistStore`]; [`InMemoryStore`] is the stand-in used by tests and
//! local runs. [`DebouncedStore`] sits in front of either and coalesces
//! the rapid save bursts the gameplay paths produce (extraction saves,
//! death saves, disconnect saves landing within the same second) into
//! one write per player.

use std::collections::HashMap;

use lastlight_protocol::{PlayerDocument, PlayerId};

use crate::{HookError, PersistStore};

/// How long a queued save waits for further writes to coalesce into it.
pub const SAVE_DEBOUNCE_MS: u64 = 500;

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

/// A [`PersistStore`] holding serialized documents in a map.
///
/// Documents are kept as JSON bytes, not parsed values, so loads exercise
/// the same shape-validation path the real backend does.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: HashMap<PlayerId, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw document, bypassing validation. Lets tests plant
    /// malformed data to exercise the fallback path.
    pub fn seed_raw(&mut self, player: PlayerId, bytes: Vec<u8>) {
        self.docs.insert(player, bytes);
    }
}

impl PersistStore for InMemoryStore {
    fn load(&mut self, player: &PlayerId) -> Result<Option<PlayerDocument>, HookError> {
        match self.docs.get(player) {
            None => Ok(None),
            Some(bytes) => PlayerDocument::from_json(bytes)
                .map(Some)
                .map_err(|err| HookError::Storage(err.to_string())),
        }
    }

    fn save(&mut self, player: &PlayerId, doc: &PlayerDocument) -> Result<(), HookError> {
        let bytes = doc
            .to_json()
            .map_err(|err| HookError::Storage(err.to_string()))?;
        self.docs.insert(player.clone(), bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DebouncedStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PendingSave {
    doc: PlayerDocument,
    due_ms: u64,
}

/// Coalesces saves: the first write for a player schedules a flush
/// [`SAVE_DEBOUNCE_MS`] later; further writes inside that window replace
/// the pending document without pushing the deadline back. Driven by the
/// server's sweep via [`DebouncedStore::tick`].
pub struct DebouncedStore {
    inner: Box<dyn PersistStore>,
    debounce_ms: u64,
    pending: HashMap<PlayerId, PendingSave>,
}

impl DebouncedStore {
    pub fn new(inner: Box<dyn PersistStore>, debounce_ms: u64) -> Self {
        Self {
            inner,
            debounce_ms,
            pending: HashMap::new(),
        }
    }

    /// Passthrough read. Pending writes shadow the backend so a load
    /// never observes data older than the latest queued save.
    pub fn load(&mut self, player: &PlayerId) -> Result<Option<PlayerDocument>, HookError> {
        if let Some(pending) = self.pending.get(player) {
            return Ok(Some(pending.doc.clone()));
        }
        self.inner.load(player)
    }

    /// Queues `doc` for writing, replacing any pending document.
    pub fn queue_save(&mut self, player: &PlayerId, doc: PlayerDocument, now_ms: u64) {
        self.pending
            .entry(player.clone())
            .and_modify(|pending| pending.doc = doc.clone())
            .or_insert(PendingSave {
                doc,
                due_ms: now_ms + self.debounce_ms,
            });
    }

    /// Writes every pending document whose debounce window has elapsed.
    /// Failures are logged and the document is dropped — the next
    /// gameplay save will queue a fresh one.
    pub fn tick(&mut self, now_ms: u64) {
        let due: Vec<PlayerId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due_ms <= now_ms)
            .map(|(player, _)| player.clone())
            .collect();
        for player in due {
            if let Some(pending) = self.pending.remove(&player) {
                if let Err(err) = self.inner.save(&player, &pending.doc) {
                    tracing::warn!(%player, %err, "debounced save failed");
                }
            }
        }
    }

    /// Writes everything still pending, ignoring deadlines. Called on
    /// shutdown so no queued save is lost.
    pub fn flush_all(&mut self) {
        let players: Vec<PlayerId> = self.pending.keys().cloned().collect();
        for player in players {
            if let Some(pending) = self.pending.remove(&player) {
                if let Err(err) = self.inner.save(&player, &pending.doc) {
                    tracing::warn!(%player, %err, "flush save failed");
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(name: &str) -> PlayerId {
        PlayerId(name.into())
    }

    fn doc_with_currency(currency: u64) -> PlayerDocument {
        PlayerDocument {
            currency,
            ..Default::default()
        }
    }

    /// Records the currency of every document written through it.
    struct CountingStore {
        saves: std::sync::Arc<std::sync::Mutex<Vec<u64>>>,
    }

    impl PersistStore for CountingStore {
        fn load(&mut self, _player: &PlayerId) -> Result<Option<PlayerDocument>, HookError> {
            Ok(None)
        }
        fn save(&mut self, _player: &PlayerId, doc: &PlayerDocument) -> Result<(), HookError> {
            self.saves.lock().unwrap().push(doc.currency);
            Ok(())
        }
    }

    fn counting() -> (DebouncedStore, std::sync::Arc<std::sync::Mutex<Vec<u64>>>) {
        let saves = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let store = DebouncedStore::new(
            Box::new(CountingStore {
                saves: saves.clone(),
            }),
            500,
        );
        (store, saves)
    }

    #[test]
    fn test_in_memory_store_round_trip() {
        let mut store = InMemoryStore::new();
        assert!(store.load(&pid("rook")).unwrap().is_none());
        store.save(&pid("rook"), &doc_with_currency(7)).unwrap();
        assert_eq!(store.load(&pid("rook")).unwrap().unwrap().currency, 7);
    }

    #[test]
    fn test_in_memory_store_rejects_malformed_seed() {
        let mut store = InMemoryStore::new();
        store.seed_raw(pid("rook"), b"{ not json".to_vec());
        assert!(store.load(&pid("rook")).is_err());
    }

    #[test]
    fn test_queue_save_coalesces_burst_into_one_write() {
        let (mut store, saves) = counting();
        store.queue_save(&pid("rook"), doc_with_currency(1), 1_000);
        store.queue_save(&pid("rook"), doc_with_currency(2), 1_100);
        store.queue_save(&pid("rook"), doc_with_currency(3), 1_200);

        // Nothing written before the first save's deadline…
        store.tick(1_400);
        assert!(saves.lock().unwrap().is_empty());

        // …then exactly one write, carrying the newest document.
        store.tick(1_500);
        assert_eq!(*saves.lock().unwrap(), vec![3]);
        store.tick(2_000);
        assert_eq!(saves.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_load_sees_pending_document_before_flush() {
        let (mut store, _saves) = counting();
        store.queue_save(&pid("rook"), doc_with_currency(9), 1_000);
        assert_eq!(store.load(&pid("rook")).unwrap().unwrap().currency, 9);
    }

    #[test]
    fn test_flush_all_ignores_deadlines() {
        let (mut store, saves) = counting();
        store.queue_save(&pid("rook"), doc_with_currency(5), 1_000);
        store.queue_save(&pid("doe"), doc_with_currency(6), 1_000);
        store.flush_all();
        assert!(store.pending.is_empty());
        let mut written = saves.lock().unwrap().clone();
        written.sort_unstable();
        assert_eq!(written, vec![5, 6]);
    }
}
