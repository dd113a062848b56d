//! Background save worker
//!
//! Mutations hand their record to the worker and return immediately. Writes
//! queued back to back are coalesced so only the newest one hits storage, and
//! a clear is applied in order with the writes around it.

use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{self, Receiver, Sender};
#[cfg(not(target_arch = "wasm32"))]
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use super::codec::Record;
use super::store::KeyValueStore;

/// How saves reach storage. Settings files may spell it loosely
/// ("background", "bg", "immediate", "sync").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum SaveMode {
    /// Queue to a worker, caller never waits
    #[default]
    Background,
    /// Write before the mutating call returns
    Immediate,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Background => "Background",
            SaveMode::Immediate => "Immediate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "background" | "bg" => Some(SaveMode::Background),
            "immediate" | "sync" => Some(SaveMode::Immediate),
            _ => None,
        }
    }
}

impl TryFrom<String> for SaveMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown save mode: {value}"))
    }
}

enum SaveJob {
    Write(Record),
    Clear,
    #[cfg(not(target_arch = "wasm32"))]
    Flush(Sender<()>),
}

/// Owns the path from in-memory state to durable storage
pub struct SaveWorker {
    store: Arc<dyn KeyValueStore>,
    mode: SaveMode,
    #[cfg(not(target_arch = "wasm32"))]
    tx: Option<Sender<SaveJob>>,
    #[cfg(not(target_arch = "wasm32"))]
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SaveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveWorker")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SaveWorker {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(store: Arc<dyn KeyValueStore>, mode: SaveMode) -> Self {
        let mut worker = Self {
            store,
            mode,
            tx: None,
            handle: None,
        };
        if mode == SaveMode::Background {
            let (tx, rx) = mpsc::channel();
            let store = worker.store.clone();
            match std::thread::Builder::new()
                .name("save-worker".into())
                .spawn(move || run(store.as_ref(), rx))
            {
                Ok(handle) => {
                    worker.tx = Some(tx);
                    worker.handle = Some(handle);
                }
                Err(e) => {
                    log::warn!("Could not start save worker ({e}), saving synchronously");
                    worker.mode = SaveMode::Immediate;
                }
            }
        }
        worker
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(store: Arc<dyn KeyValueStore>, mode: SaveMode) -> Self {
        Self { store, mode }
    }

    /// Effective mode (background may fall back to immediate)
    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    /// Persist a full record, fire-and-forget
    pub fn write(&self, record: Record) {
        self.dispatch(SaveJob::Write(record));
    }

    /// Remove the saved game, ordered after any queued writes
    pub fn clear(&self) {
        self.dispatch(SaveJob::Clear);
    }

    /// Block until everything queued so far is applied
    #[cfg(not(target_arch = "wasm32"))]
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(SaveJob::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Jobs run as soon as the browser's event loop yields
    #[cfg(target_arch = "wasm32")]
    pub fn flush(&self) {}

    #[cfg(not(target_arch = "wasm32"))]
    fn dispatch(&self, job: SaveJob) {
        match &self.tx {
            Some(tx) => {
                if let Err(mpsc::SendError(job)) = tx.send(job) {
                    // Worker thread died; keep saving on the caller's thread
                    apply(self.store.as_ref(), job);
                }
            }
            None => apply(self.store.as_ref(), job),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn dispatch(&self, job: SaveJob) {
        match self.mode {
            SaveMode::Immediate => apply(self.store.as_ref(), job),
            SaveMode::Background => {
                let store = self.store.clone();
                wasm_bindgen_futures::spawn_local(async move { apply(store.as_ref(), job) });
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for SaveWorker {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("Save worker panicked");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(store: &dyn KeyValueStore, rx: Receiver<SaveJob>) {
    let mut next = rx.recv().ok();
    while let Some(job) = next.take() {
        match job {
            SaveJob::Write(mut record) => {
                // Coalesce consecutive writes, last one wins
                loop {
                    match rx.try_recv() {
                        Ok(SaveJob::Write(newer)) => record = newer,
                        Ok(other) => {
                            next = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }
                apply(store, SaveJob::Write(record));
            }
            other => apply(store, other),
        }
        if next.is_none() {
            next = rx.recv().ok();
        }
    }
    log::debug!("Save worker stopped");
}

fn apply(store: &dyn KeyValueStore, job: SaveJob) {
    match job {
        SaveJob::Write(record) => {
            if let Err(e) = store.save(&record) {
                log::warn!("Save failed: {e}");
            }
        }
        SaveJob::Clear => {
            if let Err(e) = store.clear() {
                log::warn!("Clearing save failed: {e}");
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        SaveJob::Flush(ack) => {
            let _ = ack.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::StorageError;
    use std::sync::Mutex;

    fn record(points: u64) -> Record {
        Record::from([("total_points".to_string(), points.to_string())])
    }

    /// Records every call so ordering can be checked
    #[derive(Default)]
    struct JournalStore {
        journal: Mutex<Vec<String>>,
    }

    impl KeyValueStore for JournalStore {
        fn load(&self) -> crate::persistence::Result<Record> {
            Ok(Record::new())
        }

        fn save(&self, record: &Record) -> crate::persistence::Result<()> {
            let entry = format!("save {}", record["total_points"]);
            self.journal.lock().unwrap().push(entry);
            Ok(())
        }

        fn clear(&self) -> crate::persistence::Result<()> {
            self.journal.lock().unwrap().push("clear".into());
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self) -> crate::persistence::Result<Record> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn save(&self, _: &Record) -> crate::persistence::Result<()> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn clear(&self) -> crate::persistence::Result<()> {
            Err(StorageError::Unavailable("broken".into()))
        }
    }

    #[test]
    fn test_immediate_writes_synchronously() {
        let store = Arc::new(MemoryStore::new());
        let worker = SaveWorker::new(store.clone(), SaveMode::Immediate);
        worker.write(record(3));
        assert_eq!(store.snapshot(), record(3));
        worker.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_background_last_write_wins() {
        let store = Arc::new(MemoryStore::new());
        let worker = SaveWorker::new(store.clone(), SaveMode::Background);
        for points in 1..=50 {
            worker.write(record(points));
        }
        worker.flush();
        assert_eq!(store.snapshot(), record(50));
    }

    #[test]
    fn test_clear_is_ordered_with_writes() {
        let store = Arc::new(JournalStore::default());
        let worker = SaveWorker::new(store.clone(), SaveMode::Background);
        worker.write(record(1));
        worker.clear();
        worker.write(record(2));
        worker.flush();

        let journal = store.journal.lock().unwrap().clone();
        let clear_at = journal.iter().position(|e| e == "clear").unwrap();
        assert_eq!(journal.last().unwrap(), "save 2");
        assert!(journal[..clear_at].iter().all(|e| e == "save 1"));
    }

    #[test]
    fn test_drop_drains_queue() {
        let store = Arc::new(MemoryStore::new());
        {
            let worker = SaveWorker::new(store.clone(), SaveMode::Background);
            worker.write(record(9));
        }
        assert_eq!(store.snapshot(), record(9));
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let worker = SaveWorker::new(Arc::new(BrokenStore), SaveMode::Background);
        worker.write(record(1));
        worker.clear();
        worker.flush();

        let worker = SaveWorker::new(Arc::new(BrokenStore), SaveMode::Immediate);
        worker.write(record(1));
    }

    #[test]
    fn test_save_mode_from_str() {
        assert_eq!(SaveMode::from_str("Background"), Some(SaveMode::Background));
        assert_eq!(SaveMode::from_str("sync"), Some(SaveMode::Immediate));
        assert_eq!(SaveMode::from_str("later"), None);
        assert_eq!(SaveMode::default().as_str(), "Background");
    }
}
