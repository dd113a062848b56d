//! Observable game state
//!
//! `StateCell` holds the current snapshot behind an `Arc` and fans every
//! replacement out to subscribers. Readers clone the `Arc`, so a read never
//! sees a half-written state.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::state::GameState;

/// Shared, immutable snapshot
pub type Snapshot = Arc<GameState>;

/// Current value plus subscriber list
#[derive(Debug)]
pub struct StateCell {
    current: RwLock<Snapshot>,
    subscribers: Mutex<Vec<Sender<Snapshot>>>,
}

impl StateCell {
    pub fn new(initial: GameState) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Latest published snapshot
    pub fn get(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot and notify subscribers in publish order
    pub fn publish(&self, next: GameState) -> Snapshot {
        let next = Arc::new(next);
        // Hold the subscriber lock across the swap so a concurrent subscribe
        // can't miss or duplicate this value.
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        subscribers.retain(|tx| tx.send(next.clone()).is_ok());
        next
    }

    /// Subscribe; the current snapshot is delivered immediately
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Receiver is alive, this send can't fail
        let _ = tx.send(self.get());
        subscribers.push(tx);
        Subscription { rx }
    }

    /// Live subscriber count (dropped subscriptions are pruned on publish)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving end of a state subscription
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<Snapshot>,
}

impl Subscription {
    /// Next pending snapshot, without blocking
    pub fn try_next(&self) -> Option<Snapshot> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything pending and keep only the newest
    pub fn latest(&self) -> Option<Snapshot> {
        let mut newest = None;
        while let Some(snapshot) = self.try_next() {
            newest = Some(snapshot);
        }
        newest
    }

    /// All pending snapshots in publish order
    pub fn pending(&self) -> Vec<Snapshot> {
        self.rx.try_iter().collect()
    }
}
