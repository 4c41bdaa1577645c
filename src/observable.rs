//! Latest-value holders that background work writes and the UI reads.
//!
//! A new subscriber immediately receives the current value. The deduplicating
//! flavor drops a `set` equal to the value already held, so subscribers never
//! see the same value twice in a row.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Inner<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

pub struct Observable<T> {
    inner: Mutex<Inner<T>>,
    distinct: bool,
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Emits every `set`, even when the value did not change.
    pub fn new(value: T) -> Self {
        Self::build(value, false)
    }

    /// Emits only when the value differs from the one held.
    pub fn distinct(value: T) -> Self {
        Self::build(value, true)
    }

    fn build(value: T, distinct: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value,
                subscribers: Vec::new(),
            }),
            distinct,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Store `value` and notify subscribers. Returns whether anything was
    /// emitted.
    pub fn set(&self, value: T) -> bool {
        let mut inner = self.lock();
        if self.distinct && inner.value == value {
            return false;
        }
        inner.value = value;
        let current = inner.value.clone();
        inner
            .subscribers
            .retain(|tx| tx.send(current.clone()).is_ok());
        true
    }

    /// Subscribe to future values; the current value is delivered first.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.lock();
        if tx.send(inner.value.clone()).is_ok() {
            inner.subscribers.push(tx);
        }
        rx
    }
}

impl<T: Clone + PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
