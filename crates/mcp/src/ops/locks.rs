#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Per-key FIFO lock map. Waiters acquire in enqueue order; entries vanish
/// once nothing holds or waits on them, so an idle context carries no state.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    entries: Mutex<HashMap<String, Arc<LockEntry>>>,
}

#[derive(Debug, Default)]
struct LockEntry {
    state: Mutex<TicketState>,
    cond: Condvar,
}

#[derive(Debug, Default)]
struct TicketState {
    next_ticket: u64,
    now_serving: u64,
}

#[derive(Debug)]
pub(crate) struct KeyLockGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    entry: Arc<LockEntry>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire(&self, key: &str) -> KeyLockGuard<'_> {
        // The ticket is taken while the map mutex is held so release-time
        // pruning can never race a fresh waiter on the same entry.
        let (entry, ticket) = {
            let mut entries = lock(&self.entries);
            let entry = entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(LockEntry::default()))
                .clone();
            let ticket = {
                let mut state = lock(&entry.state);
                let ticket = state.next_ticket;
                state.next_ticket += 1;
                ticket
            };
            (entry, ticket)
        };

        let mut state = lock(&entry.state);
        while state.now_serving != ticket {
            state = entry
                .cond
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        drop(state);

        KeyLockGuard {
            locks: self,
            key: key.to_string(),
            entry,
        }
    }

    /// Both keys, ascending order, for two-key operations (deadlock
    /// avoidance). The keys must differ.
    pub(crate) fn acquire_pair(
        &self,
        first: &str,
        second: &str,
    ) -> (KeyLockGuard<'_>, KeyLockGuard<'_>) {
        if first <= second {
            let a = self.acquire(first);
            let b = self.acquire(second);
            (a, b)
        } else {
            let b = self.acquire(second);
            let a = self.acquire(first);
            (a, b)
        }
    }

    fn release(&self, key: &str, entry: &Arc<LockEntry>) {
        let mut entries = lock(&self.entries);
        let drained = {
            let mut state = lock(&entry.state);
            state.now_serving += 1;
            state.now_serving == state.next_ticket
        };
        entry.cond.notify_all();
        if drained {
            if let Some(current) = entries.get(key) {
                if Arc::ptr_eq(current, entry) {
                    entries.remove(key);
                }
            }
        }
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.key, &self.entry);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
