//! Process-wide counting tables.
//!
//! Counting tables are monotone: a partition table for `(N, K)` answers
//! every query with `n ≤ N, k ≤ K`, and a Dyck or involution table of size
//! `N` answers every smaller size. A [`SharedTable`] therefore holds at most
//! one table per kind and serves every covered request from it; an
//! uncovered request replaces it with a table large enough for both. Memory
//! stays bounded by the largest table requested rather than by the number
//! of distinct requests.
//!
//! Builds run under the write lock, so concurrent callers needing the same
//! growth wait for a single build instead of racing. Callers keep the
//! `Arc<T>` they were handed, so replacing the shared table never
//! invalidates a walk in progress.

use std::sync::Arc;

use parking_lot::RwLock;

/// At most one live table of a kind, grown on demand.
#[derive(Debug)]
pub struct SharedTable<T> {
    name: &'static str,
    current: RwLock<Option<Arc<T>>>,
}

impl<T> SharedTable<T> {
    /// Creates an empty slot. `name` only appears in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: RwLock::new(None),
        }
    }

    /// Returns the current table if `covers` accepts it, otherwise builds a
    /// replacement with `build`, which receives the table being replaced.
    pub fn get_covering(
        &self,
        covers: impl Fn(&T) -> bool,
        build: impl FnOnce(Option<&T>) -> T,
    ) -> Arc<T> {
        if let Some(table) = self.current.read().as_ref() {
            if covers(table) {
                log::trace!("{} table hit", self.name);
                return Arc::clone(table);
            }
        }
        let mut slot = self.current.write();
        if let Some(table) = slot.as_ref() {
            if covers(table) {
                return Arc::clone(table);
            }
        }
        let table = Arc::new(build(slot.as_deref()));
        *slot = Some(Arc::clone(&table));
        table
    }

    /// The live table, if any request has been served yet.
    pub fn current(&self) -> Option<Arc<T>> {
        self.current.read().clone()
    }

    /// Drops the live table. Tables still held by callers stay alive.
    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn grow(table: &SharedTable<Vec<u32>>, len: usize, builds: &AtomicUsize) -> Arc<Vec<u32>> {
        table.get_covering(
            |t| t.len() >= len,
            |prev| {
                builds.fetch_add(1, Ordering::SeqCst);
                let len = prev.map_or(len, |p| p.len().max(len));
                (0..len as u32).collect()
            },
        )
    }

    #[test]
    fn test_smaller_requests_reuse_the_covering_table() {
        let table = SharedTable::new("test");
        let builds = AtomicUsize::new(0);
        let big = grow(&table, 50, &builds);
        for len in (1..=50).rev() {
            assert!(Arc::ptr_eq(&grow(&table, len, &builds), &big));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_growing_sweep_keeps_one_table() {
        let table = SharedTable::new("test");
        let builds = AtomicUsize::new(0);
        for len in 1..=200 {
            grow(&table, len, &builds);
            grow(&table, len / 2, &builds);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 200);
        assert_eq!(table.current().map(|t| t.len()), Some(200));
    }

    #[test]
    fn test_concurrent_requests_share_one_build() {
        let table: Arc<SharedTable<Vec<u32>>> = Arc::new(SharedTable::new("test"));
        let builds = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                let builds = Arc::clone(&builds);
                std::thread::spawn(move || {
                    table
                        .get_covering(
                            |t| t.len() >= 3,
                            |_| {
                                builds.fetch_add(1, Ordering::SeqCst);
                                std::thread::sleep(std::time::Duration::from_millis(10));
                                vec![1, 2, 3]
                            },
                        )
                        .len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 3);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_keeps_outstanding_tables() {
        let table = SharedTable::new("test");
        let builds = AtomicUsize::new(0);
        let held = grow(&table, 4, &builds);
        table.clear();
        assert!(table.current().is_none());
        assert_eq!(held.len(), 4);
    }
}
