use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Copy-on-write cell: one writer at a time, readers take cheap `Arc` snapshots.
///
/// A writer clones the current value, edits the clone and publishes it only if the
/// edit succeeds, so a failed update leaves the visible state untouched. Readers
/// never wait for a writer's edit, only for the pointer swap.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
    writer: Mutex<()>,
}

impl<T: Clone> SnapshotCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
            writer: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Arc<T> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn update<R, E>(&self, edit: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = T::clone(&self.load());
        let outcome = edit(&mut next)?;
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
        Ok(outcome)
    }

    pub fn modify<R>(&self, edit: impl FnOnce(&mut T) -> R) -> R {
        match self.update(|value| Ok::<R, Infallible>(edit(value))) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }
}

impl<T: Clone + Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let cell = SnapshotCell::new(vec![1]);
        let before = cell.load();
        cell.modify(|v| v.push(2));
        assert_eq!(*before, vec![1]);
        assert_eq!(*cell.load(), vec![1, 2]);
    }

    #[test]
    fn test_failed_update_is_not_published() {
        let cell = SnapshotCell::new(vec![1]);
        let result: Result<(), &str> = cell.update(|v| {
            v.push(2);
            Err("rejected")
        });
        assert!(result.is_err());
        assert_eq!(*cell.load(), vec![1]);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_appends() {
        let cell = Arc::new(SnapshotCell::new(Vec::new()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for i in 0..50 {
                        cell.update(|v| {
                            v.push(t * 100 + i);
                            Ok::<_, ()>(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cell.load().len(), 400);
    }
}
