use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Revisioned<T> {
    revision: u64,
    value: T,
}

/// Shared, observable holder of a document.
///
/// Cloning yields another handle to the same value. Every `set`/`update`
/// bumps the revision and wakes subscribers; a subscriber that falls behind
/// sees only the latest value.
pub struct ObservableCell<T> {
    tx: Arc<watch::Sender<Revisioned<T>>>,
}

impl<T> Clone for ObservableCell<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T: Clone> ObservableCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(Revisioned { revision: 0, value: initial });
        Self { tx: Arc::new(tx) }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.tx.borrow().value.clone()
    }

    /// Current value and the revision it was published at.
    pub fn snapshot(&self) -> (u64, T) {
        let current = self.tx.borrow();
        (current.revision, current.value.clone())
    }

    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Replace the value; returns the revision it was published at.
    pub fn set(&self, value: T) -> u64 {
        let mut revision = 0;
        self.tx.send_modify(|current| {
            current.revision += 1;
            current.value = value;
            revision = current.revision;
        });
        revision
    }

    /// Mutate in place; subscribers are notified even if nothing changed.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.tx.send_modify(|current| {
            current.revision += 1;
            f(&mut current.value);
        });
    }

    /// Register a subscriber. Its first `changed()` resolves on the next
    /// mutation; the value at subscription time is available immediately.
    pub fn subscribe(&self) -> CellSubscriber<T> {
        CellSubscriber { rx: self.tx.subscribe() }
    }
}

impl<T: Default + Clone> Default for ObservableCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

pub struct CellSubscriber<T> {
    rx: watch::Receiver<Revisioned<T>>,
}

impl<T: Clone> CellSubscriber<T> {
    /// Wait for a mutation not yet seen by this subscriber.
    /// Fails once every cell handle has been dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Latest value without marking it seen.
    pub fn get(&self) -> T {
        self.rx.borrow().value.clone()
    }

    /// Latest revision and value, marking it seen.
    pub fn latest(&mut self) -> (u64, T) {
        let current = self.rx.borrow_and_update();
        (current.revision, current.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_update_bump_revision() {
        let cell = ObservableCell::new(1u32);
        assert_eq!(cell.snapshot(), (0, 1));

        cell.set(5);
        cell.update(|v| *v += 1);

        assert_eq!(cell.get(), 6);
        assert_eq!(cell.revision(), 2);
    }

    #[test]
    fn clones_share_the_value() {
        let a = ObservableCell::new(String::from("x"));
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
    }

    #[tokio::test]
    async fn subscriber_sees_initial_value_then_latest() {
        let cell = ObservableCell::new(0u32);
        let mut sub = cell.subscribe();
        assert_eq!(sub.get(), 0);

        cell.set(1);
        cell.set(2);
        sub.changed().await.expect("cell alive");
        assert_eq!(sub.latest(), (2, 2));
    }

    #[tokio::test]
    async fn changed_fails_after_all_handles_drop() {
        let cell = ObservableCell::new(0u32);
        let mut sub = cell.subscribe();
        drop(cell);
        assert!(sub.changed().await.is_err());
    }
}
