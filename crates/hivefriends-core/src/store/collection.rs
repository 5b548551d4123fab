// ── Ordered reactive collection ──
//
// Server lists keep the order the backend returned. The snapshot behind
// the `watch` channel is the single source of truth; every mutation
// rebuilds it.

use std::sync::Arc;

use tokio::sync::watch;

pub(crate) struct Collection<T: Send + Sync + 'static> {
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> Collection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace every entity, keeping the given order.
    pub(crate) fn replace(&self, items: Vec<T>) {
        let values: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        self.publish(values);
    }

    pub(crate) fn push(&self, item: T) {
        let mut values = (*self.snapshot()).clone();
        values.push(Arc::new(item));
        self.publish(values);
    }

    /// Replace the first entity matching `pred`. Returns `false` if none did.
    pub(crate) fn replace_where(&self, pred: impl Fn(&T) -> bool, item: T) -> bool {
        let mut values = (*self.snapshot()).clone();
        let Some(slot) = values.iter_mut().find(|v| pred(v)) else {
            return false;
        };
        *slot = Arc::new(item);
        self.publish(values);
        true
    }

    /// Drop every entity matching `pred`. Returns how many were removed.
    pub(crate) fn remove_where(&self, pred: impl Fn(&T) -> bool) -> usize {
        let before = self.snapshot();
        let values: Vec<Arc<T>> = before.iter().filter(|v| !pred(v)).cloned().collect();
        let removed = before.len() - values.len();
        if removed > 0 {
            self.publish(values);
        }
        removed
    }

    pub(crate) fn find(&self, pred: impl Fn(&T) -> bool) -> Option<Arc<T>> {
        self.snapshot.borrow().iter().find(|v| pred(v)).cloned()
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn clear(&self) {
        self.publish(Vec::new());
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    fn publish(&self, values: Vec<Arc<T>>) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
