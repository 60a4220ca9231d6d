//! Subscribable read model for the declarative layer.

/// What the declarative layer observes about a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerSnapshot {
    /// Whether the engine is initialized and commands may be issued.
    pub ready: bool,
}

/// Token returned by [`ViewerStore::subscribe`](super::ViewerStore::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(ViewerSnapshot)>;

/// Snapshot plus the callbacks waiting on it.
#[derive(Default)]
pub(crate) struct SnapshotCell {
    current: ViewerSnapshot,
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl SnapshotCell {
    pub(crate) fn get(&self) -> ViewerSnapshot {
        self.current
    }

    /// Replace the snapshot; listeners run only if the value changed.
    pub(crate) fn set(&mut self, next: ViewerSnapshot) {
        if next == self.current {
            return;
        }
        self.current = next;
        for (_, listener) in &mut self.listeners {
            listener(next);
        }
    }

    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_fire_only_on_change() {
        let mut cell = SnapshotCell::default();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let id = cell.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));

        cell.set(ViewerSnapshot { ready: false });
        assert_eq!(calls.get(), 0);
        cell.set(ViewerSnapshot { ready: true });
        cell.set(ViewerSnapshot { ready: true });
        assert_eq!(calls.get(), 1);

        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set(ViewerSnapshot { ready: false });
        assert_eq!(calls.get(), 1);
    }
}
