//! Stable priority queue used to order context-aware clients.

struct QueueItem<T> {
    priority: i16,
    value: T,
}

/// Items ordered by ascending priority; equal priorities keep insertion order.
///
/// Insertion is a linear scan. The queue is only written while the service
/// is being built, and holds a handful of clients.
pub struct PriorityQueue<T> {
    items: Vec<QueueItem<T>>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn insert(&mut self, value: T, priority: i16) {
        // First slot holding a strictly greater priority, so equal priorities stay FIFO.
        let pos = self
            .items
            .iter()
            .position(|item| item.priority > priority)
            .unwrap_or(self.items.len());
        self.items.insert(pos, QueueItem { priority, value });
    }

    /// Removes every item matching `pred`, returning how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(&item.value));
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
