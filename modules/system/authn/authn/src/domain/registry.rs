//! Registry of authentication clients.

use std::collections::HashMap;
use std::sync::Arc;

use authn_sdk::AuthNClient;

use super::queue::PriorityQueue;

/// All registered clients by name, plus the context-aware subset in
/// priority order.
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn AuthNClient>>,
    queue: PriorityQueue<Arc<dyn AuthNClient>>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `client` under its name.
    ///
    /// A client already registered under the same name is replaced, including
    /// its position in the dispatch order.
    pub fn register(&mut self, client: Arc<dyn AuthNClient>) {
        let name = client.name().to_owned();

        if self.clients.insert(name.clone(), Arc::clone(&client)).is_some() {
            let removed = self.queue.remove_where(|c| c.name() == name);
            tracing::debug!(client = %name, removed, "Replacing registered client");
        }

        let priority = client.as_context_aware().map(|c| c.priority());
        if let Some(priority) = priority {
            self.queue.insert(client, priority);
        }

        tracing::debug!(client = %name, ?priority, "Registered client");
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn AuthNClient>> {
        self.clients.get(name)
    }

    /// Context-aware clients, lowest priority value first.
    pub fn ordered(&self) -> impl Iterator<Item = &Arc<dyn AuthNClient>> {
        self.queue.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
