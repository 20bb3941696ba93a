use serde::{Deserialize, Serialize};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// Per-user conversation history.
pub trait ConversationStore: Send + Sync {
    fn history(&self, user_id: &str) -> Vec<Message>;
    fn append(&self, user_id: &str, message: Message);
    /// Empties the history of a known user. Unknown users are left untouched.
    fn reset(&self, user_id: &str) -> bool;
    fn clear_all(&self);
    fn user_count(&self) -> usize;
}

/// In-memory store keeping at most `window` messages per user.
#[derive(Clone)]
pub struct InMemoryConversationStore {
    store: Arc<DashMap<String, Vec<Message>>>,
    window: usize,
}

impl InMemoryConversationStore {
    pub fn new(window: usize) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn history(&self, user_id: &str) -> Vec<Message> {
        match self.store.get(user_id) {
            Some(history) => history.clone(),
            None => Vec::new(),
        }
    }

    fn append(&self, user_id: &str, message: Message) {
        let mut entry = self.store.entry(user_id.to_string()).or_default();
        entry.push(message);
        if entry.len() > self.window {
            let overflow = entry.len() - self.window;
            entry.drain(..overflow);
        }
    }

    fn reset(&self, user_id: &str) -> bool {
        match self.store.get_mut(user_id) {
            Some(mut history) => {
                history.clear();
                true
            }
            None => false,
        }
    }

    fn clear_all(&self) {
        self.store.clear();
    }

    fn user_count(&self) -> usize {
        self.store.len()
    }
}
