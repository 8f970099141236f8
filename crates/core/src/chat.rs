//! Locally persisted chat transcripts for the assistant screen.
//!
//! Chats are stored as one JSON list under [`CHAT_HISTORY_KEY`], newest first, and the next
//! chat number under [`CHAT_COUNTER_KEY`]. Both are wiped by logout along with everything
//! else in local storage.

use crate::constants::{CHAT_COUNTER_KEY, CHAT_HISTORY_KEY};
use crate::storage::KeyValueStore;
use crate::{CardioError, CardioResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: u32,
    pub name: String,
    pub messages: Vec<ChatMessage>,
}

/// All chats plus the selection state of the assistant screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistory {
    chats: Vec<Chat>,
    counter: u32,
    current: Option<u32>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self {
            chats: Vec::new(),
            counter: 1,
            current: None,
        }
    }
}

impl ChatHistory {
    /// Loads chats and counter from `store`. The first (newest) chat becomes current.
    ///
    /// A malformed chat list is logged and treated as empty; a malformed counter falls back
    /// to one past the highest stored id.
    pub fn load(store: &impl KeyValueStore) -> CardioResult<Self> {
        let chats: Vec<Chat> = match store.get(CHAT_HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed chat history: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let next_free = chats.iter().map(|c| c.id + 1).max().unwrap_or(1);
        let counter = match store.get(CHAT_COUNTER_KEY)? {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!("ignoring malformed chat counter: {:?}", raw);
                next_free
            }),
            None => next_free,
        };

        Ok(Self {
            current: chats.first().map(|c| c.id),
            chats,
            // A counter behind the stored ids would hand out a duplicate.
            counter: counter.max(next_free),
        })
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn current(&self) -> Option<&Chat> {
        self.current
            .and_then(|id| self.chats.iter().find(|c| c.id == id))
    }

    /// Creates `Chat N`, puts it first and makes it current.
    pub fn create_chat(&mut self, store: &mut impl KeyValueStore) -> CardioResult<&Chat> {
        let id = self.counter;
        self.chats.insert(
            0,
            Chat {
                id,
                name: format!("Chat {id}"),
                messages: Vec::new(),
            },
        );
        self.current = Some(id);
        self.counter += 1;

        self.save_chats(store)?;
        store.set(CHAT_COUNTER_KEY, &self.counter.to_string())?;

        Ok(&self.chats[0])
    }

    pub fn select(&mut self, id: u32) -> CardioResult<()> {
        if !self.chats.iter().any(|c| c.id == id) {
            return Err(CardioError::InvalidInput(format!("no chat with id {id}")));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Appends a message to the current chat.
    ///
    /// Returns `false` without touching storage when the text is blank or no chat is
    /// selected.
    pub fn append(
        &mut self,
        store: &mut impl KeyValueStore,
        speaker: Speaker,
        text: &str,
    ) -> CardioResult<bool> {
        let text = text.trim();
        let Some(current) = self.current else {
            return Ok(false);
        };
        if text.is_empty() {
            return Ok(false);
        }
        let Some(chat) = self.chats.iter_mut().find(|c| c.id == current) else {
            return Ok(false);
        };

        chat.messages.push(ChatMessage {
            speaker,
            text: text.to_string(),
        });
        self.save_chats(store)?;
        Ok(true)
    }

    /// Deletes a chat. If it was current, the first remaining chat becomes current.
    pub fn delete_chat(&mut self, store: &mut impl KeyValueStore, id: u32) -> CardioResult<()> {
        let before = self.chats.len();
        self.chats.retain(|c| c.id != id);
        if self.chats.len() == before {
            return Err(CardioError::InvalidInput(format!("no chat with id {id}")));
        }
        if self.current == Some(id) {
            self.current = self.chats.first().map(|c| c.id);
        }
        self.save_chats(store)
    }

    fn save_chats(&self, store: &mut impl KeyValueStore) -> CardioResult<()> {
        let raw = serde_json::to_string(&self.chats).map_err(CardioError::Serialization)?;
        store.set(CHAT_HISTORY_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn new_chats_are_prepended_and_numbered() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::load(&store).unwrap();
        assert_eq!(history.counter(), 1);

        history.create_chat(&mut store).unwrap();
        history.create_chat(&mut store).unwrap();

        let names: Vec<_> = history.chats().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Chat 2", "Chat 1"]);
        assert_eq!(history.current().map(|c| c.id), Some(2));
        assert_eq!(store.get(CHAT_COUNTER_KEY).unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn history_reloads_from_storage() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::load(&store).unwrap();
        history.create_chat(&mut store).unwrap();
        history
            .append(&mut store, Speaker::User, "¿Qué significa mi riesgo?")
            .unwrap();

        let reloaded = ChatHistory::load(&store).unwrap();
        assert_eq!(reloaded, history);
        assert_eq!(reloaded.current().unwrap().messages.len(), 1);
    }

    #[test]
    fn blank_input_or_no_current_chat_is_ignored() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::load(&store).unwrap();
        assert!(!history.append(&mut store, Speaker::User, "hola").unwrap());

        history.create_chat(&mut store).unwrap();
        assert!(!history.append(&mut store, Speaker::User, "   ").unwrap());
        assert!(history.append(&mut store, Speaker::User, "hola").unwrap());
    }

    #[test]
    fn deleting_current_chat_selects_first_remaining() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::load(&store).unwrap();
        for _ in 0..3 {
            history.create_chat(&mut store).unwrap();
        }
        history.select(2).unwrap();
        history.delete_chat(&mut store, 2).unwrap();
        assert_eq!(history.current().map(|c| c.id), Some(3));

        history.delete_chat(&mut store, 1).unwrap();
        history.delete_chat(&mut store, 3).unwrap();
        assert!(history.current().is_none());
        assert!(history.delete_chat(&mut store, 3).is_err());
        // the counter never goes backwards
        assert_eq!(history.counter(), 4);
    }

    #[test]
    fn malformed_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set(CHAT_HISTORY_KEY, "{oops").unwrap();
        store.set(CHAT_COUNTER_KEY, "many").unwrap();
        let history = ChatHistory::load(&store).unwrap();
        assert!(history.chats().is_empty());
        assert_eq!(history.counter(), 1);
    }

    #[test]
    fn stale_counter_cannot_reuse_an_id() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::load(&store).unwrap();
        history.create_chat(&mut store).unwrap();
        history.create_chat(&mut store).unwrap();
        // chat list written, counter write lost
        store.set(CHAT_COUNTER_KEY, "2").unwrap();

        let mut reloaded = ChatHistory::load(&store).unwrap();
        assert_eq!(reloaded.counter(), 3);
        let id = reloaded.create_chat(&mut store).unwrap().id;
        assert_eq!(id, 3);

        reloaded.delete_chat(&mut store, 2).unwrap();
        assert_eq!(reloaded.chats().len(), 2);
    }
}
