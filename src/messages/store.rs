//! In-memory message log.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// One page of messages, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Total number of stored messages.
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<Message>,
}

/// Append-only message log shared between handlers.
#[derive(Default)]
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, sender: impl Into<String>, content: impl Into<String>) -> Message {
        let message = Message {
            id: Uuid::new_v4(),
            sender: sender.into(),
            content: content.into(),
            sent_at: Utc::now(),
        };
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        message
    }

    /// Fetch page `page` (1-based). Returns `None` when the page does not
    /// exist; an empty log still has one empty page.
    pub fn list(&self, page: usize, page_size: usize) -> Option<Page> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        let count = messages.len();
        let page_size = page_size.max(1);
        let num_pages = count.div_ceil(page_size).max(1);
        if page == 0 || page > num_pages {
            return None;
        }

        let results = messages
            .iter()
            .rev()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        Some(Page {
            count,
            page,
            page_size,
            results,
        })
    }

    pub fn len(&self) -> usize {
        self.messages.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
