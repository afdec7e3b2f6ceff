// Collaborator seams: identity lookup, per-user watchlists, chat history.
//
// The document store behind these in production is not part of this
// service; MemoryStore implements all three for local runs and tests.

use std::collections::{HashMap, VecDeque};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use neoradar_common::{ChatMessage, UserRecord, WatchlistEntry};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve an authenticated email to its user record.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
}

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Append unless an entry with the same `neo_id` exists. Returns whether
    /// it was added.
    async fn add(&self, email: &str, entry: WatchlistEntry) -> Result<bool>;

    /// Returns whether anything was removed.
    async fn remove(&self, email: &str, neo_id: &str) -> Result<bool>;

    /// Entries in insertion order.
    async fn list(&self, email: &str) -> Result<Vec<WatchlistEntry>>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn append(&self, message: ChatMessage) -> Result<()>;

    /// The `limit` most recent messages, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>>;
}

/// Chat messages kept in memory; older ones are dropped first.
pub const CHAT_RETENTION: usize = 1000;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    /// Ordered by timestamp, oldest first.
    messages: RwLock<VecDeque<ChatMessage>>,
    provision_on_lookup: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record the first time a verified email is looked up.
    pub fn provisioning(mut self) -> Self {
        self.provision_on_lookup = true;
        self
    }

    pub async fn insert_user(&self, email: &str) {
        self.users
            .write()
            .await
            .entry(email.to_string())
            .or_insert_with(|| empty_user(email));
    }
}

fn empty_user(email: &str) -> UserRecord {
    UserRecord {
        email: email.to_string(),
        watchlist: Vec::new(),
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        if let Some(user) = self.users.read().await.get(email) {
            return Ok(Some(user.clone()));
        }
        if !self.provision_on_lookup {
            return Ok(None);
        }
        let mut users = self.users.write().await;
        let user = users
            .entry(email.to_string())
            .or_insert_with(|| empty_user(email));
        tracing::info!(email, "Provisioned user record");
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn add(&self, email: &str, entry: WatchlistEntry) -> Result<bool> {
        let mut users = self.users.write().await;
        let user = users
            .entry(email.to_string())
            .or_insert_with(|| empty_user(email));
        if user.watchlist.iter().any(|e| e.neo_id == entry.neo_id) {
            return Ok(false);
        }
        user.watchlist.push(entry);
        Ok(true)
    }

    async fn remove(&self, email: &str, neo_id: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(email) else {
            return Ok(false);
        };
        let before = user.watchlist.len();
        user.watchlist.retain(|e| e.neo_id != neo_id);
        Ok(user.watchlist.len() != before)
    }

    async fn list(&self, email: &str) -> Result<Vec<WatchlistEntry>> {
        Ok(self
            .users
            .read()
            .await
            .get(email)
            .map(|u| u.watchlist.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn append(&self, message: ChatMessage) -> Result<()> {
        let mut messages = self.messages.write().await;
        let at = messages.partition_point(|m| m.timestamp <= message.timestamp);
        messages.insert(at, message);
        while messages.len() > CHAT_RETENTION {
            messages.pop_front();
        }
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let messages = self.messages.read().await;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.iter().skip(skip).cloned().collect())
    }
}
