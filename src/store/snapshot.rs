//! Snapshot gateway
//!
//! Converts the store to and from a [`StoreDocument`] and persists it as JSON.
//! Loading merges into the current state; it never resets it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::collections::InsertMode;
use crate::error::{StoreError, StoreResult};
use crate::types::StoreDocument;
use crate::utils::atomic_write;

use super::{reconcile, ChatStore, StoreState};

impl StoreState {
    /// Capture conversations, contacts and non-empty message lists
    pub fn to_document(&self) -> StoreDocument {
        StoreDocument {
            chats: self.chats.to_vec(),
            contacts: self.contacts.clone(),
            messages: self
                .messages
                .iter()
                .filter(|(_, list)| !list.is_empty())
                .map(|(jid, list)| (jid.clone(), list.to_vec()))
                .collect(),
        }
    }

    /// Merge a document: upsert conversations, diff-merge contacts, and
    /// append messages per conversation
    pub fn merge_document(&mut self, doc: StoreDocument) {
        self.chats.upsert(doc.chats);
        reconcile::contacts_set(self, doc.contacts.into_values().collect());
        for (jid, messages) in doc.messages {
            let list = self.message_list_mut(&jid);
            for msg in messages {
                list.upsert(msg, InsertMode::Append);
            }
        }
    }
}

impl ChatStore {
    /// Capture the current state as a document
    pub fn to_document(&self) -> StoreDocument {
        self.state.lock().to_document()
    }

    /// Merge a document into the store. An empty document changes nothing.
    pub fn from_document(&self, doc: StoreDocument) {
        if doc.is_empty() {
            debug!("empty snapshot, nothing to merge");
            return;
        }
        self.state.lock().merge_document(doc);
    }

    /// Serialize the current state to JSON
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(&self.to_document()).map_err(StoreError::Serialize)
    }

    /// Merge a JSON document; fails without touching the store if it is malformed
    pub fn from_json(&self, json: &str) -> StoreResult<()> {
        let doc: StoreDocument = serde_json::from_str(json).map_err(StoreError::MalformedSnapshot)?;
        self.from_document(doc);
        Ok(())
    }

    /// Write a snapshot atomically
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let doc = self.to_document();
        let bytes = serde_json::to_vec(&doc).map_err(StoreError::Serialize)?;
        atomic_write(path.as_ref(), &bytes)?;
        debug!(
            path = %path.as_ref().display(),
            chats = doc.chats.len(),
            contacts = doc.contacts.len(),
            messages = doc.message_count(),
            "wrote snapshot"
        );
        Ok(())
    }

    /// Merge a snapshot file into the store. A missing file loads nothing and
    /// returns `Ok(false)`.
    pub fn read_from_file<P: AsRef<Path>>(&self, path: P) -> StoreResult<bool> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot to load");
            return Ok(false);
        }
        let content = std::fs::read_to_string(path)?;
        self.from_json(&content)?;
        info!(path = %path.display(), "loaded snapshot");
        Ok(true)
    }

    /// Write to the configured snapshot path; `Ok(false)` if none is set
    pub fn save(&self) -> StoreResult<bool> {
        match &self.config().snapshot_path {
            Some(path) => self.write_to_file(path).map(|_| true),
            None => Ok(false),
        }
    }

    /// Load from the configured snapshot path; `Ok(false)` if none is set or
    /// the file does not exist
    pub fn load(&self) -> StoreResult<bool> {
        match &self.config().snapshot_path {
            Some(path) => self.read_from_file(path),
            None => Ok(false),
        }
    }

    /// Write a snapshot to `path` every `interval` until the task is aborted.
    /// Write failures are logged and retried on the next tick.
    pub fn spawn_autosave(self: &Arc<Self>, path: PathBuf, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let store = Arc::clone(&store);
                let target = path.clone();
                match tokio::task::spawn_blocking(move || store.write_to_file(&target)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, path = %path.display(), "autosave failed"),
                    Err(e) => warn!(error = %e, "autosave task failed"),
                }
            }
        })
    }

    /// Start autosave from the store config, if both a path and an interval
    /// are configured
    pub fn start_autosave(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let path = self.config().snapshot_path.clone()?;
        let interval = self.config().autosave_interval?;
        info!(path = %path.display(), ?interval, "autosave enabled");
        Some(self.spawn_autosave(path, interval))
    }
}
