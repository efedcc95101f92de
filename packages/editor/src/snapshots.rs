//! # Local Snapshots
//!
//! Two device-local copies per document:
//!
//! - **preview**: the latest persisted sequence, read by preview tabs
//! - **backup**: written after every save; a failed save stamps it past the
//!   remote `updatedAt`, so the unsaved sequence is offered back on load
//!
//! Both are `{components, timestamp}` JSON payloads and expire after a fixed
//! age, checked lazily on the next load.

use crate::document::Component;
use crate::EditorError;
use chrono::{DateTime, Duration, Utc};
use pagecraft_common::LocalStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const PREVIEW_PREFIX: &str = "pagecraft:preview:";
pub const BACKUP_PREFIX: &str = "pagecraft:backup:";

pub fn preview_key(document_id: &str) -> String {
    format!("{}{}", PREVIEW_PREFIX, document_id)
}

pub fn backup_key(document_id: &str) -> String {
    format!("{}{}", BACKUP_PREFIX, document_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub components: Vec<Component>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A local backup newer than the stored document
///
/// The caller decides whether to restore it; nothing is merged automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOffer {
    pub components: Vec<Component>,
    pub saved_at: DateTime<Utc>,
    pub remote_updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SnapshotStore {
    local: Arc<dyn LocalStore>,
}

impl SnapshotStore {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self { local }
    }

    fn write(&self, key: &str, components: &[Component], now: DateTime<Utc>) -> Result<(), EditorError> {
        let payload = SnapshotPayload {
            components: components.to_vec(),
            timestamp: now,
        };
        self.local.set(key, &serde_json::to_string(&payload)?)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<SnapshotPayload>, EditorError> {
        match self.local.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn write_preview(
        &self,
        document_id: &str,
        components: &[Component],
        now: DateTime<Utc>,
    ) -> Result<(), EditorError> {
        self.write(&preview_key(document_id), components, now)
    }

    pub fn write_backup(
        &self,
        document_id: &str,
        components: &[Component],
        now: DateTime<Utc>,
    ) -> Result<(), EditorError> {
        self.write(&backup_key(document_id), components, now)
    }

    pub fn read_preview(&self, document_id: &str) -> Result<Option<SnapshotPayload>, EditorError> {
        self.read(&preview_key(document_id))
    }

    pub fn read_backup(&self, document_id: &str) -> Result<Option<SnapshotPayload>, EditorError> {
        self.read(&backup_key(document_id))
    }

    /// Drop both snapshots of one document
    pub fn remove(&self, document_id: &str) -> Result<(), EditorError> {
        self.local.remove(&preview_key(document_id))?;
        self.local.remove(&backup_key(document_id))?;
        Ok(())
    }

    /// Remove snapshots older than `max_age`, plus any that fail to parse
    ///
    /// Returns how many keys were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>, max_age: Duration) -> Result<usize, EditorError> {
        let mut removed = 0;

        for key in self.local.keys()? {
            if !key.starts_with(PREVIEW_PREFIX) && !key.starts_with(BACKUP_PREFIX) {
                continue;
            }

            let expired = match self.read(&key) {
                Ok(Some(payload)) => now - payload.timestamp > max_age,
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "dropping unreadable snapshot");
                    true
                }
            };

            if expired {
                self.local.remove(&key)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Offer the backup back if it is newer than the remote copy
    pub fn recovery_offer(
        &self,
        document_id: &str,
        remote_updated_at: DateTime<Utc>,
    ) -> Result<Option<RecoveryOffer>, EditorError> {
        let offer = self
            .read_backup(document_id)?
            .filter(|backup| backup.timestamp > remote_updated_at)
            .map(|backup| RecoveryOffer {
                components: backup.components,
                saved_at: backup.timestamp,
                remote_updated_at,
            });
        Ok(offer)
    }

    pub fn discard_backup(&self, document_id: &str) -> Result<(), EditorError> {
        self.local.remove(&backup_key(document_id))?;
        Ok(())
    }
}
