//! # Edit Session
//!
//! One user's editing session over one page. The session owns the live
//! component sequence, its undo history and the persistence scheduler, and
//! is the only thing that mutates them.
//!
//! ## Consistency
//!
//! Structural operations (add, move, delete) and explicit commits are
//! confirm-then-commit: the resulting sequence is computed on the side,
//! written to the store, and only swapped in locally once the write
//! succeeds. A failed write leaves local state exactly as it was.
//!
//! Content and style edits, undo and redo are local-first and persisted
//! later by the scheduler (see [`crate::scheduler`]).
//!
//! Every failure is logged, turned into a user notification and returned
//! as an [`EditorError`]; the session stays usable afterwards.

use crate::config::EditorConfig;
use crate::content::{ComponentContent, ComponentKind};
use crate::document::{
    Component, EditableDocument, PageStatus, PageSummary, PAGES_COLLECTION, PUBLISHED_COLLECTION,
};
use crate::history::HistoryStack;
use crate::ids::{new_document_id, short_hash, IdGenerator};
use crate::mutations::Mutation;
use crate::notifications::{Notification, NotificationCenter, Severity};
use crate::publish::PublishOptions;
use crate::scheduler::{
    AutosaveState, FailureOutcome, PersistenceScheduler, SaveAttempt, SaveUrgency,
};
use crate::snapshots::{RecoveryOffer, SnapshotStore};
use crate::EditorError;
use chrono::{DateTime, Duration, Utc};
use pagecraft_common::{DocumentStore, LocalStore, Query, SortDirection, StoreError, UserId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Public copy of a published page
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishedPage<'a> {
    page_id: &'a str,
    owner_id: &'a UserId,
    title: &'a str,
    url: &'a str,
    components: &'a [Component],
    #[serde(with = "chrono::serde::ts_milliseconds")]
    published_at: DateTime<Utc>,
    config: &'a PublishOptions,
}

fn nonce(now: DateTime<Utc>) -> i64 {
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_millis())
}

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    user: UserId,
    store: Arc<dyn DocumentStore>,
    snapshots: SnapshotStore,
    config: EditorConfig,

    document: Option<EditableDocument>,
    history: HistoryStack<Vec<Component>>,
    scheduler: PersistenceScheduler,
    notifications: NotificationCenter,
    ids: IdGenerator,
    /// Persistent notice raised when autosave gave up
    disabled_notice: Option<u64>,

    /// Poked on every scheduled mutation so the autosave driver re-arms
    wake: Arc<Notify>,
}

impl EditSession {
    pub fn new(
        user: UserId,
        store: Arc<dyn DocumentStore>,
        local: Arc<dyn LocalStore>,
        config: EditorConfig,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("session-{}", short_hash(&format!("{}:{}", user, nonce(now)))),
            user,
            store,
            snapshots: SnapshotStore::new(local),
            history: HistoryStack::with_capacity(config.history_capacity),
            scheduler: PersistenceScheduler::new(config.timings()),
            config,
            document: None,
            notifications: NotificationCenter::new(),
            ids: IdGenerator::from_seed("detached"),
            disabled_notice: None,
            wake: Arc::new(Notify::new()),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&EditableDocument> {
        self.document.as_ref()
    }

    /// Live component sequence (empty when nothing is loaded)
    pub fn components(&self) -> &[Component] {
        self.document
            .as_ref()
            .map(|d| d.components.as_slice())
            .unwrap_or(&[])
    }

    pub fn history(&self) -> &HistoryStack<Vec<Component>> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn autosave_state(&self) -> AutosaveState {
        self.scheduler.state()
    }

    pub fn save_attempt(&self) -> &SaveAttempt {
        self.scheduler.attempt()
    }

    pub fn is_dirty(&self) -> bool {
        self.scheduler.is_dirty()
    }

    pub fn next_save_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn wake_handle(&self) -> Arc<Notify> {
        self.wake.clone()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.pending()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain_transient()
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    /// Types the palette may offer; anything else is rejected by `add_component`
    pub fn available_component_types(&self) -> &'static [ComponentKind] {
        &ComponentKind::ALL
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn doc(&self) -> Result<&EditableDocument, EditorError> {
        self.document.as_ref().ok_or(EditorError::NotLoaded)
    }

    fn doc_mut(&mut self) -> Result<&mut EditableDocument, EditorError> {
        self.document.as_mut().ok_or(EditorError::NotLoaded)
    }

    /// Surface a failure to the user and hand it back to the caller
    fn fail<T>(&mut self, context: &str, err: EditorError) -> Result<T, EditorError> {
        tracing::warn!(session = %self.id, error = %err, "{}", context);
        self.notifications.error(format!("{}: {}", context, err));
        Err(err)
    }

    fn attach(&mut self, document: EditableDocument, ids: IdGenerator) {
        self.document = Some(document);
        self.ids = ids;
        self.reset_persistence();
    }

    fn detach(&mut self) {
        self.document = None;
        self.reset_persistence();
    }

    fn reset_persistence(&mut self) {
        self.history.clear();
        self.scheduler.reset();
        if let Some(id) = self.disabled_notice.take() {
            self.dismiss_notification(id);
        }
    }

    fn schedule(&mut self, urgency: SaveUrgency) {
        self.scheduler.mark_dirty(urgency, Instant::now());
        tracing::debug!(session = %self.id, ?urgency, deadline = ?self.scheduler.next_deadline(), "save scheduled");
        self.wake.notify_one();
    }

    /// Write preview (and optionally backup) snapshots; failures only warn
    fn refresh_snapshots(&self, now: DateTime<Utc>, with_backup: bool) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };

        if let Err(e) = self.snapshots.write_preview(doc.id(), &doc.components, now) {
            tracing::warn!(document = %doc.id(), error = %e, "failed to write preview snapshot");
        }
        if with_backup {
            if let Err(e) = self.snapshots.write_backup(doc.id(), &doc.components, now) {
                tracing::warn!(document = %doc.id(), error = %e, "failed to write backup snapshot");
            }
        }
    }

    /// Keep the unsaved sequence locally after a failed write
    ///
    /// Stamped strictly after the last persisted `updatedAt` so the next
    /// load offers it back.
    fn backup_unsaved(&self) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };

        let stamp = Utc::now().max(doc.updated_at + Duration::milliseconds(1));
        match self.snapshots.write_backup(doc.id(), &doc.components, stamp) {
            Ok(()) => tracing::debug!(document = %doc.id(), "kept unsaved changes in local backup"),
            Err(e) => tracing::warn!(document = %doc.id(), error = %e, "failed to write backup snapshot"),
        }
    }

    /// Rewrite the full component array of the loaded page
    async fn write_components(
        &self,
        components: &[Component],
        now: DateTime<Utc>,
    ) -> Result<(), EditorError> {
        let document_id = self.doc()?.id().to_string();

        let mut fields = Map::new();
        fields.insert("components".to_string(), serde_json::to_value(components)?);
        fields.insert("updatedAt".to_string(), Value::from(now.timestamp_millis()));

        self.store
            .update_fields(PAGES_COLLECTION, &document_id, fields)
            .await?;
        Ok(())
    }

    /// Confirm-then-commit: write the mutated sequence, swap it in on success
    async fn commit_remote(&mut self, mutation: Mutation, context: &str) -> Result<(), EditorError> {
        let applied = mutation.applied_to(&self.doc()?.components);
        let candidate = match applied {
            Ok(candidate) => candidate,
            Err(e) => return self.fail(context, e.into()),
        };

        let now = Utc::now();
        if let Err(e) = self.write_components(&candidate, now).await {
            return self.fail(context, e);
        }

        let doc = self.doc_mut()?;
        let previous = std::mem::replace(&mut doc.components, candidate);
        doc.updated_at = now;
        let document_id = doc.id().to_string();

        self.history.push(previous);
        self.scheduler.mark_persisted(now);
        self.refresh_snapshots(now, true);

        tracing::info!(session = %self.id, document = %document_id, mutation = mutation.name(), "committed");
        Ok(())
    }

    /// Local-first: apply now, persist later according to `urgency`
    fn commit_local(
        &mut self,
        mutation: Mutation,
        urgency: SaveUrgency,
        context: &str,
    ) -> Result<(), EditorError> {
        let applied = mutation.applied_to(&self.doc()?.components);
        let candidate = match applied {
            Ok(candidate) => candidate,
            Err(e) => return self.fail(context, e.into()),
        };

        let doc = self.doc_mut()?;
        let previous = std::mem::replace(&mut doc.components, candidate);
        self.history.push(previous);
        self.schedule(urgency);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Open a page owned by the session user
    ///
    /// Returns a recovery offer when a local backup is newer than the
    /// stored page.
    pub async fn load(&mut self, document_id: &str) -> Result<Option<RecoveryOffer>, EditorError> {
        let context = "Could not open page";

        let value = match self.store.get(PAGES_COLLECTION, document_id).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                return self.fail(context, EditorError::DocumentNotFound(document_id.to_string()))
            }
            Err(StoreError::PermissionDenied(_)) => {
                return self.fail(context, EditorError::PermissionDenied(document_id.to_string()))
            }
            Err(e) => return self.fail(context, e.into()),
        };

        let document = match EditableDocument::from_value(document_id, value) {
            Ok(document) => document,
            Err(e) => return self.fail(context, e),
        };

        if !document.is_owned_by(&self.user) {
            return self.fail(context, EditorError::PermissionDenied(document_id.to_string()));
        }

        let now = Utc::now();
        let remote_updated_at = document.updated_at;
        let component_count = document.components.len();
        self.attach(document, IdGenerator::for_document(document_id, nonce(now)));

        match self
            .snapshots
            .purge_expired(now, self.config.snapshot_max_age())
        {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "purged expired local snapshots"),
            Err(e) => tracing::warn!(error = %e, "failed to purge local snapshots"),
        }

        let offer = match self.snapshots.recovery_offer(document_id, remote_updated_at) {
            Ok(offer) => offer,
            Err(e) => {
                tracing::warn!(document = document_id, error = %e, "ignoring unreadable backup");
                None
            }
        };

        self.refresh_snapshots(now, false);

        if offer.is_some() {
            self.notifications.push(
                Severity::Info,
                "A newer local copy of this page was found. Restore it?",
                false,
            );
        }

        tracing::info!(session = %self.id, document = document_id, components = component_count, "loaded page");
        Ok(offer)
    }

    /// Create and open a new draft, optionally seeded from a template
    pub async fn create(
        &mut self,
        title: &str,
        template: Option<&[Component]>,
    ) -> Result<String, EditorError> {
        let now = Utc::now();
        let document_id = new_document_id(self.user.as_str(), nonce(now));
        let mut ids = IdGenerator::for_document(&document_id, nonce(now));

        let document = match template {
            Some(template) => EditableDocument::from_template(
                document_id.clone(),
                title,
                self.user.clone(),
                template,
                &mut ids,
                now,
            ),
            None => EditableDocument::new(document_id.clone(), title, self.user.clone(), now),
        };

        let value = document.to_value()?;
        if let Err(e) = self.store.create(PAGES_COLLECTION, &document_id, value).await {
            return self.fail("Could not create page", e.into());
        }

        self.attach(document, ids);
        self.refresh_snapshots(now, false);

        tracing::info!(session = %self.id, document = %document_id, "created page");
        Ok(document_id)
    }

    /// The session user's pages, most recently updated first
    pub async fn list_documents(&mut self) -> Result<Vec<PageSummary>, EditorError> {
        let query = Query::new()
            .where_eq("ownerId", self.user.as_str())
            .order_by("updatedAt", SortDirection::Descending);

        let rows = match self.store.query(PAGES_COLLECTION, &query).await {
            Ok(rows) => rows,
            Err(e) => return self.fail("Could not list pages", e.into()),
        };

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            match EditableDocument::from_value(&row.id, row.data) {
                Ok(document) => summaries.push(PageSummary::from(&document)),
                Err(e) => tracing::warn!(document = %row.id, error = %e, "skipping unreadable page"),
            }
        }
        Ok(summaries)
    }

    /// Permanently delete a page (and its public copy) from the store
    pub async fn remove_document(&mut self, document_id: &str) -> Result<(), EditorError> {
        let context = "Could not delete page";

        let owner_matches = match self.store.get(PAGES_COLLECTION, document_id).await {
            Ok(Some(value)) => value.get("ownerId").and_then(Value::as_str) == Some(self.user.as_str()),
            Ok(None) => {
                return self.fail(context, EditorError::DocumentNotFound(document_id.to_string()))
            }
            Err(e) => return self.fail(context, e.into()),
        };
        if !owner_matches {
            return self.fail(context, EditorError::PermissionDenied(document_id.to_string()));
        }

        if let Err(e) = self.store.delete(PUBLISHED_COLLECTION, document_id).await {
            return self.fail(context, e.into());
        }
        if let Err(e) = self.store.delete(PAGES_COLLECTION, document_id).await {
            return self.fail(context, e.into());
        }

        if let Err(e) = self.snapshots.remove(document_id) {
            tracing::warn!(document = document_id, error = %e, "failed to clear local snapshots");
        }

        if self.document.as_ref().map(|d| d.id()) == Some(document_id) {
            self.detach();
        }

        self.notifications.success("Page deleted");
        tracing::info!(session = %self.id, document = document_id, "deleted page");
        Ok(())
    }

    /// Replace the live sequence with a recovered local backup
    pub fn restore_backup(&mut self, offer: RecoveryOffer) -> Result<(), EditorError> {
        let doc = self.doc_mut()?;
        let previous = std::mem::replace(&mut doc.components, offer.components);
        self.history.push(previous);
        self.schedule(SaveUrgency::Immediate);
        tracing::info!(session = %self.id, saved_at = %offer.saved_at, "restored local backup");
        Ok(())
    }

    /// Decline a recovery offer
    pub fn discard_backup(&mut self) -> Result<(), EditorError> {
        let document_id = self.doc()?.id().to_string();
        self.snapshots.discard_backup(&document_id)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Append a section of the given type with its default content
    ///
    /// Written immediately; returns the new component id.
    pub async fn add_component(&mut self, type_tag: &str) -> Result<String, EditorError> {
        let context = "Could not add section";

        let kind = match ComponentKind::from_tag(type_tag) {
            Ok(kind) => kind,
            Err(e) => return self.fail(context, e.into()),
        };

        let doc = self.document.as_ref().ok_or(EditorError::NotLoaded)?;
        let component_id = self.ids.next_unused(&doc.components);
        let mutation = Mutation::InsertComponent {
            component: Component::new(component_id.clone(), kind.default_content()),
            index: None,
        };

        self.commit_remote(mutation, context).await?;
        Ok(component_id)
    }

    /// Replace a section's content; persisted by the debounce
    pub fn update_component(
        &mut self,
        component_id: &str,
        content: ComponentContent,
    ) -> Result<(), EditorError> {
        let context = "Could not update section";
        if let Err(e) = content.validate() {
            return self.fail(context, e.into());
        }

        self.commit_local(
            Mutation::UpdateContent {
                component_id: component_id.to_string(),
                content,
            },
            SaveUrgency::Debounced,
            context,
        )
    }

    /// Replace a section's content and write it now
    pub async fn commit_component(
        &mut self,
        component_id: &str,
        content: ComponentContent,
    ) -> Result<(), EditorError> {
        let context = "Could not save section";
        if let Err(e) = content.validate() {
            return self.fail(context, e.into());
        }

        self.commit_remote(
            Mutation::UpdateContent {
                component_id: component_id.to_string(),
                content,
            },
            context,
        )
        .await
    }

    /// Replace a section's style overrides; persisted by the debounce
    pub fn update_style(
        &mut self,
        component_id: &str,
        style: BTreeMap<String, String>,
    ) -> Result<(), EditorError> {
        self.commit_local(
            Mutation::SetStyle {
                component_id: component_id.to_string(),
                style,
            },
            SaveUrgency::Debounced,
            "Could not update style",
        )
    }

    /// Move a section to `index`; written immediately
    pub async fn move_component(&mut self, component_id: &str, index: usize) -> Result<(), EditorError> {
        self.commit_remote(
            Mutation::MoveComponent {
                component_id: component_id.to_string(),
                index,
            },
            "Could not move section",
        )
        .await
    }

    /// Remove a section; the store is updated before local state
    pub async fn delete_component(&mut self, component_id: &str) -> Result<(), EditorError> {
        self.commit_remote(
            Mutation::RemoveComponent {
                component_id: component_id.to_string(),
            },
            "Could not delete section",
        )
        .await
    }

    /// Step back one edit; persisted by the periodic autosave
    pub fn undo(&mut self) -> bool {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };

        let current = doc.components.clone();
        match self.history.undo(current) {
            Some(previous) => {
                doc.components = previous;
                self.schedule(SaveUrgency::Periodic);
                true
            }
            None => false,
        }
    }

    /// Re-apply one undone edit; persisted by the periodic autosave
    pub fn redo(&mut self) -> bool {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };

        let current = doc.components.clone();
        match self.history.redo(current) {
            Some(next) => {
                doc.components = next;
                self.schedule(SaveUrgency::Periodic);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// User-requested save; also re-enables a disabled autosave
    pub async fn save_now(&mut self) -> Result<(), EditorError> {
        let components = self.doc()?.components.clone();
        self.scheduler.begin_manual();

        let saved_at = Utc::now();
        match self.write_components(&components, saved_at).await {
            Ok(()) => {
                self.scheduler.record_success(saved_at, Instant::now());
                if let Some(doc) = self.document.as_mut() {
                    doc.updated_at = saved_at;
                }
                self.refresh_snapshots(saved_at, true);
                if let Some(id) = self.disabled_notice.take() {
                    self.dismiss_notification(id);
                }
                self.notifications.success("Saved");
                tracing::info!(session = %self.id, "saved");
                Ok(())
            }
            Err(e) => {
                self.scheduler.record_failure(e.to_string(), Instant::now());
                self.backup_unsaved();
                self.wake.notify_one();
                self.fail("Save failed", e)
            }
        }
    }

    /// Run the scheduled write if one is due at `now`
    ///
    /// Returns whether a write was attempted.
    pub async fn run_due_save(&mut self, now: Instant) -> bool {
        if self.document.is_none() || !self.scheduler.take_due(now) {
            return false;
        }

        let components = self.components().to_vec();
        let saved_at = Utc::now();

        match self.write_components(&components, saved_at).await {
            Ok(()) => {
                self.scheduler.record_success(saved_at, Instant::now());
                if let Some(doc) = self.document.as_mut() {
                    doc.updated_at = saved_at;
                }
                self.refresh_snapshots(saved_at, true);
                tracing::debug!(session = %self.id, components = components.len(), "autosaved");
            }
            Err(e) => match self.scheduler.record_failure(e.to_string(), Instant::now()) {
                FailureOutcome::RetryScheduled { retry_count, .. } => {
                    self.backup_unsaved();
                    let delay = self.scheduler.timings().retry_delay;
                    tracing::warn!(session = %self.id, error = %e, retry_count, "autosave failed, retrying");
                    self.notifications.warning(format!(
                        "Autosave failed ({}). Retrying in {}s.",
                        e,
                        delay.as_secs()
                    ));
                }
                FailureOutcome::Disabled => {
                    tracing::error!(session = %self.id, error = %e, "autosave disabled after repeated failures");
                    self.backup_unsaved();
                    self.notifications.warning(format!("Autosave failed ({}).", e));
                    self.disabled_notice = Some(self.notifications.push(
                        Severity::Error,
                        "Autosave has been turned off after repeated failures. Save manually to keep your changes.",
                        true,
                    ));
                }
            },
        }

        true
    }

    // ------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------

    /// Validate `options`, then publish the current sequence
    ///
    /// Returns the public URL. The component sequence is not modified.
    pub async fn publish(&mut self, options: PublishOptions) -> Result<String, EditorError> {
        let context = "Could not publish";
        let now = Utc::now();

        if let Err(e) = options.validate(now) {
            return self.fail(context, e.into());
        }

        let doc = self.doc()?;
        let next = match doc.status.transition_to(PageStatus::Published) {
            Ok(next) => next,
            Err(e) => return self.fail(context, e),
        };
        let document_id = doc.id().to_string();
        let url = options.public_url(&self.config.public_base_url, &document_id);
        let snapshot = serde_json::to_value(PublishedPage {
            page_id: &document_id,
            owner_id: &doc.owner_id,
            title: &doc.title,
            url: &url,
            components: &doc.components,
            published_at: now,
            config: &options,
        })?;

        let mut fields = Map::new();
        fields.insert("status".to_string(), serde_json::to_value(next)?);
        fields.insert("publishedAt".to_string(), Value::from(now.timestamp_millis()));
        fields.insert("publishConfig".to_string(), serde_json::to_value(&options)?);

        if let Err(e) = self.store.create(PUBLISHED_COLLECTION, &document_id, snapshot).await {
            return self.fail(context, e.into());
        }

        if let Err(e) = self
            .store
            .update_fields(PAGES_COLLECTION, &document_id, fields)
            .await
        {
            if let Err(cleanup) = self.store.delete(PUBLISHED_COLLECTION, &document_id).await {
                tracing::warn!(document = %document_id, error = %cleanup, "failed to roll back public copy");
            }
            return self.fail(context, e.into());
        }

        let doc = self.doc_mut()?;
        doc.status = next;
        doc.published_at = Some(now);
        doc.publish_config = Some(options);

        self.notifications.success(format!("Published at {}", url));
        tracing::info!(session = %self.id, document = %document_id, url = %url, "published");
        Ok(url)
    }

    /// Take a published page offline and return it to draft
    pub async fn unpublish(&mut self) -> Result<(), EditorError> {
        let context = "Could not unpublish";

        let doc = self.doc()?;
        let document_id = doc.id().to_string();
        let transition = doc.status.transition_to(PageStatus::Draft);
        let next = match transition {
            Ok(next) => next,
            Err(e) => return self.fail(context, e),
        };

        if let Err(e) = self.store.delete(PUBLISHED_COLLECTION, &document_id).await {
            return self.fail(context, e.into());
        }

        let mut fields = Map::new();
        fields.insert("status".to_string(), serde_json::to_value(next)?);
        fields.insert("publishedAt".to_string(), Value::Null);
        if let Err(e) = self
            .store
            .update_fields(PAGES_COLLECTION, &document_id, fields)
            .await
        {
            return self.fail(context, e.into());
        }

        let doc = self.doc_mut()?;
        doc.status = next;
        doc.published_at = None;

        self.notifications.success("Page unpublished");
        tracing::info!(session = %self.id, document = %document_id, "unpublished");
        Ok(())
    }
}
