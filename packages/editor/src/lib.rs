//! # Pagecraft Editor
//!
//! Edit-session engine for landing pages built from typed sections.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ content: section types, defaults, validation│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: one user editing one page          │
//! │  - Structural edits written before commit   │
//! │  - Content edits debounced                  │
//! │  - Bounded undo/redo                        │
//! │  - Publish with validated settings          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ scheduler + autosave: when to write, retry  │
//! │ and when to give up                         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pagecraft-common: document + local stores   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Remote confirms structure**: add, move and delete only land locally
//!    after the store accepted them
//! 2. **One save clock**: a single scheduler decides when the next write
//!    happens, so two timers never race
//! 3. **Failures are visible**: every caught error becomes a notification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{spawn_autosave, EditSession, EditorConfig};
//!
//! let mut session = EditSession::new(user, store, local, EditorConfig::default());
//! session.load("page-123").await?;
//!
//! let hero = session.add_component("hero").await?;
//! session.update_component(&hero, content)?;
//!
//! let session = Arc::new(Mutex::new(session));
//! let autosave = spawn_autosave(session.clone()).await;
//! // ...
//! autosave.shutdown().await;
//! ```

mod autosave;
mod config;
mod content;
mod document;
mod errors;
mod history;
mod ids;
mod mutations;
mod notifications;
mod publish;
mod scheduler;
mod session;
mod snapshots;

pub use autosave::{spawn_autosave, AutosaveHandle, SharedSession};
pub use config::EditorConfig;
pub use content::{
    ComponentContent, ComponentKind, ContentError, CtaContent, FaqContent, FaqItem, FeatureItem,
    FeaturesContent, FooterContent, FooterLink, HeroContent, PricingContent, PricingPlan,
    Testimonial, TestimonialsContent,
};
pub use document::{
    Component, EditableDocument, PageStatus, PageSummary, PAGES_COLLECTION, PUBLISHED_COLLECTION,
};
pub use errors::EditorError;
pub use history::{HistoryStack, DEFAULT_HISTORY_CAPACITY};
pub use ids::{new_document_id, IdGenerator};
pub use mutations::{Mutation, MutationError};
pub use notifications::{Notification, NotificationCenter, Severity};
pub use publish::{PublishOptions, PublishValidationError, SeoFields};
pub use scheduler::{
    AutosaveState, FailureOutcome, PersistenceScheduler, SaveAttempt, SaveUrgency,
    SchedulerTimings,
};
pub use session::EditSession;
pub use snapshots::{backup_key, preview_key, RecoveryOffer, SnapshotPayload, SnapshotStore};
