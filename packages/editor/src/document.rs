//! # Document Model
//!
//! An [`EditableDocument`] is one landing page: an ordered sequence of
//! [`Component`]s (sequence order is render order) plus ownership, status
//! and timestamps.
//!
//! ## Stored layout
//!
//! ```text
//! pages/<id>
//! {
//!   "id": "...", "title": "...", "ownerId": "...",
//!   "status": "draft" | "published",
//!   "createdAt": <ms>, "updatedAt": <ms>, "publishedAt": <ms>?,
//!   "components": [ { "id", "type", "content", "style" }, ... ],
//!   "publishConfig": { ... }?
//! }
//! ```
//!
//! The whole `components` array is rewritten on every save.

use crate::content::{ComponentContent, ComponentKind, ContentError};
use crate::ids::IdGenerator;
use crate::publish::PublishOptions;
use crate::EditorError;
use chrono::{DateTime, Utc};
use pagecraft_common::UserId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Collection holding editable pages
pub const PAGES_COLLECTION: &str = "pages";

/// Collection holding public snapshots of published pages
pub const PUBLISHED_COLLECTION: &str = "published";

/// One section of a page
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Unique within the owning document
    pub id: String,

    pub content: ComponentContent,

    /// Style overrides (property -> value)
    pub style: BTreeMap<String, String>,
}

impl Component {
    pub fn new(id: impl Into<String>, content: ComponentContent) -> Self {
        Self {
            id: id.into(),
            content,
            style: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.content.kind()
    }
}

/// Wire form of a component before the type tag has been checked
#[derive(Debug, Clone, Deserialize)]
pub struct RawComponent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    style: BTreeMap<String, String>,
}

impl TryFrom<RawComponent> for Component {
    type Error = ContentError;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        Ok(Component {
            content: ComponentContent::from_parts(&raw.kind, raw.content)?,
            id: raw.id,
            style: raw.style,
        })
    }
}

#[derive(Serialize)]
struct ComponentWire<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a ComponentContent,
    style: &'a BTreeMap<String, String>,
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ComponentWire {
            id: &self.id,
            kind: self.kind().tag(),
            content: &self.content,
            style: &self.style,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawComponent::deserialize(deserializer)?;
        Component::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Publication status; only draft <-> published transitions exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    pub fn transition_to(self, next: PageStatus) -> Result<PageStatus, EditorError> {
        if self == next {
            return Err(EditorError::InvalidTransition {
                from: self,
                to: next,
            });
        }
        Ok(next)
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStatus::Draft => f.write_str("draft"),
            PageStatus::Published => f.write_str("published"),
        }
    }
}

/// The page being edited
#[derive(Debug, Clone, PartialEq)]
pub struct EditableDocument {
    id: String,
    pub title: String,
    pub components: Vec<Component>,
    pub status: PageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub published_at: Option<DateTime<Utc>>,
    pub publish_config: Option<PublishOptions>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageRecordOut<'a> {
    id: &'a str,
    title: &'a str,
    owner_id: &'a UserId,
    status: PageStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    published_at: Option<DateTime<Utc>>,
    components: &'a [Component],
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_config: Option<&'a PublishOptions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRecordIn {
    #[serde(default)]
    title: String,
    owner_id: UserId,
    status: PageStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    components: Vec<RawComponent>,
    #[serde(default)]
    publish_config: Option<PublishOptions>,
}

impl EditableDocument {
    /// Create an empty draft
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            components: Vec::new(),
            status: PageStatus::Draft,
            created_at: now,
            updated_at: now,
            owner_id,
            published_at: None,
            publish_config: None,
        }
    }

    /// Create a draft from a template snapshot
    ///
    /// Components are copied in order and given fresh ids.
    pub fn from_template(
        id: impl Into<String>,
        title: impl Into<String>,
        owner_id: UserId,
        template: &[Component],
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> Self {
        let mut doc = Self::new(id, title, owner_id, now);
        for component in template {
            let fresh_id = ids.next_unused(&doc.components);
            doc.components.push(Component {
                id: fresh_id,
                ..component.clone()
            });
        }
        doc
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn find_component(&self, component_id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == component_id)
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Encode into the stored JSON layout
    pub fn to_value(&self) -> Result<Value, EditorError> {
        let record = PageRecordOut {
            id: &self.id,
            title: &self.title,
            owner_id: &self.owner_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
            components: &self.components,
            publish_config: self.publish_config.as_ref(),
        };
        Ok(serde_json::to_value(record)?)
    }

    /// Decode from the stored JSON layout
    ///
    /// Unknown component types are an explicit error, as are duplicate
    /// component ids.
    pub fn from_value(id: &str, value: Value) -> Result<Self, EditorError> {
        let record: PageRecordIn =
            serde_json::from_value(value).map_err(|e| EditorError::Decode {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        let mut components: Vec<Component> = Vec::with_capacity(record.components.len());
        for raw in record.components {
            let component = Component::try_from(raw)?;
            if components.iter().any(|c| c.id == component.id) {
                return Err(EditorError::Decode {
                    id: id.to_string(),
                    message: format!("duplicate component id {}", component.id),
                });
            }
            components.push(component);
        }

        Ok(Self {
            id: id.to_string(),
            title: record.title,
            components,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            owner_id: record.owner_id,
            published_at: record.published_at,
            publish_config: record.publish_config,
        })
    }
}

/// Listing row for a user's pages
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub status: PageStatus,
    pub updated_at: DateTime<Utc>,
    pub component_count: usize,
}

impl From<&EditableDocument> for PageSummary {
    fn from(doc: &EditableDocument) -> Self {
        Self {
            id: doc.id().to_string(),
            title: doc.title.clone(),
            status: doc.status,
            updated_at: doc.updated_at,
            component_count: doc.components.len(),
        }
    }
}
