//! # Component Mutations
//!
//! Semantic operations on a page's component sequence.
//!
//! ## Semantics
//!
//! ### InsertComponent
//! - Appends when no index is given, otherwise inserts before `index`
//! - Fails on a duplicate id
//!
//! ### UpdateContent / SetStyle
//! - Atomic replacement of the whole payload or style map
//! - Content type must match the component's existing type
//!
//! ### MoveComponent
//! - Splice: remove from the current position, insert at `index` in the
//!   shortened sequence
//!
//! ### RemoveComponent
//! - Filters the component out by id

use crate::content::{ComponentContent, ComponentKind};
use crate::document::Component;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    InsertComponent {
        component: Component,
        index: Option<usize>,
    },

    UpdateContent {
        component_id: String,
        content: ComponentContent,
    },

    SetStyle {
        component_id: String,
        style: BTreeMap<String, String>,
    },

    MoveComponent {
        component_id: String,
        index: usize,
    },

    RemoveComponent {
        component_id: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Duplicate component id: {0}")]
    DuplicateId(String),

    #[error("Index {index} out of bounds for {len} components")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Component is a {found}, not a {expected}")]
    KindMismatch {
        expected: ComponentKind,
        found: ComponentKind,
    },
}

fn position(components: &[Component], component_id: &str) -> Result<usize, MutationError> {
    components
        .iter()
        .position(|c| c.id == component_id)
        .ok_or_else(|| MutationError::ComponentNotFound(component_id.to_string()))
}

impl Mutation {
    /// Check that this mutation can be applied to `components`
    pub fn validate(&self, components: &[Component]) -> Result<(), MutationError> {
        match self {
            Mutation::InsertComponent { component, index } => {
                if components.iter().any(|c| c.id == component.id) {
                    return Err(MutationError::DuplicateId(component.id.clone()));
                }
                if let Some(index) = index {
                    if *index > components.len() {
                        return Err(MutationError::IndexOutOfBounds {
                            index: *index,
                            len: components.len(),
                        });
                    }
                }
                Ok(())
            }

            Mutation::UpdateContent {
                component_id,
                content,
            } => {
                let existing = &components[position(components, component_id)?];
                if existing.kind() != content.kind() {
                    return Err(MutationError::KindMismatch {
                        expected: existing.kind(),
                        found: content.kind(),
                    });
                }
                Ok(())
            }

            Mutation::SetStyle { component_id, .. } | Mutation::RemoveComponent { component_id } => {
                position(components, component_id).map(|_| ())
            }

            Mutation::MoveComponent {
                component_id,
                index,
            } => {
                position(components, component_id)?;
                if *index >= components.len() {
                    return Err(MutationError::IndexOutOfBounds {
                        index: *index,
                        len: components.len(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Apply in place after validation; on error `components` is untouched
    pub fn apply(&self, components: &mut Vec<Component>) -> Result<(), MutationError> {
        self.validate(components)?;

        match self {
            Mutation::InsertComponent { component, index } => {
                let at = index.unwrap_or(components.len());
                components.insert(at, component.clone());
            }

            Mutation::UpdateContent {
                component_id,
                content,
            } => {
                let at = position(components, component_id)?;
                components[at].content = content.clone();
            }

            Mutation::SetStyle {
                component_id,
                style,
            } => {
                let at = position(components, component_id)?;
                components[at].style = style.clone();
            }

            Mutation::MoveComponent {
                component_id,
                index,
            } => {
                let from = position(components, component_id)?;
                let moved = components.remove(from);
                components.insert(*index, moved);
            }

            Mutation::RemoveComponent { component_id } => {
                components.retain(|c| &c.id != component_id);
            }
        }

        Ok(())
    }

    /// Produce the sequence this mutation would yield, leaving the input alone
    pub fn applied_to(&self, components: &[Component]) -> Result<Vec<Component>, MutationError> {
        let mut candidate = components.to_vec();
        self.apply(&mut candidate)?;
        Ok(candidate)
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertComponent { .. } => "insert_component",
            Mutation::UpdateContent { .. } => "update_content",
            Mutation::SetStyle { .. } => "set_style",
            Mutation::MoveComponent { .. } => "move_component",
            Mutation::RemoveComponent { .. } => "remove_component",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> Vec<Component> {
        vec![
            Component::new("a", ComponentKind::Hero.default_content()),
            Component::new("b", ComponentKind::Features.default_content()),
            Component::new("c", ComponentKind::Footer.default_content()),
        ]
    }

    fn ids(components: &[Component]) -> Vec<&str> {
        components.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_insert_appends_by_default() {
        let mut components = sequence();
        Mutation::InsertComponent {
            component: Component::new("d", ComponentKind::Faq.default_content()),
            index: None,
        }
        .apply(&mut components)
        .unwrap();

        assert_eq!(ids(&components), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut components = sequence();
        let err = Mutation::InsertComponent {
            component: Component::new("b", ComponentKind::Faq.default_content()),
            index: Some(0),
        }
        .apply(&mut components)
        .unwrap_err();

        assert_eq!(err, MutationError::DuplicateId("b".to_string()));
        assert_eq!(ids(&components), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_is_a_splice() {
        let mut components = sequence();
        Mutation::MoveComponent {
            component_id: "a".to_string(),
            index: 2,
        }
        .apply(&mut components)
        .unwrap();
        assert_eq!(ids(&components), vec!["b", "c", "a"]);

        Mutation::MoveComponent {
            component_id: "a".to_string(),
            index: 0,
        }
        .apply(&mut components)
        .unwrap();
        assert_eq!(ids(&components), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let mut components = sequence();
        let err = Mutation::MoveComponent {
            component_id: "a".to_string(),
            index: 3,
        }
        .apply(&mut components)
        .unwrap_err();

        assert_eq!(err, MutationError::IndexOutOfBounds { index: 3, len: 3 });
    }

    #[test]
    fn test_update_content_requires_same_kind() {
        let mut components = sequence();
        let err = Mutation::UpdateContent {
            component_id: "a".to_string(),
            content: ComponentKind::Faq.default_content(),
        }
        .apply(&mut components)
        .unwrap_err();

        assert_eq!(
            err,
            MutationError::KindMismatch {
                expected: ComponentKind::Hero,
                found: ComponentKind::Faq,
            }
        );
    }

    #[test]
    fn test_remove_missing_component() {
        let mut components = sequence();
        let err = Mutation::RemoveComponent {
            component_id: "zzz".to_string(),
        }
        .apply(&mut components)
        .unwrap_err();

        assert_eq!(err, MutationError::ComponentNotFound("zzz".to_string()));
    }

    #[test]
    fn test_applied_to_leaves_input_untouched() {
        let components = sequence();
        let candidate = Mutation::RemoveComponent {
            component_id: "b".to_string(),
        }
        .applied_to(&components)
        .unwrap();

        assert_eq!(ids(&candidate), vec!["a", "c"]);
        assert_eq!(ids(&components), vec!["a", "b", "c"]);
    }
}
