//! Tests for longer mutation sequences
//!
//! This tests:
//! - Insert + move + remove chains
//! - Undo/redo over snapshots
//! - Sequence integrity (unique ids, no lost sections)

use pagecraft_editor::{Component, ComponentKind, HistoryStack, Mutation, MutationError};
use std::collections::{BTreeMap, HashSet};

fn section(id: &str, kind: ComponentKind) -> Component {
    Component::new(id, kind.default_content())
}

fn ids(components: &[Component]) -> Vec<&str> {
    components.iter().map(|c| c.id.as_str()).collect()
}

/// Apply through a history stack the way the session does
fn commit(stack: &mut HistoryStack<Vec<Component>>, live: &mut Vec<Component>, mutation: Mutation) {
    let next = mutation.applied_to(live).unwrap();
    stack.push(std::mem::replace(live, next));
}

#[test]
fn test_build_reorder_then_remove() {
    let mut live = Vec::new();
    let mut stack = HistoryStack::new();

    for (id, kind) in [
        ("hero", ComponentKind::Hero),
        ("features", ComponentKind::Features),
        ("pricing", ComponentKind::Pricing),
        ("footer", ComponentKind::Footer),
    ] {
        commit(
            &mut stack,
            &mut live,
            Mutation::InsertComponent {
                component: section(id, kind),
                index: None,
            },
        );
    }
    assert_eq!(ids(&live), vec!["hero", "features", "pricing", "footer"]);

    // Pricing above features
    commit(
        &mut stack,
        &mut live,
        Mutation::MoveComponent {
            component_id: "pricing".to_string(),
            index: 1,
        },
    );
    assert_eq!(ids(&live), vec!["hero", "pricing", "features", "footer"]);

    commit(
        &mut stack,
        &mut live,
        Mutation::RemoveComponent {
            component_id: "features".to_string(),
        },
    );
    assert_eq!(ids(&live), vec!["hero", "pricing", "footer"]);

    // Undo remove, then undo move
    live = stack.undo(live).unwrap();
    assert_eq!(ids(&live), vec!["hero", "pricing", "features", "footer"]);
    live = stack.undo(live).unwrap();
    assert_eq!(ids(&live), vec!["hero", "features", "pricing", "footer"]);

    assert_eq!(stack.undo_levels(), 4);
    assert_eq!(stack.redo_levels(), 2);
}

#[test]
fn test_style_updates_with_undo_redo() {
    let mut live = vec![section("cta", ComponentKind::Cta)];
    let mut stack = HistoryStack::new();

    for color in ["red", "green", "blue", "black", "white"] {
        let mut style = BTreeMap::new();
        style.insert("background".to_string(), color.to_string());
        commit(
            &mut stack,
            &mut live,
            Mutation::SetStyle {
                component_id: "cta".to_string(),
                style,
            },
        );
    }
    assert_eq!(stack.undo_levels(), 5);

    for _ in 0..5 {
        live = stack.undo(live).unwrap();
    }
    assert!(live[0].style.is_empty());
    assert_eq!(stack.redo_levels(), 5);

    for _ in 0..5 {
        live = stack.redo(live).unwrap();
    }
    assert_eq!(live[0].style["background"], "white");

    // Undo 3, apply new (clears redo)
    for _ in 0..3 {
        live = stack.undo(live).unwrap();
    }
    assert_eq!(stack.redo_levels(), 3);
    commit(
        &mut stack,
        &mut live,
        Mutation::SetStyle {
            component_id: "cta".to_string(),
            style: BTreeMap::new(),
        },
    );
    assert_eq!(stack.redo_levels(), 0);
}

#[test]
fn test_failed_mutations_leave_sequence_intact() {
    let live = vec![
        section("a", ComponentKind::Hero),
        section("b", ComponentKind::Faq),
    ];

    let cases = [
        Mutation::InsertComponent {
            component: section("a", ComponentKind::Cta),
            index: None,
        },
        Mutation::InsertComponent {
            component: section("c", ComponentKind::Cta),
            index: Some(5),
        },
        Mutation::MoveComponent {
            component_id: "b".to_string(),
            index: 2,
        },
        Mutation::RemoveComponent {
            component_id: "zzz".to_string(),
        },
        Mutation::UpdateContent {
            component_id: "b".to_string(),
            content: ComponentKind::Hero.default_content(),
        },
    ];

    for mutation in cases {
        let mut scratch = live.clone();
        assert!(mutation.apply(&mut scratch).is_err(), "{} should fail", mutation.name());
        assert_eq!(scratch, live);
    }
}

#[test]
fn test_ids_stay_unique_through_long_sequences() {
    let mut live: Vec<Component> = Vec::new();

    for i in 0..30 {
        let kind = ComponentKind::ALL[i % ComponentKind::ALL.len()];
        Mutation::InsertComponent {
            component: section(&format!("s{}", i), kind),
            index: Some(i / 2),
        }
        .apply(&mut live)
        .unwrap();
    }

    for i in (0..30).step_by(3) {
        Mutation::RemoveComponent {
            component_id: format!("s{}", i),
        }
        .apply(&mut live)
        .unwrap();
    }

    let unique: HashSet<&str> = live.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(unique.len(), live.len());
    assert_eq!(live.len(), 20);

    let duplicate = Mutation::InsertComponent {
        component: section("s1", ComponentKind::Hero),
        index: None,
    };
    assert!(matches!(
        duplicate.apply(&mut live),
        Err(MutationError::DuplicateId(_))
    ));
}
