//! Integration tests for the task registry.
//!
//! Covers the active-task invariant under arbitrary command sequences and
//! persistence of the task list across reloads.

use std::sync::Arc;

use pomotask_core::storage::keys;
use pomotask_core::{Database, MemoryStore, Store, TaskRegistry};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add,
    SetActive(usize),
    Toggle(usize),
    Delete(usize),
    ClearCompleted,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        (0usize..8).prop_map(Op::SetActive),
        (0usize..8).prop_map(Op::Toggle),
        (0usize..8).prop_map(Op::Delete),
        Just(Op::ClearCompleted),
    ]
}

fn id_at(registry: &TaskRegistry, index: usize) -> i64 {
    registry
        .tasks()
        .get(index)
        .map(|t| t.id)
        .unwrap_or(-1)
}

proptest! {
    #[test]
    fn at_most_one_active_task(ops in prop::collection::vec(op(), 1..40)) {
        let mut registry = TaskRegistry::new(Arc::new(MemoryStore::new()));
        for op in ops {
            match op {
                Op::Add => { registry.add("task").unwrap(); }
                Op::SetActive(i) => { registry.set_active(id_at(&registry, i)); }
                Op::Toggle(i) => { let _ = registry.toggle_completion(id_at(&registry, i)); }
                Op::Delete(i) => { let _ = registry.delete(id_at(&registry, i)); }
                Op::ClearCompleted => { registry.clear_completed(); }
            }

            let flagged: Vec<_> = registry.tasks().iter().filter(|t| t.active).collect();
            prop_assert!(flagged.len() <= 1);
            prop_assert!(flagged.iter().all(|t| !t.completed));
            prop_assert_eq!(flagged.first().map(|t| t.id), registry.active_task_id());
        }
    }
}

#[test]
fn completing_the_active_task_leaves_none_active() {
    let mut registry = TaskRegistry::new(Arc::new(MemoryStore::new()));
    let id = registry.add("Write report").unwrap().id;
    assert!(registry.set_active(id));
    registry.toggle_completion(id).unwrap();
    assert!(registry.tasks().iter().all(|t| !t.active));
    assert!(registry.active_task().is_none());
}

#[test]
fn associate_on_missing_task_is_not_fatal() {
    let mut registry = TaskRegistry::new(Arc::new(MemoryStore::new()));
    registry.add("A").unwrap();
    let before = registry.tasks().to_vec();
    let err = registry.associate_session(-5, 1).unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(registry.tasks(), &before[..]);
}

#[test]
fn task_list_roundtrips_through_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomotask.db");

    let saved = {
        let mut registry = TaskRegistry::new(Arc::new(Database::open_at(&path).unwrap()));
        let a = registry.add("A").unwrap().id;
        let b = registry.add("B").unwrap().id;
        registry.add("C").unwrap();
        registry.associate_session(a, 100).unwrap();
        registry.associate_session(a, 101).unwrap();
        registry.toggle_completion(a).unwrap();
        registry.set_active(b);
        registry.tasks().to_vec()
    };

    let reloaded = TaskRegistry::load(Arc::new(Database::open_at(&path).unwrap()));
    assert_eq!(reloaded.tasks(), &saved[..]);
    assert_eq!(reloaded.active_task().map(|t| t.text.as_str()), Some("B"));
}

#[test]
fn reads_task_list_written_by_browser_build() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            keys::TASKS,
            r#"[{"id":1712000000000,"text":"Legacy","completed":false,"createdAt":"2024-04-01T19:33:20.000Z","active":true,"sessions":[1712000100000]}]"#,
        )
        .unwrap();
    let registry = TaskRegistry::load(store);
    let task = registry.get(1712000000000).unwrap();
    assert_eq!(task.sessions, vec![1712000100000]);
    assert_eq!(registry.active_task_id(), Some(1712000000000));
}
