//! End-to-end session flow through the controller.
//!
//! A focus countdown runs to completion and the resulting session has to
//! land on the right task, even when the store misbehaves.

use std::sync::Arc;

use pomotask_core::storage::keys;
use pomotask_core::{
    Association, Config, Controller, Event, MemoryStore, Session, SessionObserver, Store,
    StoreError, TimerMode,
};

fn config() -> Config {
    let mut config = Config::default();
    config.timer.auto_switch_delay_ms = 0;
    config
}

/// Configure a one-minute focus and run it out.
fn run_focus(controller: &mut Controller) -> Vec<Event> {
    controller.configure(1, 1).unwrap();
    controller.switch_mode(TimerMode::Focus).unwrap();
    controller.start();
    let mut events = Vec::new();
    for _ in 0..61 {
        events.extend(controller.tick());
    }
    events
}

#[test]
fn session_goes_to_first_incomplete_task() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = Controller::open(store, config()).unwrap();
    let a = controller.tasks_mut().add("A").unwrap().id;
    let b = controller.tasks_mut().add("B").unwrap().id;

    let events = run_focus(&mut controller);
    let session = events.iter().find_map(Event::session).unwrap();

    assert_eq!(controller.tasks().get(a).unwrap().sessions, vec![session.id]);
    assert!(controller.tasks().get(b).unwrap().sessions.is_empty());
    assert_eq!(controller.snapshot().mode, TimerMode::Break);
    assert_eq!(controller.snapshot().completed_sessions, 1);
}

#[test]
fn session_goes_to_active_task() {
    let mut controller = Controller::open(Arc::new(MemoryStore::new()), config()).unwrap();
    controller.tasks_mut().add("A").unwrap();
    let b = controller.tasks_mut().add("B").unwrap().id;
    controller.tasks_mut().set_active(b);

    run_focus(&mut controller);
    assert_eq!(controller.tasks().get(b).unwrap().session_count(), 1);
}

#[test]
fn session_without_tasks_still_counts() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = Controller::open(store.clone(), config()).unwrap();
    run_focus(&mut controller);
    assert_eq!(store.get(keys::COMPLETED_SESSIONS).unwrap().as_deref(), Some("1"));
    assert_eq!(controller.stats_report().total_pomodoros, 1);
}

#[test]
fn break_completion_credits_nothing() {
    let mut controller = Controller::open(Arc::new(MemoryStore::new()), config()).unwrap();
    let a = controller.tasks_mut().add("A").unwrap().id;
    controller.configure(1, 1).unwrap();
    controller.switch_mode(TimerMode::Break).unwrap();
    controller.start();
    for _ in 0..61 {
        controller.tick();
    }
    assert!(controller.tasks().get(a).unwrap().sessions.is_empty());
    assert_eq!(controller.snapshot().mode, TimerMode::Focus);
}

#[test]
fn state_reloads_after_restart() {
    let store = Arc::new(MemoryStore::new());
    let a = {
        let mut controller = Controller::open(store.clone(), config()).unwrap();
        let a = controller.tasks_mut().add("A").unwrap().id;
        run_focus(&mut controller);
        a
    };

    let controller = Controller::open(store, config()).unwrap();
    assert_eq!(controller.snapshot().completed_sessions, 1);
    assert_eq!(controller.snapshot().total_secs, 60);
    assert_eq!(controller.tasks().get(a).unwrap().session_count(), 1);
}

struct Collect(std::rc::Rc<std::cell::RefCell<Vec<(i64, Association)>>>);

impl SessionObserver for Collect {
    fn name(&self) -> &str {
        "collect"
    }

    fn on_session_complete(
        &mut self,
        session: &Session,
        association: Association,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.0.borrow_mut().push((session.id, association));
        Ok(())
    }
}

#[test]
fn observers_are_told_about_completions() {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut controller = Controller::open(Arc::new(MemoryStore::new()), config()).unwrap();
    controller.subscribe(Box::new(Collect(seen.clone())));
    run_focus(&mut controller);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, Association::Unassociated);
}

/// Store whose writes always fail, like a browser over quota.
struct FullStore(MemoryStore);

impl Store for FullStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".into()))
    }
}

#[test]
fn failing_store_never_breaks_operations() {
    let store = Arc::new(FullStore(MemoryStore::new()));
    let mut controller = Controller::open(store, config()).unwrap();

    let a = controller.tasks_mut().add("A").unwrap().id;
    assert!(controller.tasks_mut().set_active(a));
    let events = run_focus(&mut controller);

    assert!(events.iter().any(|e| e.session().is_some()));
    assert_eq!(controller.snapshot().completed_sessions, 1);
    assert_eq!(controller.tasks().get(a).unwrap().session_count(), 1);
    assert!(controller.tasks_mut().toggle_completion(a).unwrap());
    assert_eq!(controller.tasks_mut().clear_completed(), 1);
}
