//! Observer surface for sheet change notifications.
//!
//! Observers receive snapshots, never live references into controller
//! state: every payload is cloned at mutation time, so a delivery can
//! never observe a half-applied change.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::grid::Grid;

/// Receives sheet change notifications.
///
/// Callbacks run on the delivery thread, never on the caller that
/// triggered the change.
pub trait SheetObserver: Send + Sync {
    /// A full (re)load completed: fresh labels and grid.
    fn on_sheet_loaded(&self, header_labels: &[String], row_labels: &[String], grid: &Grid);

    /// An in-place mutation completed: grid after the change.
    fn on_cells_refreshed(&self, grid: &Grid);
}

/// A deliverable notification with its snapshot payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    Loaded {
        header_labels: Vec<String>,
        row_labels: Vec<String>,
        grid: Grid,
    },
    Refreshed {
        grid: Grid,
    },
}

impl SheetEvent {
    /// Invoke the matching observer callback.
    pub fn deliver(&self, observer: &dyn SheetObserver) {
        match self {
            SheetEvent::Loaded {
                header_labels,
                row_labels,
                grid,
            } => observer.on_sheet_loaded(header_labels, row_labels, grid),
            SheetEvent::Refreshed { grid } => observer.on_cells_refreshed(grid),
        }
    }
}

/// Identity key for a registered observer: the allocation behind the handle.
fn observer_key(observer: &Arc<dyn SheetObserver>) -> *const () {
    Arc::as_ptr(observer) as *const ()
}

/// Thread-safe observer list keyed by allocation identity.
///
/// Adding a handle twice keeps one entry; removing an absent handle is a
/// no-op. Registration order is preserved and is the delivery order for
/// notifications posted at the same instant.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<Mutex<Vec<Arc<dyn SheetObserver>>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Duplicate handles are ignored.
    pub fn add(&self, observer: Arc<dyn SheetObserver>) {
        let mut observers = self.observers.lock().unwrap();
        let key = observer_key(&observer);
        if observers.iter().any(|o| observer_key(o) == key) {
            return;
        }
        observers.push(observer);
    }

    /// Unregister an observer. Absent handles are ignored.
    pub fn remove(&self, observer: &Arc<dyn SheetObserver>) {
        let key = observer_key(observer);
        self.observers
            .lock()
            .unwrap()
            .retain(|o| observer_key(o) != key);
    }

    /// Is this exact handle currently registered?
    pub fn contains(&self, observer: &Arc<dyn SheetObserver>) -> bool {
        let key = observer_key(observer);
        self.observers
            .lock()
            .unwrap()
            .iter()
            .any(|o| observer_key(o) == key)
    }

    /// Current membership in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn SheetObserver>> {
        self.observers.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.lock().unwrap().is_empty()
    }
}

/// Observer that records every delivery with its arrival instant. Tests
/// assert on delivery order and pacing through it.
#[derive(Default)]
pub struct EventCollector {
    events: Mutex<Vec<(Instant, SheetEvent)>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries so far, in delivery order.
    pub fn events(&self) -> Vec<SheetEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Deliveries with the instant each one arrived.
    pub fn timed_events(&self) -> Vec<(Instant, SheetEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SheetObserver for EventCollector {
    fn on_sheet_loaded(&self, header_labels: &[String], row_labels: &[String], grid: &Grid) {
        self.events.lock().unwrap().push((
            Instant::now(),
            SheetEvent::Loaded {
                header_labels: header_labels.to_vec(),
                row_labels: row_labels.to_vec(),
                grid: grid.clone(),
            },
        ));
    }

    fn on_cells_refreshed(&self, grid: &Grid) {
        self.events.lock().unwrap().push((
            Instant::now(),
            SheetEvent::Refreshed { grid: grid.clone() },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_registry_add_is_idempotent() {
        let registry = ObserverRegistry::new();
        let observer: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());

        registry.add(observer.clone());
        registry.add(observer.clone());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_remove_absent_is_noop() {
        let registry = ObserverRegistry::new();
        let registered: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());
        let stranger: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());

        registry.add(registered.clone());
        registry.remove(&stranger);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&registered));
        assert!(!registry.contains(&stranger));
    }

    #[test]
    fn test_registry_identity_is_per_allocation() {
        let registry = ObserverRegistry::new();
        let a: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());
        let b: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());

        registry.add(a.clone());
        registry.add(b.clone());
        assert_eq!(registry.len(), 2);

        registry.remove(&a);
        assert!(!registry.contains(&a));
        assert!(registry.contains(&b));
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = ObserverRegistry::new();
        let first: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());
        let second: Arc<dyn SheetObserver> = Arc::new(EventCollector::new());

        registry.add(first.clone());
        registry.add(second.clone());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &first));
        assert!(Arc::ptr_eq(&snapshot[1], &second));
    }

    #[test]
    fn test_deliver_dispatches_to_matching_callback() {
        let collector = EventCollector::new();
        let grid = Grid::blank(1, 1);

        SheetEvent::Refreshed { grid: grid.clone() }.deliver(&collector);
        SheetEvent::Loaded {
            header_labels: vec!["A".to_string()],
            row_labels: vec!["0".to_string()],
            grid: grid.clone(),
        }
        .deliver(&collector);

        let events = collector.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SheetEvent::Refreshed { .. }));
        assert!(matches!(events[1], SheetEvent::Loaded { .. }));
    }
}
