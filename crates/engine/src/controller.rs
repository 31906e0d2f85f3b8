//! Sheet state controller.
//!
//! All mutations funnel through one worker thread: public methods enqueue
//! commands over a channel and return immediately. The worker owns the
//! sheet state outright (grid, labels, tracked selection), applies commands
//! strictly in submission order, and hands notification snapshots to the
//! dispatcher. Nothing outside the worker ever touches live state, so a
//! read-modify-write command is atomic with respect to every other command.
//!
//! Notification pacing is asymmetric and deliberate: "loaded" is announced
//! to each observer after a fixed delay (one second by default, so a host
//! can show its loading affordance), "refreshed" promptly.

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::events::{ObserverRegistry, SheetEvent, SheetObserver};
use crate::grid::{Grid, NUM_COLS, NUM_ROWS};
use crate::labels;
use crate::store::SheetStore;

/// A oneshot channel for single-use replies, built on `mpsc::sync_channel`.
mod oneshot {
    use std::sync::mpsc;

    pub struct Sender<T>(mpsc::SyncSender<T>);
    pub struct Receiver<T>(mpsc::Receiver<T>);

    impl<T> Sender<T> {
        pub fn send(self, value: T) -> Result<(), T> {
            self.0.send(value).map_err(|e| e.0)
        }
    }

    impl<T> Receiver<T> {
        pub fn blocking_recv(self) -> Result<T, mpsc::RecvError> {
            self.0.recv()
        }
    }

    pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
        // Buffer of 1 for oneshot semantics
        let (tx, rx) = mpsc::sync_channel(1);
        (Sender(tx), Receiver(rx))
    }
}

/// Tuning knobs for the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Delay applied to each observer's "loaded" notification.
    pub loaded_notify_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            loaded_notify_delay: Duration::from_secs(1),
        }
    }
}

/// Point-in-time copy of the worker's state, for synchronous inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSnapshot {
    pub header_labels: Vec<String>,
    pub row_labels: Vec<String>,
    pub grid: Grid,
    /// Tracked selection index. Edits move only the row half; the column
    /// half keeps its previous value.
    pub selected: (usize, usize),
}

enum Command {
    Load,
    Reload,
    Save,
    Clear,
    SelectCell {
        row: usize,
        column: usize,
    },
    EditCell {
        text: Option<String>,
        row: usize,
        column: usize,
    },
    Snapshot {
        reply: oneshot::Sender<Option<SheetSnapshot>>,
    },
}

/// Public handle to the mutation worker.
///
/// Dropping the controller stops it: the worker drains already-submitted
/// commands, then the dispatcher fires what is already due and discards
/// the rest. Commands submitted after `stop()` are silently dropped.
pub struct SheetController {
    tx: Option<mpsc::Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    registry: ObserverRegistry,
}

impl SheetController {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self::with_config(store, ControllerConfig::default())
    }

    pub fn with_config(store: Arc<dyn SheetStore>, config: ControllerConfig) -> Self {
        let registry = ObserverRegistry::new();
        let (tx, rx) = mpsc::channel();
        let worker_registry = registry.clone();
        let worker = thread::spawn(move || run_worker(rx, store, worker_registry, config));
        Self {
            tx: Some(tx),
            worker: Some(worker),
            registry,
        }
    }

    /// Register an observer. Duplicate handles are ignored.
    pub fn add_observer(&self, observer: Arc<dyn SheetObserver>) {
        self.registry.add(observer);
    }

    /// Unregister an observer. Pending notifications aimed at it are
    /// cancelled; absent handles are ignored.
    pub fn remove_observer(&self, observer: &Arc<dyn SheetObserver>) {
        self.registry.remove(observer);
    }

    /// Load labels and grid if nothing is held yet, then announce "loaded".
    /// The announcement fires on every call, held sheet or not.
    pub fn load(&self) {
        self.submit(Command::Load);
    }

    /// Regenerate labels and reload the grid from the store unconditionally,
    /// then announce "loaded".
    pub fn reload(&self) {
        self.submit(Command::Reload);
    }

    /// Strip the session selection and write the sheet to the store, then
    /// announce "refreshed". No-op before the first load.
    pub fn save(&self) {
        self.submit(Command::Save);
    }

    /// Blank every cell and reset the tracked selection, then announce
    /// "refreshed". No-op before the first load.
    pub fn clear(&self) {
        self.submit(Command::Clear);
    }

    /// Move the single selection to (row, column) and announce "refreshed".
    /// Out-of-range indices are skipped.
    pub fn select_cell(&self, row: usize, column: usize) {
        self.submit(Command::SelectCell { row, column });
    }

    /// Replace the text at (row, column) and announce "refreshed".
    /// Out-of-range indices are skipped.
    pub fn edit_cell(&self, text: Option<String>, row: usize, column: usize) {
        self.submit(Command::EditCell { text, row, column });
    }

    /// Synchronously inspect the worker's state. Runs after every command
    /// submitted before it, so it observes their effects. Returns `None`
    /// before the first load and after `stop()`.
    pub fn snapshot(&self) -> Option<SheetSnapshot> {
        let tx = self.tx.as_ref()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        if tx.send(Command::Snapshot { reply: reply_tx }).is_err() {
            return None;
        }
        reply_rx.blocking_recv().ok().flatten()
    }

    /// Stop the worker: already-submitted commands still run, then the
    /// dispatcher flushes due notifications and discards deferred ones.
    pub fn stop(&mut self) {
        if self.tx.is_none() {
            return;
        }
        self.tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        log::debug!("sheet controller stopped");
    }

    fn submit(&self, command: Command) {
        let Some(tx) = &self.tx else {
            log::debug!("command submitted after stop; dropped");
            return;
        };
        if tx.send(command).is_err() {
            log::debug!("mutation worker gone; command dropped");
        }
    }
}

impl Drop for SheetController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State owned by the mutation worker.
struct SheetState {
    header_labels: Vec<String>,
    row_labels: Vec<String>,
    grid: Grid,
    selected: (usize, usize),
}

struct Worker {
    store: Arc<dyn SheetStore>,
    dispatcher: Dispatcher,
    config: ControllerConfig,
    state: Option<SheetState>,
}

fn run_worker(
    rx: mpsc::Receiver<Command>,
    store: Arc<dyn SheetStore>,
    registry: ObserverRegistry,
    config: ControllerConfig,
) {
    let mut worker = Worker {
        store,
        dispatcher: Dispatcher::start(registry),
        config,
        state: None,
    };
    while let Ok(command) = rx.recv() {
        worker.handle(command);
    }
    worker.dispatcher.stop();
}

impl Worker {
    fn handle(&mut self, command: Command) {
        match command {
            Command::Load => self.load(),
            Command::Reload => self.reload(),
            Command::Save => self.save(),
            Command::Clear => self.clear(),
            Command::SelectCell { row, column } => self.select_cell(row, column),
            Command::EditCell { text, row, column } => self.edit_cell(text, row, column),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn load(&mut self) {
        if self.state.is_none() {
            self.state = Some(self.fresh_state());
        }
        // Announced on every call, even when the sheet was already held.
        self.notify_loaded();
    }

    fn reload(&mut self) {
        self.state = Some(self.fresh_state());
        self.notify_loaded();
    }

    fn fresh_state(&self) -> SheetState {
        let grid = self
            .store
            .load_sheet()
            .and_then(|text| Grid::from_stored(&text))
            .unwrap_or_else(|| Grid::blank(NUM_ROWS, NUM_COLS));
        log::debug!("sheet loaded: {}x{}", grid.rows(), grid.cols());
        // Labels come from the fixed sheet dimensions, never from whatever
        // the store held: a stored sheet of another size keeps the stock
        // label strips.
        SheetState {
            header_labels: labels::header_labels(NUM_COLS),
            row_labels: labels::row_labels(NUM_ROWS),
            grid,
            selected: (0, 0),
        }
    }

    fn save(&mut self) {
        let Some(state) = &mut self.state else {
            log::debug!("save before load; skipped");
            return;
        };
        if state.grid.is_empty() {
            log::debug!("save of empty sheet; skipped");
            return;
        }
        // Selection is session state; the stored text never carries it.
        state.grid.deselect_all();
        state.selected = (0, 0);
        if let Err(err) = self.store.save_sheet(&state.grid.to_stored()) {
            log::warn!("sheet save failed: {}", err);
        }
        self.notify_refreshed();
    }

    fn clear(&mut self) {
        let Some(state) = &mut self.state else {
            log::debug!("clear before load; skipped");
            return;
        };
        state.grid.clear();
        state.selected = (0, 0);
        self.notify_refreshed();
    }

    fn select_cell(&mut self, row: usize, column: usize) {
        let Some(state) = &mut self.state else {
            log::debug!("select before load; skipped");
            return;
        };
        if state.grid.is_empty() {
            return;
        }
        if !state.grid.contains(row, column) {
            log::warn!(
                "select ({}, {}) out of range for {}x{} sheet; skipped",
                row,
                column,
                state.grid.rows(),
                state.grid.cols()
            );
            return;
        }
        // Sweep every flag rather than just the tracked cell: edits move
        // the tracked row without touching flags, so the tracked index can
        // point away from the one selected cell.
        state.grid.deselect_all();
        if let Some(cell) = state.grid.get_mut(row, column) {
            cell.selected = true;
        }
        state.selected = (row, column);
        self.notify_refreshed();
    }

    fn edit_cell(&mut self, text: Option<String>, row: usize, column: usize) {
        let Some(state) = &mut self.state else {
            log::debug!("edit before load; skipped");
            return;
        };
        if state.grid.is_empty() {
            return;
        }
        if !state.grid.contains(row, column) {
            log::warn!(
                "edit ({}, {}) out of range for {}x{} sheet; skipped",
                row,
                column,
                state.grid.rows(),
                state.grid.cols()
            );
            return;
        }
        if let Some(cell) = state.grid.get_mut(row, column) {
            cell.set_text(text);
        }
        // Longstanding tracking quirk, kept on purpose: an edit moves the
        // tracked row but leaves the tracked column where it was.
        state.selected.0 = row;
        self.notify_refreshed();
    }

    fn snapshot(&self) -> Option<SheetSnapshot> {
        self.state.as_ref().map(|state| SheetSnapshot {
            header_labels: state.header_labels.clone(),
            row_labels: state.row_labels.clone(),
            grid: state.grid.clone(),
            selected: state.selected,
        })
    }

    fn notify_loaded(&self) {
        let Some(state) = &self.state else {
            return;
        };
        self.dispatcher.post(
            SheetEvent::Loaded {
                header_labels: state.header_labels.clone(),
                row_labels: state.row_labels.clone(),
                grid: state.grid.clone(),
            },
            self.config.loaded_notify_delay,
        );
    }

    fn notify_refreshed(&self) {
        let Some(state) = &self.state else {
            return;
        };
        self.dispatcher.post(
            SheetEvent::Refreshed {
                grid: state.grid.clone(),
            },
            Duration::ZERO,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventCollector;
    use crate::store::MemoryStore;
    use std::time::Instant;

    fn quick_config() -> ControllerConfig {
        ControllerConfig {
            loaded_notify_delay: Duration::from_millis(10),
        }
    }

    fn controller() -> SheetController {
        SheetController::with_config(Arc::new(MemoryStore::new()), quick_config())
    }

    /// Poll until the collector holds `n` events or the timeout passes.
    fn wait_for(collector: &EventCollector, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if collector.len() >= n {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        collector.len() >= n
    }

    #[test]
    fn test_snapshot_before_load_is_none() {
        let controller = controller();
        assert_eq!(controller.snapshot(), None);
    }

    #[test]
    fn test_load_initializes_default_sheet() {
        let controller = controller();
        controller.load();

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.grid.rows(), NUM_ROWS);
        assert_eq!(snapshot.grid.cols(), NUM_COLS);
        assert_eq!(
            snapshot.header_labels,
            vec!["A", "B", "C", "D", "E", "F", "G", "H"]
        );
        assert_eq!(
            snapshot.row_labels,
            vec!["0", "1", "2", "3", "4", "5", "6", "7"]
        );
        assert_eq!(snapshot.selected, (0, 0));
        assert!(snapshot.grid.selected_coords().is_empty());
    }

    #[test]
    fn test_load_uses_stored_sheet() {
        let store = Arc::new(MemoryStore::new());
        let mut grid = Grid::blank(NUM_ROWS, NUM_COLS);
        grid.get_mut(3, 4).unwrap().text = Some("kept".to_string());
        store.save_sheet(&grid.to_stored()).unwrap();

        let controller = SheetController::with_config(store, quick_config());
        controller.load();

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(
            snapshot.grid.get(3, 4).unwrap().text.as_deref(),
            Some("kept")
        );
    }

    #[test]
    fn test_malformed_store_falls_back_to_default() {
        let store = Arc::new(MemoryStore::new());
        store.save_sheet("{ not a sheet").unwrap();

        let controller = SheetController::with_config(store, quick_config());
        controller.load();

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.grid.rows(), NUM_ROWS);
        assert!(snapshot.grid.iter().all(|(_, _, cell)| cell.is_blank()));
    }

    #[test]
    fn test_edit_sets_text_and_moves_tracked_row_only() {
        let controller = controller();
        controller.load();
        controller.select_cell(2, 3);
        controller.edit_cell(Some("7".to_string()), 5, 1);

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.grid.get(5, 1).unwrap().text.as_deref(), Some("7"));
        // Row follows the edit, column stays from the previous selection.
        assert_eq!(snapshot.selected, (5, 3));
        // Flags are untouched by an edit.
        assert_eq!(snapshot.grid.selected_coords(), vec![(2, 3)]);
    }

    #[test]
    fn test_select_moves_the_single_selection() {
        let controller = controller();
        controller.load();
        controller.select_cell(2, 3);
        controller.select_cell(5, 1);

        let snapshot = controller.snapshot().unwrap();
        assert!(!snapshot.grid.get(2, 3).unwrap().selected);
        assert!(snapshot.grid.get(5, 1).unwrap().selected);
        assert_eq!(snapshot.grid.selected_coords(), vec![(5, 1)]);
        assert_eq!(snapshot.selected, (5, 1));
    }

    #[test]
    fn test_select_after_edit_cannot_strand_a_flag() {
        let controller = controller();
        controller.load();
        controller.select_cell(2, 3);
        // Moves the tracked index off the selected cell.
        controller.edit_cell(Some("x".to_string()), 5, 1);
        controller.select_cell(0, 0);

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.grid.selected_coords(), vec![(0, 0)]);
    }

    #[test]
    fn test_save_strips_selection_and_resets_tracking() {
        let store = Arc::new(MemoryStore::new());
        let controller = SheetController::with_config(store.clone(), quick_config());
        controller.load();
        controller.edit_cell(Some("v".to_string()), 1, 2);
        controller.select_cell(4, 4);
        controller.save();

        let snapshot = controller.snapshot().unwrap();
        assert!(snapshot.grid.selected_coords().is_empty());
        assert_eq!(snapshot.selected, (0, 0));

        let stored = store.load_sheet().unwrap();
        let stored_grid = Grid::from_stored(&stored).unwrap();
        assert_eq!(stored_grid.get(1, 2).unwrap().text.as_deref(), Some("v"));
        assert!(!stored.contains("true"));
    }

    #[test]
    fn test_clear_blanks_sheet_and_resets_tracking() {
        let controller = controller();
        controller.load();
        controller.edit_cell(Some("gone".to_string()), 6, 6);
        controller.select_cell(6, 6);
        controller.clear();

        let snapshot = controller.snapshot().unwrap();
        assert!(snapshot
            .grid
            .iter()
            .all(|(_, _, cell)| cell.is_blank() && !cell.selected));
        assert_eq!(snapshot.selected, (0, 0));
    }

    #[test]
    fn test_out_of_range_select_and_edit_are_skipped() {
        let controller = controller();
        let collector = Arc::new(EventCollector::new());
        controller.add_observer(collector.clone());
        controller.load();
        controller.select_cell(2, 3);
        let before = controller.snapshot().unwrap();
        assert!(wait_for(&collector, 2, Duration::from_secs(1)));
        let announced = collector.len();

        controller.select_cell(NUM_ROWS, 0);
        controller.edit_cell(Some("x".to_string()), 0, NUM_COLS);

        // Neither state nor observers hear about a skipped operation.
        assert_eq!(controller.snapshot().unwrap(), before);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(collector.len(), announced);
    }

    #[test]
    fn test_mutations_before_load_are_skipped() {
        let controller = controller();
        controller.select_cell(0, 0);
        controller.edit_cell(Some("x".to_string()), 0, 0);
        controller.save();
        controller.clear();
        assert_eq!(controller.snapshot(), None);
    }

    #[test]
    fn test_commands_after_stop_are_dropped() {
        let mut controller = controller();
        controller.load();
        controller.stop();

        controller.load();
        controller.edit_cell(Some("x".to_string()), 0, 0);
        assert_eq!(controller.snapshot(), None);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut controller = controller();
        controller.load();
        controller.stop();
        controller.stop();
    }
}
