//! Timed notification delivery.
//!
//! The dispatcher owns a dedicated delivery thread. Posting fans an event
//! out into one delivery per observer registered at post time; each
//! delivery carries its own due instant. The thread drains an mpsc channel
//! into a due-ordered heap and fires deliveries as they come due, so a
//! deferred "loaded" never blocks a prompt "refreshed" behind it.
//!
//! Unregistering an observer cancels anything still pending for it: the
//! thread re-checks registry membership at fire time. On `stop()` the
//! channel closes; deliveries already due still fire, deliveries with a
//! future due time are discarded so shutdown never waits out a delay.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::events::{ObserverRegistry, SheetEvent, SheetObserver};

/// One observer's pending notification.
struct Delivery {
    due: Instant,
    /// Post-order tiebreak for equal due times.
    seq: u64,
    observer: Arc<dyn SheetObserver>,
    event: Arc<SheetEvent>,
}

impl PartialEq for Delivery {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Delivery {}

impl PartialOrd for Delivery {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delivery {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Delivery thread plus the sending side of its queue.
pub struct Dispatcher {
    tx: Option<mpsc::Sender<Delivery>>,
    handle: Option<JoinHandle<()>>,
    registry: ObserverRegistry,
    seq: AtomicU64,
}

impl Dispatcher {
    /// Spawn the delivery thread against an observer registry.
    pub fn start(registry: ObserverRegistry) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread_registry = registry.clone();
        let handle = thread::spawn(move || run_delivery(rx, thread_registry));
        Self {
            tx: Some(tx),
            handle: Some(handle),
            registry,
            seq: AtomicU64::new(0),
        }
    }

    /// Post `event` to every currently registered observer, one delivery
    /// per observer, each due after `delay`. Observers registered later do
    /// not receive it; observers removed before the due time do not either.
    pub fn post(&self, event: SheetEvent, delay: Duration) {
        let Some(tx) = &self.tx else {
            log::debug!("notification posted after dispatcher stop; dropped");
            return;
        };
        let due = Instant::now() + delay;
        let event = Arc::new(event);
        for observer in self.registry.snapshot() {
            let delivery = Delivery {
                due,
                seq: self.seq.fetch_add(1, Ordering::Relaxed),
                observer,
                event: Arc::clone(&event),
            };
            if tx.send(delivery).is_err() {
                log::debug!("delivery thread gone; notification dropped");
                return;
            }
        }
    }

    /// Close the queue and join the delivery thread.
    pub fn stop(&mut self) {
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_delivery(rx: mpsc::Receiver<Delivery>, registry: ObserverRegistry) {
    let mut pending: BinaryHeap<Reverse<Delivery>> = BinaryHeap::new();
    loop {
        // Fire everything already due, earliest first.
        while let Some(Reverse(head)) = pending.peek() {
            if head.due > Instant::now() {
                break;
            }
            if let Some(Reverse(delivery)) = pending.pop() {
                fire(&delivery, &registry);
            }
        }
        // Block for the next message, bounded by the earliest due time.
        match pending.peek() {
            Some(Reverse(head)) => {
                let timeout = head.due.saturating_duration_since(Instant::now());
                match rx.recv_timeout(timeout) {
                    Ok(delivery) => pending.push(Reverse(delivery)),
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(delivery) => pending.push(Reverse(delivery)),
                Err(_) => break,
            },
        }
    }
    // Queue closed. Already-due deliveries still fire; future-due ones are
    // discarded so stop() returns without waiting out their delays.
    let now = Instant::now();
    while let Some(Reverse(delivery)) = pending.pop() {
        if delivery.due > now {
            break;
        }
        fire(&delivery, &registry);
    }
}

fn fire(delivery: &Delivery, registry: &ObserverRegistry) {
    if !registry.contains(&delivery.observer) {
        log::debug!("observer unregistered before delivery; skipping");
        return;
    }
    delivery.event.deliver(delivery.observer.as_ref());
}
