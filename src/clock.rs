//! Clock and one-shot timer capabilities.
//!
//! The ledgers never read the system clock or own a timer. They are handed a
//! [`Clock`] and (for buffs) a [`Scheduler`], so the headless simulator and
//! tests can drive time by hand.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// A one-shot buff removal waiting to be delivered back to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpiryTask {
    pub buff_id: String,
}

/// Timer service able to fire a one-shot task after a delay.
///
/// Delivery is best-effort: a dropped or late task only delays removal until
/// the next sweep.
pub trait Scheduler {
    fn schedule(&mut self, delay_ms: f64, task: ExpiryTask);
}

/// Scheduler that never fires. Expiry is left entirely to the sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScheduler;

impl Scheduler for NoScheduler {
    fn schedule(&mut self, _delay_ms: f64, _task: ExpiryTask) {}
}

#[derive(Clone, Debug)]
struct PendingTimer {
    fire_at_ms: f64,
    task: ExpiryTask,
}

/// In-process one-shot timer queue.
///
/// Clones share the same queue, so one handle can be boxed into the
/// [`BuffLedger`](crate::BuffLedger) while the game loop keeps another and
/// drains it with [`TimerQueue::take_due`].
#[derive(Clone)]
pub struct TimerQueue {
    pending: Rc<RefCell<Vec<PendingTimer>>>,
    clock: Rc<dyn Clock>,
}

impl TimerQueue {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            pending: Rc::new(RefCell::new(Vec::new())),
            clock,
        }
    }

    /// Remove and return every task whose fire time is at or before `now_ms`,
    /// earliest first.
    pub fn take_due(&self, now_ms: f64) -> Vec<ExpiryTask> {
        let mut pending = self.pending.borrow_mut();
        let (mut due, rest): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|t| t.fire_at_ms <= now_ms);
        *pending = rest;
        due.sort_by(|a, b| a.fire_at_ms.total_cmp(&b.fire_at_ms));
        due.into_iter().map(|t| t.task).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay_ms: f64, task: ExpiryTask) {
        let fire_at_ms = self.clock.now_ms() + delay_ms.max(0.0);
        self.pending
            .borrow_mut()
            .push(PendingTimer { fire_at_ms, task });
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending_count())
            .finish()
    }
}
