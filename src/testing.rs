//! Test doubles for the timer's collaborators.
//!
//! The mocks model a uniprocessor: one "current" thread, an interrupt flag,
//! and logs of every block/unblock so tests can check wake order. Blocking
//! is recorded and returns immediately, standing in for "switched away and
//! later resumed".

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use spin::Mutex;

use crate::config::Frequency;
use crate::scheduler::{
    IntrLevel, ThreadId,
    traits::{InterruptController, IntervalTimer, Scheduler},
};
use crate::timer::calibrate::LoopProbe;

pub struct MockInterrupts {
    enabled: AtomicBool,
    in_handler: AtomicBool,
    disables: AtomicUsize,
    pub registered: Mutex<Vec<(u8, fn(), &'static str)>>,
}

impl MockInterrupts {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            in_handler: AtomicBool::new(false),
            disables: AtomicUsize::new(0),
            registered: Mutex::new(Vec::new()),
        }
    }

    /// Run `f` as if from inside an external interrupt handler
    pub fn as_handler<R>(&self, f: impl FnOnce() -> R) -> R {
        let was = self.enabled.swap(false, Ordering::SeqCst);
        self.in_handler.store(true, Ordering::SeqCst);
        let r = f();
        self.in_handler.store(false, Ordering::SeqCst);
        self.enabled.store(was, Ordering::SeqCst);
        r
    }

    /// How many critical sections have been entered
    pub fn disable_count(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

impl InterruptController for MockInterrupts {
    fn disable(&self) -> IntrLevel {
        self.disables.fetch_add(1, Ordering::SeqCst);
        IntrLevel::from_enabled(self.enabled.swap(false, Ordering::SeqCst))
    }

    fn restore(&self, level: IntrLevel) {
        self.enabled.store(level.is_on(), Ordering::SeqCst);
    }

    fn level(&self) -> IntrLevel {
        IntrLevel::from_enabled(self.enabled.load(Ordering::SeqCst))
    }

    fn in_external_handler(&self) -> bool {
        self.in_handler.load(Ordering::SeqCst)
    }

    fn register_external_handler(&self, vector: u8, handler: fn(), name: &'static str) {
        self.registered.lock().push((vector, handler, name));
    }
}

pub struct MockScheduler {
    current: AtomicUsize,
    tick_notifies: AtomicU64,
    /// Threads in the order they called `block_current`
    pub blocked: Mutex<Vec<ThreadId>>,
    /// Threads in the order they were passed to `unblock`
    pub unblocked: Mutex<Vec<ThreadId>>,
    /// Interrupt level observed at each `block_current`
    pub block_levels: Mutex<Vec<bool>>,
    intc_enabled_probe: Option<&'static MockInterrupts>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            current: AtomicUsize::new(1),
            tick_notifies: AtomicU64::new(0),
            blocked: Mutex::new(Vec::new()),
            unblocked: Mutex::new(Vec::new()),
            block_levels: Mutex::new(Vec::new()),
            intc_enabled_probe: None,
        }
    }

    /// Record the interrupt level of `intc` every time a thread blocks
    pub fn watching(intc: &'static MockInterrupts) -> Self {
        Self {
            intc_enabled_probe: Some(intc),
            ..Self::new()
        }
    }

    pub fn set_current(&self, thread: ThreadId) {
        self.current.store(thread.0, Ordering::SeqCst);
    }

    pub fn tick_notifies(&self) -> u64 {
        self.tick_notifies.load(Ordering::SeqCst)
    }

    pub fn unblocked(&self) -> Vec<ThreadId> {
        self.unblocked.lock().clone()
    }

    pub fn blocked(&self) -> Vec<ThreadId> {
        self.blocked.lock().clone()
    }
}

impl Scheduler for MockScheduler {
    fn current_thread(&self) -> ThreadId {
        ThreadId(self.current.load(Ordering::SeqCst))
    }

    fn block_current(&self) {
        if let Some(intc) = self.intc_enabled_probe {
            self.block_levels.lock().push(intc.level().is_on());
        }
        self.blocked.lock().push(self.current_thread());
    }

    fn unblock(&self, thread: ThreadId) {
        self.unblocked.lock().push(thread);
    }

    fn tick_notify(&self) {
        self.tick_notifies.fetch_add(1, Ordering::SeqCst);
    }
}

/// Probe that says "too many" for any count above a fixed threshold
pub struct ThresholdProbe {
    pub threshold: u64,
    pub calls: AtomicUsize,
}

impl ThresholdProbe {
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            calls: AtomicUsize::new(0),
        }
    }
}

impl LoopProbe for ThresholdProbe {
    fn too_many_loops(&self, loops: u32) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        loops as u64 > self.threshold
    }
}

#[derive(Default)]
pub struct RecordingPit {
    pub programmed: Vec<Frequency>,
}

impl IntervalTimer for RecordingPit {
    fn program(&mut self, freq: Frequency) {
        self.programmed.push(freq);
    }
}
