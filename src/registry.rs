/*!
 * Handler Registry
 * Process-wide signal-to-callback table and the delivery trampoline
 */

use crate::types::Signal;
use arc_swap::ArcSwapOption;
use libc::c_int;
use std::sync::Arc;

/// Signal handler callback function type.
///
/// Callbacks run in signal-delivery context, on the stack of whichever
/// thread the kernel preempted. They must not allocate and must not take
/// locks that ordinary execution could be holding.
pub type HandlerFn = Box<dyn Fn(Signal) + Send + Sync>;

/// One registered handler.
pub(crate) struct Entry {
    action: HandlerFn,
}

impl Entry {
    pub(crate) fn new(action: HandlerFn) -> Self {
        Self { action }
    }
}

/// Process-wide handler table: one atomically-swapped slot per signal
/// ordinal, at most one callback per signal.
///
/// Writes (install/evict) happen only from ordinary execution; the delivery
/// trampoline only performs lock-free loads, so a registration racing a
/// concurrent delivery resolves to either the old or the new callback,
/// never a torn state.
pub(crate) struct HandlerTable {
    slots: [ArcSwapOption<Entry>; Signal::COUNT],
}

const EMPTY_SLOT: ArcSwapOption<Entry> = ArcSwapOption::const_empty();

impl HandlerTable {
    const fn new() -> Self {
        Self { slots: [EMPTY_SLOT; Signal::COUNT] }
    }

    /// Swap in a callback, returning whatever was installed before so a
    /// failed OS install can be rolled back.
    pub(crate) fn install(&self, signal: Signal, entry: Entry) -> Option<Arc<Entry>> {
        self.slots[signal.ordinal()].swap(Some(Arc::new(entry)))
    }

    /// Put back a previously swapped-out entry.
    pub(crate) fn restore(&self, signal: Signal, previous: Option<Arc<Entry>>) {
        self.slots[signal.ordinal()].store(previous);
    }

    /// Remove the entry for `signal`, reporting whether one was present.
    pub(crate) fn evict(&self, signal: Signal) -> bool {
        self.slots[signal.ordinal()].swap(None).is_some()
    }

    pub(crate) fn is_registered(&self, signal: Signal) -> bool {
        self.slots[signal.ordinal()].load().is_some()
    }

    /// Delivery-path lookup-and-call. Runs in signal context: the load is
    /// lock-free and allocation-free, an empty slot does nothing, and
    /// nothing here logs.
    fn invoke(&self, signal: Signal) {
        let entry = self.slots[signal.ordinal()].load();
        if let Some(entry) = entry.as_ref() {
            (entry.action)(signal);
        }
    }
}

/// The process-wide table. Created once, lives for the process lifetime;
/// process exit reclaims it.
static HANDLERS: HandlerTable = HandlerTable::new();

pub(crate) fn handlers() -> &'static HandlerTable {
    &HANDLERS
}

/// Single OS-facing entry point for every handled signal.
///
/// May preempt any thread at an arbitrary instruction boundary, including
/// reentrantly while an earlier invocation is still running. Unknown raw
/// codes and empty slots are ignored.
pub(crate) extern "C" fn trampoline(code: c_int) {
    if let Some(signal) = Signal::from_raw(code) {
        HANDLERS.invoke(signal);
    }
}
