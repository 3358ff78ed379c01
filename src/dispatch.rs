/*!
 * Signal Dispatch
 * Installing handlers and manipulating process-wide signal state
 */

use crate::flags::HandlerFlags;
use crate::registry::{self, Entry, HandlerFn};
use crate::set::SignalSet;
use crate::types::{Signal, SignalError, SignalResult};
use log::{debug, info, warn};
use std::io;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::Arc;

fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Register a callback for `signal` with no install flags and an empty
/// handler-scope mask.
///
/// The callback runs in signal-delivery context: it must not allocate heap
/// memory and must not take locks that ordinary execution could be holding.
/// Installing a callback for a signal that already has one replaces it. For
/// SIGKILL and SIGSTOP this is a silent no-op, mirroring the kernel.
pub fn handle<F>(signal: Signal, action: F) -> SignalResult<()>
where
    F: Fn(Signal) + Send + Sync + 'static,
{
    handle_with(signal, HandlerFlags::empty(), SignalSet::empty(), action)
}

/// Register a callback for `signal`, passing `flags` through to the OS and
/// blocking `mask` for the duration of the handler.
///
/// The callback runs under the same constraints as [`handle`]. The handler
/// is active iff this returns `Ok`: when the OS install call fails, the
/// previous registration is restored and the error reported.
pub fn handle_with<F>(
    signal: Signal,
    flags: HandlerFlags,
    mask: SignalSet,
    action: F,
) -> SignalResult<()>
where
    F: Fn(Signal) + Send + Sync + 'static,
{
    install(signal, flags, mask, Box::new(action))
}

/// Register one shared callback for every signal in `signals`.
pub fn handle_set<F>(
    signals: impl Into<SignalSet>,
    flags: HandlerFlags,
    mask: SignalSet,
    action: F,
) -> SignalResult<()>
where
    F: Fn(Signal) + Send + Sync + 'static,
{
    let action = Arc::new(action);
    for signal in signals.into() {
        let action = Arc::clone(&action);
        install(signal, flags, mask, Box::new(move |s| (*action)(s)))?;
    }
    Ok(())
}

fn install(
    signal: Signal,
    flags: HandlerFlags,
    mask: SignalSet,
    action: HandlerFn,
) -> SignalResult<()> {
    if !signal.can_be_caught() {
        debug!("Skipped handler install for uncatchable {}", signal);
        return Ok(());
    }

    // Slot first, then sigaction: a delivery landing between the two sees
    // either the old entry or the new one, never a handled signal with an
    // empty slot.
    let previous = registry::handlers().install(signal, Entry::new(action));

    let handler: extern "C" fn(libc::c_int) = registry::trampoline;

    // SAFETY: `sa` is fully initialized before the call and `trampoline`
    // matches the one-argument handler prototype.
    let rc = unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as usize;
        sa.sa_mask = mask.to_os();
        sa.sa_flags = flags.bits();
        libc::sigaction(signal.as_raw(), &sa, ptr::null_mut())
    };
    if rc != 0 {
        let errno = last_errno();
        registry::handlers().restore(signal, previous);
        warn!("sigaction failed for {} (errno {}); handler rolled back", signal, errno);
        return Err(SignalError::Install { signal, errno });
    }

    info!("Installed handler for {}", signal);
    Ok(())
}

/// Whether a callback is currently registered for `signal`.
pub fn has_handler(signal: Signal) -> bool {
    registry::handlers().is_registered(signal)
}

fn set_disposition(signal: Signal, disposition: libc::sighandler_t) -> SignalResult<()> {
    // SAFETY: SIG_IGN and SIG_DFL are valid dispositions for every signal
    // the guards let through.
    let previous = unsafe { libc::signal(signal.as_raw(), disposition) };
    if previous == libc::SIG_ERR {
        return Err(SignalError::Disposition { signal, errno: last_errno() });
    }
    Ok(())
}

/// Ask the OS to discard `signal` on delivery.
///
/// Any registered callback stays in the registry untouched; it simply stops
/// being invoked until the trampoline is reinstalled. For SIGKILL and
/// SIGSTOP this is a silent no-op.
pub fn ignore(signal: Signal) -> SignalResult<()> {
    if !signal.can_be_ignored() {
        return Ok(());
    }
    set_disposition(signal, libc::SIG_IGN)?;
    debug!("Ignoring {}", signal);
    Ok(())
}

/// Revert `signal` to its default disposition and evict any registered
/// callback. For SIGKILL and SIGSTOP this is a silent no-op.
pub fn restore_default_action(signal: Signal) -> SignalResult<()> {
    if !(signal.can_be_caught() && signal.can_be_ignored()) {
        return Ok(());
    }
    set_disposition(signal, libc::SIG_DFL)?;
    // A delivery already in flight may still observe the evicted callback;
    // the registry read races the disposition change by design.
    if registry::handlers().evict(signal) {
        info!("Removed handler for {}", signal);
    }
    Ok(())
}

/// Synchronously deliver `signal` to the calling thread.
///
/// Never a no-op, even for SIGKILL and SIGSTOP. If the signal is caught, its
/// handler has run by the time this returns.
pub fn raise(signal: Signal) -> SignalResult<()> {
    // SAFETY: raise is valid for every raw code in the platform table.
    if unsafe { libc::raise(signal.as_raw()) } != 0 {
        return Err(SignalError::Raise { signal, errno: last_errno() });
    }
    Ok(())
}

fn procmask(how: libc::c_int, set: &SignalSet) -> SignalResult<()> {
    let os_set = set.to_os();
    // SAFETY: `os_set` is initialized and outlives the call; the old-mask
    // output is not requested.
    let rc = unsafe { libc::sigprocmask(how, &os_set, ptr::null_mut()) };
    if rc != 0 {
        return Err(SignalError::Mask { errno: last_errno() });
    }
    Ok(())
}

fn blockable(signals: SignalSet) -> SignalSet {
    // Blocking SIGKILL or SIGSTOP is meaningless; the kernel ignores the
    // request, so the bits are dropped before it is made.
    signals.iter().filter(|s| s.can_be_ignored()).collect()
}

/// Add `signals` to the calling thread's blocked mask. Signals that cannot
/// be ignored are skipped silently.
pub fn block(signals: impl Into<SignalSet>) -> SignalResult<()> {
    let set = blockable(signals.into());
    procmask(libc::SIG_BLOCK, &set)?;
    debug!("Blocked {:?}", set);
    Ok(())
}

/// Remove `signals` from the calling thread's blocked mask.
pub fn unblock(signals: impl Into<SignalSet>) -> SignalResult<()> {
    let set = signals.into();
    procmask(libc::SIG_UNBLOCK, &set)?;
    debug!("Unblocked {:?}", set);
    Ok(())
}

/// Remove every known signal from the blocked mask.
pub fn unblock_all() -> SignalResult<()> {
    procmask(libc::SIG_UNBLOCK, &SignalSet::all())?;
    debug!("Unblocked all signals");
    Ok(())
}

/// Replace the entire blocked mask with exactly `signals`. Signals that
/// cannot be ignored are skipped silently.
pub fn mask(signals: impl Into<SignalSet>) -> SignalResult<()> {
    let set = blockable(signals.into());
    procmask(libc::SIG_SETMASK, &set)?;
    debug!("Set blocked mask to {:?}", set);
    Ok(())
}

/// Snapshot of the calling thread's blocked mask.
pub fn current_mask() -> SignalResult<SignalSet> {
    let mut old = MaybeUninit::<libc::sigset_t>::uninit();
    // The `how` argument is ignored when the new set is null; this is a
    // pure query.
    // SAFETY: `old` is written by the kernel before assume_init.
    let rc = unsafe { libc::sigprocmask(libc::SIG_BLOCK, ptr::null(), old.as_mut_ptr()) };
    if rc != 0 {
        return Err(SignalError::Mask { errno: last_errno() });
    }
    let old = unsafe { old.assume_init() };
    Ok(SignalSet::from_os(&old))
}

/// Snapshot of the signals generated but held back by the blocked mask.
pub fn pending() -> SignalResult<SignalSet> {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    // SAFETY: `set` is written by the kernel before assume_init.
    let rc = unsafe { libc::sigpending(set.as_mut_ptr()) };
    if rc != 0 {
        return Err(SignalError::Pending { errno: last_errno() });
    }
    let set = unsafe { set.assume_init() };
    Ok(SignalSet::from_os(&set))
}

/// Atomically replace the blocked mask with `signals` and pause the calling
/// thread until an unblocked signal is delivered; the previous mask is
/// restored on return.
///
/// The swap-and-wait is one kernel operation, so a signal arriving between
/// the mask change and the wait cannot be lost.
pub fn suspend(signals: impl Into<SignalSet>) -> SignalResult<()> {
    let os_set = signals.into().to_os();
    // SAFETY: `os_set` is initialized and outlives the call.
    unsafe { libc::sigsuspend(&os_set) };
    // sigsuspend only ever returns -1; EINTR is the success path.
    let errno = last_errno();
    if errno != libc::EINTR {
        return Err(SignalError::Suspend { errno });
    }
    Ok(())
}
