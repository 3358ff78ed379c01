/*!
 * Signal Types
 * Signal identity, default dispositions, and result types
 */

use libc::c_int;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors
///
/// Requests the kernel refuses by policy (catching SIGKILL, blocking SIGSTOP)
/// are not errors; those entry points no-op instead. Errors here mean an OS
/// call reported failure and carry the raw errno.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalError {
    #[error("failed to install handler for {signal}: {}", errno_message(*errno))]
    Install { signal: Signal, errno: i32 },

    #[error("failed to change disposition of {signal}: {}", errno_message(*errno))]
    Disposition { signal: Signal, errno: i32 },

    #[error("failed to update blocked-signal mask: {}", errno_message(*errno))]
    Mask { errno: i32 },

    #[error("failed to read pending signals: {}", errno_message(*errno))]
    Pending { errno: i32 },

    #[error("failed to raise {signal}: {}", errno_message(*errno))]
    Raise { signal: Signal, errno: i32 },

    #[error("sigsuspend failed: {}", errno_message(*errno))]
    Suspend { errno: i32 },
}

fn errno_message(errno: i32) -> String {
    std::io::Error::from_raw_os_error(errno).to_string()
}

/// The action the OS takes when a signal is delivered and no handler or
/// ignore disposition is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultAction {
    /// Abnormal termination of the process
    Terminate,
    /// Abnormal termination, creating a core image if the OS supports it
    CoreDump,
    /// Stop (not terminate) the process
    Stop,
    /// Discard the signal
    Discard,
    /// Continue the process if it is stopped, otherwise discard
    Continue,
}

/// Signals defined in the platform's `signal.h`.
///
/// Raw codes come from `libc` and are not portable in value across operating
/// systems. Variant order matches the rows of the platform signal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Hangup detected on controlling terminal or death of controlling process
    SIGHUP,
    /// Interrupt from keyboard (Ctrl+C)
    SIGINT,
    /// Quit from keyboard (Ctrl+\)
    SIGQUIT,
    /// Illegal instruction
    SIGILL,
    /// Trace/breakpoint trap
    SIGTRAP,
    /// Abort signal
    SIGABRT,
    /// Bus error (bad memory access)
    SIGBUS,
    /// Floating-point exception
    SIGFPE,
    /// Kill signal (cannot be caught or ignored)
    SIGKILL,
    /// User-defined signal 1
    SIGUSR1,
    /// Invalid memory reference
    SIGSEGV,
    /// User-defined signal 2
    SIGUSR2,
    /// Write on a pipe with no reader
    SIGPIPE,
    /// Real-time timer expired
    SIGALRM,
    /// Termination signal
    SIGTERM,
    /// Child process stopped or terminated
    SIGCHLD,
    /// Continue if stopped
    SIGCONT,
    /// Stop process (cannot be caught or ignored)
    SIGSTOP,
    /// Stop typed at terminal (Ctrl+Z)
    SIGTSTP,
    /// Terminal input for background process
    SIGTTIN,
    /// Terminal output for background process
    SIGTTOU,
    /// Urgent condition on socket
    SIGURG,
    /// CPU time limit exceeded
    SIGXCPU,
    /// File size limit exceeded
    SIGXFSZ,
    /// Virtual alarm clock
    SIGVTALRM,
    /// Profiling timer expired
    SIGPROF,
    /// Window resize signal
    SIGWINCH,
    /// I/O now possible on a descriptor
    SIGIO,
    /// Bad system call
    SIGSYS,
    /// Coprocessor stack fault
    #[cfg(target_os = "linux")]
    SIGSTKFLT,
    /// Power failure
    #[cfg(target_os = "linux")]
    SIGPWR,
    /// Emulated instruction executed
    #[cfg(target_vendor = "apple")]
    SIGEMT,
    /// Status request from keyboard
    #[cfg(target_vendor = "apple")]
    SIGINFO,
}

/// One row of the platform signal table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SignalInfo {
    pub(crate) signal: Signal,
    pub(crate) raw: c_int,
    pub(crate) default_action: DefaultAction,
    pub(crate) description: &'static str,
    pub(crate) catchable: bool,
    pub(crate) ignorable: bool,
}

const fn entry(
    signal: Signal,
    raw: c_int,
    default_action: DefaultAction,
    description: &'static str,
) -> SignalInfo {
    // The kernel refuses to let user code override these two dispositions.
    let protected = matches!(signal, Signal::SIGKILL | Signal::SIGSTOP);
    SignalInfo {
        signal,
        raw,
        default_action,
        description,
        catchable: !protected,
        ignorable: !protected,
    }
}

/// Rows for the signals available on every supported platform.
const COMMON_SIGNALS: [SignalInfo; 29] = [
    entry(Signal::SIGHUP, libc::SIGHUP, DefaultAction::Terminate, "Hangup"),
    entry(Signal::SIGINT, libc::SIGINT, DefaultAction::Terminate, "Interrupt"),
    entry(Signal::SIGQUIT, libc::SIGQUIT, DefaultAction::CoreDump, "Quit"),
    entry(Signal::SIGILL, libc::SIGILL, DefaultAction::CoreDump, "Illegal instruction"),
    entry(Signal::SIGTRAP, libc::SIGTRAP, DefaultAction::CoreDump, "Trace/breakpoint trap"),
    entry(Signal::SIGABRT, libc::SIGABRT, DefaultAction::CoreDump, "Aborted"),
    entry(Signal::SIGBUS, libc::SIGBUS, DefaultAction::CoreDump, "Bus error"),
    entry(Signal::SIGFPE, libc::SIGFPE, DefaultAction::CoreDump, "Floating point exception"),
    entry(Signal::SIGKILL, libc::SIGKILL, DefaultAction::Terminate, "Killed"),
    entry(Signal::SIGUSR1, libc::SIGUSR1, DefaultAction::Terminate, "User defined signal 1"),
    entry(Signal::SIGSEGV, libc::SIGSEGV, DefaultAction::CoreDump, "Segmentation fault"),
    entry(Signal::SIGUSR2, libc::SIGUSR2, DefaultAction::Terminate, "User defined signal 2"),
    entry(Signal::SIGPIPE, libc::SIGPIPE, DefaultAction::Terminate, "Broken pipe"),
    entry(Signal::SIGALRM, libc::SIGALRM, DefaultAction::Terminate, "Alarm clock"),
    entry(Signal::SIGTERM, libc::SIGTERM, DefaultAction::Terminate, "Terminated"),
    entry(Signal::SIGCHLD, libc::SIGCHLD, DefaultAction::Discard, "Child status changed"),
    entry(Signal::SIGCONT, libc::SIGCONT, DefaultAction::Continue, "Continued"),
    entry(Signal::SIGSTOP, libc::SIGSTOP, DefaultAction::Stop, "Stopped (signal)"),
    entry(Signal::SIGTSTP, libc::SIGTSTP, DefaultAction::Stop, "Stopped"),
    entry(Signal::SIGTTIN, libc::SIGTTIN, DefaultAction::Stop, "Stopped (tty input)"),
    entry(Signal::SIGTTOU, libc::SIGTTOU, DefaultAction::Stop, "Stopped (tty output)"),
    entry(Signal::SIGURG, libc::SIGURG, DefaultAction::Discard, "Urgent I/O condition"),
    entry(Signal::SIGXCPU, libc::SIGXCPU, DefaultAction::Terminate, "CPU time limit exceeded"),
    entry(Signal::SIGXFSZ, libc::SIGXFSZ, DefaultAction::Terminate, "File size limit exceeded"),
    entry(Signal::SIGVTALRM, libc::SIGVTALRM, DefaultAction::Terminate, "Virtual timer expired"),
    entry(Signal::SIGPROF, libc::SIGPROF, DefaultAction::Terminate, "Profiling timer expired"),
    entry(Signal::SIGWINCH, libc::SIGWINCH, DefaultAction::Discard, "Window size changed"),
    entry(
        Signal::SIGIO,
        libc::SIGIO,
        // BSD-derived kernels discard SIGIO; Linux terminates.
        if cfg!(target_os = "linux") { DefaultAction::Terminate } else { DefaultAction::Discard },
        "I/O possible",
    ),
    entry(Signal::SIGSYS, libc::SIGSYS, DefaultAction::CoreDump, "Bad system call"),
];

/// Platform-specific rows. With them each supported platform's table covers
/// raw codes 1..=31 contiguously.
#[cfg(target_os = "linux")]
const PLATFORM_SIGNALS: [SignalInfo; 2] = [
    entry(Signal::SIGSTKFLT, libc::SIGSTKFLT, DefaultAction::Terminate, "Stack fault"),
    entry(Signal::SIGPWR, libc::SIGPWR, DefaultAction::Terminate, "Power failure"),
];

#[cfg(target_vendor = "apple")]
const PLATFORM_SIGNALS: [SignalInfo; 2] = [
    entry(Signal::SIGEMT, libc::SIGEMT, DefaultAction::CoreDump, "EMT trap"),
    entry(Signal::SIGINFO, libc::SIGINFO, DefaultAction::Discard, "Information request"),
];

#[cfg(not(any(target_os = "linux", target_vendor = "apple")))]
const PLATFORM_SIGNALS: [SignalInfo; 0] = [];

pub(crate) const SIGNAL_COUNT: usize = COMMON_SIGNALS.len() + PLATFORM_SIGNALS.len();

const fn build_table() -> [SignalInfo; SIGNAL_COUNT] {
    let mut table = [COMMON_SIGNALS[0]; SIGNAL_COUNT];
    let mut i = 0;
    while i < COMMON_SIGNALS.len() {
        table[i] = COMMON_SIGNALS[i];
        i += 1;
    }
    let mut j = 0;
    while j < PLATFORM_SIGNALS.len() {
        table[i + j] = PLATFORM_SIGNALS[j];
        j += 1;
    }
    table
}

/// Per-platform signal table: raw code, default disposition, catch/ignore
/// policy. Row order matches `Signal`'s variant order.
pub(crate) const SIGNAL_TABLE: [SignalInfo; SIGNAL_COUNT] = build_table();

impl Signal {
    /// Number of signals in the platform table.
    pub(crate) const COUNT: usize = SIGNAL_COUNT;

    /// Every signal supported on this platform, in table order.
    pub fn all() -> impl Iterator<Item = Signal> {
        SIGNAL_TABLE.iter().map(|info| info.signal)
    }

    /// Convert from a raw signal number. Unknown codes yield `None`.
    pub fn from_raw(code: c_int) -> Option<Self> {
        SIGNAL_TABLE.iter().find(|info| info.raw == code).map(|info| info.signal)
    }

    /// The platform's raw code for this signal.
    #[inline]
    pub const fn as_raw(self) -> c_int {
        SIGNAL_TABLE[self as usize].raw
    }

    /// Dense index into the platform table.
    #[inline]
    pub(crate) const fn ordinal(self) -> usize {
        self as usize
    }

    #[inline]
    fn info(self) -> &'static SignalInfo {
        &SIGNAL_TABLE[self as usize]
    }

    /// The action taken when this signal is delivered with default disposition.
    #[inline]
    pub fn default_action(self) -> DefaultAction {
        self.info().default_action
    }

    /// Whether a handler can catch this signal.
    ///
    /// `false` only for SIGKILL and SIGSTOP.
    #[inline]
    pub fn can_be_caught(self) -> bool {
        self.info().catchable
    }

    /// Whether this signal can be ignored or blocked.
    ///
    /// `false` only for SIGKILL and SIGSTOP.
    #[inline]
    pub fn can_be_ignored(self) -> bool {
        self.info().ignorable
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        self.info().description
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_align_with_variant_ordinals() {
        for (index, info) in SIGNAL_TABLE.iter().enumerate() {
            assert_eq!(info.signal.ordinal(), index);
        }
    }

    #[test]
    fn raw_codes_are_unique() {
        for a in SIGNAL_TABLE.iter() {
            let occurrences = SIGNAL_TABLE.iter().filter(|b| b.raw == a.raw).count();
            assert_eq!(occurrences, 1, "duplicate raw code {}", a.raw);
        }
    }

    #[test]
    fn protected_flags_cover_exactly_kill_and_stop() {
        for info in SIGNAL_TABLE.iter() {
            let protected = matches!(info.signal, Signal::SIGKILL | Signal::SIGSTOP);
            assert_eq!(info.catchable, !protected);
            assert_eq!(info.ignorable, !protected);
        }
    }
}
