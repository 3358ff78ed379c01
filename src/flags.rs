/*!
 * Handler Flags
 * sigaction installation flags
 */

use bitflags::bitflags;
use libc::c_int;

bitflags! {
    /// Flags applied when installing a signal handler, mirroring the `SA_*`
    /// constants accepted by `sigaction(2)`. Passed through to the OS
    /// verbatim.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct HandlerFlags: c_int {
        /// Generate SIGCHLD only when a child exits, not when it stops
        const NO_CHILD_STOP = libc::SA_NOCLDSTOP;
        /// Do not create zombie processes when children of the calling process exit
        const NO_CHILD_WAIT = libc::SA_NOCLDWAIT;
        /// Deliver the signal on the alternate stack installed with sigaltstack(2)
        const ON_STACK = libc::SA_ONSTACK;
        /// Do not mask the delivered signal from itself while its handler runs
        const NO_DEFER = libc::SA_NODEFER;
        /// Reset the disposition to default at the moment of delivery
        const RESET_HANDLER = libc::SA_RESETHAND;
        /// Restart interruptible system calls instead of failing with EINTR
        const RESTART = libc::SA_RESTART;
        /// Request the extended siginfo handler prototype
        const INFO = libc::SA_SIGINFO;
    }
}
