/*!
 * sigmux
 * Typed POSIX signal dispatch: signal identity, signal sets, and handler
 * multiplexing through a single delivery trampoline
 */

pub mod dispatch;
pub mod flags;
mod registry;
pub mod set;
pub mod types;

// Re-export public API
pub use dispatch::{
    block, current_mask, handle, handle_set, handle_with, has_handler, ignore, mask, pending,
    raise, restore_default_action, suspend, unblock, unblock_all,
};
pub use flags::HandlerFlags;
pub use registry::HandlerFn;
pub use set::SignalSet;
pub use types::{DefaultAction, Signal, SignalError, SignalResult};
