//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build router → Publish in SharedRouter
//!
//! Reload (reload.rs):
//!     watcher update → rebuild → atomic swap (old kept on failure)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → trigger → background loops exit
//!     (stdin is read on its own thread, see input.rs)
//! ```

pub mod input;
pub mod reload;
pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
