//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at load / reload):
//!     PrefixRoutesConfig
//!     → table.rs (normalize prefixes, reject duplicates)
//!     → trie.rs (byte-wise prefix index)
//!     → router.rs (bind to Upstreams)
//!     → shared.rs (atomic publish)
//!
//! Per command:
//!     key
//!     → router.rs (longest-prefix lookup, optional prefix strip)
//!     → Upstreams (cluster → pool handle)
//!     → Return: Matched / CatchAll / NoRoute
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - Longest prefix wins; declaration order never matters for lookup
//! - Deterministic: same table and key always give the same outcome

pub mod commands;
pub mod route;
pub mod router;
pub mod shared;
pub mod table;
pub mod trie;

pub use route::{MirrorPolicy, Route};
pub use router::{Dispatch, NoUpstream, PrefixRouter, RouteOutcome, Target};
pub use shared::SharedRouter;
pub use table::{RouteTable, RouteTableError};
