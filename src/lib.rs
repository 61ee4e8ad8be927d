//! Prefix-based key router for key-value protocol proxies.
//!
//! Given the key of an inbound command, pick the upstream connection pool
//! whose configured prefix is the longest match, optionally stripping that
//! prefix, and fall back to a catch-all cluster when nothing matches.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::RouterConfig;
pub use routing::{PrefixRouter, RouteOutcome, RouteTable, RouteTableError, SharedRouter};
pub use upstream::{ConnectionPool, PoolHandle, Upstreams};
