//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → RouteTable + Upstreams → PrefixRouter
//!
//! On change:
//!     watcher.rs detects change, waits for writes to settle
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → SharedRouter::reload (atomic swap)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - Everything except `[prefix_routes]` has a default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_router, load_config, parse_config, ConfigError};
pub use schema::{
    CatchAllRouteConfig, MirrorPolicyConfig, ObservabilityConfig, PrefixRouteConfig,
    PrefixRoutesConfig, RouterConfig, UpstreamConfig,
};
