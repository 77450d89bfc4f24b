//! Facade crate for the toolkit members.
//! Re-exports kernel/utils primitives and the feature-gated infrastructure crates.
//! Keep this crate thin: it should compose other crates, not implement behavior.
//!
//! ## Usage
//! - Add `toolx` with the desired feature flags (`logger`, `http`, `cache`,
//!   `database`, `kafka`, `api`) or `full` for everything.
//! - Check `toolx::features::ENABLED` at runtime to see what was compiled in.

pub use toolx_kernel as kernel;
pub use toolx_utils as utils;

#[cfg(feature = "cache")]
pub use toolx_cache as cache;
#[cfg(feature = "database")]
pub use toolx_database as database;
#[cfg(feature = "http")]
pub use toolx_http as http;
#[cfg(feature = "kafka")]
pub use toolx_kafka as kafka;
#[cfg(feature = "logger")]
pub use toolx_logger as logger;

/// Feature registry for runtime introspection.
pub mod features {
    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "logger")]
        "logger",
        #[cfg(feature = "http")]
        "http",
        #[cfg(feature = "cache")]
        "cache",
        #[cfg(feature = "database")]
        "database",
        #[cfg(feature = "kafka")]
        "kafka",
        #[cfg(feature = "api")]
        "api",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}
