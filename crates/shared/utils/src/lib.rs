//! Small helpers shared across the toolkit crates.
//!
//! Each module is independent; import what you need:
//! ```rust
//! let unique = toolx_utils::collection::dedup(&["a", "b", "a"]);
//! assert_eq!(unique, vec!["a", "b"]);
//!
//! assert_eq!(toolx_utils::bytesize::kb_size(1_536), "1.50 KB");
//! ```

pub mod bytesize;
pub mod collection;
pub mod defaults;
pub mod encode;
pub mod env;
mod error;
pub mod fs;
pub mod hash;
pub mod id;
pub mod string;
pub mod time;

pub use error::{UtilsError, UtilsErrorExt};
