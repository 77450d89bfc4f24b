#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the toolkit crates. The only macro exported
//! today is [`macro@toolx_error`], which turns a plain enum into the error
//! type every `toolx-*` crate uses.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining toolkit error enums.
///
/// Transforms a standard enum into a fully-featured error type wired into
/// `thiserror`, with conversion and context plumbing generated once instead of
/// hand-written per crate.
///
/// # Injected Behaviors
///
/// * **Derives**: adds `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: generates a companion `<ErrorName>Ext` trait adding
///   `.context(...)` to `Result<T, ErrorName>` and to `Result<T, SourceError>`
///   for every variant wrapping an upstream error.
/// * **Standard Conversions**: implements `From<SourceError>` for variants
///   containing a `source` field, enabling `?` on upstream results.
/// * **Internal Fallback**: provides `From<&'static str>` and `From<String>`
///   when an `Internal` variant is present.
/// * **Display Helper**: emits a module-level `format_context` function used
///   by `#[error(...)]` attributes to append ` (context)` when set.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants wrapping external errors must include a `source: T` field or a
///    field marked with `#[source]`/`#[from]` (compatible with `thiserror`),
///    plus a `context: Option<Cow<'static, str>>` field.
/// 3. Tuple and unit variants are rejected to keep error wiring explicit.
///
/// # Example
///
/// ```rust,ignore
/// use toolx_derive::toolx_error;
/// use std::borrow::Cow;
///
/// #[toolx_error]
/// pub enum CacheError {
///     #[error("Redis error{}: {source}", format_context(.context))]
///     Redis {
///         #[source]
///         source: redis::RedisError,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn warm_up(cache: &Cache) -> Result<(), CacheError> {
///     cache.ping().context("Warming up the cache")?;
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn toolx_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
