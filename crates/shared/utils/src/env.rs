//! Environment variable access.

/// Value of `key`, or `default` when the variable is unset or not unicode.
#[must_use]
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
