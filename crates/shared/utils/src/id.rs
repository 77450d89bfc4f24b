//! Identifier generation.

/// Hyphenated v4 UUID.
#[must_use]
pub fn uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
