use std::borrow::Cow;
use toolx_utils::time;

#[toolx_derive::toolx_error]
pub enum ValidateError {
    #[error("validation error{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Rejects empty or whitespace-only values.
pub fn not_blank(field: &str, value: &str) -> Result<(), ValidateError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Rejects values whose character count lies outside `min..=max`.
pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidateError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(invalid(format!("{field} length must be between {min} and {max}, got {len}")));
    }
    Ok(())
}

/// Trimmed copy of `value`.
#[must_use]
pub fn trimmed(value: &str) -> String {
    value.trim().to_owned()
}

/// Accepts `%Y-%m-%d %H:%M:%S` timestamps; the empty string passes.
pub fn is_datetime(field: &str, value: &str) -> Result<(), ValidateError> {
    if value.is_empty() {
        return Ok(());
    }
    time::parse_ts(value).map(|_| ()).map_err(|err| invalid(format!("{field}: {err}")))
}

/// Parses a flexible-format timestamp to unix seconds; the empty string passes
/// through as `None`.
pub fn datetime_to_unix(field: &str, value: &str) -> Result<Option<i64>, ValidateError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    time::parse_ts_any(value).map(Some).map_err(|err| invalid(format!("{field}: {err}")))
}

fn invalid(message: String) -> ValidateError {
    ValidateError::Invalid { message: message.into(), context: None }
}
