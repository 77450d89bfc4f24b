//! Human-readable byte size formatting.

const KB: i64 = 1024;
const MB: i64 = KB * 1024;
const GB: i64 = MB * 1024;
const TB: i64 = GB * 1024;

/// Formats a byte count with two decimals and the largest fitting unit.
/// Sizes below one megabyte always render in KB.
///
/// ```rust
/// assert_eq!(toolx_utils::bytesize::kb_size(512), "0.50 KB");
/// assert_eq!(toolx_utils::bytesize::kb_size(5 * 1024 * 1024), "5.00 MB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn kb_size(size: i64) -> String {
    let (unit, conversion) = match size {
        s if s < MB => ("KB", KB),
        s if s < GB => ("MB", MB),
        s if s < TB => ("GB", GB),
        _ => ("TB", TB),
    };

    format!("{:.2} {unit}", size as f64 / conversion as f64)
}
