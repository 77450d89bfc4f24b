use toolx_kernel::server::validate;

#[test]
fn not_blank_rejects_whitespace() {
    assert!(validate::not_blank("name", "toolx").is_ok());
    let err = validate::not_blank("name", "   ").expect_err("blank");
    assert!(err.to_string().contains("name must not be blank"));
}

#[test]
fn length_between_counts_characters() {
    assert!(validate::length_between("tag", "abc", 1, 3).is_ok());
    assert!(validate::length_between("tag", "héllo", 5, 5).is_ok());
    assert!(validate::length_between("tag", "", 1, 3).is_err());
    let err = validate::length_between("tag", "abcd", 1, 3).expect_err("too long");
    assert!(err.to_string().contains("between 1 and 3"));
}

#[test]
fn trimmed_returns_a_copy() {
    assert_eq!(validate::trimmed("  a b  "), "a b");
    assert_eq!(validate::trimmed(""), "");
}

#[test]
fn is_datetime_accepts_the_toolkit_format_and_empty() {
    assert!(validate::is_datetime("start", "").is_ok());
    assert!(validate::is_datetime("start", "2024-03-01 12:30:00").is_ok());
    assert!(validate::is_datetime("start", "2024-03-01").is_err());
    assert!(validate::is_datetime("start", "12:30:00").is_err());
}

#[test]
fn datetime_to_unix_passes_empty_through() {
    assert_eq!(validate::datetime_to_unix("start", "  ").expect("empty"), None);
    assert_eq!(
        validate::datetime_to_unix("start", "2024-03-01T12:00:00+00:00").expect("rfc3339"),
        Some(1_709_294_400)
    );
    assert!(validate::datetime_to_unix("start", "2024-03-01 12:00:00").expect("datetime").is_some());
    assert!(validate::datetime_to_unix("start", "soon").is_err());
}
