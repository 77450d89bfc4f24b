use serde::{Deserialize, Serialize};
use toolx_utils::{UtilsError, encode, hash};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    name: String,
    count: u32,
}

#[test]
fn sha256_matches_known_vector() {
    assert_eq!(
        hash::sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        hash::sha256_hex(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

// RFC 4231 test case 2.
#[test]
fn hmac_sha256_matches_known_vector() {
    let key = b"Jefe";
    let message = b"what do ya want for nothing?";
    assert_eq!(
        hash::hmac_sha256_hex(key, message),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
    assert_eq!(
        hash::hmac_sha256_base64(key, message),
        "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
    );
}

#[test]
fn base64_round_trip_and_decode_error() {
    let encoded = encode::base64_encode(b"toolx");
    assert_eq!(encoded, "dG9vbHg=");
    assert_eq!(encode::base64_decode(&encoded).expect("decode"), b"toolx");

    let err = encode::base64_decode("not base64!!").expect_err("invalid input");
    assert!(matches!(err, UtilsError::Base64 { .. }));
}

#[test]
fn file_to_base64_reads_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("blob.bin");
    std::fs::write(&path, b"\x00\x01binary").expect("write blob");

    let encoded = encode::file_to_base64(&path).expect("encode file");
    assert_eq!(encode::base64_decode(&encoded).expect("decode"), b"\x00\x01binary");

    let err = encode::file_to_base64(dir.path().join("missing")).expect_err("missing file");
    assert!(err.to_string().contains("missing"));
}

#[test]
fn gzip_json_round_trip() {
    let payload = Payload { name: "toolx".into(), count: 7 };
    let packed = encode::gzip_json(&payload).expect("pack");
    // Compressed output is base64 text, safe to embed anywhere.
    assert!(packed.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)));

    let unpacked: Payload = encode::gunzip_json(&packed).expect("unpack");
    assert_eq!(unpacked, payload);
}

#[test]
fn json_string_helpers() {
    let payload = Payload { name: "x".into(), count: 1 };
    let text = encode::to_json_string(&payload).expect("serialize");
    assert_eq!(text, r#"{"name":"x","count":1}"#);

    let parsed: Payload = encode::from_json_str(&text).expect("parse");
    assert_eq!(parsed, payload);

    let err = encode::from_json_str::<Payload>("{broken").expect_err("invalid json");
    assert!(matches!(err, UtilsError::Json { .. }));
}
