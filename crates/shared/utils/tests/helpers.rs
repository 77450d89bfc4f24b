use toolx_utils::{bytesize, collection, env, fs, id};

#[test]
fn dedup_keeps_first_occurrence() {
    assert_eq!(collection::dedup(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    assert_eq!(collection::dedup(&["a", "b", "a"]), vec!["a", "b"]);
    assert!(collection::dedup::<i32>(&[]).is_empty());
}

#[test]
fn remove_drops_every_occurrence() {
    assert_eq!(collection::remove(&[1, 2, 1, 3], &1), vec![2, 3]);
    assert_eq!(collection::remove(&[1, 2], &9), vec![1, 2]);
}

#[test]
fn set_operations_preserve_left_order() {
    let a = ["x", "y", "z"];
    let b = ["z", "w", "x"];
    assert_eq!(collection::difference(&a, &b), vec!["y"]);
    assert_eq!(collection::intersection(&a, &b), vec!["x", "z"]);
    assert_eq!(collection::union_of(&a, &b), vec!["x", "y", "z", "w"]);
    assert!(collection::contains(&a, &"y"));
    assert!(!collection::contains(&a, &"w"));
}

#[test]
fn byte_sizes_pick_the_largest_fitting_unit() {
    assert_eq!(bytesize::kb_size(0), "0.00 KB");
    assert_eq!(bytesize::kb_size(1024), "1.00 KB");
    assert_eq!(bytesize::kb_size(1_536), "1.50 KB");
    assert_eq!(bytesize::kb_size(1024 * 1024), "1.00 MB");
    assert_eq!(bytesize::kb_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    assert_eq!(bytesize::kb_size(2 * 1024 * 1024 * 1024 * 1024), "2.00 TB");
}

#[test]
fn env_or_falls_back_when_unset() {
    assert_eq!(env::env_or("TOOLX_TEST_SURELY_UNSET_VARIABLE", "fallback"), "fallback");
    // PATH is always present in a test environment.
    assert_ne!(env::env_or("PATH", "fallback"), "fallback");
}

#[test]
fn uuid_is_hyphenated_v4() {
    let value = id::uuid();
    assert_eq!(value.len(), 36);
    assert_eq!(value.matches('-').count(), 4);
    assert_ne!(value, id::uuid());
}

#[test]
fn exists_and_executable_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("probe.txt");
    assert!(!fs::exists(&file));
    std::fs::write(&file, b"x").expect("write probe");
    assert!(fs::exists(&file));

    let exe_dir = fs::executable_dir().expect("executable dir");
    assert!(exe_dir.is_dir());
}
