use std::sync::Arc;
use std::time::Duration;

use toolx_cache::{Cache, CacheError, CacheExt, MemoryCache};

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Session {
    user: String,
    visits: u32,
}

#[tokio::test]
async fn works_through_a_trait_object() {
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());

    cache.set("token", "abc", None).await.expect("set");
    assert_eq!(cache.get("token").await.expect("get"), Some("abc".to_owned()));
    assert_eq!(cache.incr_by("hits", 2).await.expect("incr"), 2);
    assert!(cache.del("token").await.expect("del"));
    assert!(!cache.exists("token").await.expect("exists"));
}

#[tokio::test]
async fn json_helpers_round_trip() {
    let cache = MemoryCache::new();
    let session = Session { user: "alice".to_owned(), visits: 3 };

    cache.set_json("session:1", &session, Some(Duration::from_secs(60))).await.expect("set_json");
    let loaded: Option<Session> = cache.get_json("session:1").await.expect("get_json");
    assert_eq!(loaded, Some(session));

    let missing: Option<Session> = cache.get_json("session:2").await.expect("missing key");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn json_helpers_surface_decode_errors() {
    let cache = MemoryCache::new();
    cache.set("broken", "not json", None).await.expect("set");

    let err = cache.get_json::<Session>("broken").await.expect_err("decode fails");
    assert!(matches!(err, CacheError::Serde { .. }));
}
