//! Role cache against the gateway's own role passthrough.

use std::sync::Arc;

use exgen_gateway::role::{
    HttpRoleFetcher, MemoryStore, Requester, RoleCache, RoleError, RoleStore, ROLE_CACHE_KEY,
};

mod common;

fn cache_for(gateway: &common::Gateway, store: Arc<MemoryStore>) -> RoleCache {
    let fetcher = HttpRoleFetcher::new(&gateway.url("")).unwrap();
    RoleCache::new(Arc::new(fetcher), store)
}

#[tokio::test]
async fn test_concurrent_lookups_hit_backend_once() {
    let backend = common::start_echo_backend().await;
    let gateway = common::start_gateway(&backend.url(), |_| {}).await;
    let cache = cache_for(&gateway, Arc::new(MemoryStore::new()));
    let requester = Requester::new("user_alice", "alice");

    let lookups = (0..8).map(|_| {
        let cache = cache.clone();
        let requester = requester.clone();
        tokio::spawn(async move { cache.get_role(Some(&requester)).await })
    });
    let results = futures_util::future::join_all(lookups).await;

    for result in results {
        let role = result.unwrap().unwrap();
        assert!(role.is_admin());
        assert_eq!(role.user_id.as_deref(), Some("user_alice"));
    }
    assert_eq!(backend.role_calls(), 1);

    cache.get_role(Some(&requester)).await.unwrap();
    assert_eq!(backend.role_calls(), 1);
}

#[tokio::test]
async fn test_persisted_role_survives_restart() {
    let backend = common::start_echo_backend().await;
    let gateway = common::start_gateway(&backend.url(), |_| {}).await;
    let store = Arc::new(MemoryStore::new());
    let requester = Requester::new("user_bob", "bob");

    cache_for(&gateway, store.clone())
        .get_role(Some(&requester))
        .await
        .unwrap();
    assert!(store.get(ROLE_CACHE_KEY).unwrap().is_some());

    let restarted = cache_for(&gateway, store.clone());
    assert_eq!(restarted.load().as_deref(), Some("user_bob"));
    restarted.get_role(Some(&requester)).await.unwrap();
    assert_eq!(backend.role_calls(), 1);

    restarted.forget_role("user_bob");
    assert!(store.get(ROLE_CACHE_KEY).unwrap().is_none());
    restarted.get_role(Some(&requester)).await.unwrap();
    assert_eq!(backend.role_calls(), 2);
}

#[tokio::test]
async fn test_rejected_token_is_not_cached() {
    let backend = common::start_echo_backend().await;
    let gateway = common::start_gateway(&backend.url(), |_| {}).await;
    let store = Arc::new(MemoryStore::new());
    let cache = cache_for(&gateway, store.clone());
    let requester = Requester::new("user_eve", "expired");

    assert_eq!(cache.get_role(Some(&requester)).await, Err(RoleError::Status(401)));
    assert_eq!(cache.get_role(Some(&requester)).await, Err(RoleError::Status(401)));
    assert_eq!(backend.role_calls(), 2);
    assert!(store.get(ROLE_CACHE_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_no_requester_makes_no_call() {
    let backend = common::start_echo_backend().await;
    let gateway = common::start_gateway(&backend.url(), |_| {}).await;
    let cache = cache_for(&gateway, Arc::new(MemoryStore::new()));

    let role = cache.get_role(None).await.unwrap();
    assert!(!role.has_role());
    assert_eq!(backend.role_calls(), 0);
}
