/// Stream key generator tests.

mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use common::*;
use identity_core::{IdentityError, Provider, StreamKeyGenerator};
use uuid::Uuid;

#[tokio::test]
async fn regeneration_overwrites_with_a_distinct_key() {
    // GIVEN: A user without a stream key
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    assert_eq!(user.stream_key, None);
    let generator = StreamKeyGenerator::new(store.clone());

    // WHEN: A key is generated twice
    let first = generator.generate(user.id).await.expect("first key");
    let second = generator.generate(user.id).await.expect("second key");

    // THEN: Each call persists a fresh value
    let first_key = first.stream_key.expect("key persisted");
    let second_key = second.stream_key.expect("key persisted");
    assert_ne!(first_key, second_key);

    // AND: The stored user reflects the latest one
    let fresh = store
        .find_user(user.id)
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(fresh.stream_key.as_deref(), Some(second_key.as_str()));
}

#[tokio::test]
async fn stored_key_is_a_hashed_digest_not_raw_bytes() {
    // GIVEN: A user
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    let generator = StreamKeyGenerator::new(store.clone());

    // WHEN: A key is generated
    let user = generator.generate(user.id).await.expect("key");
    let key = user.stream_key.expect("key persisted");

    // THEN: The stored value is a URL-safe, padding-free SHA-256 digest;
    // 32 random bytes would decode to themselves, a digest cannot
    assert_eq!(key.len(), 43);
    assert!(!key.contains('='));
    assert!(!key.contains('+'));
    assert!(!key.contains('/'));
    let decoded = URL_SAFE_NO_PAD.decode(&key).expect("valid encoding");
    assert_eq!(decoded.len(), 32);
}

#[tokio::test]
async fn generating_for_unknown_user_is_not_found() {
    // GIVEN: An empty store
    let store = memory_store();
    let generator = StreamKeyGenerator::new(store);

    // WHEN/THEN: Generation for a random id surfaces NotFound
    let result = generator.generate(Uuid::new_v4()).await;
    assert!(matches!(result, Err(IdentityError::NotFound(_))));
}
