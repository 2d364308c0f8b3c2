/// Token refresher tests: always-refresh reads, atomic pair writes, and the
/// stale-refresh-token race.

mod common;

use common::*;
use identity_core::error::RefreshError;
use identity_core::{IdentityError, Provider, ProviderRegistry, TokenRefresher};
use std::sync::Arc;

fn registry_with_google(
    client: Arc<dyn identity_core::ProviderClient>,
) -> ProviderRegistry {
    let mut registry = ProviderRegistry::default();
    registry.insert(Provider::Google, client);
    registry
}

#[tokio::test]
async fn get_live_token_refreshes_then_persists_the_pair() {
    // GIVEN: A google credential storing refresh token R1, and a provider
    // that answers R1 with {T2, R2}
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    let client = Arc::new(RotatingProviderClient::new(
        "R1",
        vec![token_pair("T2", Some("R2"))],
    ));
    let refresher = TokenRefresher::new(store.clone(), registry_with_google(client));

    // WHEN: A live token is requested
    let token = refresher
        .get_live_token(user.id, Provider::Google)
        .await
        .expect("refresh should succeed");

    // THEN: The fresh access token is returned and BOTH fields were written
    // together; the store never holds T2 next to R1
    assert_eq!(token.as_deref(), Some("T2"));
    let credential = store
        .find_credential(user.id, Provider::Google)
        .await
        .expect("lookup")
        .expect("credential exists");
    assert_eq!(credential.provider_token, "T2");
    assert_eq!(credential.provider_refresh_token.as_deref(), Some("R2"));
}

#[tokio::test]
async fn stale_refresh_token_fails_cleanly_without_writing() {
    // GIVEN: A provider that already rotated R1 away (a concurrent refresh
    // won the race), while the caller still reads R1 from the store
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    let client = Arc::new(RotatingProviderClient::new(
        "R2",
        vec![token_pair("T3", Some("R3"))],
    ));
    let refresher = TokenRefresher::new(store.clone(), registry_with_google(client));

    // WHEN: The loser attempts its refresh with the stale R1
    let result = refresher.get_live_token(user.id, Provider::Google).await;

    // THEN: It fails with ProviderRefresh, never silently succeeding with
    // R1, and the stored pair is untouched
    assert!(matches!(
        result,
        Err(IdentityError::ProviderRefresh(
            RefreshError::ProviderRejected(_)
        ))
    ));
    let credential = store
        .find_credential(user.id, Provider::Google)
        .await
        .expect("lookup")
        .expect("credential exists");
    assert_eq!(credential.provider_token, "T1");
    assert_eq!(credential.provider_refresh_token.as_deref(), Some("R1"));
}

#[tokio::test]
async fn missing_credential_yields_no_token() {
    // GIVEN: A user with no google credential
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Github,
        token_pair("T1", None),
    )
    .await;
    let client = Arc::new(RotatingProviderClient::new("R1", vec![]));
    let refresher = TokenRefresher::new(store.clone(), registry_with_google(client));

    // WHEN/THEN: Asking for a google token is None, not an error
    let token = refresher
        .get_live_token(user.id, Provider::Google)
        .await
        .expect("lookup should succeed");
    assert_eq!(token, None);
}

#[tokio::test]
async fn credential_without_refresh_token_cannot_be_refreshed() {
    // GIVEN: A google credential that never stored a refresh token
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", None),
    )
    .await;
    let client = Arc::new(RotatingProviderClient::new("R1", vec![]));
    let refresher = TokenRefresher::new(store.clone(), registry_with_google(client));

    // WHEN/THEN: There is nothing to exchange, so no live token is available
    let result = refresher.get_live_token(user.id, Provider::Google).await;
    assert!(matches!(
        result,
        Err(IdentityError::ProviderRefresh(_))
    ));
}

#[tokio::test]
async fn stable_refresh_token_is_retained_on_rotation() {
    // GIVEN: A provider (google-style) that omits the refresh token from a
    // successful exchange
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    let client = Arc::new(RotatingProviderClient::new(
        "R1",
        vec![token_pair("T2", None)],
    ));
    let refresher = TokenRefresher::new(store.clone(), registry_with_google(client));

    // WHEN: The token is refreshed
    let token = refresher
        .get_live_token(user.id, Provider::Google)
        .await
        .expect("refresh should succeed");

    // THEN: The access token rotates while the still-valid refresh token is
    // kept, written in the same atomic update
    assert_eq!(token.as_deref(), Some("T2"));
    let credential = store
        .find_credential(user.id, Provider::Google)
        .await
        .expect("lookup")
        .expect("credential exists");
    assert_eq!(credential.provider_token, "T2");
    assert_eq!(credential.provider_refresh_token.as_deref(), Some("R1"));
}

#[tokio::test]
async fn network_failure_surfaces_and_leaves_store_untouched() {
    // GIVEN: An unreachable provider
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Google,
        token_pair("T1", Some("R1")),
    )
    .await;
    let refresher = TokenRefresher::new(
        store.clone(),
        registry_with_google(Arc::new(UnreachableProviderClient)),
    );

    // WHEN/THEN: The failure degrades to "no live token", and nothing was
    // written
    let result = refresher.get_live_token(user.id, Provider::Google).await;
    assert!(matches!(
        result,
        Err(IdentityError::ProviderRefresh(RefreshError::Network(_)))
    ));
    let credential = store
        .find_credential(user.id, Provider::Google)
        .await
        .expect("lookup")
        .expect("credential exists");
    assert_eq!(credential.provider_token, "T1");
}

#[tokio::test]
async fn unconfigured_provider_is_a_config_error() {
    // GIVEN: A registry with no restream client
    let store = memory_store();
    let user = seed_user(
        &store,
        ALICE_EMAIL,
        ALICE_HANDLE,
        Provider::Restream,
        token_pair("T1", Some("R1")),
    )
    .await;
    let refresher = TokenRefresher::new(store.clone(), ProviderRegistry::default());

    // WHEN/THEN: The gap is reported as configuration, not a refresh failure
    let result = refresher.get_live_token(user.id, Provider::Restream).await;
    assert!(matches!(result, Err(IdentityError::Config(_))));
}
