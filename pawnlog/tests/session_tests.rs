mod common;

use common::{harness, login_json, user_json};
use httpmock::prelude::*;
use secrecy::ExposeSecret;
use serde_json::json;

#[tokio::test]
async fn fetch_user_without_token_makes_no_network_call() {
    let h = harness().await;
    let profile = h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("testuser"));
    });

    let mut session = h.session().await;
    session.fetch_user().await;

    assert_eq!(profile.hits(), 0);
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
}

#[tokio::test]
async fn login_sets_token_and_fetches_profile() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST)
            .path("/auth/callback")
            .json_body(json!({"code": "abc", "state": "xyz"}));
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    h.server.mock(|when, then| {
        when.method(GET)
            .path("/users/me")
            .header("authorization", "Bearer jwt-1");
        then.status(200).json_body(user_json("testuser"));
    });

    let mut session = h.session().await;
    session.login("abc", "xyz").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().username, "testuser");
    assert_eq!(h.api.token().unwrap().expose_secret(), "jwt-1");
    assert!(session.error().is_none());
    assert!(!session.state().is_loading);
}

#[tokio::test]
async fn login_failure_at_exchange_surfaces_detail_and_reraises() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(400)
            .json_body(json!({"detail": "Invalid or expired state. Please try logging in again."}));
    });

    let mut session = h.session().await;
    let err = session.login("abc", "xyz").await.unwrap_err();

    assert!(err.detail().is_some());
    assert_eq!(
        session.error(),
        Some("Invalid or expired state. Please try logging in again.")
    );
    assert!(!session.is_authenticated());
    assert!(!h.api.has_token());
}

#[tokio::test]
async fn login_failure_at_profile_fetch_leaves_token_unset() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(500).body("boom");
    });

    let mut session = h.session().await;
    assert!(session.login("abc", "xyz").await.is_err());

    assert!(!session.is_authenticated());
    assert!(!h.api.has_token());
    assert_eq!(session.error(), Some("Login failed"));
}

#[tokio::test]
async fn logout_clears_local_state_even_when_server_fails() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("testuser"));
    });
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/logout");
        then.status(500).body("unavailable");
    });

    let mut session = h.session().await;
    session.login("abc", "xyz").await.unwrap();
    assert!(session.is_authenticated());

    session.logout().await;

    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(!h.api.has_token());
    assert!(!session.state().is_loading);
}

#[tokio::test]
async fn refresh_failure_keeps_authenticated_state() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("testuser"));
    });
    h.server.mock(|when, then| {
        when.method(POST).path("/users/me/refresh");
        then.status(502)
            .json_body(json!({"detail": "Platform unavailable"}));
    });

    let mut session = h.session().await;
    session.login("abc", "xyz").await.unwrap();

    session.refresh_user().await;

    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().username, "testuser");
    assert_eq!(session.error(), Some("Platform unavailable"));
    assert!(h.api.has_token());
}

#[tokio::test]
async fn refresh_replaces_user_on_success() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "olduser"));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("olduser"));
    });
    let refresh = h.server.mock(|when, then| {
        when.method(POST)
            .path("/users/me/refresh")
            .header("authorization", "Bearer jwt-1");
        then.status(200).json_body(user_json("newuser"));
    });

    let mut session = h.session().await;
    session.login("abc", "xyz").await.unwrap();
    session.refresh_user().await;

    refresh.assert();
    assert_eq!(session.user().unwrap().username, "newuser");
    assert!(session.error().is_none());
}

#[tokio::test]
async fn refresh_is_noop_when_anonymous() {
    let h = harness().await;
    let refresh = h.server.mock(|when, then| {
        when.method(POST).path("/users/me/refresh");
        then.status(200).json_body(user_json("testuser"));
    });

    let mut session = h.session().await;
    session.refresh_user().await;

    assert_eq!(refresh.hits(), 0);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn snapshot_survives_restart_with_fresh_flags() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("testuser"));
    });

    {
        let mut session = h.session().await;
        session.login("abc", "xyz").await.unwrap();
    }

    // A fresh store over the same storage rehydrates user and
    // authenticated flag; loading/error never persist.
    let session = h.session().await;
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().username, "testuser");
    assert!(!session.state().is_loading);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn unauthorized_response_deauthenticates_on_next_sync() {
    let h = harness().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/auth/callback");
        then.status(200).json_body(login_json("jwt-1", "testuser"));
    });
    let profile = h.server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(user_json("testuser"));
    });
    h.server.mock(|when, then| {
        when.method(POST).path("/users/me/refresh");
        then.status(401).json_body(json!({"detail": "Not authenticated"}));
    });

    let mut session = h.session().await;
    session.login("abc", "xyz").await.unwrap();
    assert_eq!(profile.hits(), 1);

    // The 401 clears the credential inside the gateway
    session.refresh_user().await;
    assert!(!h.api.has_token());

    // The next sync observes the missing token and resolves anonymous
    // without hitting the network again
    session.fetch_user().await;
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert_eq!(profile.hits(), 1);
}
