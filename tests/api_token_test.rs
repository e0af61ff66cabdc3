//! Integration tests for API-token external access: minting, validation,
//! permission grants, revocation and expiry.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use fleetcrm_api::auth::{consts, AuthError};
use fleetcrm_api::errors::ServiceError;
use fleetcrm_api::services::tokens::CreateTokenInput;
use uuid::Uuid;

#[tokio::test]
async fn minted_token_validates_and_carries_grants() {
    let app = common::spawn_app().await;
    let owner = Uuid::new_v4();

    let minted = app
        .services
        .tokens
        .create_token(
            owner,
            CreateTokenInput {
                name: "telemetry-sync".into(),
                permissions: vec![consts::BIDS_READ.into(), consts::EQUIPMENT_READ.into()],
                expires_at: None,
            },
        )
        .await
        .unwrap();

    assert!(minted.token.starts_with("sk_"));
    assert_eq!(minted.record.prefix, &minted.token[..8]);

    let principal = app.auth.validate_api_token(&minted.token).await.unwrap();
    assert!(principal.is_api_token);
    assert_eq!(principal.user_id, owner);
    assert!(principal.has_permission(consts::BIDS_READ));
    assert!(!principal.has_permission(consts::BIDS_WRITE));
}

#[tokio::test]
async fn unknown_grant_is_rejected_at_mint_time() {
    let app = common::spawn_app().await;

    let err = app
        .services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "bad".into(),
                permissions: vec!["bids:explode".into()],
                expires_at: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn revoked_token_stops_validating() {
    let app = common::spawn_app().await;

    let minted = app
        .services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "to-revoke".into(),
                permissions: vec![consts::BIDS_READ.into()],
                expires_at: None,
            },
        )
        .await
        .unwrap();

    app.services
        .tokens
        .revoke_token(minted.record.id)
        .await
        .unwrap();
    // Revocation is idempotent
    app.services
        .tokens
        .revoke_token(minted.record.id)
        .await
        .unwrap();

    let err = app.auth.validate_api_token(&minted.token).await.unwrap_err();
    assert_matches!(err, AuthError::RevokedApiToken);
}

#[tokio::test]
async fn expired_token_stops_validating() {
    let app = common::spawn_app().await;

    // expires_at is validated at mint time, so mint a token one second from
    // now and shift the stored expiry backwards instead of sleeping
    let minted = app
        .services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "short-lived".into(),
                permissions: vec![consts::BIDS_READ.into()],
                expires_at: Some(Utc::now() + Duration::hours(1)),
            },
        )
        .await
        .unwrap();

    use fleetcrm_api::auth::api_token;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    let record = api_token::Entity::find_by_id(minted.record.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: api_token::ActiveModel = record.into();
    active.expires_at = Set(Some(Utc::now() - Duration::hours(1)));
    active.update(&*app.db).await.unwrap();

    let err = app.auth.validate_api_token(&minted.token).await.unwrap_err();
    assert_matches!(err, AuthError::ExpiredApiToken);
}

#[tokio::test]
async fn expiry_in_the_past_is_rejected_at_mint_time() {
    let app = common::spawn_app().await;

    let err = app
        .services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "stale".into(),
                permissions: vec![consts::BIDS_READ.into()],
                expires_at: Some(Utc::now() - Duration::hours(1)),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn listing_never_exposes_the_hash() {
    let app = common::spawn_app().await;

    app.services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "listed".into(),
                permissions: vec![consts::BIDS_READ.into()],
                expires_at: None,
            },
        )
        .await
        .unwrap();

    let tokens = app.services.tokens.list_tokens().await.unwrap();
    assert_eq!(tokens.len(), 1);

    let serialized = serde_json::to_value(&tokens[0]).unwrap();
    assert!(serialized.get("token_hash").is_none());
    assert!(serialized.get("prefix").is_some());
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = common::spawn_app().await;

    assert_matches!(
        app.auth.validate_api_token("sk_doesnotexist").await,
        Err(AuthError::InvalidApiToken)
    );
    assert_matches!(
        app.auth.validate_api_token("not-even-prefixed").await,
        Err(AuthError::InvalidApiToken)
    );
}

#[tokio::test]
async fn validation_stamps_last_used() {
    let app = common::spawn_app().await;

    let minted = app
        .services
        .tokens
        .create_token(
            Uuid::new_v4(),
            CreateTokenInput {
                name: "stamped".into(),
                permissions: vec![consts::BIDS_READ.into()],
                expires_at: None,
            },
        )
        .await
        .unwrap();
    assert!(minted.record.last_used_at.is_none());

    app.auth.validate_api_token(&minted.token).await.unwrap();

    let tokens = app.services.tokens.list_tokens().await.unwrap();
    assert!(tokens[0].last_used_at.is_some());
}
