//! OAuth 2.0 Integration Tests
//!
//! These tests drive the client credentials flow end to end through the
//! engine: credential issuance, token exchange, bearer validation and the
//! expired token sweep.

use ccgate::errors::OAuthError;
use ccgate::oauth::{
    OAuthClientStore, auth_server::*, clients::registration::*, resource_server::*, types::*,
};
use ccgate::storage::{inmemory::MemoryOAuthStorage, traits::AccessTokenStore};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use std::sync::Arc;

#[tokio::test]
async fn test_client_credentials_flow() {
    // Setup
    let storage = Arc::new(MemoryOAuthStorage::new());
    let auth_server = Arc::new(AuthorizationServer::new(storage.clone()));
    let resource_server = Arc::new(ResourceServer::new(storage.clone()));
    let client_registration = Arc::new(ClientRegistrationService::new(
        storage.clone(),
        "http://localhost:8084",
    ));

    // Step 1: Issue credentials
    let credentials = client_registration.register_client().await.unwrap();
    assert_eq!(storage.count_clients().await.unwrap(), 1);

    // Step 2: Token request
    let token_request = TokenRequest {
        grant_type: GrantType::ClientCredentials,
        client_id: Some(credentials.client_id.clone()),
        client_secret: Some(credentials.client_secret.clone()),
        scope: Some("all".to_string()),
    };

    let token_response = auth_server.token(token_request, None).await.unwrap();

    assert!(!token_response.access_token.is_empty());
    assert_eq!(token_response.token_type, TokenType::Bearer);
    assert_eq!(token_response.expires_in, 7200);
    assert_eq!(token_response.scope, Some("all".to_string()));

    // Step 3: Resource access
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        format!("Bearer {}", token_response.access_token)
            .parse()
            .unwrap(),
    );

    let validation_result = resource_server
        .validate_bearer_token(&headers, None)
        .await
        .unwrap();

    assert_eq!(validation_result.client_id, credentials.client_id);
    assert!(validation_result.scopes.contains("all"));
}

#[tokio::test]
async fn test_client_authentication_failures() {
    let storage = Arc::new(MemoryOAuthStorage::new());
    let auth_server = AuthorizationServer::new(storage.clone());
    let client_registration = ClientRegistrationService::new(storage.clone(), "http://localhost:8084");

    let credentials = client_registration.register_client().await.unwrap();

    // Unregistered client id
    let result = auth_server
        .token(
            TokenRequest {
                grant_type: GrantType::ClientCredentials,
                client_id: Some("deadbeef".to_string()),
                client_secret: Some(credentials.client_secret.clone()),
                scope: None,
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(OAuthError::InvalidClient(_))));

    // Wrong secret for a registered client
    let result = auth_server
        .token(
            TokenRequest {
                grant_type: GrantType::ClientCredentials,
                client_id: Some(credentials.client_id.clone()),
                client_secret: Some("not-the-secret".to_string()),
                scope: None,
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(OAuthError::InvalidClient(_))));

    // Other grant types are not served
    let result = TokenRequest::try_from(TokenForm {
        grant_type: Some("password".to_string()),
        client_id: Some(credentials.client_id.clone()),
        client_secret: Some(credentials.client_secret.clone()),
        scope: None,
    });
    assert!(matches!(result, Err(OAuthError::UnsupportedGrantType(_))));
}

#[tokio::test]
async fn test_basic_client_authentication() {
    let storage = Arc::new(MemoryOAuthStorage::new());
    let auth_server =
        AuthorizationServer::new(storage.clone()).with_client_info_handler(ClientInfoHandler::Basic);
    let client_registration = ClientRegistrationService::new(storage.clone(), "http://localhost:8084");

    let credentials = client_registration.register_client().await.unwrap();

    let client_auth = Some(ClientAuthentication {
        client_id: credentials.client_id.clone(),
        client_secret: Some(credentials.client_secret.clone()),
    });

    let token_response = auth_server
        .token(
            TokenRequest {
                grant_type: GrantType::ClientCredentials,
                client_id: None,
                client_secret: None,
                scope: None,
            },
            client_auth,
        )
        .await
        .unwrap();

    assert!(token_response.scope.is_none());
}

#[tokio::test]
async fn test_token_expiry_and_cleanup() {
    let storage = Arc::new(MemoryOAuthStorage::new());
    let resource_server = Arc::new(ResourceServer::new(storage.clone()));

    // Create an expired token
    let expired_token = AccessToken {
        token: "expired-token".to_string(),
        token_type: TokenType::Bearer,
        client_id: "test-client".to_string(),
        scope: Some("all".to_string()),
        created_at: Utc::now() - Duration::hours(3),
        expires_at: Utc::now() - Duration::hours(1),
    };

    storage.store_token(&expired_token).await.unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("Authorization", "Bearer expired-token".parse().unwrap());

    let result = resource_server.validate_bearer_token(&headers, None).await;

    match result {
        Err(OAuthError::InvalidToken(msg)) => assert!(msg.contains("expired")),
        other => panic!("Expected InvalidToken error for expired token, got {:?}", other),
    }

    // The sweep drops it and the token becomes unknown
    assert_eq!(storage.cleanup_expired_tokens().await.unwrap(), 1);
    let result = resource_server.validate_bearer_token(&headers, None).await;
    assert!(matches!(result, Err(OAuthError::InvalidToken(_))));
}

#[tokio::test]
async fn test_short_lived_tokens() {
    let storage = Arc::new(MemoryOAuthStorage::new());
    let auth_server = AuthorizationServer::new(storage.clone())
        .with_access_token_expiration(Duration::seconds(-1));
    let resource_server = ResourceServer::new(storage.clone());
    let client_registration = ClientRegistrationService::new(storage.clone(), "http://localhost:8084");

    let credentials = client_registration.register_client().await.unwrap();
    let token_response = auth_server
        .token(
            TokenRequest {
                grant_type: GrantType::ClientCredentials,
                client_id: Some(credentials.client_id),
                client_secret: Some(credentials.client_secret),
                scope: None,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(token_response.expires_in, 0);

    let query = format!("access_token={}", token_response.access_token);
    let result = resource_server
        .validate_bearer_token(&HeaderMap::new(), Some(&query))
        .await;
    assert!(matches!(result, Err(OAuthError::InvalidToken(_))));
}

#[tokio::test]
async fn test_registry_capacity() {
    let storage = Arc::new(MemoryOAuthStorage::with_max_clients(2));
    let client_registration = ClientRegistrationService::new(storage.clone(), "http://localhost:8084");

    client_registration.register_client().await.unwrap();
    client_registration.register_client().await.unwrap();
    assert!(client_registration.register_client().await.is_err());

    assert_eq!(storage.count_clients().await.unwrap(), 2);
}
