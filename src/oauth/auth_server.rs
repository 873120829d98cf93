//! OAuth 2.0 authorization server handling the client credentials token flow.

use crate::errors::OAuthError;
use crate::oauth::types::*;
use crate::storage::traits::{AccessTokenStore, OAuthClientStore, OAuthStorage};
use axum::{
    Json,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Description returned to callers for engine-side faults
const INTERNAL_ERROR_DESCRIPTION: &str =
    "The authorization server encountered an unexpected condition that prevented it from fulfilling the request";

/// Called for engine-side faults; a returned response replaces the generic one
pub type InternalErrorHandler =
    Arc<dyn Fn(&OAuthError) -> Option<OAuthErrorResponse> + Send + Sync>;

/// Called for every error response leaving the token endpoint
pub type ResponseErrorHandler = Arc<dyn Fn(&OAuthErrorResponse) + Send + Sync>;

/// Where client credentials are read from on token requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientInfoHandler {
    /// `client_id` and `client_secret` request parameters
    Form,
    /// HTTP Basic `Authorization` header
    Basic,
}

/// OAuth 2.0 Authorization Server
pub struct AuthorizationServer {
    pub storage: Arc<dyn OAuthStorage>,
    allowed_grant_types: Vec<GrantType>,
    allow_get_access_request: bool,
    client_info_handler: ClientInfoHandler,
    access_token_expiration: Duration,
    internal_error_handler: InternalErrorHandler,
    response_error_handler: ResponseErrorHandler,
}

impl AuthorizationServer {
    /// Create a new authorization server
    pub fn new(storage: Arc<dyn OAuthStorage>) -> Self {
        Self {
            storage,
            allowed_grant_types: vec![GrantType::ClientCredentials],
            allow_get_access_request: false,
            client_info_handler: ClientInfoHandler::Basic,
            access_token_expiration: Duration::hours(2),
            internal_error_handler: Arc::new(|err: &OAuthError| -> Option<OAuthErrorResponse> {
                tracing::error!(error = %err, "Internal Error");
                None
            }),
            response_error_handler: Arc::new(|re: &OAuthErrorResponse| {
                tracing::warn!(
                    error = %re.error,
                    description = ?re.error_description,
                    "Response Error"
                );
            }),
        }
    }

    /// Restrict the grant types accepted by the token endpoint
    pub fn with_allowed_grant_types(mut self, grant_types: Vec<GrantType>) -> Self {
        self.allowed_grant_types = grant_types;
        self
    }

    /// Accept token requests made with GET as well as POST
    pub fn allow_get_access_request(mut self, allow: bool) -> Self {
        self.allow_get_access_request = allow;
        self
    }

    pub fn with_client_info_handler(mut self, handler: ClientInfoHandler) -> Self {
        self.client_info_handler = handler;
        self
    }

    pub fn with_access_token_expiration(mut self, expiration: Duration) -> Self {
        self.access_token_expiration = expiration;
        self
    }

    pub fn with_internal_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&OAuthError) -> Option<OAuthErrorResponse> + Send + Sync + 'static,
    {
        self.internal_error_handler = Arc::new(handler);
        self
    }

    pub fn with_response_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&OAuthErrorResponse) + Send + Sync + 'static,
    {
        self.response_error_handler = Arc::new(handler);
        self
    }

    /// Handle token requests (RFC 6749 Section 4.4.2)
    pub async fn token(
        &self,
        request: TokenRequest,
        client_auth: Option<ClientAuthentication>,
    ) -> Result<TokenResponse, OAuthError> {
        if !self.allowed_grant_types.contains(&request.grant_type) {
            return Err(OAuthError::UnsupportedGrantType(
                request.grant_type.as_str().to_string(),
            ));
        }

        match request.grant_type {
            GrantType::ClientCredentials => {
                self.handle_client_credentials_grant(request, client_auth)
                    .await
            }
        }
    }

    /// Handle client credentials grant
    async fn handle_client_credentials_grant(
        &self,
        request: TokenRequest,
        client_auth: Option<ClientAuthentication>,
    ) -> Result<TokenResponse, OAuthError> {
        // Client credentials grant requires client authentication
        let client_id = client_auth
            .as_ref()
            .map(|auth| auth.client_id.as_str())
            .or(request.client_id.as_deref())
            .ok_or_else(|| OAuthError::InvalidClient("Missing client credentials".to_string()))?;

        let client = self
            .storage
            .get_client(client_id)
            .await
            .map_err(|e| OAuthError::ServerError(e.to_string()))?
            .ok_or_else(|| OAuthError::InvalidClient("Client not found".to_string()))?;

        self.authenticate_client(&client, client_auth.as_ref(), &request)?;

        if !client.grant_types.contains(&GrantType::ClientCredentials) {
            return Err(OAuthError::UnauthorizedClient(
                "Client not authorized for client credentials grant".to_string(),
            ));
        }

        let granted_scope = match request.scope {
            Some(ref requested_scope) if !validate_scope(requested_scope) => {
                return Err(OAuthError::InvalidScope(format!(
                    "Malformed scope: {}",
                    requested_scope
                )));
            }
            Some(ref requested_scope) if requested_scope.trim().is_empty() => None,
            Some(requested_scope) => Some(requested_scope),
            None => None,
        };

        let access_token = generate_token();
        let now = Utc::now();

        let access_token_record = AccessToken {
            token: access_token.clone(),
            token_type: TokenType::Bearer,
            client_id: client.client_id.clone(),
            scope: granted_scope.clone(),
            created_at: now,
            expires_at: now + self.access_token_expiration,
        };

        self.storage
            .store_token(&access_token_record)
            .await
            .map_err(|e| {
                OAuthError::ServerError(format!("Failed to store access token: {:?}", e))
            })?;

        tracing::info!(
            client_id = %client.client_id,
            scope = ?granted_scope,
            "issued access token"
        );

        Ok(TokenResponse::new(
            access_token,
            TokenType::Bearer,
            self.access_token_expiration.num_seconds().max(0) as u64,
            granted_scope,
        ))
    }

    /// Authenticate a client by shared secret
    fn authenticate_client(
        &self,
        client: &OAuthClient,
        client_auth: Option<&ClientAuthentication>,
        request: &TokenRequest,
    ) -> Result<(), OAuthError> {
        let provided_secret = client_auth
            .and_then(|auth| auth.client_secret.as_ref())
            .or(request.client_secret.as_ref())
            .ok_or_else(|| OAuthError::InvalidClient("Missing client secret".to_string()))?;

        if provided_secret != &client.client_secret {
            return Err(OAuthError::InvalidClient(
                "Invalid client secret".to_string(),
            ));
        }

        Ok(())
    }

    /// HTTP entry point for the token endpoint.
    ///
    /// Accepts POST, and GET when [`Self::allow_get_access_request`] is set.
    /// Every response carries `Cache-Control: no-store` (RFC 6749 Section 5.1).
    pub async fn handle_token_request(
        &self,
        method: &Method,
        headers: &HeaderMap,
        form: TokenForm,
    ) -> Response {
        let result = self.validate_and_issue(method, headers, form).await;

        let response = match result {
            Ok(token_response) => (StatusCode::OK, Json(token_response)).into_response(),
            Err(err) => self.error_response(&err),
        };
        with_no_store(response)
    }

    /// Reject a token request that could not be read, with the same error
    /// handling and headers as [`Self::handle_token_request`]
    pub fn reject_token_request(&self, err: &OAuthError) -> Response {
        with_no_store(self.error_response(err))
    }

    async fn validate_and_issue(
        &self,
        method: &Method,
        headers: &HeaderMap,
        form: TokenForm,
    ) -> Result<TokenResponse, OAuthError> {
        let method_allowed =
            *method == Method::POST || (self.allow_get_access_request && *method == Method::GET);
        if !method_allowed {
            return Err(OAuthError::InvalidRequest(format!(
                "Token requests cannot use {}",
                method
            )));
        }

        let client_auth = extract_client_auth(self.client_info_handler, headers, &form);
        let mut request = TokenRequest::try_from(form)?;
        if self.client_info_handler == ClientInfoHandler::Basic {
            request.client_id = None;
            request.client_secret = None;
        }

        self.token(request, client_auth).await
    }

    /// Render an error through the configured error handlers
    fn error_response(&self, err: &OAuthError) -> Response {
        let error_response = if err.is_internal() {
            (self.internal_error_handler)(err).unwrap_or_else(|| {
                OAuthErrorResponse::new(err.error_code(), INTERNAL_ERROR_DESCRIPTION)
            })
        } else {
            OAuthErrorResponse::from(err)
        };

        (self.response_error_handler)(&error_response);

        (error_response.status_code(), Json(error_response)).into_response()
    }
}

fn with_no_store(mut response: Response) -> Response {
    let response_headers = response.headers_mut();
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response_headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

/// Client Authentication extracted from request
#[derive(Clone, Debug)]
pub struct ClientAuthentication {
    pub client_id: String,
    pub client_secret: Option<String>,
}

/// Token endpoint parameters, read from the query string or a urlencoded body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

impl TokenForm {
    /// Read parameters from `application/x-www-form-urlencoded` data.
    ///
    /// A repeated parameter keeps its first value and unknown parameters
    /// are ignored.
    pub fn from_urlencoded(input: &[u8]) -> TokenForm {
        let mut form = TokenForm::default();
        for (key, value) in url::form_urlencoded::parse(input) {
            let slot = match key.as_ref() {
                "grant_type" => &mut form.grant_type,
                "client_id" => &mut form.client_id,
                "client_secret" => &mut form.client_secret,
                "scope" => &mut form.scope,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        form
    }

    /// Fill parameters missing from `self` with those from `fallback`
    pub fn or(self, fallback: TokenForm) -> TokenForm {
        TokenForm {
            grant_type: non_empty(self.grant_type).or(non_empty(fallback.grant_type)),
            client_id: non_empty(self.client_id).or(non_empty(fallback.client_id)),
            client_secret: non_empty(self.client_secret).or(non_empty(fallback.client_secret)),
            scope: non_empty(self.scope).or(non_empty(fallback.scope)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<TokenForm> for TokenRequest {
    type Error = OAuthError;

    fn try_from(form: TokenForm) -> Result<Self, Self::Error> {
        let grant_type = non_empty(form.grant_type)
            .ok_or_else(|| OAuthError::InvalidRequest("Missing grant_type".to_string()))?;

        Ok(Self {
            grant_type: GrantType::try_from(grant_type.as_str())?,
            client_id: non_empty(form.client_id),
            client_secret: non_empty(form.client_secret),
            scope: non_empty(form.scope),
        })
    }
}

/// Extract client authentication according to the configured handler
pub fn extract_client_auth(
    handler: ClientInfoHandler,
    headers: &HeaderMap,
    form: &TokenForm,
) -> Option<ClientAuthentication> {
    match handler {
        ClientInfoHandler::Basic => {
            let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
            let encoded = auth_str.strip_prefix("Basic ")?;
            let decoded = BASE64_STANDARD.decode(encoded).ok()?;
            let credentials = String::from_utf8(decoded).ok()?;
            let (client_id, client_secret) = credentials.split_once(':')?;
            if client_id.is_empty() {
                return None;
            }
            Some(ClientAuthentication {
                client_id: client_id.to_string(),
                client_secret: Some(client_secret.to_string()),
            })
        }
        ClientInfoHandler::Form => {
            let client_id = non_empty(form.client_id.clone())?;
            Some(ClientAuthentication {
                client_id,
                client_secret: non_empty(form.client_secret.clone()),
            })
        }
    }
}
