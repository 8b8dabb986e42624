use super::error::OAuthError;
use super::jwt::JWTAuth;
use crate::auth::password;
use crate::config::OAuthConfig;
use anyhow::Context;
use async_trait::async_trait;
use budget_repo::token_repo::{NewAccessToken, TokenRepo};
use budget_repo::user_repo::{UserRepo, UserRepoError};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Body of an OAuth2 token request. Every field is optional so that missing parameters are
/// reported as `invalid_request` instead of failing deserialization.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl TokenRequest {
    pub fn password_grant(
        client: &OAuthConfig,
        username: Option<String>,
        password: Option<String>,
    ) -> TokenRequest {
        TokenRequest {
            grant_type: Some("password".to_string()),
            client_id: Some(client.client_id.clone()),
            client_secret: Some(client.client_secret.clone()),
            username,
            password,
        }
    }
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct TokenResponse {
    pub token_type: String,
    pub expires_in: i64,
    pub access_token: String,
}

#[async_trait]
pub trait TokenIssuer: Sync + Send {
    async fn issue_token(&self, request: TokenRequest) -> Result<TokenResponse, OAuthError>;
}

/// Issues tokens for the password grant of a single configured client.
pub struct PasswordGrantIssuer {
    client: OAuthConfig,
    user_repo: Arc<dyn UserRepo>,
    token_repo: Arc<dyn TokenRepo>,
    jwt_auth: JWTAuth,
}

impl PasswordGrantIssuer {
    pub fn new(
        client: OAuthConfig,
        user_repo: Arc<dyn UserRepo>,
        token_repo: Arc<dyn TokenRepo>,
        jwt_auth: JWTAuth,
    ) -> PasswordGrantIssuer {
        PasswordGrantIssuer {
            client,
            user_repo,
            token_repo,
            jwt_auth,
        }
    }

    fn authenticate_client(
        &self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<String, OAuthError> {
        let client_id = client_id.ok_or(OAuthError::InvalidRequest("client_id"))?;
        let client_secret = client_secret.ok_or(OAuthError::InvalidRequest("client_secret"))?;
        if client_id != self.client.client_id || client_secret != self.client.client_secret {
            return Err(OAuthError::InvalidClient);
        }
        Ok(client_id)
    }

    async fn authenticate_user(&self, username: &str, password: String) -> Result<(), OAuthError> {
        let user = match self.user_repo.get_user(username).await {
            Ok(user) => user,
            Err(UserRepoError::UserNotFound(_)) => return Err(OAuthError::InvalidGrant),
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };
        let matched = password::verify_password(password, user.password_hash)
            .context("Unable to verify password")?;
        if matched {
            Ok(())
        } else {
            Err(OAuthError::InvalidGrant)
        }
    }
}

#[async_trait]
impl TokenIssuer for PasswordGrantIssuer {
    #[instrument(skip(self))]
    async fn issue_token(&self, request: TokenRequest) -> Result<TokenResponse, OAuthError> {
        match request.grant_type.as_deref() {
            None => return Err(OAuthError::InvalidRequest("grant_type")),
            Some("password") => {}
            Some(_) => return Err(OAuthError::UnsupportedGrantType),
        }
        let client_id = self.authenticate_client(request.client_id, request.client_secret)?;
        let username = request
            .username
            .ok_or(OAuthError::InvalidRequest("username"))?;
        let password = request
            .password
            .ok_or(OAuthError::InvalidRequest("password"))?;

        self.authenticate_user(&username, password).await?;

        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);
        let token = self
            .token_repo
            .create_token(NewAccessToken::new(
                Uuid::new_v4().simple().to_string(),
                username.clone(),
                client_id,
                expires_at,
            ))
            .await
            .context("Unable to store access token")?;
        let access_token = self
            .jwt_auth
            .create_token(username, token.id, expires_at)
            .context("Unable to sign access token")?;
        info!(user_id = %token.user_id, "Issued access token");

        Ok(TokenResponse {
            token_type: "Bearer".to_string(),
            expires_in: JWTAuth::EXPIRE_TIME,
            access_token,
        })
    }
}
