use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An access token issued through the password grant. The token string handed to clients only
/// carries the id; everything else is looked up here.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct AccessToken {
    pub id: String,
    pub user_id: String,
    pub client_id: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewAccessToken {
    pub id: String,
    pub user_id: String,
    pub client_id: String,
    pub expires_at: DateTime<Utc>,
}

impl NewAccessToken {
    pub fn new(
        id: String,
        user_id: String,
        client_id: String,
        expires_at: DateTime<Utc>,
    ) -> NewAccessToken {
        NewAccessToken {
            id,
            user_id,
            client_id,
            expires_at,
        }
    }

    pub fn to_access_token(self, created_at: DateTime<Utc>) -> AccessToken {
        AccessToken {
            id: self.id,
            user_id: self.user_id,
            client_id: self.client_id,
            revoked: false,
            created_at,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Error, Debug)]
pub enum TokenRepoError {
    #[error("Token {0} not found")]
    TokenNotFound(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait TokenRepo: Sync + Send {
    async fn create_token(&self, new_token: NewAccessToken)
        -> Result<AccessToken, TokenRepoError>;

    async fn get_token(&self, token_id: &str) -> Result<AccessToken, TokenRepoError>;

    /// All tokens ever issued to the user, revoked ones included.
    async fn get_user_tokens(&self, user_id: &str) -> Result<Vec<AccessToken>, TokenRepoError>;

    /// Marks the token as revoked. Revoking an already revoked token is not an error.
    async fn revoke_token(&self, token_id: &str) -> Result<(), TokenRepoError>;

    /// Deletes tokens that expired before `expired_before`, revoked or not. Returns the number of
    /// tokens removed.
    async fn purge_tokens(&self, expired_before: DateTime<Utc>) -> Result<u64, TokenRepoError>;
}
