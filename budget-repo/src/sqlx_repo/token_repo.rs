use super::{has_error_code, SQLxRepo, FOREIGN_KEY_VIOLATION};
use crate::token_repo::TokenRepoError::TokenNotFound;
use crate::token_repo::{AccessToken, NewAccessToken, TokenRepo, TokenRepoError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TokenEntry {
    id: String,
    user_id: String,
    client_id: String,
    revoked: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<TokenEntry> for AccessToken {
    fn from(value: TokenEntry) -> Self {
        AccessToken {
            id: value.id,
            user_id: value.user_id,
            client_id: value.client_id,
            revoked: value.revoked,
            created_at: value.created_at,
            expires_at: value.expires_at,
        }
    }
}

const TOKEN_COLUMNS: &str = "id, user_id, client_id, revoked, created_at, expires_at";

#[async_trait]
impl TokenRepo for SQLxRepo {
    #[instrument(skip(self, new_token), fields(user_id = %new_token.user_id))]
    async fn create_token(
        &self,
        new_token: NewAccessToken,
    ) -> Result<AccessToken, TokenRepoError> {
        let result = query_as::<_, TokenEntry>(&format!(
            "INSERT INTO oauth_access_tokens(id, user_id, client_id, expires_at) VALUES ($1, $2, $3, $4) RETURNING {}",
            TOKEN_COLUMNS
        ))
        .bind(&new_token.id)
        .bind(&new_token.user_id)
        .bind(&new_token.client_id)
        .bind(new_token.expires_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(entry) => Ok(entry.into()),
            Err(e) if has_error_code(&e, FOREIGN_KEY_VIOLATION) => {
                Err(TokenRepoError::UserNotFound(new_token.user_id))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("Unable to insert access token")
                .into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_token(&self, token_id: &str) -> Result<AccessToken, TokenRepoError> {
        let entry = query_as::<_, TokenEntry>(&format!(
            "SELECT {} FROM oauth_access_tokens WHERE id = $1",
            TOKEN_COLUMNS
        ))
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get access token {}", token_id))?;
        entry
            .map(AccessToken::from)
            .ok_or_else(|| TokenNotFound(token_id.to_owned()))
    }

    #[instrument(skip(self))]
    async fn get_user_tokens(&self, user_id: &str) -> Result<Vec<AccessToken>, TokenRepoError> {
        let entries = query_as::<_, TokenEntry>(&format!(
            "SELECT {} FROM oauth_access_tokens WHERE user_id = $1 ORDER BY created_at",
            TOKEN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get access tokens for user {}", user_id))?;
        Ok(entries.into_iter().map(AccessToken::from).collect())
    }

    #[instrument(skip(self))]
    async fn revoke_token(&self, token_id: &str) -> Result<(), TokenRepoError> {
        let result = sqlx::query("UPDATE oauth_access_tokens SET revoked = TRUE WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to revoke access token {}", token_id))?;
        if result.rows_affected() == 0 {
            Err(TokenNotFound(token_id.to_owned()))
        } else {
            Ok(())
        }
    }

    #[instrument(skip(self))]
    async fn purge_tokens(&self, expired_before: DateTime<Utc>) -> Result<u64, TokenRepoError> {
        let result =
            sqlx::query("DELETE FROM oauth_access_tokens WHERE expires_at < $1")
                .bind(expired_before)
                .execute(&self.pool)
                .await
                .context("Unable to purge access tokens")?;
        Ok(result.rows_affected())
    }
}
