use super::{has_error_code, SQLxRepo, UNIQUE_VIOLATION};
use crate::user_repo::{User, UserRepo, UserRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: String,
    password_hash: String,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User::new(value.id, value.password_hash)
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> =
            query_as::<_, UserEntry>("SELECT id, password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(User::from)
            .ok_or_else(|| UserRepoError::UserNotFound(user_id.to_owned()))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: User) -> Result<(), UserRepoError> {
        let result = sqlx::query("INSERT INTO users(id, password_hash) VALUES($1, $2)")
            .bind(&user.id)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if has_error_code(&e, UNIQUE_VIOLATION) => {
                Err(UserRepoError::UserAlreadyExists(user.id))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to create user {}", user.id))
                .into()),
        }
    }
}
