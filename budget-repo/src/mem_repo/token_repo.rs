use crate::token_repo::TokenRepoError::TokenNotFound;
use crate::token_repo::{AccessToken, NewAccessToken, TokenRepo, TokenRepoError};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct State {
    tokens: HashMap<String, AccessToken>,
    user_tokens: HashMap<String, Vec<String>>,
}

pub struct MemTokenRepo {
    state: RwLock<State>,
}

impl MemTokenRepo {
    pub fn new() -> MemTokenRepo {
        let state = State {
            tokens: HashMap::new(),
            user_tokens: HashMap::new(),
        };
        MemTokenRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemTokenRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepo for MemTokenRepo {
    async fn create_token(
        &self,
        new_token: NewAccessToken,
    ) -> Result<AccessToken, TokenRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.tokens.contains_key(&new_token.id) {
            return Err(anyhow!("Token {} already exists", new_token.id).into());
        }

        let token = new_token.to_access_token(Utc::now());
        write_guard
            .user_tokens
            .entry(token.user_id.clone())
            .or_default()
            .push(token.id.clone());
        write_guard.tokens.insert(token.id.clone(), token.clone());

        Ok(token)
    }

    async fn get_token(&self, token_id: &str) -> Result<AccessToken, TokenRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .tokens
            .get(token_id)
            .cloned()
            .ok_or_else(|| TokenNotFound(token_id.to_owned()))
    }

    async fn get_user_tokens(&self, user_id: &str) -> Result<Vec<AccessToken>, TokenRepoError> {
        let read_guard = self.read_lock()?;

        let Some(token_ids) = read_guard.user_tokens.get(user_id) else {
            return Ok(Vec::new());
        };

        let tokens = token_ids
            .iter()
            .map(|id| {
                read_guard
                    .tokens
                    .get(id)
                    .expect("tokens should have all the ids from user_tokens")
            })
            .cloned()
            .collect();
        Ok(tokens)
    }

    async fn revoke_token(&self, token_id: &str) -> Result<(), TokenRepoError> {
        let mut write_guard = self.write_lock()?;

        match write_guard.tokens.get_mut(token_id) {
            Some(token) => {
                token.revoked = true;
                Ok(())
            }
            None => Err(TokenNotFound(token_id.to_owned())),
        }
    }

    async fn purge_tokens(&self, expired_before: DateTime<Utc>) -> Result<u64, TokenRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        let before = state.tokens.len();
        state
            .tokens
            .retain(|_, token| token.expires_at >= expired_before);
        let purged = before - state.tokens.len();

        let tokens = &state.tokens;
        state.user_tokens.retain(|_, token_ids| {
            token_ids.retain(|id| tokens.contains_key(id));
            !token_ids.is_empty()
        });

        Ok(purged as u64)
    }
}
