use crate::user::UserId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone)]
pub struct JWTAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// `jti` is the id of the stored access token, so a signed token can still be revoked.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Claims {
    pub sub: UserId,
    pub jti: String,
    pub exp: i64,
}

impl JWTAuth {
    pub const EXPIRE_TIME: i64 = 30 * 24 * 60 * 60;

    pub fn from_secret(secret: Vec<u8>) -> JWTAuth {
        JWTAuth {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
        }
    }

    pub fn create_token(
        &self,
        user_id: UserId,
        token_id: String,
        expires_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            jti: token_id,
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::JWTAuth;
    use base64::Engine;
    use chrono::{Duration, Utc};

    fn jwt_auth() -> JWTAuth {
        let secret: [u8; 32] = rand::random();
        JWTAuth::from_secret(secret.to_vec())
    }

    #[test]
    fn valid_token() {
        let jwt_auth = jwt_auth();
        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);

        let token = jwt_auth
            .create_token("alice".into(), "token-1".into(), expires_at)
            .unwrap();
        let claims = jwt_auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.jti, "token-1");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn expired_token() {
        let jwt_auth = jwt_auth();
        let expires_at = Utc::now() - Duration::hours(1);

        let token = jwt_auth
            .create_token("alice".into(), "token-1".into(), expires_at)
            .unwrap();
        assert!(jwt_auth.validate_token(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret() {
        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);
        let token = jwt_auth()
            .create_token("alice".into(), "token-1".into(), expires_at)
            .unwrap();

        assert!(jwt_auth().validate_token(&token).is_err());
    }

    #[test]
    fn invalid_token() {
        let jwt_auth = jwt_auth();

        let token_bytes: [u8; 32] = rand::random();
        let base64_engine = base64::engine::general_purpose::STANDARD;
        let token = base64_engine.encode(token_bytes);
        assert!(jwt_auth.validate_token(&token).is_err())
    }
}
