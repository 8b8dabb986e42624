use crate::auth::password;
use crate::config::OAuthConfig;
use crate::error::HandlerError;
use crate::oauth::{OAuthError, TokenIssuer, TokenRequest};
use crate::user::UserId;
use actix_web::{post, web, HttpMessage, HttpRequest, HttpResponse, Responder};
use anyhow::Context;
use budget_repo::token_repo::TokenRepo;
use budget_repo::user_repo::{User, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Credentials posted to `/login`, as JSON or as a form. Anything missing or unreadable is left
/// empty and reported by the token issuer.
#[derive(Default)]
pub struct LoginCredentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginCredentials {
    pub fn from_body(content_type: &str, body: &[u8]) -> LoginCredentials {
        if content_type == "application/x-www-form-urlencoded" {
            Self::from_form(body)
        } else {
            Self::from_json(body)
        }
    }

    fn from_json(body: &[u8]) -> LoginCredentials {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return LoginCredentials::default();
        };
        LoginCredentials {
            email: fields.get("email").and_then(json_field),
            password: fields.get("password").and_then(json_field),
        }
    }

    fn from_form(body: &[u8]) -> LoginCredentials {
        let form = std::str::from_utf8(body).unwrap_or_default();
        match web::Query::<HashMap<String, String>>::from_query(form) {
            Ok(fields) => {
                let mut fields = fields.into_inner();
                LoginCredentials {
                    email: fields.remove("email"),
                    password: fields.remove("password"),
                }
            }
            Err(_) => LoginCredentials::default(),
        }
    }
}

/// Scalars are passed on in their textual form.
fn json_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: UserId,
    pub password: String,
}

/// Exchanges credentials for an access token through the password grant. The issuer's answer,
/// errors included, is passed back untouched.
#[post("/login")]
pub async fn login(
    issuer: web::Data<Arc<dyn TokenIssuer>>,
    client: web::Data<OAuthConfig>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, OAuthError> {
    let credentials = LoginCredentials::from_body(req.content_type(), &body);
    let request = TokenRequest::password_grant(&client, credentials.email, credentials.password);

    let response = issuer.issue_token(request).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("")]
pub async fn logout(
    token_repo: web::Data<Arc<dyn TokenRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();

    let tokens = token_repo.get_user_tokens(&user_id).await?;
    for token in &tokens {
        token_repo.revoke_token(&token.id).await?;
    }
    info!(%user_id, revoked = tokens.len(), "Logged out");

    Ok(HttpResponse::Ok().json("Logged out successfully"))
}

#[post("/signup")]
pub async fn signup(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();
    let password_hash =
        password::encode_password(credentials.password).context("Unable to hash password")?;

    user_repo
        .create_user(User::new(credentials.email, password_hash))
        .await?;

    Ok(HttpResponse::Ok())
}
