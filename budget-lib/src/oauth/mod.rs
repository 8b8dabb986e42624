use actix_web::{web, Scope};

mod error;
mod handlers;
mod issuer;
pub mod jwt;

pub use error::OAuthError;
pub use issuer::{PasswordGrantIssuer, TokenIssuer, TokenRequest, TokenResponse};

pub fn oauth_service() -> Scope {
    web::scope("/oauth").service(handlers::issue_token)
}
