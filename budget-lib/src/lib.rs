use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;
use budget_repo::Repos;
use config::OAuthConfig;
use oauth::jwt::JWTAuth;
use oauth::{PasswordGrantIssuer, TokenIssuer};
use std::sync::Arc;

pub mod auth;
pub mod category;
pub mod config;
mod error;
pub mod flash;
pub mod oauth;
mod params;
pub mod tracing;
pub mod transaction;
pub mod user;

pub use error::json_config;

/// State shared by every worker of the server.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repos,
    pub jwt_auth: JWTAuth,
    pub oauth_client: OAuthConfig,
    pub signups_enabled: bool,
}

/// Registers app data and all services. Categories, transactions and logout sit behind bearer
/// authentication.
pub fn app_config_func(state: &AppState, cfg: &mut web::ServiceConfig) {
    let issuer: Arc<dyn TokenIssuer> = Arc::new(PasswordGrantIssuer::new(
        state.oauth_client.clone(),
        state.repos.user_repo.clone(),
        state.repos.token_repo.clone(),
        state.jwt_auth.clone(),
    ));
    let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);

    cfg.app_data(state.jwt_auth.clone())
        .app_data(web::Data::new(state.repos.user_repo.clone()))
        .app_data(web::Data::new(state.repos.token_repo.clone()))
        .app_data(web::Data::new(state.repos.category_repo.clone()))
        .app_data(web::Data::new(state.repos.transaction_repo.clone()))
        .app_data(web::Data::new(issuer))
        .app_data(web::Data::new(state.oauth_client.clone()))
        .app_data(json_config())
        .service(oauth::oauth_service())
        .service(auth::handlers::login)
        .service(
            web::scope("/logout")
                .service(auth::handlers::logout)
                .wrap(bearer_auth_middleware.clone()),
        )
        .service(category::category_service().wrap(bearer_auth_middleware.clone()))
        .service(transaction::transaction_service().wrap(bearer_auth_middleware));

    if state.signups_enabled {
        cfg.service(auth::handlers::signup);
    }
}
