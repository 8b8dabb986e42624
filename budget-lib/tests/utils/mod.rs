#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use budget_lib::config::OAuthConfig;
use budget_lib::oauth::jwt::JWTAuth;
use budget_lib::user::UserId;
use budget_lib::AppState;
use budget_repo::user_repo::{User, UserRepo};
use budget_repo::Repos;
use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

pub mod mock;

pub const TEST_PASSWORD: &str = "pass";

/// Category and transaction services with a fixed authenticated user.
macro_rules! build_app {
    ($repos:ident, $user_id:expr) => {{
        let user_id: budget_lib::user::UserId = $user_id;
        let app = App::new()
            .app_data(Data::new($repos.category_repo.clone()))
            .app_data(Data::new($repos.transaction_repo.clone()))
            .app_data(Data::new($repos.token_repo.clone()))
            .app_data(budget_lib::json_config())
            .wrap(budget_lib::tracing::create_middleware())
            .service(
                budget_lib::category::category_service().wrap(MockAuthentication {
                    user_id: user_id.clone(),
                }),
            )
            .service(
                budget_lib::transaction::transaction_service()
                    .wrap(MockAuthentication { user_id }),
            );
        tracing::info!("Built app");
        app
    }};
}

/// The whole application, with real bearer authentication.
macro_rules! build_full_app {
    ($state:ident) => {{
        App::new()
            .wrap(budget_lib::tracing::create_middleware())
            .configure(|cfg| budget_lib::app_config_func(&$state, cfg))
    }};
}

pub struct TestUser {
    pub user_id: UserId,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let user_id = format!("test-user-{}@example.com", Uuid::new_v4());
        let user = User::new(
            user_id.clone(),
            budget_lib::auth::password::encode_password(TEST_PASSWORD.to_string()).unwrap(),
        );
        user_repo.create_user(user).await.unwrap();
        info!(%user_id, "Created user");
        TestUser { user_id }
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    budget_repo::mem_repo::create_repos()
}

#[fixture]
pub fn app_state(repos: Repos) -> AppState {
    let secret: [u8; 32] = rand::random();
    AppState {
        repos,
        jwt_auth: JWTAuth::from_secret(secret.to_vec()),
        oauth_client: OAuthConfig {
            client_id: "2".to_string(),
            client_secret: "test-client-secret".to_string(),
        },
        signups_enabled: true,
    }
}

pub fn response_cookie<B>(response: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn location<B>(response: &ServiceResponse<B>) -> Option<String> {
    response
        .headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|l| l.to_str().ok())
        .map(str::to_owned)
}
