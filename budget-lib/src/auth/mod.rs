use crate::oauth::jwt::JWTAuth;
use crate::user::UserId;
use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use anyhow::{bail, Context};
use budget_repo::token_repo::TokenRepo;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use tracing_actix_web::RootSpan;

pub mod handlers;
pub mod password;

/// Validates credentials using [JWTAuth] and the stored access token. If valid, injects the user
/// id into request and into the [RootSpan]
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    match authenticate(&req, credentials.token()).await {
        Ok(user) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", &user.as_str());
            }
            req.extensions_mut().insert::<UserId>(user);
            Ok(req)
        }
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
            Err((AuthenticationError::new(challenge).into(), req))
        }
    }
}

async fn authenticate(req: &ServiceRequest, token: &str) -> Result<UserId, anyhow::Error> {
    let jwt_auth = req
        .app_data::<JWTAuth>()
        .context("JWTAuth is not configured")?;
    let token_repo = req
        .app_data::<web::Data<Arc<dyn TokenRepo>>>()
        .context("Token repo is not configured")?;

    let claims = jwt_auth.validate_token(token)?;
    let access_token = token_repo.get_token(&claims.jti).await?;
    if access_token.revoked {
        bail!("Token {} has been revoked", access_token.id);
    }
    if access_token.user_id != claims.sub {
        bail!("Token {} was not issued to {}", access_token.id, claims.sub);
    }
    if access_token.expires_at < Utc::now() {
        bail!("Token {} has expired", access_token.id);
    }
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::credentials_validator;
    use crate::oauth::jwt::JWTAuth;
    use crate::user::UserId;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{http, test, web, App, Responder};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use budget_repo::token_repo::{NewAccessToken, TokenRepo};
    use chrono::{Duration, Utc};
    use rstest::fixture;
    use rstest::rstest;
    use std::sync::Arc;

    macro_rules! build_service {
        ($jwt_auth:ident, $token_repo:ident) => {{
            let bearer_auth_middleware = HttpAuthentication::bearer(credentials_validator);
            let app = App::new()
                .app_data($jwt_auth.clone())
                .app_data(web::Data::new($token_repo.clone()))
                .route("/", web::get().to(return_user))
                .wrap(bearer_auth_middleware);
            test::init_service(app).await
        }};
    }

    #[fixture]
    fn jwt_auth() -> JWTAuth {
        let secret: [u8; 32] = rand::random();
        JWTAuth::from_secret(secret.to_vec())
    }

    #[fixture]
    fn token_repo() -> Arc<dyn TokenRepo> {
        budget_repo::mem_repo::create_repos().token_repo
    }

    async fn issue(
        jwt_auth: &JWTAuth,
        token_repo: &Arc<dyn TokenRepo>,
        user_id: &str,
        token_id: &str,
    ) -> String {
        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);
        token_repo
            .create_token(NewAccessToken::new(
                token_id.to_string(),
                user_id.to_string(),
                "2".to_string(),
                expires_at,
            ))
            .await
            .unwrap();
        jwt_auth
            .create_token(user_id.to_string(), token_id.to_string(), expires_at)
            .unwrap()
    }

    fn bearer_request(token: &str) -> TestRequest {
        TestRequest::get().uri("/").insert_header((
            http::header::AUTHORIZATION,
            (String::from("Bearer ") + token),
        ))
    }

    #[rstest]
    #[actix_rt::test]
    async fn valid_user(jwt_auth: JWTAuth, token_repo: Arc<dyn TokenRepo>) {
        let user_id: UserId = "test".into();
        let token = issue(&jwt_auth, &token_repo, &user_id, "token-1").await;

        let service = build_service!(jwt_auth, token_repo);

        let request = bearer_request(&token).to_request();
        let response = test::call_service(&service, request).await;
        assert!(
            response.status().is_success(),
            "Response status is {}",
            response.status()
        );

        let body = test::read_body(response).await;
        assert_eq!(user_id.as_bytes(), &body)
    }

    #[rstest]
    #[actix_rt::test]
    async fn revoked_token(jwt_auth: JWTAuth, token_repo: Arc<dyn TokenRepo>) {
        let token = issue(&jwt_auth, &token_repo, "test", "token-1").await;
        token_repo.revoke_token("token-1").await.unwrap();

        let service = build_service!(jwt_auth, token_repo);

        let request = bearer_request(&token).to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn token_without_record(jwt_auth: JWTAuth, token_repo: Arc<dyn TokenRepo>) {
        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);
        let token = jwt_auth
            .create_token("test".into(), "unknown".into(), expires_at)
            .unwrap();

        let service = build_service!(jwt_auth, token_repo);

        let request = bearer_request(&token).to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn token_of_other_user(jwt_auth: JWTAuth, token_repo: Arc<dyn TokenRepo>) {
        issue(&jwt_auth, &token_repo, "other_user", "token-1").await;
        let expires_at = Utc::now() + Duration::seconds(JWTAuth::EXPIRE_TIME);
        let forged = jwt_auth
            .create_token("test".into(), "token-1".into(), expires_at)
            .unwrap();

        let service = build_service!(jwt_auth, token_repo);

        let request = bearer_request(&forged).to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn no_token(jwt_auth: JWTAuth, token_repo: Arc<dyn TokenRepo>) {
        let service = build_service!(jwt_auth, token_repo);

        let request = TestRequest::get().uri("/").to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    async fn return_user(user_id: web::ReqData<UserId>) -> impl Responder {
        user_id.into_inner()
    }
}
