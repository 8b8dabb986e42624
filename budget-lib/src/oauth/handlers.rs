use super::{OAuthError, TokenIssuer, TokenRequest};
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

#[post("/token")]
pub async fn issue_token(
    issuer: web::Data<Arc<dyn TokenIssuer>>,
    request: web::Form<TokenRequest>,
) -> Result<HttpResponse, OAuthError> {
    let response = issuer.issue_token(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
