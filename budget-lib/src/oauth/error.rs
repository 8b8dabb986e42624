use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures of the password grant, rendered as OAuth2 error responses.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("The request is missing a required parameter, includes an invalid parameter value, includes a parameter more than once, or is otherwise malformed.")]
    InvalidRequest(&'static str),
    #[error("The authorization grant type is not supported by the authorization server.")]
    UnsupportedGrantType,
    #[error("Client authentication failed")]
    InvalidClient,
    #[error("The user credentials were incorrect.")]
    InvalidGrant,
    #[error("The authorization server encountered an unexpected condition which prevented it from fulfilling the request.")]
    ServerError(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    error_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    message: String,
}

impl OAuthError {
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::InvalidRequest(_) => "invalid_request",
            OAuthError::UnsupportedGrantType => "unsupported_grant_type",
            OAuthError::InvalidClient => "invalid_client",
            OAuthError::InvalidGrant => "invalid_grant",
            OAuthError::ServerError(_) => "server_error",
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            OAuthError::InvalidRequest(parameter) => {
                Some(format!("Check the `{}` parameter", parameter))
            }
            _ => None,
        }
    }
}

impl ResponseError for OAuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            OAuthError::InvalidClient => StatusCode::UNAUTHORIZED,
            OAuthError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        if let OAuthError::ServerError(e) = self {
            error!(error = ?e, "Unable to issue token");
        }
        let description = self.to_string();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            error_description: description.clone(),
            hint: self.hint(),
            message: description,
        })
    }
}
