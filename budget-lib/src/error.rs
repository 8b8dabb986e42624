use actix_web::body::BoxBody;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use budget_repo::category_repo::CategoryRepoError;
use budget_repo::token_repo::TokenRepoError;
use budget_repo::transaction_repo::TransactionRepoError;
use budget_repo::user_repo::UserRepoError;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    User(#[from] UserRepoError),
    #[error(transparent)]
    Token(#[from] TokenRepoError),
    #[error(transparent)]
    Category(#[from] CategoryRepoError),
    #[error(transparent)]
    Transaction(#[from] TransactionRepoError),
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::User(UserRepoError::UserNotFound(_))
            | HandlerError::Token(TokenRepoError::TokenNotFound(_))
            | HandlerError::Category(CategoryRepoError::CategoryNotFound(_))
            | HandlerError::Transaction(TransactionRepoError::TransactionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            HandlerError::User(UserRepoError::UserAlreadyExists(_))
            | HandlerError::Category(CategoryRepoError::CategoryInUse(_)) => StatusCode::CONFLICT,
            HandlerError::Transaction(TransactionRepoError::CategoryNotFound(_))
            | HandlerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        match self {
            HandlerError::Validation(errors) => HttpResponse::build(status).json(errors),
            _ if status.is_server_error() => {
                error!(error = ?self, "Request failed");
                HttpResponse::build(status).finish()
            }
            _ => HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() })),
        }
    }
}

/// Reports JSON bodies that fail to deserialize as `400` with the parser's message.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        error!(req_path = req.path(), %err);
        match err {
            JsonPayloadError::Deserialize(deserialize_err) => {
                let error_body = serde_json::json!({
                    "error": "Unable to parse JSON payload",
                    "detail": format!("{}", deserialize_err),
                });
                actix_web::error::InternalError::from_response(
                    deserialize_err,
                    HttpResponse::BadRequest()
                        .content_type("application/json")
                        .body(error_body.to_string()),
                )
                .into()
            }
            _ => err.into(),
        }
    })
}
