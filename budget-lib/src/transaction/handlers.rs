use super::TransactionQuery;
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use budget_repo::transaction_repo::{NewTransaction, TransactionRepo};
use std::sync::Arc;

#[post("")]
pub async fn create_new_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    new_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .create_new_transaction(&user_id.into_inner(), new_transaction.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<TransactionQuery>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(&user_id.into_inner(), query.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    updated_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .update_transaction(
            &user_id.into_inner(),
            transaction_id.into_inner(),
            updated_transaction.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
