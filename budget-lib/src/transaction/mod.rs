use crate::params::empty_as_none;
use actix_web::{web, Scope};
use budget_repo::transaction_repo::Filter;
use chrono::NaiveDate;
use serde::Deserialize;

mod handlers;

pub fn transaction_service() -> Scope {
    web::scope("/transactions")
        .service(handlers::get_transaction)
        .service(handlers::get_all_transactions)
        .service(handlers::create_new_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
}

#[derive(Deserialize, Debug, Default)]
pub struct TransactionQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub until: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub query: Option<String>,
}

impl From<TransactionQuery> for Filter {
    fn from(query: TransactionQuery) -> Filter {
        Filter {
            from: query.from,
            until: query.until,
            category_id: query.category_id,
            description: query.query,
        }
    }
}
