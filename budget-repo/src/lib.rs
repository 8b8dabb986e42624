use std::sync::Arc;

use category_repo::CategoryRepo;
use token_repo::TokenRepo;
use transaction_repo::TransactionRepo;
use user_repo::UserRepo;

pub mod category_repo;
pub mod token_repo;
pub mod transaction_repo;
pub mod user_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

/// Handles to every store the service needs. All handles of one set share the same backing
/// storage, so foreign keys between them hold.
#[derive(Clone)]
pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub token_repo: Arc<dyn TokenRepo>,
    pub category_repo: Arc<dyn CategoryRepo>,
    pub transaction_repo: Arc<dyn TransactionRepo>,
}
