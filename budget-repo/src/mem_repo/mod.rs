use crate::Repos;
use std::sync::Arc;

mod ledger;
mod token_repo;
mod user_repo;

pub use ledger::MemLedger;
pub use token_repo::MemTokenRepo;
pub use user_repo::MemUserRepo;

pub fn create_repos() -> Repos {
    let ledger = Arc::new(MemLedger::new());

    Repos {
        user_repo: Arc::new(MemUserRepo::new()),
        token_repo: Arc::new(MemTokenRepo::new()),
        category_repo: ledger.clone(),
        transaction_repo: ledger,
    }
}
