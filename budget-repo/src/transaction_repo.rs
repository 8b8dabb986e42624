use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Restricts which transactions are returned. Date bounds are inclusive and `description` is a
/// case-insensitive substring match.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub description: Option<String>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        from: None,
        until: None,
        category_id: None,
        description: None,
    };

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(from) = self.from {
            if transaction.date < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if transaction.date > until {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if transaction.category_id != category_id {
                return false;
            }
        }
        if let Some(description) = &self.description {
            if !transaction
                .description
                .to_lowercase()
                .contains(&description.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Transactions matching `filter`, newest first.
    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub category_id: i32,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl Transaction {
    pub const fn new(
        id: i32,
        category_id: i32,
        description: String,
        date: NaiveDate,
        amount: Decimal,
    ) -> Transaction {
        Transaction {
            id,
            category_id,
            description,
            date,
            amount,
        }
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTransaction {
    pub category_id: i32,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl NewTransaction {
    pub const fn new(
        category_id: i32,
        description: String,
        date: NaiveDate,
        amount: Decimal,
    ) -> NewTransaction {
        NewTransaction {
            category_id,
            description,
            date,
            amount,
        }
    }

    pub fn to_transaction(self, id: i32) -> Transaction {
        Transaction::new(id, self.category_id, self.description, self.date, self.amount)
    }
}
