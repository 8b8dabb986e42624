use super::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{CategoryNotFound, TransactionNotFound};
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{query_as, query_scalar, QueryBuilder};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    category_id: i32,
    description: String,
    date: NaiveDate,
    amount: Decimal,
}

impl From<TransactionEntry> for Transaction {
    fn from(value: TransactionEntry) -> Self {
        Transaction::new(
            value.id,
            value.category_id,
            value.description,
            value.date,
            value.amount,
        )
    }
}

/// Turns a plain search string into an ILIKE pattern that matches it literally anywhere.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn category_exists(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<bool, TransactionRepoError> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
        )
        .bind(category_id)
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Unable to check category {}", category_id))?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn get_transaction_entry(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Option<TransactionEntry>, TransactionRepoError> {
        let transaction_entry = query_as::<_, TransactionEntry>(
            "SELECT id, category_id, description, date, amount FROM transactions WHERE id = $1 AND user_id = $2",
        )
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        Ok(transaction_entry)
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        self.get_transaction_entry(user, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))
            .map(|t| t.into())
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(
            "SELECT id, category_id, description, date, amount FROM transactions WHERE user_id = ",
        );
        query_builder.push_bind(user);
        if let Some(from) = filter.from {
            query_builder.push(" AND date >= ").push_bind(from);
        }
        if let Some(until) = filter.until {
            query_builder.push(" AND date <= ").push_bind(until);
        }
        if let Some(category_id) = filter.category_id {
            query_builder.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(description) = filter.description {
            query_builder
                .push(" AND description ILIKE ")
                .push_bind(contains_pattern(&description))
                .push(r" ESCAPE '\'");
        }
        query_builder.push(" ORDER BY date DESC, id DESC");

        let transaction_entries: Vec<TransactionEntry> = query_builder
            .build_query_as::<TransactionEntry>()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get transactions for user {}", user))?;

        Ok(transaction_entries
            .into_iter()
            .map(|transaction_entry| transaction_entry.into())
            .collect())
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let id: Option<i32> = query_scalar(
            "INSERT INTO transactions(category_id, description, date, amount, user_id) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $5) \
             RETURNING id",
        )
        .bind(new_transaction.category_id)
        .bind(&new_transaction.description)
        .bind(new_transaction.date)
        .bind(new_transaction.amount)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .context("Unable to insert transaction")?;

        match id {
            Some(id) => Ok(new_transaction.to_transaction(id)),
            None => Err(CategoryNotFound(new_transaction.category_id)),
        }
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        if self
            .get_transaction_entry(user, transaction_id)
            .await?
            .is_none()
        {
            return Err(TransactionNotFound(transaction_id));
        }
        if !self
            .category_exists(user, updated_transaction.category_id)
            .await?
        {
            return Err(CategoryNotFound(updated_transaction.category_id));
        }

        let result = sqlx::query(
            "UPDATE transactions SET category_id = $1, description = $2, date = $3, amount = $4 WHERE user_id = $5 AND id = $6",
        )
        .bind(updated_transaction.category_id)
        .bind(&updated_transaction.description)
        .bind(updated_transaction.date)
        .bind(updated_transaction.amount)
        .bind(user)
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?;
        if result.rows_affected() == 0 {
            Err(TransactionNotFound(transaction_id))
        } else {
            Ok(updated_transaction.to_transaction(transaction_id))
        }
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_entry = query_as::<_, TransactionEntry>(
            "DELETE FROM transactions WHERE user_id = $1 AND id = $2 RETURNING id, category_id, description, date, amount",
        )
        .bind(user)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete transaction {}", transaction_id))?
        .ok_or(TransactionNotFound(transaction_id))?;
        Ok(transaction_entry.into())
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn plain_search_is_wrapped() {
        assert_eq!(contains_pattern("rent"), "%rent%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
