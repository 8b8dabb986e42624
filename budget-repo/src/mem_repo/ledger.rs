use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct StoredTransaction {
    user: String,
    transaction: Transaction,
}

struct State {
    categories: HashMap<i32, Category>,
    user_categories: HashMap<String, HashSet<i32>>,
    transactions: HashMap<i32, StoredTransaction>,
    next_category_id: i32,
    next_transaction_id: i32,
}

impl State {
    fn owns_category(&self, user: &str, category_id: i32) -> bool {
        self.user_categories
            .get(user)
            .map_or(false, |ids| ids.contains(&category_id))
    }

    fn owned_transaction(&self, user: &str, transaction_id: i32) -> Option<&Transaction> {
        self.transactions
            .get(&transaction_id)
            .filter(|stored| stored.user == user)
            .map(|stored| &stored.transaction)
    }
}

/// Categories and transactions share one lock so that the category reference of every
/// transaction can be checked atomically.
pub struct MemLedger {
    state: RwLock<State>,
}

impl MemLedger {
    pub fn new() -> MemLedger {
        let state = State {
            categories: HashMap::new(),
            user_categories: HashMap::new(),
            transactions: HashMap::new(),
            next_category_id: 1,
            next_transaction_id: 1,
        };
        MemLedger {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryRepo for MemLedger {
    async fn get_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        let Some(category_ids) = read_guard.user_categories.get(user) else {
            return Ok(Vec::new());
        };

        let mut categories: Vec<Category> = category_ids
            .iter()
            .map(|id| {
                read_guard
                    .categories
                    .get(id)
                    .expect("categories should have all the ids from user_categories")
            })
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(categories)
    }

    async fn get_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        if !read_guard.owns_category(user, category_id) {
            return Err(CategoryNotFound(category_id));
        }

        let category = read_guard
            .categories
            .get(&category_id)
            .expect("categories should contain same ids as user_categories")
            .clone();
        Ok(category)
    }

    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_category_id;
        write_guard.next_category_id += 1;

        let category = new_category.to_category(id);

        write_guard.categories.insert(id, category.clone());
        write_guard
            .user_categories
            .entry(user.to_owned())
            .or_default()
            .insert(id);

        Ok(category)
    }

    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_category(user, category_id) {
            return Err(CategoryNotFound(category_id));
        }

        match write_guard.categories.entry(category_id) {
            Entry::Occupied(mut e) => {
                let category = updated_category.to_category(category_id);
                e.insert(category.clone());
                Ok(category)
            }
            Entry::Vacant(_) => Err(CategoryNotFound(category_id)),
        }
    }

    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_category(user, category_id) {
            return Err(CategoryNotFound(category_id));
        }
        if write_guard
            .transactions
            .values()
            .any(|stored| stored.transaction.category_id == category_id)
        {
            return Err(CategoryInUse(category_id));
        }

        if let Some(ids) = write_guard.user_categories.get_mut(user) {
            ids.remove(&category_id);
        }
        write_guard
            .categories
            .remove(&category_id)
            .ok_or(CategoryNotFound(category_id))
    }
}

#[async_trait]
impl TransactionRepo for MemLedger {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .owned_transaction(user, transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let mut transactions: Vec<Transaction> = read_guard
            .transactions
            .values()
            .filter(|stored| stored.user == user && filter.matches(&stored.transaction))
            .map(|stored| stored.transaction.clone())
            .collect();
        transactions.sort_by(|a, b| b.cmp(a));

        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_category(user, new_transaction.category_id) {
            return Err(TransactionRepoError::CategoryNotFound(
                new_transaction.category_id,
            ));
        }

        let id = write_guard.next_transaction_id;
        write_guard.next_transaction_id += 1;

        let transaction = new_transaction.to_transaction(id);
        write_guard.transactions.insert(
            id,
            StoredTransaction {
                user: user.to_owned(),
                transaction: transaction.clone(),
            },
        );

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .owned_transaction(user, transaction_id)
            .is_none()
        {
            return Err(TransactionNotFound(transaction_id));
        }
        if !write_guard.owns_category(user, updated_transaction.category_id) {
            return Err(TransactionRepoError::CategoryNotFound(
                updated_transaction.category_id,
            ));
        }

        let transaction = updated_transaction.to_transaction(transaction_id);
        write_guard.transactions.insert(
            transaction_id,
            StoredTransaction {
                user: user.to_owned(),
                transaction: transaction.clone(),
            },
        );
        Ok(transaction)
    }

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .owned_transaction(user, transaction_id)
            .is_none()
        {
            return Err(TransactionNotFound(transaction_id));
        }

        write_guard
            .transactions
            .remove(&transaction_id)
            .map(|stored| stored.transaction)
            .ok_or(TransactionNotFound(transaction_id))
    }
}
