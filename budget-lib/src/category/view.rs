use super::ShowQuery;
use crate::flash::FlashMessage;
use budget_repo::category_repo::Category;
use budget_repo::transaction_repo::{Filter, Transaction};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct CategoryListView {
    pub categories: Vec<Category>,
    pub editable_category: Option<Category>,
    pub flash: Option<FlashMessage>,
}

#[derive(Serialize, Debug)]
pub struct CategoryDetailView {
    pub category: Category,
    pub transactions: Vec<Transaction>,
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub query: String,
    pub income_total: Decimal,
    pub spending_total: Decimal,
    pub flash: Option<FlashMessage>,
}

/// Filters of the category page with defaults filled in.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransactionFilters {
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub query: String,
}

impl TransactionFilters {
    /// Missing values default to the current year, the first of the current month and `today`.
    pub fn resolve(query: ShowQuery, today: NaiveDate) -> TransactionFilters {
        TransactionFilters {
            year: query.year.unwrap_or_else(|| today.year()),
            start_date: query
                .start_date
                .unwrap_or_else(|| today.with_day(1).unwrap_or(today)),
            end_date: query.end_date.unwrap_or(today),
            query: query.query.unwrap_or_default(),
        }
    }

    pub fn to_filter(&self, category_id: i32) -> Filter {
        Filter {
            from: Some(self.start_date),
            until: Some(self.end_date),
            category_id: Some(category_id),
            description: Some(self.query.clone()).filter(|q| !q.is_empty()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Totals {
    pub income: Decimal,
    pub spending: Decimal,
}

/// Income is the sum of positive amounts, spending the magnitude of the negative ones.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for transaction in transactions {
        if transaction.amount > Decimal::ZERO {
            totals.income += transaction.amount;
        } else if transaction.amount < Decimal::ZERO {
            totals.spending -= transaction.amount;
        }
    }
    totals
}
