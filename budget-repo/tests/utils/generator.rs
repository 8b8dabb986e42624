use budget_repo::category_repo::{NewCategory, DEFAULT_COLOR};
use budget_repo::transaction_repo::NewTransaction;
use chrono::NaiveDate;
use fake::faker::lorem::en::{Sentence, Word};
use fake::{Fake, Faker};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

pub fn new_category() -> NewCategory {
    let name: String = Word().fake();
    let description: Option<String> = Some(Sentence(3..6).fake());
    NewCategory::new(name, description, DEFAULT_COLOR.to_string())
}

pub fn new_category_named(name: &str) -> NewCategory {
    NewCategory::new(name.to_string(), None, DEFAULT_COLOR.to_string())
}

pub struct NewTransactionGenerator {
    category_id: i32,
    descriptions: Vec<String>,
    dates: Vec<NaiveDate>,
    amounts: Vec<Decimal>,
    position: usize,
}

impl NewTransactionGenerator {
    pub fn for_category(category_id: i32) -> NewTransactionGenerator {
        NewTransactionGenerator {
            category_id,
            descriptions: Vec::new(),
            dates: Vec::new(),
            amounts: Vec::new(),
            position: 0,
        }
    }

    pub fn with_descriptions(mut self, descriptions: Vec<&str>) -> NewTransactionGenerator {
        self.descriptions = descriptions.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dates(mut self, dates: Vec<&str>) -> NewTransactionGenerator {
        self.dates = dates.into_iter().map(|d| d.parse().unwrap()).collect();
        self
    }

    pub fn with_amounts(mut self, amounts: Vec<i64>) -> NewTransactionGenerator {
        self.amounts = amounts.into_iter().map(Decimal::from).collect();
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        let position = self.position;
        self.position += 1;

        let description = self
            .descriptions
            .get(position)
            .cloned()
            .unwrap_or_else(|| Sentence(2..5).fake());
        let date = self.dates.get(position).copied().unwrap_or_else(|| {
            *[
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            ]
            .choose(&mut rand::thread_rng())
            .unwrap()
        });
        let amount = self
            .amounts
            .get(position)
            .copied()
            .unwrap_or_else(|| Decimal::from(Faker.fake::<i16>()));

        NewTransaction::new(self.category_id, description, date, amount)
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        (0..count).map(|_| self.generate()).collect()
    }
}
