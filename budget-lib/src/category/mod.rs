use crate::params::empty_as_none;
use actix_web::{web, Scope};
use budget_repo::category_repo::{NewCategory, DEFAULT_COLOR};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

mod handlers;
pub mod view;

pub fn category_service() -> Scope {
    web::scope("/categories")
        .service(handlers::index)
        .service(handlers::show)
        .service(handlers::store)
        .service(handlers::update)
        .service(handlers::destroy)
}

#[derive(Deserialize, Validate, Debug)]
pub struct CategoryForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 7))]
    pub color: Option<String>,
}

impl CategoryForm {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory::new(
            self.name,
            self.description,
            self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        )
    }
}

#[derive(Deserialize, Debug)]
pub struct DeleteForm {
    #[serde(default)]
    pub category_id: Option<String>,
}

impl DeleteForm {
    /// Whether the form confirms deletion of `category_id`.
    pub fn confirms(&self, category_id: i32) -> bool {
        self.category_id
            .as_deref()
            .and_then(|id| id.trim().parse::<i32>().ok())
            == Some(category_id)
    }
}

/// `?action=edit&id=3` on the listing selects the category being edited or deleted.
#[derive(Deserialize, Debug)]
pub struct IndexQuery {
    pub action: Option<String>,
    pub id: Option<String>,
}

impl IndexQuery {
    pub fn editable_id(&self) -> Option<i32> {
        match self.action.as_deref() {
            Some("edit") | Some("delete") => self.id.as_deref()?.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ShowQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
}
