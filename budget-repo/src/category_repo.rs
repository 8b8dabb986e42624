use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_COLOR: &str = "#aabbcc";

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl Category {
    pub fn new(id: i32, name: String, description: Option<String>, color: String) -> Category {
        Category {
            id,
            name,
            description,
            color,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl NewCategory {
    pub fn new(name: String, description: Option<String>, color: String) -> NewCategory {
        NewCategory {
            name,
            description,
            color,
        }
    }

    pub fn to_category(self, id: i32) -> Category {
        Category::new(id, self.name, self.description, self.color)
    }
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category with id {0} still has transactions")]
    CategoryInUse(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait CategoryRepo: Sync + Send {
    /// Categories of the user, ordered by name.
    async fn get_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError>;

    async fn get_category(&self, user: &str, category_id: i32)
        -> Result<Category, CategoryRepoError>;

    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    /// Fails with [CategoryRepoError::CategoryInUse] while any transaction references the
    /// category.
    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError>;
}
