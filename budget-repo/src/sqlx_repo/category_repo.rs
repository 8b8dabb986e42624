use super::{has_error_code, SQLxRepo, FOREIGN_KEY_VIOLATION};
use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CategoryEntry {
    id: i32,
    name: String,
    description: Option<String>,
    color: String,
}

impl From<CategoryEntry> for Category {
    fn from(value: CategoryEntry) -> Self {
        Category::new(value.id, value.name, value.description, value.color)
    }
}

#[async_trait]
impl CategoryRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError> {
        let entries = query_as::<_, CategoryEntry>(
            "SELECT id, name, description, color FROM categories WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get categories for user {}", user))?;
        Ok(entries.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let entry = query_as::<_, CategoryEntry>(
            "SELECT id, name, description, color FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(category_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get category {}", category_id))?;
        entry
            .map(Category::from)
            .ok_or(CategoryNotFound(category_id))
    }

    #[instrument(skip(self, new_category))]
    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO categories(name, description, color, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_category.name)
        .bind(&new_category.description)
        .bind(&new_category.color)
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .context("Unable to insert category")?;

        Ok(new_category.to_category(id))
    }

    #[instrument(skip(self, updated_category))]
    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, description = $2, color = $3 WHERE id = $4 AND user_id = $5",
        )
        .bind(&updated_category.name)
        .bind(&updated_category.description)
        .bind(&updated_category.color)
        .bind(category_id)
        .bind(user)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update category {}", category_id))?;
        if result.rows_affected() == 0 {
            Err(CategoryNotFound(category_id))
        } else {
            Ok(updated_category.to_category(category_id))
        }
    }

    #[instrument(skip(self))]
    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let result = query_as::<_, CategoryEntry>(
            "DELETE FROM categories WHERE id = $1 AND user_id = $2 RETURNING id, name, description, color",
        )
        .bind(category_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(entry) => entry
                .map(Category::from)
                .ok_or(CategoryNotFound(category_id)),
            Err(e) if has_error_code(&e, FOREIGN_KEY_VIOLATION) => Err(CategoryInUse(category_id)),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to delete category {}", category_id))
                .into()),
        }
    }
}
