mod category_repo;
mod token_repo;
mod transaction_repo;
mod user_repo;

use crate::Repos;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tracing::info;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

pub async fn create_repos(
    database_url: String,
    max_pool_size: u32,
) -> Result<Repos, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;
    info!("Database pool created");

    info!("Running migrations");
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Unable to run migrations")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok(Repos {
        user_repo: repo.clone(),
        token_repo: repo.clone(),
        category_repo: repo.clone(),
        transaction_repo: repo,
    })
}

fn has_error_code(error: &sqlx::Error, code: &str) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(code),
        _ => false,
    }
}
