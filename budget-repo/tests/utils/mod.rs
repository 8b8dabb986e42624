#![allow(dead_code)]

pub mod generator;
pub mod test_user;

use budget_repo::Repos;
use serde::Deserialize;
use std::{env, fs};

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

/// Database used by the `sqlx` cases: `config_test.toml` in the crate directory, or the
/// `TEST_DATABASE_URL` environment variable.
fn test_database_url() -> Option<String> {
    if let Ok(config) = fs::read_to_string("config_test.toml") {
        let config: TestConfig = toml::from_str(&config).unwrap();
        return Some(config.database_url);
    }
    env::var("TEST_DATABASE_URL").ok()
}

/// Returns `None` for `RepoType::SQLx` when no test database is configured, in which case the
/// case is skipped.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::SQLx => match test_database_url() {
            Some(database_url) => Some(
                budget_repo::sqlx_repo::create_repos(database_url, 1)
                    .await
                    .unwrap(),
            ),
            None => {
                eprintln!("no test database configured, skipping sqlx case");
                None
            }
        },
        RepoType::Mem => Some(budget_repo::mem_repo::create_repos()),
    }
}
