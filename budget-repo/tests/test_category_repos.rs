mod utils;

use budget_repo::category_repo::CategoryRepoError;
use budget_repo::transaction_repo::NewTransaction;
use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use utils::generator::{new_category, new_category_named};
use utils::test_user::TestUser;
use utils::RepoType;

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_and_get_category(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    let new_category = new_category();
    let category = repos
        .category_repo
        .create_category(&user.id, new_category.clone())
        .await
        .unwrap();

    let stored_category = repos
        .category_repo
        .get_category(&user.id, category.id)
        .await
        .unwrap();
    assert_eq!(stored_category.name, new_category.name);
    assert_eq!(stored_category.description, new_category.description);
    assert_eq!(stored_category.color, new_category.color);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_categories_sorted_by_name(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    for name in ["Salary", "Groceries", "Rent"] {
        repos
            .category_repo
            .create_category(&user.id, new_category_named(name))
            .await
            .unwrap();
    }

    let names: Vec<String> = repos
        .category_repo
        .get_categories(&user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Groceries", "Rent", "Salary"]);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_category_of_other_user(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user1 = TestUser::new(&repos.user_repo).await;
    let user2 = TestUser::new(&repos.user_repo).await;

    let category = repos
        .category_repo
        .create_category(&user1.id, new_category())
        .await
        .unwrap();

    let result = repos
        .category_repo
        .get_category(&user2.id, category.id)
        .await;
    assert!(matches!(result, Err(CategoryRepoError::CategoryNotFound(id)) if id == category.id));
    assert!(repos
        .category_repo
        .get_categories(&user2.id)
        .await
        .unwrap()
        .is_empty());

    let delete_result = repos
        .category_repo
        .delete_category(&user2.id, category.id)
        .await;
    assert!(delete_result.is_err());
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_category(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    let category = repos
        .category_repo
        .create_category(&user.id, new_category_named("Food"))
        .await
        .unwrap();

    let updated = repos
        .category_repo
        .update_category(&user.id, category.id, new_category_named("Eating Out"))
        .await
        .unwrap();
    assert_eq!(updated.id, category.id);
    assert_eq!(updated.name, "Eating Out");

    let stored_category = repos
        .category_repo
        .get_category(&user.id, category.id)
        .await
        .unwrap();
    assert_eq!(stored_category, updated);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_missing_category(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    let result = repos
        .category_repo
        .update_category(&user.id, 4321, new_category())
        .await;
    assert!(matches!(result, Err(CategoryRepoError::CategoryNotFound(4321))));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_category(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    let category = repos
        .category_repo
        .create_category(&user.id, new_category())
        .await
        .unwrap();

    let deleted = repos
        .category_repo
        .delete_category(&user.id, category.id)
        .await
        .unwrap();
    assert_eq!(deleted, category);

    let result = repos
        .category_repo
        .get_category(&user.id, category.id)
        .await;
    assert!(result.is_err());
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_category_with_transactions(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.user_repo).await;

    let category = repos
        .category_repo
        .create_category(&user.id, new_category())
        .await
        .unwrap();
    let transaction = repos
        .transaction_repo
        .create_new_transaction(
            &user.id,
            NewTransaction::new(
                category.id,
                "Lunch".to_string(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                Decimal::from(-12),
            ),
        )
        .await
        .unwrap();

    let result = repos
        .category_repo
        .delete_category(&user.id, category.id)
        .await;
    assert!(matches!(result, Err(CategoryRepoError::CategoryInUse(id)) if id == category.id));
    assert!(repos
        .category_repo
        .get_category(&user.id, category.id)
        .await
        .is_ok());

    repos
        .transaction_repo
        .delete_transaction(&user.id, transaction.id)
        .await
        .unwrap();
    assert!(repos
        .category_repo
        .delete_category(&user.id, category.id)
        .await
        .is_ok());
}
