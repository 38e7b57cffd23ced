use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait, Value};
use uuid::Uuid;

use blog_core::error::RepoError;
use blog_core::filter::{FilterParams, PostFilter};
use blog_core::pagination::PageRequest;
use blog_core::ports::{PostRepository, UserRepository};

use super::entity::{post, user};
use super::postgres_repo::filtered_query;
use super::{PostgresPostRepository, PostgresUserRepository};

fn user_model(username: &str) -> user::Model {
    let now = chrono::Utc::now();
    user::Model {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        password_hash: "hash".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn post_model(id: i32, author: &user::Model) -> post::Model {
    post::Model {
        id,
        post_title: "test post".to_owned(),
        post_content: "howdy howdy howdy".to_owned(),
        author_id: author.id,
        created_date: NaiveDate::from_ymd_opt(2004, 8, 24).unwrap(),
    }
}

fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(count))])
}

fn sql_for(params: FilterParams<'_>) -> String {
    let filter = PostFilter::from_params(&params).unwrap();
    filtered_query(&filter)
        .build(DatabaseBackend::Postgres)
        .to_string()
}

#[tokio::test]
async fn test_find_post_by_id_resolves_author() {
    let author = user_model("testuser");
    let row = post_model(7, &author);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[(row, author.clone())]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let post = repo.find_by_id(7).await.unwrap().unwrap();

    assert_eq!(post.id, 7);
    assert_eq!(post.post_title, "test post");
    assert_eq!(post.author.id, author.id);
    assert_eq!(post.author.username, "testuser");
}

#[tokio::test]
async fn test_find_missing_post_returns_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<(post::Model, user::Model)>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_id(404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        PostRepository::delete(&repo, 404).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_fetches_the_requested_page() {
    let author = user_model("testuser");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(3)]])
        .append_query_results([[(post_model(3, &author), author.clone())]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let page = repo
        .list(&PostFilter::default(), PageRequest::new(2, 2))
        .await
        .unwrap();

    assert_eq!(page.count, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].author.username, "testuser");
}

#[tokio::test]
async fn test_list_past_the_last_page_skips_the_page_query() {
    // Only the count query has a result; a page query would fail the mock.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(3)]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let page = repo
        .list(&PostFilter::default(), PageRequest::new(u64::MAX / 2, 10))
        .await
        .unwrap();

    assert_eq!(page.count, 3);
    assert!(page.items.is_empty());
    assert!(page.is_out_of_range());
}

#[tokio::test]
async fn test_find_user_by_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model("user_a")]])
        .into_connection();
    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_username("user_a").await.unwrap().unwrap();
    assert_eq!(user.username, "user_a");
}

#[test]
fn test_default_query_orders_newest_first() {
    let sql = sql_for(FilterParams::default());

    assert!(sql.contains(r#"LEFT JOIN "users""#));
    assert!(sql.contains(r#"ORDER BY "posts"."created_date" DESC, "posts"."id" DESC"#));
    assert!(!sql.contains("LIKE"));
}

#[test]
fn test_title_filter_is_case_insensitive() {
    let sql = sql_for(FilterParams {
        post_title: Some("Test"),
        ..Default::default()
    });

    assert!(sql.contains(r#"LOWER("posts"."post_title") LIKE '%test%'"#));
}

#[test]
fn test_author_and_date_filters_compose() {
    let sql = sql_for(FilterParams {
        author_username: Some("user_a"),
        created_date: Some("2004-08-24"),
        ..Default::default()
    });

    assert!(sql.contains(r#"LOWER("users"."username") LIKE"#));
    assert!(sql.contains(r#""posts"."created_date" = '2004-08-24'"#));
    assert!(sql.contains(" AND "));
}

#[test]
fn test_search_spans_title_content_and_author() {
    let sql = sql_for(FilterParams {
        search: Some("howdy"),
        ordering: Some("post_title"),
        ..Default::default()
    });

    assert!(sql.contains(r#"LOWER("posts"."post_title") LIKE '%howdy%'"#));
    assert!(sql.contains(r#"LOWER("posts"."post_content") LIKE '%howdy%'"#));
    assert!(sql.contains(r#"LOWER("users"."username") LIKE '%howdy%'"#));
    assert!(sql.contains(" OR "));
    assert!(sql.contains(r#"ORDER BY LOWER("posts"."post_title") ASC, "posts"."id" DESC"#));
}
