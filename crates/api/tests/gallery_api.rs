//! Integration tests for the public surface: gallery listing/filtering,
//! project detail, category listing, and contact intake.

mod common;

use atelier_db::models::project::CreateProject;
use atelier_db::repositories::{CategoryRepo, ProjectRepo};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

fn new_project(title: &str, categories: Vec<i64>, sort_order: i64) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        description: String::new(),
        year: 2024,
        categories,
        cover_image: None,
        thumbnail: None,
        media: Vec::new(),
        sort_order,
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn gallery_lists_projects_in_catalog_order(pool: PgPool) {
    ProjectRepo::create(&pool, &new_project("second", vec![1], 2))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("first", vec![1], 1))
        .await
        .unwrap();
    // A row that never received an order sorts last.
    sqlx::query("INSERT INTO projects (title, description, year, categories) VALUES ('unordered', '', 2024, ARRAY[1]::BIGINT[])")
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool).await;
    let response = get(app, "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    let titles: Vec<&str> = json["data"]["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first", "second", "unordered"]);
    assert!(json["data"]["error"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn gallery_filters_by_category(pool: PgPool) {
    let web = CategoryRepo::create(&pool, "Web", "web").await.unwrap();
    let print = CategoryRepo::create(&pool, "Print", "print").await.unwrap();
    ProjectRepo::create(&pool, &new_project("site", vec![web.id], 1))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("poster", vec![print.id], 2))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("both", vec![web.id, print.id], 3))
        .await
        .unwrap();

    let app = common::build_test_app(pool).await;

    let all = response_json(get(app.clone(), "/api/v1/projects?category=all").await).await;
    assert_eq!(all["data"]["projects"].as_array().unwrap().len(), 3);

    let web_only =
        response_json(get(app.clone(), &format!("/api/v1/projects?category={}", web.id)).await)
            .await;
    let titles: Vec<&str> = web_only["data"]["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["site", "both"]);

    let bad = get(app, "/api/v1/projects?category=web-design").await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn project_detail_and_missing_project(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("solo", vec![1], 1))
        .await
        .unwrap();

    let app = common::build_test_app(pool).await;

    let found = get(app.clone(), &format!("/api/v1/projects/{}", project.id)).await;
    assert_eq!(found.status(), StatusCode::OK);
    let json = response_json(found).await;
    assert_eq!(json["data"]["title"], "solo");

    let missing = get(app, "/api/v1/projects/424242").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn categories_listed_by_name(pool: PgPool) {
    CategoryRepo::create(&pool, "Web", "web").await.unwrap();
    CategoryRepo::create(&pool, "Branding", "branding").await.unwrap();

    let app = common::build_test_app(pool).await;
    let json = response_json(get(app, "/api/v1/categories").await).await;

    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Branding", "Web"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn contact_message_is_recorded(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Visitor",
                        "email": "visitor@example.com",
                        "message": "Hello!",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn contact_message_with_invalid_email_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Visitor",
                        "email": "not-an-email",
                        "message": "Hello!",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "rejected submissions must not be stored");
}
