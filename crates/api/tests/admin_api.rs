//! Integration tests for the admin workflows: reordering, category
//! cascade deletion, and the create/media validation gates that must
//! reject a request before anything reaches the blob store.

mod common;

use atelier_core::catalog::UNCATEGORIZED_CATEGORY;
use atelier_core::media::{MediaItem, MediaKind, MAX_MEDIA_ITEMS};
use atelier_db::models::project::CreateProject;
use atelier_db::repositories::{CategoryRepo, ProjectRepo};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use common::MultipartBody;

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

fn reorder_request(id: i64, direction: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/admin/projects/{id}/reorder"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(json!({ "direction": direction }).to_string()))
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reorder_earlier_swaps_with_the_previous_project(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let a = ProjectRepo::create(&pool, &new_project("a", vec![1], 1)).await.unwrap();
    let b = ProjectRepo::create(&pool, &new_project("b", vec![1], 2)).await.unwrap();
    let c = ProjectRepo::create(&pool, &new_project("c", vec![1], 3)).await.unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let response = app
        .oneshot(reorder_request(b.id, "earlier", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let a_after = ProjectRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    let b_after = ProjectRepo::find_by_id(&pool, b.id).await.unwrap().unwrap();
    let c_after = ProjectRepo::find_by_id(&pool, c.id).await.unwrap().unwrap();
    assert_eq!(b_after.sort_order, Some(1));
    assert_eq!(a_after.sort_order, Some(2));
    assert_eq!(c_after.sort_order, Some(3), "third project is untouched");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reorder_at_the_boundary_is_a_no_op(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let first = ProjectRepo::create(&pool, &new_project("first", vec![1], 1)).await.unwrap();
    ProjectRepo::create(&pool, &new_project("second", vec![1], 2)).await.unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let response = app
        .oneshot(reorder_request(first.id, "earlier", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = ProjectRepo::find_by_id(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(after.sort_order, Some(1), "no swap at the first position");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn category_delete_cascades_through_the_api(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let cat = CategoryRepo::create(&pool, "Temp", "temp").await.unwrap();
    let project = ProjectRepo::create(&pool, &new_project("orphan", vec![cat.id], 1))
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/admin/categories/{}", cat.id))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(after.categories, vec![UNCATEGORIZED_CATEGORY]);
    assert!(CategoryRepo::find_by_id(&pool, cat.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_category_slug_conflicts(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    CategoryRepo::create(&pool, "Web Design", "web-design").await.unwrap();

    let app = common::build_test_app(pool).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/categories")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(json!({ "name": "Web Design" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_empty_category_selection_is_rejected_before_uploads(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let app = common::build_test_app(pool.clone()).await;

    let multipart = MultipartBody::new()
        .text("title", "No categories")
        .text("year", "2024")
        .text("categories", "")
        .file("media", "a.png", "image/png", b"png-bytes");
    let content_type = multipart.content_type();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/projects")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(multipart.finish()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("category"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "no record may be written");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_disallowed_mime_is_rejected_naming_the_file(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let app = common::build_test_app(pool.clone()).await;

    let multipart = MultipartBody::new()
        .text("title", "Bad file")
        .text("year", "2024")
        .text("categories", "1")
        .file("media", "notes.txt", "text/plain", b"hello");
    let content_type = multipart.content_type();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/projects")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(multipart.finish()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("notes.txt"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_implausible_year_is_rejected(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;
    let app = common::build_test_app(pool).await;

    let multipart = MultipartBody::new()
        .text("title", "Time travel")
        .text("year", "1850")
        .text("categories", "1");
    let content_type = multipart.content_type();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/projects")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(multipart.finish()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn eleventh_media_item_is_rejected_with_no_state_change(pool: PgPool) {
    let (_admin_id, token) = common::seed_admin(&pool).await;

    // A project already at the cap.
    let media: Vec<MediaItem> = (0..MAX_MEDIA_ITEMS)
        .map(|i| MediaItem {
            url: format!("https://cdn.test.invalid/portfolio/{i}-img.png"),
            kind: MediaKind::Image,
            description: None,
        })
        .collect();
    let project = ProjectRepo::create(
        &pool,
        &CreateProject {
            title: "full".to_string(),
            description: String::new(),
            year: 2024,
            categories: vec![1],
            cover_image: Some(media[0].url.clone()),
            thumbnail: None,
            media,
            sort_order: 1,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone()).await;

    let multipart = MultipartBody::new().file("media", "extra.png", "image/png", b"png-bytes");
    let content_type = multipart.content_type();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/admin/projects/{}/media", project.id))
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(multipart.finish()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(after.media.0.len(), MAX_MEDIA_ITEMS, "existing media unchanged");
}
