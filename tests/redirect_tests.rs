//! Redirect endpoint tests
//!
//! The most critical path: link id → 307 redirect plus exactly one counted
//! access. Unknown ids get a plain 404, never a fallback redirect.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};

use redirectory::services::redirect::redirect_routes;
use redirectory::storages::LinkStore;
use redirectory::storages::memory::MemoryStore;

fn storage() -> Arc<dyn LinkStore> {
    Arc::new(MemoryStore::new(6))
}

#[actix_web::test]
async fn test_redirect_hit_returns_307_with_location() {
    let storage = storage();
    let record = storage.create("https://example.com").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .configure(redirect_routes),
    )
    .await;

    let req = TestRequest::get()
        .uri(&format!("/redirect/{}", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp
        .headers()
        .get("Location")
        .expect("Location header")
        .to_str()
        .unwrap();
    assert_eq!(location, "https://example.com");

    assert_eq!(storage.get(&record.id).await.unwrap().access_count, 1);
}

#[actix_web::test]
async fn test_redirect_miss_returns_404() {
    let storage = storage();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .configure(redirect_routes),
    )
    .await;

    let req = TestRequest::get().uri("/redirect/nothere").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Not Found");
}

#[actix_web::test]
async fn test_each_hit_counts_once_and_sees_current_target() {
    let storage = storage();
    let record = storage.create("https://example.com").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .configure(redirect_routes),
    )
    .await;

    for _ in 0..3 {
        let req = TestRequest::get()
            .uri(&format!("/redirect/{}", record.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }
    assert_eq!(storage.get(&record.id).await.unwrap().access_count, 3);

    // an edit between resolutions is observed by the next hit
    storage
        .update(&record.id, "https://example.org")
        .await
        .unwrap();

    let req = TestRequest::get()
        .uri(&format!("/redirect/{}", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://example.org");
    assert_eq!(storage.get(&record.id).await.unwrap().access_count, 4);
}

#[actix_web::test]
async fn test_deleted_link_stops_redirecting() {
    let storage = storage();
    let record = storage.create("https://example.com").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .configure(redirect_routes),
    )
    .await;

    storage.remove(&record.id).await.unwrap();

    let req = TestRequest::get()
        .uri(&format!("/redirect/{}", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
