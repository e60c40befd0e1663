use super::*;
use axum::{
    body::{self, Body},
    http::{header, Method, Request},
};
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let settings = Settings {
        allowed_origins: vec![
            "http://localhost:4200".to_string(),
            "https://*.example.dev".to_string(),
        ],
        ..Settings::default()
    };
    let app = build_router(
        Arc::new(AppState {
            api: ApiContext {
                storage: storage.clone(),
            },
        }),
        &settings,
    );
    (app, storage)
}

async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&body).expect("json"))
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn hello_route_greets() {
    let (app, _storage) = test_app().await;
    let (status, hello): (_, HelloResponse) = get_json(app, "/api/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hello.message, "Hello World");
}

#[tokio::test]
async fn organizations_route_returns_names_in_order() {
    let (app, storage) = test_app().await;
    for name in ["Acme", "Globex", "Acme"] {
        storage.create_organization(name).await.expect("insert");
    }

    let (status, names): (_, Vec<String>) = get_json(app, "/api/organizations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names, vec!["Acme", "Globex", "Acme"]);
}

#[tokio::test]
async fn organizations_route_returns_empty_array() {
    let (app, _storage) = test_app().await;
    let (status, names): (_, Vec<String>) = get_json(app, "/api/organizations").await;
    assert_eq!(status, StatusCode::OK);
    assert!(names.is_empty());
}

#[tokio::test]
async fn storage_failure_maps_to_error_bodies() {
    let (app, storage) = test_app().await;
    storage.pool().close().await;

    let (status, err): (_, ApiError) = get_json(app.clone(), "/api/organizations").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code, ErrorCode::Internal);

    let (status, err): (_, ApiError) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err.code, ErrorCode::Unavailable);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origins_with_credentials() {
    let (app, _storage) = test_app().await;

    for origin in ["http://localhost:4200", "https://study.example.dev"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/organizations")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let headers = response.headers();
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some(origin)
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }
}

#[tokio::test]
async fn cors_rejects_unknown_origin() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/api/organizations")
        .header(header::ORIGIN, "https://evil.test")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn large_listings_are_gzipped_small_ones_are_not() {
    let (app, storage) = test_app().await;

    let request = Request::get("/api/hello")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

    for i in 0..100 {
        storage
            .create_organization(&format!("Organization number {i:03}"))
            .await
            .expect("insert");
    }
    let request = Request::get("/api/organizations")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok()),
        Some("gzip")
    );
}
