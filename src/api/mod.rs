//! API handlers for Bibliotheca REST endpoints

pub mod authors;
pub mod books;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;

use axum::{
    extract::FromRequest,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON body extractor whose rejections surface as validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:id/loan", post(books::loan_book))
        .route("/books/:id/return_book", post(books::return_book))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route("/members/top-active", get(members::top_active_members))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route("/members/:id/loans", get(members::get_member_loans))
        // Loans
        .route("/loans", get(loans::list_loans))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/extend_due_date", post(loans::extend_due_date))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        repository::Repository,
        services::{notifications::InMemoryQueue, Services},
    };

    /// Router over a pool that never connects; only requests rejected before
    /// touching the database can be exercised.
    fn offline_router() -> Router {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let (queue, _receiver) = InMemoryQueue::new();
        let services = Services::new(Repository::new(pool), &config, Arc::new(queue));
        create_router(AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = offline_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_extend_due_date_rejects_non_numeric_days() {
        let (status, body) = send(post_json(
            "/api/v1/loans/1/extend_due_date",
            r#"{"additional_days": "soon"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_loan_rejects_malformed_body() {
        let (status, body) = send(post_json("/api/v1/books/1/loan", "{member_id:")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_create_member_validates_before_storage() {
        let (status, body) = send(post_json(
            "/api/v1/members",
            r#"{"email": "nope", "username": "x"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::get("/api/v1/shelves").body(Body::empty()).unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let request = Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/books/{id}/loan"].is_object());
        assert!(body["paths"]["/members/top-active"].is_object());
    }
}
