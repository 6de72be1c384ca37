//! API Routes
//!
//! Configures the Axum router with all messaging endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_participant, cache_stats, create_conversation, delete_message, edit_message, get_messages,
    health, list_conversations, mark_read, remove_participant, send_message, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET    /api/conversations` - List the caller's conversations
/// - `POST   /api/conversations` - Create a conversation
/// - `GET    /api/conversations/:id/messages` - Page through messages
/// - `POST   /api/conversations/:id/messages` - Send a message
/// - `PATCH  /api/conversations/:id/messages/:message_id` - Edit a message
/// - `DELETE /api/conversations/:id/messages/:message_id` - Delete a message
/// - `POST   /api/conversations/:id/read` - Mark conversation as read
/// - `POST   /api/conversations/:id/participants` - Add a participant
/// - `DELETE /api/conversations/:id/participants/:user_id` - Remove a participant
/// - `GET    /api/cache/stats` - Cache occupancy and counters
/// - `GET    /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/:id/messages",
            get(get_messages).post(send_message),
        )
        .route(
            "/api/conversations/:id/messages/:message_id",
            delete(delete_message).patch(edit_message),
        )
        .route("/api/conversations/:id/read", post(mark_read))
        .route("/api/conversations/:id/participants", post(add_participant))
        .route(
            "/api/conversations/:id/participants/:user_id",
            delete(remove_participant),
        )
        .route("/api/cache/stats", get(cache_stats))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_conversations_require_identity() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/conversations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_conversation_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/conversations")
                    .header("content-type", "application/json")
                    .header("x-user-id", "u1")
                    .body(Body::from(
                        r#"{"kind":"direct","participants":["u2"]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
