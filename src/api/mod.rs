//! API Module
//!
//! HTTP handlers and routing for the messaging REST API.
//!
//! # Endpoints
//! - `GET/POST /api/conversations` - List and create conversations
//! - `GET/POST /api/conversations/:id/messages` - Page and send messages
//! - `PATCH/DELETE /api/conversations/:id/messages/:message_id` - Edit and delete
//! - `POST /api/conversations/:id/read` - Mark as read
//! - `POST/DELETE /api/conversations/:id/participants[/:user_id]` - Membership
//! - `GET /api/cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
