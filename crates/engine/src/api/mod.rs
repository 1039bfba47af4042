//! API layer - HTTP and WebSocket entry points.

pub mod auth;
pub mod connections;
pub mod http;
pub mod notifier;
pub mod websocket;

pub use connections::{ConnectionManager, SharedConnectionManager};
pub use notifier::WebSocketNotifier;
