//! Waymark Shared - wire types exchanged between the engine and its clients
//!
//! - WebSocket messages (`ClientMessage`, `ServerMessage`)
//! - HTTP request and response bodies
//!
//! Pure data types and serialization; no business logic.

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{ClientMessage, ServerMessage};
pub use requests::{CreateBadgeRequest, UpdateBadgeRequest};
pub use responses::{
    ErrorCode, ErrorResponse, EvaluateResponse, HealthResponse, ProcessEventResponse,
};
