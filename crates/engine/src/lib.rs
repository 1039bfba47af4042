//! Waymark Engine library.
//!
//! Server-side badge progress and unlock engine.
//!
//! ## Structure
//!
//! - `repositories/` - Badge Catalog and Progress Store wrappers over ports
//! - `use_cases/` - Event processing, listings, stats and administration
//! - `infrastructure/` - Ports plus SQLite, in-memory, clock and config adapters
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod repositories;
pub mod use_cases;

#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
