//! Service surface
//!
//! A thin axum layer over the generators: REST endpoints for advisory,
//! weather, speech, and the mocked auth/feedback/notification services,
//! plus a WebSocket proxy for the live conversation bridge.

pub mod http;
pub mod state;
pub mod websocket;

pub use http::create_router;
pub use state::{AppState, Generators};
