//! Client for the meltos room HTTP API.
//!
//! DESIGN
//! ======
//! Every operation is one request and one response. The only local state is
//! the pair of identifiers (room id, session id) the server hands out when a
//! room is opened or joined; both are echoed back on every later call.
//!
//! Non-2xx responses surface as [`RoomError::ApiResponse`] instead of being
//! parsed as if they had succeeded. Response bodies are otherwise passed
//! through untouched: callers pick `serde_json::Value` for a verbatim parse or
//! one of the [`schema`] shapes.

pub mod client;
pub mod config;
pub mod error;
pub mod schema;
pub mod session;

pub use client::{RoomClient, open};
pub use config::{DEFAULT_BASE_URL, RoomConfig, RoomTimeouts};
pub use error::RoomError;
pub use session::SessionConfigs;
