//! HTTP API server
//!
//! Serves the job, work entry and analytics routes under
//! `/api/users/{user_id}` plus an unauthenticated `/api/health`.

mod auth;
mod config;
mod handlers;
mod server;

pub use config::{ConfigError, ServerConfig, CONFIG_FILENAME, DEFAULT_PORT};
pub use handlers::{AppState, Settings};
pub use server::{router, Server, ServerHandle};
