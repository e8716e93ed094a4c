//! HTTP surface of the mock Business API.
//!
//! Exposes the handlers that feed the webhook pipeline: accepting outbound
//! messages (which emits their status milestones), triggering synthetic
//! batch generation, and updating the callback settings. The rest of the
//! real platform's surface (media, profiles, users) is out of scope for
//! this mock.

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server, AppState};
