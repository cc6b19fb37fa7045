//! HTTP handlers for the relay service.

pub mod chat;
pub mod health;
pub mod metrics;

pub use chat::chat;
pub use health::health_check;
