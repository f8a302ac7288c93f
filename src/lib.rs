pub mod composer;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod intent;
pub mod models;
pub mod server;
pub mod service;
pub mod session;
pub mod tools;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{AssistantError, Result};
pub use service::{AssistantService, TurnOutcome};
