//! GitHub Actions Client
//!
//! A typed client for the GitHub Actions REST API: workflows and workflow
//! runs, repository and organization variables, and encrypted secrets.
//! Secret values are sealed with anonymous public-key encryption before
//! they are transmitted; the plaintext never leaves the process.

pub mod client;
pub mod config;
pub mod error;
pub mod secrets;
pub mod transport;
pub mod variables;
pub mod workflows;

pub use client::ActionsClient;
pub use config::ClientConfig;
pub use error::ClientError;
