//! Core of the smartcode client: data model, HTTP client for the review
//! service, local storage, review history, and the review and chat state
//! machines. Nothing here touches the terminal.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
pub mod orchestrator;
pub mod schema;
pub mod types;
pub mod upload;

pub use error::{Error, Result, ValidationError};
