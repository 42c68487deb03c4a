//! Gmail Agent - search Gmail and summarize messages with Gemini
//!
//! This library provides the OAuth flow, the Gmail and Gemini clients,
//! per-session agent state and the HTTP surface that ties them together.

pub mod agent;
pub mod auth;
pub mod config;
pub mod error;
pub mod gmail;
pub mod server;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
