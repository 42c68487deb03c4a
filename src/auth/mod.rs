//! Authentication module for Google OAuth2
//!
//! This module provides:
//! - The in-memory token bundle produced by a successful callback
//! - GoogleOAuth for building consent URLs and exchanging/refreshing tokens

mod credentials;
mod provider;

pub use credentials::TokenBundle;
pub use provider::GoogleOAuth;

#[cfg(test)]
pub(crate) use credentials::test_bundle;
