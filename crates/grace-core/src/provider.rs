//! The error type shared by every provider adapter.
//!
//! Adapters translate their transport errors into [`ProviderError`] so the
//! pipeline can tell a failed round-trip apart from a clean not-found, which
//! adapters report as `Ok(None)`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("request failed: {0}")]
  Request(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("provider returned {status_code}: {message}")]
  Api { status_code: u16, message: String },

  #[error("could not decode provider response: {0}")]
  Decode(String),

  #[error("provider authentication failed: {0}")]
  Authentication(String),

  #[error("incomplete provider payload: {0}")]
  Incomplete(String),
}
