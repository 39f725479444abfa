//! Error type for `grace-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A table or column name that is not a plain SQL identifier.
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("cannot write an empty row to `{0}`")]
  EmptyRow(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
