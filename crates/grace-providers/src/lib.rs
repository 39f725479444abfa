//! HTTP clients for the metadata providers behind each domain.
//!
//! Each client implements the matching provider trait from `grace-core`:
//! [`OpenLibraryClient`] for books, [`IgdbClient`] for games and
//! [`TmdbClient`] for movies. All of them share one [`reqwest::Client`]
//! built by [`http_client`] with a bounded request timeout.

mod http;
mod igdb;
mod openlibrary;
mod tmdb;

pub mod error;

pub use error::{Error, Result};
pub use http::http_client;
pub use igdb::IgdbClient;
pub use openlibrary::OpenLibraryClient;
pub use tmdb::TmdbClient;
