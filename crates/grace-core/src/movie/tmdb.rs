//! TheMovieDB response shapes and the provider trait for movies.

use std::future::Future;

use serde::Deserialize;

use crate::provider::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TmdbGenre {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TmdbCompany {
  pub id:        i64,
  pub name:      String,
  pub logo_path: Option<String>,
}

/// `GET /3/movie/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieDetail {
  pub id:                   i64,
  pub title:                String,
  pub tagline:              Option<String>,
  pub overview:             Option<String>,
  pub genres:               Vec<TmdbGenre>,
  pub production_companies: Vec<TmdbCompany>,
  /// `YYYY-MM-DD`, sometimes empty.
  pub release_date:         Option<String>,
  /// Minutes.
  pub runtime:              Option<i64>,
  pub poster_path:          Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieSearchItem {
  pub id:           i64,
  pub title:        String,
  pub release_date: Option<String>,
  pub poster_path:  Option<String>,
}

/// `GET /3/search/movie`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieSearchResponse {
  pub page:    u32,
  pub results: Vec<MovieSearchItem>,
}

/// Lookups against TheMovieDB. A 404 is reported as `Ok(None)`.
pub trait MovieProvider: Send + Sync {
  fn movie(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<MovieDetail>, ProviderError>> + Send + '_;

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<MovieSearchResponse, ProviderError>> + Send + 'a;
}
