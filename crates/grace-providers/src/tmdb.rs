//! TheMovieDB client.

use grace_core::{
  movie::tmdb::{MovieDetail, MovieProvider, MovieSearchResponse},
  provider::ProviderError,
};
use reqwest::Client;
use tracing::debug;

use crate::{Result, http::handle_response};

const BASE_URL: &str = "https://api.themoviedb.org/3";

/// Client for the TMDB v3 API, authenticated with a read access token.
#[derive(Debug, Clone)]
pub struct TmdbClient {
  client:   Client,
  token:    String,
  base_url: String,
}

impl TmdbClient {
  pub fn new(client: Client, token: impl Into<String>) -> Self {
    Self { client, token: token.into(), base_url: BASE_URL.to_owned() }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into().trim_end_matches('/').to_owned();
    self
  }

  fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }

  /// `GET /movie/{id}`
  pub async fn get_movie(&self, id: i64) -> Result<Option<MovieDetail>> {
    debug!(id, "tmdb movie");
    let response = self
      .client
      .get(self.url(&format!("/movie/{id}")))
      .bearer_auth(&self.token)
      .send()
      .await?;
    handle_response(response).await
  }

  /// `GET /search/movie?query=..&language=en-US`
  pub async fn search_movies(&self, query: &str) -> Result<MovieSearchResponse> {
    debug!(query, "tmdb search");
    let response = self
      .client
      .get(self.url("/search/movie"))
      .bearer_auth(&self.token)
      .query(&[("query", query), ("language", "en-US")])
      .send()
      .await?;
    Ok(handle_response(response).await?.unwrap_or_default())
  }
}

impl MovieProvider for TmdbClient {
  async fn movie(&self, id: i64) -> Result<Option<MovieDetail>, ProviderError> {
    Ok(self.get_movie(id).await?)
  }

  async fn search(&self, query: &str) -> Result<MovieSearchResponse, ProviderError> {
    Ok(self.search_movies(query).await?)
  }
}
