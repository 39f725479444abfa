//! OpenLibrary client.

use grace_core::{
  book::openlibrary::{AuthorRecord, BookProvider, Edition, SearchResponse, Work},
  provider::ProviderError,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Result, http::handle_response};

const BASE_URL: &str = "https://openlibrary.org";

/// Fields requested from `/search.json`; the default set omits edition keys.
const SEARCH_FIELDS: &str = "key,title,edition_key,author_name,publish_date";

/// Client for the public OpenLibrary JSON API. Needs no credentials.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
  client:   Client,
  base_url: String,
}

impl OpenLibraryClient {
  pub fn new(client: Client) -> Self { Self { client, base_url: BASE_URL.to_owned() } }

  /// Point the client at another host, e.g. a local mirror.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into().trim_end_matches('/').to_owned();
    self
  }

  fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
    debug!(path, "openlibrary request");
    let response = self.client.get(self.url(path)).send().await?;
    handle_response(response).await
  }

  /// `GET /isbn/{isbn}.json`, or `/books/{olid}.json` for edition ids.
  pub async fn get_edition(&self, id: &str) -> Result<Option<Edition>> {
    let path = if id.starts_with("OL") {
      format!("/books/{id}.json")
    } else {
      format!("/isbn/{id}.json")
    };
    self.get(&path).await
  }

  /// `GET /works/{id}.json`
  pub async fn get_work(&self, id: &str) -> Result<Option<Work>> {
    self.get(&format!("/works/{id}.json")).await
  }

  /// `GET /authors/{id}.json`
  pub async fn get_author(&self, id: &str) -> Result<Option<AuthorRecord>> {
    self.get(&format!("/authors/{id}.json")).await
  }

  /// `GET /search.json?q=<query> language:eng`
  pub async fn search_books(&self, query: &str) -> Result<SearchResponse> {
    let q = format!("{query} language:eng");
    let response = self
      .client
      .get(self.url("/search.json"))
      .query(&[("q", q.as_str()), ("fields", SEARCH_FIELDS)])
      .send()
      .await?;
    Ok(handle_response(response).await?.unwrap_or_default())
  }
}

impl BookProvider for OpenLibraryClient {
  async fn edition(&self, id: &str) -> Result<Option<Edition>, ProviderError> {
    Ok(self.get_edition(id).await?)
  }

  async fn work(&self, id: &str) -> Result<Option<Work>, ProviderError> {
    Ok(self.get_work(id).await?)
  }

  async fn author(&self, id: &str) -> Result<Option<AuthorRecord>, ProviderError> {
    Ok(self.get_author(id).await?)
  }

  async fn search(&self, query: &str) -> Result<SearchResponse, ProviderError> {
    Ok(self.search_books(query).await?)
  }
}

#[cfg(test)]
mod tests {
  use grace_core::text;
  use reqwest::StatusCode;

  use super::*;
  use crate::http::decode_body;

  fn fixture<T: DeserializeOwned>(body: &str) -> T {
    decode_body(StatusCode::OK, body).unwrap().unwrap()
  }

  #[test]
  fn edition_fixture_decodes() {
    let edition: Edition = fixture(include_str!("../fixtures/edition.json"));
    assert_eq!(edition.key, "/books/OL26423297M");
    assert_eq!(edition.isbn_13, vec!["9780316452465".to_owned()]);
    assert_eq!(edition.number_of_pages, Some(360));
    assert_eq!(edition.works[0].key, "/works/OL17775011W");
  }

  #[test]
  fn work_fixture_has_typed_description() {
    let work: Work = fixture(include_str!("../fixtures/work.json"));
    assert!(text::extract_description(&work.description).starts_with("Geralt of Rivia"));
    assert_eq!(work.subjects.len(), 3);
    assert_eq!(work.authors[0].author.key, "/authors/OL1416948A");
  }

  #[test]
  fn author_fixture_has_plain_bio() {
    let author: AuthorRecord = fixture(include_str!("../fixtures/author.json"));
    assert_eq!(author.name, "Andrzej Sapkowski");
    assert_eq!(
      text::extract_description(&author.bio),
      "Andrzej Sapkowski is a Polish fantasy writer."
    );
  }

  #[test]
  fn search_fixture_tolerates_sparse_docs() {
    let response: SearchResponse = fixture(include_str!("../fixtures/search.json"));
    assert_eq!(response.num_found, 2);
    assert_eq!(response.docs[0].edition_key[0], "OL26423297M");
    assert!(response.docs[1].edition_key.is_empty());
  }

  #[test]
  fn base_url_is_normalized() {
    let client = OpenLibraryClient::new(Client::new()).with_base_url("http://localhost:9000/");
    assert_eq!(client.url("/works/OL1W.json"), "http://localhost:9000/works/OL1W.json");
  }
}
