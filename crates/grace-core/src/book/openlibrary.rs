//! OpenLibrary response shapes and the provider trait for books.

use std::future::Future;

use serde::Deserialize;

use crate::provider::ProviderError;

/// A `{ "key": "/authors/OL…A" }` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyRef {
  pub key: String,
}

/// `GET /isbn/{isbn}.json` or `GET /books/{olid}.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Edition {
  pub key:             String,
  pub title:           String,
  pub subtitle:        Option<String>,
  pub authors:         Vec<KeyRef>,
  pub works:           Vec<KeyRef>,
  pub publishers:      Vec<String>,
  pub publish_date:    Option<String>,
  pub number_of_pages: Option<i64>,
  pub isbn_10:         Vec<String>,
  pub isbn_13:         Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkAuthor {
  pub author: KeyRef,
}

/// `GET /works/{id}.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Work {
  pub key:         String,
  pub title:       String,
  pub description: serde_json::Value,
  pub subjects:    Vec<String>,
  pub authors:     Vec<WorkAuthor>,
}

/// `GET /authors/{id}.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthorRecord {
  pub key:  String,
  pub name: String,
  pub bio:  serde_json::Value,
}

/// `GET /search.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
  pub docs:      Vec<SearchDoc>,
  #[serde(rename = "numFound")]
  pub num_found: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchDoc {
  pub edition_key:  Vec<String>,
  pub title:        String,
  pub author_name:  Vec<String>,
  pub publish_date: Vec<String>,
}

/// Everything one book lookup needs from OpenLibrary.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPayload {
  pub edition: Edition,
  /// `None` when the edition's work could not be found.
  pub work:    Option<Work>,
}

/// Lookups against OpenLibrary. Every method reports a clean not-found as
/// `Ok(None)`.
pub trait BookProvider: Send + Sync {
  /// Fetch an edition by ISBN or by edition id (`OL…M`).
  fn edition<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Edition>, ProviderError>> + Send + 'a;

  fn work<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Work>, ProviderError>> + Send + 'a;

  fn author<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<AuthorRecord>, ProviderError>> + Send + 'a;

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<SearchResponse, ProviderError>> + Send + 'a;
}
