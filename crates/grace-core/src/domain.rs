//! The per-domain descriptor that drives the generic pipeline.
//!
//! A [`Domain`] names its root table and natural key, lists the related
//! [`Category`]s it links to, and knows how to talk to its provider: fetch a
//! payload, decompose it into fragments, optionally enrich a related draft,
//! and assemble stored fragments back into a nested entity.

use std::{fmt::Display, future::Future};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
  Result,
  fragment::{Constraint, Fragment, Value},
  provider::ProviderError,
  store::LinkTable,
};

/// A related-entity category of a domain, e.g. the authors of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
  /// Name used in logs and as the response field.
  pub name:       &'static str,
  pub table:      &'static str,
  /// Column holding the natural key; UNIQUE in the store.
  pub key_column: &'static str,
  pub link:       LinkTable,
}

/// A related entity as decomposed from a root payload, before it has a
/// local identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedDraft {
  /// Normalized natural key.
  pub key: Value,
  /// Columns known from the root payload; always includes the key column.
  pub row: Fragment,
}

impl RelatedDraft {
  /// A draft whose only known column is its key.
  pub fn keyed(column: &str, key: impl Into<Value>) -> Self {
    let key = key.into();
    Self { row: Fragment::new().with(column, key.clone()), key }
  }

  pub fn new(key: impl Into<Value>, row: Fragment) -> Self { Self { key: key.into(), row } }
}

/// A provider payload split into storable parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposition {
  pub root:    Fragment,
  /// Drafts per category, in the same order as [`Domain::CATEGORIES`].
  pub related: Vec<Vec<RelatedDraft>>,
}

pub trait Domain: Send + Sync {
  /// The fully assembled, nested entity.
  type Entity: Serialize + Send;
  /// The normalized external identifier.
  type Key: Display + Send + Sync;
  /// What the provider returns for one detail lookup.
  type Payload: Send;
  type SearchResult: Serialize + Send;
  /// The scalar record accepted by the full-replace update path.
  type Root: DeserializeOwned + Send;

  /// Short name used in logs and routes (`book`, `game`, `movie`).
  const NAME: &'static str;
  const ROOT_TABLE: &'static str;
  /// Column holding the external reference; UNIQUE in the store.
  const ROOT_KEY: &'static str;
  const CATEGORIES: &'static [Category];

  /// Validate and normalize a raw external identifier.
  fn normalize_key(&self, raw: &str) -> Result<Self::Key>;

  /// Constraint selecting the root fragment already stored for `key`.
  fn existing(&self, key: &Self::Key) -> Constraint;

  /// Fetch the provider payload for `key`. `Ok(None)` is a clean not-found.
  fn fetch<'a>(
    &'a self,
    key: &'a Self::Key,
  ) -> impl Future<Output = Result<Option<Self::Payload>, ProviderError>> + Send + 'a;

  fn decompose(&self, payload: Self::Payload) -> Decomposition;

  /// Complete a related draft before it is first stored. `Ok(None)` means
  /// the provider has no record and the draft is skipped.
  fn enrich<'a>(
    &'a self,
    category: &'a Category,
    draft: RelatedDraft,
  ) -> impl Future<Output = Result<Option<Fragment>, ProviderError>> + Send + 'a {
    let _ = category;
    async move { Ok(Some(draft.row)) }
  }

  /// A related fragment that also identifies a stored root, consulted when
  /// [`Domain::existing`] matches nothing. Returns the category and the
  /// natural key to look up in it.
  fn alias(&self, key: &Self::Key) -> Option<(Category, Value)> {
    let _ = key;
    None
  }

  /// Build the nested entity from a stored root and its related fragments,
  /// given per category in [`Domain::CATEGORIES`] order.
  fn assemble(&self, root: &Fragment, related: &[Vec<Fragment>]) -> Result<Self::Entity>;

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Self::SearchResult>, ProviderError>> + Send + 'a;

  /// Split an update record into its identifier and the replacement row.
  fn replacement(&self, root: Self::Root) -> Result<(i64, Fragment)>;
}

/// Related fragments of category `index`, empty when absent.
pub fn related_at(related: &[Vec<Fragment>], index: usize) -> &[Fragment] {
  related.get(index).map(Vec::as_slice).unwrap_or_default()
}
