//! IGDB response shapes and the provider trait for games.

use std::future::Future;

use serde::Deserialize;

use crate::provider::ProviderError;

/// An expanded `{ id, name }` reference (franchise, genre, platform).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Named {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Cover {
  pub image_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InvolvedCompany {
  /// Company id; names need a `/companies` lookup.
  pub company:   i64,
  pub developer: bool,
}

/// One element of a `/v4/games` detail response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IgdbGame {
  pub id:                 i64,
  pub name:               String,
  pub summary:            Option<String>,
  pub storyline:          Option<String>,
  /// Unix seconds.
  pub first_release_date: Option<i64>,
  pub cover:              Option<Cover>,
  pub franchises:         Vec<Named>,
  pub genres:             Vec<Named>,
  pub platforms:          Vec<Named>,
  pub involved_companies: Vec<InvolvedCompany>,
}

/// One element of a `/v4/companies` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Company {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
}

/// One element of a `/v4/games` search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameSearchItem {
  pub id:                 i64,
  pub name:               String,
  pub cover:              Option<Cover>,
  pub first_release_date: Option<i64>,
}

/// Lookups against IGDB. Empty result arrays are reported as `Ok(None)`.
pub trait GameProvider: Send + Sync {
  fn game(&self, id: i64) -> impl Future<Output = Result<Option<IgdbGame>, ProviderError>> + Send + '_;

  fn company(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Company>, ProviderError>> + Send + '_;

  /// Main games whose name matches `query`.
  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<GameSearchItem>, ProviderError>> + Send + 'a;
}
