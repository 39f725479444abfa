use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  fragment::{Fragment, FromFragment},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
  pub id:                   i64,
  pub title:                String,
  pub tagline:              String,
  pub description:          String,
  pub release_date:         Option<NaiveDate>,
  /// Minutes.
  pub runtime:              i64,
  pub image:                String,
  pub reference:            i64,
  pub genres:               Vec<MovieGenre>,
  pub production_companies: Vec<ProductionCompany>,
}

/// The scalar columns of a stored movie, as accepted by the update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieFragment {
  pub id:           i64,
  pub title:        String,
  #[serde(default)]
  pub tagline:      String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub release_date: Option<NaiveDate>,
  #[serde(default)]
  pub runtime:      i64,
  #[serde(default)]
  pub image:        String,
  pub reference:    i64,
}

impl MovieFragment {
  pub fn to_row(&self) -> Fragment {
    Fragment::new()
      .with("title", self.title.as_str())
      .with("tagline", self.tagline.as_str())
      .with("description", self.description.as_str())
      .with("release_date", self.release_date)
      .with("runtime", self.runtime)
      .with("image", self.image.as_str())
      .with("reference", self.reference)
  }
}

impl FromFragment for MovieFragment {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:           f.require_id("movies")?,
      title:        f.text("title"),
      tagline:      f.text("tagline"),
      description:  f.text("description"),
      release_date: f.date("release_date"),
      runtime:      f.integer("runtime").unwrap_or_default(),
      image:        f.text("image"),
      reference:    f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieGenre {
  pub id:        i64,
  pub name:      String,
  pub reference: i64,
}

impl FromFragment for MovieGenre {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:        f.require_id("movie_genres")?,
      name:      f.text("name"),
      reference: f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionCompany {
  pub id:        i64,
  pub name:      String,
  pub image:     String,
  pub reference: i64,
}

impl FromFragment for ProductionCompany {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:        f.require_id("production_companies")?,
      name:      f.text("name"),
      image:     f.text("image"),
      reference: f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieSearchResult {
  pub id:           i64,
  pub title:        String,
  pub release_date: Option<NaiveDate>,
  pub image:        String,
}
