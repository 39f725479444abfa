use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  fragment::{Fragment, FromFragment},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
  pub id:           i64,
  pub title:        String,
  pub summary:      String,
  pub storyline:    String,
  pub release_date: Option<NaiveDate>,
  pub image:        String,
  pub reference:    i64,
  pub franchises:   Vec<Franchise>,
  pub genres:       Vec<GameGenre>,
  pub platforms:    Vec<Platform>,
  pub studios:      Vec<Studio>,
}

/// The scalar columns of a stored game, as accepted by the update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFragment {
  pub id:           i64,
  pub title:        String,
  #[serde(default)]
  pub summary:      String,
  #[serde(default)]
  pub storyline:    String,
  #[serde(default)]
  pub release_date: Option<NaiveDate>,
  #[serde(default)]
  pub image:        String,
  pub reference:    i64,
}

impl GameFragment {
  pub fn to_row(&self) -> Fragment {
    Fragment::new()
      .with("title", self.title.as_str())
      .with("summary", self.summary.as_str())
      .with("storyline", self.storyline.as_str())
      .with("release_date", self.release_date)
      .with("image", self.image.as_str())
      .with("reference", self.reference)
  }
}

impl FromFragment for GameFragment {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:           f.require_id("games")?,
      title:        f.text("title"),
      summary:      f.text("summary"),
      storyline:    f.text("storyline"),
      release_date: f.date("release_date"),
      image:        f.text("image"),
      reference:    f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Franchise {
  pub id:        i64,
  pub name:      String,
  pub reference: i64,
}

impl FromFragment for Franchise {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:        f.require_id("franchises")?,
      name:      f.text("name"),
      reference: f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameGenre {
  pub id:        i64,
  pub name:      String,
  pub reference: i64,
}

impl FromFragment for GameGenre {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:        f.require_id("game_genres")?,
      name:      f.text("name"),
      reference: f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
  pub id:        i64,
  pub name:      String,
  pub reference: i64,
}

impl FromFragment for Platform {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:        f.require_id("platforms")?,
      name:      f.text("name"),
      reference: f.integer("reference").unwrap_or_default(),
    })
  }
}

/// A developer credited on a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Studio {
  pub id:          i64,
  pub name:        String,
  pub description: String,
  pub reference:   i64,
}

impl FromFragment for Studio {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:          f.require_id("studios")?,
      name:        f.text("name"),
      description: f.text("description"),
      reference:   f.integer("reference").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSearchResult {
  pub id:           i64,
  pub title:        String,
  pub release_date: Option<NaiveDate>,
  pub image:        String,
}
