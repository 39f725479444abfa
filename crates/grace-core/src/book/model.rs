//! Book entities as stored and as returned by the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  fragment::{Fragment, FromFragment},
};

/// A fully assembled book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
  pub id:                i64,
  pub title:             String,
  pub subtitle:          String,
  pub description:       String,
  pub authors:           Vec<Author>,
  pub publishers:        Vec<Publisher>,
  pub topics:            Vec<Topic>,
  /// Every ISBN-13 and ISBN-10 the edition lists.
  pub isbns:             Vec<String>,
  pub publish_date:      Option<NaiveDate>,
  pub pages:             i64,
  pub isbn10:            String,
  pub isbn13:            String,
  pub image:             String,
  pub edition_reference: String,
  pub work_reference:    String,
}

/// The scalar columns of a stored book, as accepted by the update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFragment {
  pub id:                i64,
  pub title:             String,
  #[serde(default)]
  pub subtitle:          String,
  #[serde(default)]
  pub description:       String,
  #[serde(default)]
  pub publish_date:      Option<NaiveDate>,
  #[serde(default)]
  pub pages:             i64,
  #[serde(default)]
  pub isbn10:            String,
  #[serde(default)]
  pub isbn13:            String,
  #[serde(default)]
  pub image:             String,
  pub edition_reference: String,
  #[serde(default)]
  pub work_reference:    String,
}

impl BookFragment {
  /// The row written to `books`, without its id.
  pub fn to_row(&self) -> Fragment {
    Fragment::new()
      .with("title", self.title.as_str())
      .with("subtitle", self.subtitle.as_str())
      .with("description", self.description.as_str())
      .with("publish_date", self.publish_date)
      .with("pages", self.pages)
      .with("isbn10", self.isbn10.as_str())
      .with("isbn13", self.isbn13.as_str())
      .with("image", self.image.as_str())
      .with("edition_reference", self.edition_reference.as_str())
      .with("work_reference", self.work_reference.as_str())
  }
}

impl FromFragment for BookFragment {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:                f.require_id("books")?,
      title:             f.text("title"),
      subtitle:          f.text("subtitle"),
      description:       f.text("description"),
      publish_date:      f.date("publish_date"),
      pages:             f.integer("pages").unwrap_or_default(),
      isbn10:            f.text("isbn10"),
      isbn13:            f.text("isbn13"),
      image:             f.text("image"),
      edition_reference: f.text("edition_reference"),
      work_reference:    f.text("work_reference"),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
  pub id:          i64,
  pub first_name:  String,
  pub middle_name: String,
  pub last_name:   String,
  pub biography:   String,
  pub image:       String,
  pub reference:   String,
}

impl FromFragment for Author {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self {
      id:          f.require_id("authors")?,
      first_name:  f.text("first_name"),
      middle_name: f.text("middle_name"),
      last_name:   f.text("last_name"),
      biography:   f.text("biography"),
      image:       f.text("image"),
      reference:   f.text("reference"),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publisher {
  pub id:   i64,
  pub name: String,
}

impl FromFragment for Publisher {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self { id: f.require_id("publishers")?, name: f.text("name") })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
  pub id:   i64,
  pub name: String,
}

impl FromFragment for Topic {
  fn from_fragment(f: &Fragment) -> Result<Self> {
    Ok(Self { id: f.require_id("topics")?, name: f.text("name") })
  }
}

/// A normalized OpenLibrary search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSearchResult {
  /// Edition id, usable as the key of a fetch-or-create request.
  pub id:           String,
  pub title:        String,
  pub authors:      Vec<String>,
  pub publish_date: NaiveDate,
  pub image:        String,
}
