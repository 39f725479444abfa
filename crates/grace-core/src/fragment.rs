//! Untyped rows and the structured predicates used to select them.
//!
//! A [`Fragment`] is one row of one table: a map from column name to
//! [`Value`]. Domain code builds fragments when decomposing a provider
//! payload and decodes them again with [`FromFragment`] when assembling the
//! nested entity for a response.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The column every fragment table carries as its generated identifier.
pub const ID_COLUMN: &str = "id";

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single column value. Dates travel as ISO `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<NaiveDate> for Value {
  fn from(v: NaiveDate) -> Self { Self::Text(v.format("%Y-%m-%d").to_string()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Fragment ────────────────────────────────────────────────────────────────

/// One row of a fragment table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
  columns: BTreeMap<String, Value>,
}

impl Fragment {
  pub fn new() -> Self { Self::default() }

  /// Builder-style [`Fragment::insert`].
  pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
    self.insert(column, value);
    self
  }

  pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
    self.columns.insert(column.to_owned(), value.into());
  }

  pub fn remove(&mut self, column: &str) -> Option<Value> { self.columns.remove(column) }

  pub fn get(&self, column: &str) -> Option<&Value> { self.columns.get(column) }

  /// Iterate columns in name order.
  pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.columns.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// The generated identifier, if this fragment came out of a store.
  pub fn id(&self) -> Option<i64> { self.integer(ID_COLUMN) }

  pub fn integer(&self, column: &str) -> Option<i64> {
    match self.columns.get(column) {
      Some(Value::Integer(v)) => Some(*v),
      Some(Value::Text(s)) => s.parse().ok(),
      _ => None,
    }
  }

  /// Text content of `column`; absent and `NULL` read as the empty string.
  pub fn text(&self, column: &str) -> String {
    match self.columns.get(column) {
      Some(Value::Text(s)) => s.clone(),
      Some(Value::Integer(v)) => v.to_string(),
      _ => String::new(),
    }
  }

  pub fn date(&self, column: &str) -> Option<NaiveDate> {
    match self.columns.get(column) {
      Some(Value::Text(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
      _ => None,
    }
  }

  /// Like [`Fragment::id`] but a missing identifier is an error.
  pub fn require_id(&self, table: &'static str) -> Result<i64> {
    self.id().ok_or_else(|| Error::MalformedFragment {
      table,
      reason: "missing integer `id` column".to_owned(),
    })
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fragment {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}

/// Decode a typed record from a stored fragment.
pub trait FromFragment: Sized {
  fn from_fragment(fragment: &Fragment) -> Result<Self>;
}

/// Decode every fragment in `fragments`, failing on the first malformed row.
pub fn decode_all<T: FromFragment>(fragments: &[Fragment]) -> Result<Vec<T>> {
  fragments.iter().map(T::from_fragment).collect()
}

// ─── Constraint ──────────────────────────────────────────────────────────────

/// A structured row predicate. Backends render it with bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
  Eq(&'static str, Value),
  Any(Vec<Constraint>),
  All(Vec<Constraint>),
}

impl Constraint {
  pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
    Self::Eq(column, value.into())
  }

  /// Match the row with generated identifier `id`.
  pub fn id(id: i64) -> Self { Self::Eq(ID_COLUMN, Value::Integer(id)) }

  /// Evaluate the predicate against an in-memory fragment.
  pub fn matches(&self, fragment: &Fragment) -> bool {
    match self {
      Self::Eq(column, value) => !value.is_null() && fragment.get(column) == Some(value),
      Self::Any(parts) => parts.iter().any(|c| c.matches(fragment)),
      Self::All(parts) => parts.iter().all(|c| c.matches(fragment)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_and_null_text_read_as_empty() {
    let row = Fragment::new().with("subtitle", Value::Null);
    assert_eq!(row.text("subtitle"), "");
    assert_eq!(row.text("missing"), "");
  }

  #[test]
  fn dates_round_trip_as_iso_text() {
    let date = NaiveDate::from_ymd_opt(2008, 5, 1).unwrap();
    let row = Fragment::new().with("publish_date", date);
    assert_eq!(row.get("publish_date"), Some(&Value::Text("2008-05-01".into())));
    assert_eq!(row.date("publish_date"), Some(date));
  }

  #[test]
  fn constraint_any_matches_either_column() {
    let row = Fragment::new()
      .with("isbn13", "9780316452465")
      .with("edition_reference", "OL26423297M");
    let c = Constraint::Any(vec![
      Constraint::eq("isbn13", "OL26423297M"),
      Constraint::eq("edition_reference", "OL26423297M"),
    ]);
    assert!(c.matches(&row));
    assert!(!Constraint::eq("isbn13", Value::Null).matches(&row));
  }

  #[test]
  fn require_id_reports_table() {
    let err = Fragment::new().require_id("books").unwrap_err();
    assert!(err.to_string().contains("books"));
  }
}
