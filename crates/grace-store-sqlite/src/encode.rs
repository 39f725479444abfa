//! Conversions between `grace-core` values and SQLite, and SQL rendering of
//! [`Constraint`]s.

use grace_core::fragment::{Constraint, Fragment, ID_COLUMN, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::{Error, Result};

/// Accept only `[a-z0-9_]` names so they can be interpolated into SQL.
pub fn ident(name: &str) -> Result<&str> {
  let valid = !name.is_empty()
    && name
      .bytes()
      .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
  if valid {
    Ok(name)
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}

pub fn to_sql(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(v) => SqlValue::Integer(*v),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

pub fn from_sql(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(v) => Value::Integer(v),
    ValueRef::Real(v) => Value::Text(v.to_string()),
    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
      Value::Text(String::from_utf8_lossy(bytes).into_owned())
    }
  }
}

/// Render `constraint` as a `WHERE` body, appending bound values to
/// `params`. An empty `Any` matches nothing; an empty `All` matches all.
pub fn render(constraint: &Constraint, params: &mut Vec<SqlValue>) -> Result<String> {
  match constraint {
    Constraint::Eq(column, value) => {
      params.push(to_sql(value));
      Ok(format!("{} = ?{}", ident(column)?, params.len()))
    }
    Constraint::Any(parts) if parts.is_empty() => Ok("0".to_owned()),
    Constraint::All(parts) if parts.is_empty() => Ok("1".to_owned()),
    Constraint::Any(parts) => join(parts, " OR ", params),
    Constraint::All(parts) => join(parts, " AND ", params),
  }
}

fn join(parts: &[Constraint], op: &str, params: &mut Vec<SqlValue>) -> Result<String> {
  let rendered = parts
    .iter()
    .map(|part| render(part, params))
    .collect::<Result<Vec<_>>>()?;
  Ok(format!("({})", rendered.join(op)))
}

/// Columns and values of `row` to write, excluding `id`, validated.
pub struct Columns {
  pub names:  Vec<String>,
  pub values: Vec<SqlValue>,
}

pub fn columns(table: &'static str, row: &Fragment) -> Result<Columns> {
  let mut names = Vec::with_capacity(row.len());
  let mut values = Vec::with_capacity(row.len());
  for (name, value) in row.columns().filter(|(name, _)| *name != ID_COLUMN) {
    names.push(ident(name)?.to_owned());
    values.push(to_sql(value));
  }
  if names.is_empty() {
    return Err(Error::EmptyRow(table));
  }
  Ok(Columns { names, values })
}

impl Columns {
  /// `INSERT INTO {table} (..) VALUES (..)` with numbered placeholders.
  pub fn insert_sql(&self, table: &str) -> String {
    let placeholders = (1..=self.names.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    format!("INSERT INTO {table} ({}) VALUES ({placeholders})", self.names.join(", "))
  }

  /// `UPDATE {table} SET .. WHERE id = ?N`, with the id bound last.
  pub fn update_sql(&self, table: &str) -> String {
    let assignments = self
      .names
      .iter()
      .enumerate()
      .map(|(i, name)| format!("{name} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE id = ?{}", self.names.len() + 1)
  }
}

/// Decode every column of a result row into a [`Fragment`].
pub fn fragment_from_row(names: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Fragment> {
  let mut fragment = Fragment::new();
  for (i, name) in names.iter().enumerate() {
    fragment.insert(name, from_sql(row.get_ref(i)?));
  }
  Ok(fragment)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifiers_are_restricted() {
    assert!(ident("books_authors").is_ok());
    assert!(ident("books; DROP TABLE books").is_err());
    assert!(ident("").is_err());
  }

  #[test]
  fn nested_constraints_number_params_in_order() {
    let c = Constraint::All(vec![
      Constraint::eq("name", "Orbit"),
      Constraint::Any(vec![Constraint::eq("reference", 1_i64), Constraint::eq("reference", 2_i64)]),
    ]);
    let mut params = Vec::new();
    let sql = render(&c, &mut params).unwrap();
    assert_eq!(sql, "(name = ?1 AND (reference = ?2 OR reference = ?3))");
    assert_eq!(params.len(), 3);
  }

  #[test]
  fn ids_are_never_written() {
    let row = Fragment::new().with("id", 5_i64).with("name", "x");
    let cols = columns("topics", &row).unwrap();
    assert_eq!(cols.names, vec!["name".to_owned()]);
    assert_eq!(cols.insert_sql("topics"), "INSERT INTO topics (name) VALUES (?1)");
    assert_eq!(cols.update_sql("topics"), "UPDATE topics SET name = ?1 WHERE id = ?2");
    assert!(matches!(columns("topics", &Fragment::new()), Err(Error::EmptyRow("topics"))));
  }
}
