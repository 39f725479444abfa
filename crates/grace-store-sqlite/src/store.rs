//! The SQLite implementation of [`FragmentStore`].

use std::path::Path;

use grace_core::{
  fragment::{Constraint, Fragment},
  store::{FragmentStore, LinkBatch, LinkReport, LinkTable, Relationship, Stored},
};
use rusqlite::{params, params_from_iter, types::Value as SqlValue};
use tracing::warn;

use crate::{
  Result,
  encode::{columns, fragment_from_row, ident, render, to_sql},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Grace fragment store backed by a single SQLite file. Clones share one
/// connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// The underlying connection, for maintenance outside the trait.
  pub fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select(
    &self,
    table: &'static str,
    constraint: Constraint,
    limit: Option<usize>,
  ) -> Result<Vec<Fragment>> {
    let mut params = Vec::new();
    let filter = render(&constraint, &mut params)?;
    let mut sql = format!("SELECT * FROM {} WHERE {filter} ORDER BY id", ident(table)?);
    if let Some(limit) = limit {
      sql.push_str(&format!(" LIMIT {limit}"));
    }

    let fragments = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        let rows = stmt
          .query_map(params_from_iter(params.iter()), |row| fragment_from_row(&names, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(fragments)
  }

  /// Join rows of `link` whose `column` equals `id`, in insertion order.
  async fn relationships(
    &self,
    link: LinkTable,
    column: &'static str,
    id: i64,
  ) -> Result<Vec<Relationship>> {
    let sql = format!(
      "SELECT {src}, {dst} FROM {table} WHERE {column} = ?1 ORDER BY rowid",
      src = ident(link.source)?,
      dst = ident(link.destination)?,
      table = ident(link.table)?,
      column = ident(column)?,
    );

    let relationships = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![id], |r| {
            Ok(Relationship { source: r.get(0)?, destination: r.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(relationships)
  }
}

/// `INSERT OR IGNORE` for one join table; linking a linked pair is a no-op.
fn link_sql(link: &LinkTable) -> Result<String> {
  Ok(format!(
    "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2)",
    ident(link.table)?,
    ident(link.source)?,
    ident(link.destination)?,
  ))
}

/// Insert-or-skip and re-select statements for a natural-keyed row.
struct UniqueInsert {
  insert: String,
  select: String,
  values: Vec<SqlValue>,
  key:    SqlValue,
}

impl UniqueInsert {
  fn new(table: &'static str, key_column: &'static str, row: &Fragment) -> Result<Self> {
    let table = ident(table)?;
    let key_column = ident(key_column)?;
    let cols = columns(table, row)?;
    Ok(Self {
      insert: format!("{} ON CONFLICT({key_column}) DO NOTHING", cols.insert_sql(table)),
      select: format!("SELECT id FROM {table} WHERE {key_column} = ?1"),
      key:    row.get(key_column).map(to_sql).unwrap_or(SqlValue::Null),
      values: cols.values,
    })
  }

  /// Run inside an open transaction.
  fn run(&self, conn: &rusqlite::Connection) -> rusqlite::Result<Stored> {
    if conn.execute(&self.insert, params_from_iter(self.values.iter()))? == 1 {
      return Ok(Stored { id: conn.last_insert_rowid(), created: true });
    }
    let id = conn.query_row(&self.select, params![self.key], |r| r.get(0))?;
    Ok(Stored { id, created: false })
  }
}

// ─── FragmentStore impl ──────────────────────────────────────────────────────

impl FragmentStore for SqliteStore {
  type Error = crate::Error;

  async fn fetch_fragment(
    &self,
    table: &'static str,
    constraint: Constraint,
  ) -> Result<Option<Fragment>> {
    Ok(self.select(table, constraint, Some(1)).await?.into_iter().next())
  }

  async fn fetch_fragment_slice(
    &self,
    table: &'static str,
    constraint: Constraint,
  ) -> Result<Vec<Fragment>> {
    self.select(table, constraint, None).await
  }

  async fn store_fragment(&self, table: &'static str, row: Fragment) -> Result<i64> {
    let table = ident(table)?;
    let cols = columns(table, &row)?;
    let sql = cols.insert_sql(table);

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&sql, params_from_iter(cols.values.iter()))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn store_unique_fragment(
    &self,
    table: &'static str,
    key_column: &'static str,
    row: Fragment,
  ) -> Result<Stored> {
    let unique = UniqueInsert::new(table, key_column, &row)?;

    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let stored = unique.run(&tx)?;
        tx.commit()?;
        Ok(stored)
      })
      .await?;
    Ok(stored)
  }

  async fn update_fragment(
    &self,
    table: &'static str,
    id: i64,
    row: Fragment,
  ) -> Result<Option<i64>> {
    let table = ident(table)?;
    let cols = columns(table, &row)?;
    let sql = cols.update_sql(table);
    let mut values = cols.values;
    values.push(SqlValue::Integer(id));

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, params_from_iter(values.iter()))?))
      .await?;
    Ok((changed > 0).then_some(id))
  }

  async fn list_fragment_ids(&self, table: &'static str) -> Result<Vec<i64>> {
    let sql = format!("SELECT id FROM {} ORDER BY id", ident(table)?);
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn store_relationship(&self, link: LinkTable, relationship: Relationship) -> Result<()> {
    let sql = link_sql(&link)?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&sql, params![relationship.source, relationship.destination])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn store_relationship_slice(
    &self,
    link: LinkTable,
    source: i64,
    destinations: Vec<i64>,
  ) -> LinkReport {
    let mut report = LinkReport::default();
    for destination in destinations {
      match self.store_relationship(link, Relationship { source, destination }).await {
        Ok(()) => report.stored += 1,
        Err(err) => {
          warn!(table = link.table, source, destination, error = %err, "link skipped");
          report.failed += 1;
        }
      }
    }
    report
  }

  async fn fetch_relationship_slice(
    &self,
    link: LinkTable,
    source: i64,
  ) -> Result<Vec<Relationship>> {
    self.relationships(link, link.source, source).await
  }

  async fn fetch_relationship_sources(
    &self,
    link: LinkTable,
    destination: i64,
  ) -> Result<Vec<Relationship>> {
    self.relationships(link, link.destination, destination).await
  }

  async fn store_aggregate(
    &self,
    table: &'static str,
    key_column: &'static str,
    root: Fragment,
    links: Vec<LinkBatch>,
  ) -> Result<(Stored, LinkReport)> {
    let unique = UniqueInsert::new(table, key_column, &root)?;
    let batches = links
      .into_iter()
      .map(|batch| Ok((link_sql(&batch.link)?, batch.link.table, batch.destinations)))
      .collect::<Result<Vec<_>>>()?;

    let outcome = self
      .conn
      .call(move |conn| {
        let mut tx = conn.transaction()?;
        let stored = unique.run(&tx)?;
        if !stored.created {
          return Ok((stored, LinkReport::default()));
        }

        let mut report = LinkReport::default();
        for (sql, link_table, destinations) in &batches {
          for destination in destinations {
            let savepoint = tx.savepoint()?;
            match savepoint.execute(sql, params![stored.id, destination]) {
              Ok(_) => {
                savepoint.commit()?;
                report.stored += 1;
              }
              Err(err) => {
                // Dropping the savepoint rolls back this link only.
                warn!(table = %link_table, id = stored.id, destination, error = %err, "link skipped");
                report.failed += 1;
              }
            }
          }
        }

        tx.commit()?;
        Ok((stored, report))
      })
      .await?;
    Ok(outcome)
  }
}
