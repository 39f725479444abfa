//! The `FragmentStore` trait and the relationship types it persists.
//!
//! The trait is implemented by storage backends (e.g. `grace-store-sqlite`).
//! The pipeline depends on this abstraction only. Table and column names are
//! `'static` because they come from the domain descriptors, never from
//! request input.

use std::future::Future;

use serde::Serialize;

use crate::fragment::{Constraint, Fragment};

// ─── Relationship types ──────────────────────────────────────────────────────

/// A join table linking a root table to one related category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTable {
  pub table:       &'static str,
  /// Column holding the root identifier.
  pub source:      &'static str,
  /// Column holding the related fragment identifier.
  pub destination: &'static str,
}

/// One join row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Relationship {
  pub source:      i64,
  pub destination: i64,
}

/// The destinations to link to a freshly written root, for one join table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBatch {
  pub link:         LinkTable,
  pub destinations: Vec<i64>,
}

/// Result of an insert-or-fetch by natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stored {
  pub id:      i64,
  /// `false` when a row with the same natural key already existed.
  pub created: bool,
}

/// Outcome of a best-effort batch of relationship writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
  pub stored: usize,
  pub failed: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a relational fragment store.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait FragmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Fragments ─────────────────────────────────────────────────────────

  /// First row of `table` matching `constraint`, lowest id first.
  fn fetch_fragment(
    &self,
    table: &'static str,
    constraint: Constraint,
  ) -> impl Future<Output = Result<Option<Fragment>, Self::Error>> + Send + '_;

  /// Every row of `table` matching `constraint`, ordered by id.
  fn fetch_fragment_slice(
    &self,
    table: &'static str,
    constraint: Constraint,
  ) -> impl Future<Output = Result<Vec<Fragment>, Self::Error>> + Send + '_;

  /// Insert `row` in its own transaction and return the generated id. Any
  /// `id` column in `row` is ignored.
  fn store_fragment(
    &self,
    table: &'static str,
    row: Fragment,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Insert `row` unless a row with the same `key_column` value exists, in
  /// which case that row's id is returned with `created = false`.
  fn store_unique_fragment(
    &self,
    table: &'static str,
    key_column: &'static str,
    row: Fragment,
  ) -> impl Future<Output = Result<Stored, Self::Error>> + Send + '_;

  /// Replace every column in `row` on the row with identifier `id`.
  /// Returns `None` when no such row exists.
  fn update_fragment(
    &self,
    table: &'static str,
    id: i64,
    row: Fragment,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// Every identifier in `table`, ascending.
  fn list_fragment_ids(
    &self,
    table: &'static str,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Insert one join row. Linking an already linked pair is a no-op.
  fn store_relationship(
    &self,
    link: LinkTable,
    relationship: Relationship,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Link `source` to each of `destinations`. Failures are logged and
  /// counted; they never abort the remaining inserts.
  fn store_relationship_slice(
    &self,
    link: LinkTable,
    source: i64,
    destinations: Vec<i64>,
  ) -> impl Future<Output = LinkReport> + Send + '_;

  /// Every join row whose source is `source`, in insertion order.
  fn fetch_relationship_slice(
    &self,
    link: LinkTable,
    source: i64,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Every join row whose destination is `destination`, in insertion order.
  fn fetch_relationship_sources(
    &self,
    link: LinkTable,
    destination: i64,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Write a root fragment and all of its relationships in one transaction.
  ///
  /// If a root with the same `key_column` value already exists, nothing is
  /// written and the existing id is returned with `created = false`. Each
  /// join row is isolated so one failing link is skipped and counted
  /// without losing the root or its other links.
  fn store_aggregate(
    &self,
    table: &'static str,
    key_column: &'static str,
    root: Fragment,
    links: Vec<LinkBatch>,
  ) -> impl Future<Output = Result<(Stored, LinkReport), Self::Error>> + Send + '_;
}
