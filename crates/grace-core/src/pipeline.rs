//! The fetch-or-create pipeline, written once for every [`Domain`].
//!
//! ```text
//! key ─▶ existing root? ──yes──▶ Outcome { created: false }
//!            │ no
//!            ▼
//!      provider fetch ──none──▶ not found
//!            │
//!            ▼
//!      decompose ─▶ resolve related (dedup by natural key) ─▶ store aggregate
//! ```

use std::{collections::HashSet, sync::Arc};

use futures::{StreamExt as _, stream};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  domain::{Category, Decomposition, Domain, RelatedDraft},
  fragment::{Constraint, Fragment},
  store::{FragmentStore, LinkBatch},
};

/// Related drafts resolved concurrently within one category.
const RESOLVE_CONCURRENCY: usize = 4;

/// Result of [`Pipeline::fetch_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
  pub id:      i64,
  #[serde(skip)]
  pub created: bool,
}

/// The pipeline for one domain over one store.
pub struct Pipeline<D, S> {
  domain: D,
  store:  Arc<S>,
}

impl<D, S> Pipeline<D, S>
where
  D: Domain,
  S: FragmentStore,
{
  pub fn new(domain: D, store: Arc<S>) -> Self { Self { domain, store } }

  pub fn domain(&self) -> &D { &self.domain }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Fetch or create ───────────────────────────────────────────────────

  /// Return the local id for external identifier `raw`, creating the root
  /// and its related fragments from the provider on a miss. `Ok(None)`
  /// means the provider has no such record.
  pub async fn fetch_or_create(&self, raw: &str) -> Result<Option<Outcome>> {
    let key = self.domain.normalize_key(raw)?;

    if let Some(id) = self.stored_root(&key).await? {
      debug!(domain = D::NAME, %key, id, "root already stored");
      return Ok(Some(Outcome { id, created: false }));
    }

    let Some(payload) = self.domain.fetch(&key).await? else {
      info!(domain = D::NAME, %key, "provider has no record");
      return Ok(None);
    };

    let Decomposition { root, mut related } = self.domain.decompose(payload);
    related.resize_with(D::CATEGORIES.len(), Vec::new);

    let mut links = Vec::with_capacity(D::CATEGORIES.len());
    for (category, drafts) in D::CATEGORIES.iter().zip(related) {
      let destinations = self.resolve_category(category, drafts).await;
      links.push(LinkBatch { link: category.link, destinations });
    }

    let (stored, report) = self
      .store
      .store_aggregate(D::ROOT_TABLE, D::ROOT_KEY, root, links)
      .await
      .map_err(Error::store)?;

    if stored.created {
      info!(
        domain = D::NAME,
        %key,
        id = stored.id,
        links = report.stored,
        "stored new root"
      );
    } else {
      debug!(domain = D::NAME, %key, id = stored.id, "root written concurrently");
    }
    if report.failed > 0 {
      warn!(domain = D::NAME, id = stored.id, failed = report.failed, "some links were skipped");
    }

    Ok(Some(Outcome { id: stored.id, created: stored.created }))
  }

  /// Id of the root already stored for `key`, matched on the root's own
  /// columns first and then through the domain's alias category.
  async fn stored_root(&self, key: &D::Key) -> Result<Option<i64>> {
    let existing = self
      .store
      .fetch_fragment(D::ROOT_TABLE, self.domain.existing(key))
      .await
      .map_err(Error::store)?;
    if let Some(root) = existing {
      return root.require_id(D::ROOT_TABLE).map(Some);
    }

    let Some((category, alias)) = self.domain.alias(key) else {
      return Ok(None);
    };
    let Some(fragment) = self
      .store
      .fetch_fragment(category.table, Constraint::Eq(category.key_column, alias))
      .await
      .map_err(Error::store)?
    else {
      return Ok(None);
    };
    let destination = fragment.require_id(category.table)?;
    let sources = self
      .store
      .fetch_relationship_sources(category.link, destination)
      .await
      .map_err(Error::store)?;
    Ok(sources.first().map(|r| r.source))
  }

  /// Resolve every draft of one category, keeping provider order and
  /// dropping duplicates and drafts that could not be resolved.
  async fn resolve_category(&self, category: &Category, drafts: Vec<RelatedDraft>) -> Vec<i64> {
    let pending: Vec<_> = drafts
      .into_iter()
      .map(|draft| self.resolve_or_create(category, draft))
      .collect();
    let resolved: Vec<Option<i64>> = stream::iter(pending)
      .buffered(RESOLVE_CONCURRENCY)
      .collect()
      .await;

    let mut seen = HashSet::new();
    resolved
      .into_iter()
      .flatten()
      .filter(|id| seen.insert(*id))
      .collect()
  }

  /// Natural-key deduplication: return the id of the related fragment with
  /// `draft.key`, creating it (after provider enrichment) when absent.
  /// Failures are logged and yield `None`.
  pub async fn resolve_or_create(&self, category: &Category, draft: RelatedDraft) -> Option<i64> {
    let key = draft.key.clone();

    match self
      .store
      .fetch_fragment(category.table, Constraint::Eq(category.key_column, key.clone()))
      .await
    {
      Ok(Some(existing)) => {
        if let Some(id) = existing.id() {
          return Some(id);
        }
        warn!(category = category.name, ?key, "stored fragment has no id");
        return None;
      }
      Ok(None) => {}
      Err(err) => {
        warn!(category = category.name, ?key, error = %err, "lookup failed");
        return None;
      }
    }

    let mut row = match self.domain.enrich(category, draft).await {
      Ok(Some(row)) => row,
      Ok(None) => {
        warn!(category = category.name, ?key, "provider has no record; skipping");
        return None;
      }
      Err(err) => {
        warn!(category = category.name, ?key, error = %err, "enrichment failed; skipping");
        return None;
      }
    };
    row.insert(category.key_column, key.clone());

    match self
      .store
      .store_unique_fragment(category.table, category.key_column, row)
      .await
    {
      Ok(stored) => Some(stored.id),
      Err(err) => {
        warn!(category = category.name, ?key, error = %err, "insert failed; skipping");
        None
      }
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Assemble the nested entity whose root matches `constraint`.
  pub async fn assemble(&self, constraint: Constraint) -> Result<Option<D::Entity>> {
    let Some(root) = self
      .store
      .fetch_fragment(D::ROOT_TABLE, constraint)
      .await
      .map_err(Error::store)?
    else {
      return Ok(None);
    };
    let id = root.require_id(D::ROOT_TABLE)?;

    let mut related = Vec::with_capacity(D::CATEGORIES.len());
    for category in D::CATEGORIES {
      related.push(self.related_fragments(category, id).await?);
    }

    self.domain.assemble(&root, &related).map(Some)
  }

  /// Assemble each id in order, skipping ids that are not stored.
  pub async fn assemble_many(&self, ids: &[i64]) -> Result<Vec<D::Entity>> {
    let mut entities = Vec::with_capacity(ids.len());
    for id in ids {
      if let Some(entity) = self.assemble(Constraint::id(*id)).await? {
        entities.push(entity);
      }
    }
    Ok(entities)
  }

  async fn related_fragments(&self, category: &Category, source: i64) -> Result<Vec<Fragment>> {
    let relationships = self
      .store
      .fetch_relationship_slice(category.link, source)
      .await
      .map_err(Error::store)?;

    let mut fragments = Vec::with_capacity(relationships.len());
    for relationship in relationships {
      let fragment = self
        .store
        .fetch_fragment(category.table, Constraint::id(relationship.destination))
        .await
        .map_err(Error::store)?;
      match fragment {
        Some(fragment) => fragments.push(fragment),
        None => warn!(
          category = category.name,
          source,
          destination = relationship.destination,
          "dangling relationship; skipping"
        ),
      }
    }
    Ok(fragments)
  }

  /// Every root id of this domain.
  pub async fn existence(&self) -> Result<Vec<i64>> {
    self
      .store
      .list_fragment_ids(D::ROOT_TABLE)
      .await
      .map_err(Error::store)
  }

  // ── Provider passthrough ──────────────────────────────────────────────

  pub async fn search(&self, query: &str) -> Result<Vec<D::SearchResult>> {
    let query = query.trim();
    if query.is_empty() {
      return Err(Error::InvalidInput("search query must not be empty".to_owned()));
    }
    Ok(self.domain.search(query).await?)
  }

  // ── Updates ───────────────────────────────────────────────────────────

  /// Replace the scalar columns of a stored root. `Ok(None)` when the id is
  /// not stored.
  pub async fn update(&self, root: D::Root) -> Result<Option<i64>> {
    let (id, row) = self.domain.replacement(root)?;
    let updated = self
      .store
      .update_fragment(D::ROOT_TABLE, id, row)
      .await
      .map_err(Error::store)?;
    if updated.is_some() {
      info!(domain = D::NAME, id, "root replaced");
    }
    Ok(updated)
  }
}
