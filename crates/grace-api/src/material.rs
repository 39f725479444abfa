//! Handlers shared by every domain router.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/?id=1,2` | 204 when none of the ids are stored |
//! | `POST` | `/?id=<external>` | 201 created, 200 already stored, 204 unknown to the provider |
//! | `PUT`  | `/` | Body: the scalar record; 204 when the id is not stored |
//! | `GET`  | `/search?query=` | 204 when the provider finds nothing |
//! | `GET`  | `/existence` | 204 when the domain is empty |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use grace_core::{domain::Domain, pipeline::Pipeline, store::FragmentStore};
use serde::{Deserialize, Serialize};

use crate::{envelope::Envelope, error::ApiError};

type SharedPipeline<D, S> = State<Arc<Pipeline<D, S>>>;

#[derive(Debug, Deserialize)]
pub struct IdParams {
  pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query: Option<String>,
}

/// The `data` of write responses.
#[derive(Debug, Serialize)]
struct Written {
  id: i64,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| ApiError::BadRequest(format!("missing `{name}` parameter")))
}

/// Parse a comma-separated list of local ids; at least one is required.
fn parse_ids(raw: &str) -> Result<Vec<i64>, ApiError> {
  let ids = raw
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| match part.parse::<i64>() {
      Ok(id) if id > 0 => Ok(id),
      _ => Err(ApiError::BadRequest(format!("`{part}` is not a valid id"))),
    })
    .collect::<Result<Vec<_>, _>>()?;
  if ids.is_empty() {
    return Err(ApiError::BadRequest("missing `id` parameter".to_owned()));
  }
  Ok(ids)
}

fn no_content() -> Response { StatusCode::NO_CONTENT.into_response() }

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /?id=1,2`
pub async fn list<D, S>(
  State(pipeline): SharedPipeline<D, S>,
  Query(params): Query<IdParams>,
) -> Result<Response, ApiError>
where
  D: Domain,
  S: FragmentStore,
{
  let ids = parse_ids(&required(params.id, "id")?)?;
  let entities = pipeline.assemble_many(&ids).await?;
  if entities.is_empty() {
    return Ok(no_content());
  }
  Ok(Envelope::data(StatusCode::OK, entities).into_response())
}

// ─── Fetch or create ─────────────────────────────────────────────────────────

/// `POST /?id=<external>`
pub async fn create<D, S>(
  State(pipeline): SharedPipeline<D, S>,
  Query(params): Query<IdParams>,
) -> Result<Response, ApiError>
where
  D: Domain,
  S: FragmentStore,
{
  let id = required(params.id, "id")?;
  let Some(outcome) = pipeline.fetch_or_create(&id).await? else {
    return Ok(no_content());
  };

  let written = Written { id: outcome.id };
  let envelope = if outcome.created {
    Envelope::with_message(StatusCode::CREATED, "created", written)
  } else {
    Envelope::with_message(StatusCode::OK, "already exists", written)
  };
  Ok(envelope.into_response())
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /` with the full scalar record, including `id`, as the body.
pub async fn update<D, S>(
  State(pipeline): SharedPipeline<D, S>,
  body: Result<Json<D::Root>, JsonRejection>,
) -> Result<Response, ApiError>
where
  D: Domain,
  S: FragmentStore,
{
  let Json(root) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
  match pipeline.update(root).await? {
    Some(id) => Ok(Envelope::data(StatusCode::OK, Written { id }).into_response()),
    None => Ok(no_content()),
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// `GET /search?query=`
pub async fn search<D, S>(
  State(pipeline): SharedPipeline<D, S>,
  Query(params): Query<SearchParams>,
) -> Result<Response, ApiError>
where
  D: Domain,
  S: FragmentStore,
{
  let query = required(params.query, "query")?;
  let results = pipeline.search(&query).await?;
  if results.is_empty() {
    return Ok(no_content());
  }
  Ok(Envelope::data(StatusCode::OK, results).into_response())
}

// ─── Existence ───────────────────────────────────────────────────────────────

/// `GET /existence`
pub async fn existence<D, S>(State(pipeline): SharedPipeline<D, S>) -> Result<Response, ApiError>
where
  D: Domain,
  S: FragmentStore,
{
  let ids = pipeline.existence().await?;
  if ids.is_empty() {
    return Ok(no_content());
  }
  Ok(Envelope::data(StatusCode::OK, ids).into_response())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_comma_separated() {
    assert_eq!(parse_ids("1, 2,3,").unwrap(), vec![1, 2, 3]);
    assert!(matches!(parse_ids("1,x"), Err(ApiError::BadRequest(_))));
    assert!(matches!(parse_ids("-4"), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn id_lists_without_ids_are_rejected() {
    for raw in [",", " , ", ",,,"] {
      assert!(matches!(parse_ids(raw), Err(ApiError::BadRequest(_))), "{raw:?}");
    }
  }

  #[test]
  fn blank_parameters_are_missing() {
    assert!(required(Some("  ".into()), "id").is_err());
    assert!(required(None, "id").is_err());
    assert_eq!(required(Some(" 7 ".into()), "id").unwrap(), "7");
  }
}
