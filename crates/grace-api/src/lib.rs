//! JSON REST API for Grace.
//!
//! Exposes an axum [`Router`] per domain, each backed by a
//! [`grace_core::pipeline::Pipeline`] over any
//! [`grace_core::store::FragmentStore`]. Transport concerns (TLS, CORS,
//! tracing layers) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", grace_api::api_router(store, books, games, movies))
//! ```

pub mod envelope;
pub mod error;
pub mod material;

use std::sync::Arc;

use axum::{Router, routing::get};
use grace_core::{
  book::{BookProvider, Books},
  domain::Domain,
  game::{GameProvider, Games},
  movie::{MovieProvider, Movies},
  pipeline::Pipeline,
  store::FragmentStore,
};

pub use envelope::Envelope;
pub use error::ApiError;

/// Routes for one domain:
///
/// | Method | Path | |
/// |--------|------|-|
/// | `GET`  | `/?id=1,2` | assemble stored entities |
/// | `POST` | `/?id=<external>` | fetch or create |
/// | `PUT`  | `/` | replace a root's scalar fields |
/// | `GET`  | `/search?query=` | provider search |
/// | `GET`  | `/existence` | every stored id |
pub fn material_router<D, S>(pipeline: Arc<Pipeline<D, S>>) -> Router<()>
where
  D: Domain + 'static,
  S: FragmentStore + 'static,
{
  Router::new()
    .route(
      "/",
      get(material::list::<D, S>)
        .post(material::create::<D, S>)
        .put(material::update::<D, S>),
    )
    .route("/search", get(material::search::<D, S>))
    .route("/existence", get(material::existence::<D, S>))
    .with_state(pipeline)
}

/// Build the full API router: `/book`, `/game` and `/movie` over one store.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B, G, M>(store: Arc<S>, books: B, games: G, movies: M) -> Router<()>
where
  S: FragmentStore + 'static,
  B: BookProvider + 'static,
  G: GameProvider + 'static,
  M: MovieProvider + 'static,
{
  let books = Pipeline::new(Books::new(books), store.clone());
  let games = Pipeline::new(Games::new(games), store.clone());
  let movies = Pipeline::new(Movies::new(movies), store);

  Router::new()
    .nest("/book", material_router(Arc::new(books)))
    .nest("/game", material_router(Arc::new(games)))
    .nest("/movie", material_router(Arc::new(movies)))
}
