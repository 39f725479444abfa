//! Movies, backed by TheMovieDB.
//!
//! Genres and production companies arrive complete in the detail response,
//! so no related draft needs enrichment.

mod model;
pub mod tmdb;

pub use model::{Movie, MovieFragment, MovieGenre, MovieSearchResult, ProductionCompany};
pub use tmdb::MovieProvider;

use std::future::Future;

use crate::{
  Error, Result,
  domain::{Category, Decomposition, Domain, RelatedDraft, related_at},
  fragment::{Constraint, Fragment, FromFragment, decode_all},
  provider::ProviderError,
  store::LinkTable,
  text,
};
use tmdb::MovieDetail;

const IMAGE_URL: &str = "https://image.tmdb.org/t/p/original";

pub const GENRES: Category = Category {
  name:       "genres",
  table:      "movie_genres",
  key_column: "reference",
  link:       LinkTable { table: "movies_genres", source: "movie", destination: "genre" },
};

pub const PRODUCTION_COMPANIES: Category = Category {
  name:       "production_companies",
  table:      "production_companies",
  key_column: "reference",
  link:       LinkTable {
    table:       "movies_production_companies",
    source:      "movie",
    destination: "production_company",
  },
};

/// Full-size TMDB image for a `/…jpg` path; empty when there is none.
pub fn image_url(path: Option<&str>) -> String {
  match path.map(str::trim) {
    Some(p) if !p.is_empty() => format!("{IMAGE_URL}{p}"),
    _ => String::new(),
  }
}

/// The movie domain over a TMDB provider.
#[derive(Debug, Clone)]
pub struct Movies<P> {
  provider: P,
}

impl<P: MovieProvider> Movies<P> {
  pub fn new(provider: P) -> Self { Self { provider } }

  pub fn provider(&self) -> &P { &self.provider }

  async fn search_results(&self, query: &str) -> Result<Vec<MovieSearchResult>, ProviderError> {
    let response = self.provider.search(query).await?;
    Ok(
      response
        .results
        .into_iter()
        .map(|item| MovieSearchResult {
          id:           item.id,
          release_date: item.release_date.as_deref().and_then(text::parse_date),
          image:        image_url(item.poster_path.as_deref()),
          title:        item.title,
        })
        .collect(),
    )
  }
}

impl<P: MovieProvider> Domain for Movies<P> {
  type Entity = Movie;
  type Key = i64;
  type Payload = MovieDetail;
  type Root = MovieFragment;
  type SearchResult = MovieSearchResult;

  const NAME: &'static str = "movie";
  const ROOT_TABLE: &'static str = "movies";
  const ROOT_KEY: &'static str = "reference";
  const CATEGORIES: &'static [Category] = &[GENRES, PRODUCTION_COMPANIES];

  fn normalize_key(&self, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
      Ok(id) if id > 0 => Ok(id),
      _ => Err(Error::InvalidInput(format!("`{}` is not a TMDB movie id", raw.trim()))),
    }
  }

  fn existing(&self, key: &i64) -> Constraint { Constraint::eq("reference", *key) }

  fn fetch<'a>(
    &'a self,
    key: &'a i64,
  ) -> impl Future<Output = Result<Option<MovieDetail>, ProviderError>> + Send + 'a {
    self.provider.movie(*key)
  }

  fn decompose(&self, movie: MovieDetail) -> Decomposition {
    let root = Fragment::new()
      .with("title", movie.title.trim())
      .with("tagline", movie.tagline.unwrap_or_default())
      .with("description", movie.overview.unwrap_or_default())
      .with("release_date", movie.release_date.as_deref().and_then(text::parse_date))
      .with("runtime", movie.runtime.unwrap_or_default())
      .with("image", image_url(movie.poster_path.as_deref()))
      .with("reference", movie.id);

    let genres = movie
      .genres
      .iter()
      .filter(|g| g.id > 0)
      .map(|g| {
        RelatedDraft::new(g.id, Fragment::new().with("name", g.name.trim()).with("reference", g.id))
      })
      .collect();

    let companies = movie
      .production_companies
      .iter()
      .filter(|c| c.id > 0)
      .map(|c| {
        RelatedDraft::new(
          c.id,
          Fragment::new()
            .with("name", c.name.trim())
            .with("image", image_url(c.logo_path.as_deref()))
            .with("reference", c.id),
        )
      })
      .collect();

    Decomposition { root, related: vec![genres, companies] }
  }

  fn assemble(&self, root: &Fragment, related: &[Vec<Fragment>]) -> Result<Movie> {
    let scalars = MovieFragment::from_fragment(root)?;
    Ok(Movie {
      id:                   scalars.id,
      title:                scalars.title,
      tagline:              scalars.tagline,
      description:          scalars.description,
      release_date:         scalars.release_date,
      runtime:              scalars.runtime,
      image:                scalars.image,
      reference:            scalars.reference,
      genres:               decode_all(related_at(related, 0))?,
      production_companies: decode_all(related_at(related, 1))?,
    })
  }

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<MovieSearchResult>, ProviderError>> + Send + 'a {
    self.search_results(query)
  }

  fn replacement(&self, root: MovieFragment) -> Result<(i64, Fragment)> {
    if root.id <= 0 {
      return Err(Error::InvalidInput("movie id must be positive".to_owned()));
    }
    Ok((root.id, root.to_row()))
  }
}

#[cfg(test)]
mod tests {
  use super::{tmdb::*, *};

  struct Canned;

  impl MovieProvider for Canned {
    async fn movie(&self, _: i64) -> Result<Option<MovieDetail>, ProviderError> { Ok(None) }

    async fn search(&self, _: &str) -> Result<MovieSearchResponse, ProviderError> {
      Ok(MovieSearchResponse {
        page:    1,
        results: vec![
          MovieSearchItem {
            id:           603,
            title:        "The Matrix".into(),
            release_date: Some("1999-03-30".into()),
            poster_path:  Some("/poster.jpg".into()),
          },
          MovieSearchItem {
            id: 999,
            title: "Unreleased".into(),
            release_date: Some(String::new()),
            ..Default::default()
          },
        ],
      })
    }
  }

  #[test]
  fn decompose_prefixes_images() {
    let detail = MovieDetail {
      id: 603,
      title: "The Matrix".into(),
      overview: Some("A hacker learns the truth.".into()),
      release_date: Some("1999-03-30".into()),
      runtime: Some(136),
      poster_path: Some("/poster.jpg".into()),
      genres: vec![TmdbGenre { id: 28, name: "Action".into() }],
      production_companies: vec![TmdbCompany { id: 79, name: "Village Roadshow".into(), logo_path: None }],
      ..Default::default()
    };
    let d = Movies::new(Canned).decompose(detail);
    assert_eq!(d.root.text("image"), "https://image.tmdb.org/t/p/original/poster.jpg");
    assert_eq!(d.root.text("description"), "A hacker learns the truth.");
    assert_eq!(d.root.integer("runtime"), Some(136));
    assert_eq!(d.related[0][0].key, 28_i64.into());
    assert_eq!(d.related[1][0].row.text("image"), "");
  }

  #[tokio::test]
  async fn search_tolerates_blank_dates() {
    let results = Movies::new(Canned).search("matrix").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].release_date.is_some());
    assert_eq!(results[1].release_date, None);
    assert_eq!(results[1].image, "");
  }
}
