//! Games, backed by IGDB.
//!
//! A game is keyed by its numeric IGDB id. Franchises, genres and platforms
//! arrive expanded in the detail response; studios are the involved
//! companies flagged as developers and need a `/companies` lookup each.

pub mod igdb;
mod model;

pub use igdb::GameProvider;
pub use model::{Franchise, Game, GameFragment, GameGenre, GameSearchResult, Platform, Studio};

use std::future::Future;

use crate::{
  Error, Result,
  domain::{Category, Decomposition, Domain, RelatedDraft, related_at},
  fragment::{Constraint, Fragment, FromFragment, Value, decode_all},
  provider::ProviderError,
  store::LinkTable,
  text,
};
use igdb::{Cover, IgdbGame, Named};

pub const FRANCHISES: Category = Category {
  name:       "franchises",
  table:      "franchises",
  key_column: "reference",
  link:       LinkTable { table: "games_franchises", source: "game", destination: "franchise" },
};

pub const GENRES: Category = Category {
  name:       "genres",
  table:      "game_genres",
  key_column: "reference",
  link:       LinkTable { table: "games_genres", source: "game", destination: "genre" },
};

pub const PLATFORMS: Category = Category {
  name:       "platforms",
  table:      "platforms",
  key_column: "reference",
  link:       LinkTable { table: "games_platforms", source: "game", destination: "platform" },
};

pub const STUDIOS: Category = Category {
  name:       "studios",
  table:      "studios",
  key_column: "reference",
  link:       LinkTable { table: "games_studios", source: "game", destination: "studio" },
};

/// Cover art URL for an IGDB image id.
pub fn cover_image(cover: Option<&Cover>) -> String {
  match cover {
    Some(c) if !c.image_id.is_empty() => {
      format!("https://images.igdb.com/igdb/image/upload/t_cover_big/{}.jpg", c.image_id)
    }
    _ => String::new(),
  }
}

fn named_drafts(items: &[Named]) -> Vec<RelatedDraft> {
  items
    .iter()
    .filter(|n| n.id > 0)
    .map(|n| {
      RelatedDraft::new(
        n.id,
        Fragment::new().with("name", n.name.trim()).with("reference", n.id),
      )
    })
    .collect()
}

/// The game domain over an IGDB provider.
#[derive(Debug, Clone)]
pub struct Games<P> {
  provider: P,
}

impl<P: GameProvider> Games<P> {
  pub fn new(provider: P) -> Self { Self { provider } }

  pub fn provider(&self) -> &P { &self.provider }

  async fn studio_row(&self, reference: i64) -> Result<Option<Fragment>, ProviderError> {
    let Some(company) = self.provider.company(reference).await? else {
      return Ok(None);
    };
    Ok(Some(
      Fragment::new()
        .with("name", company.name.trim())
        .with("description", company.description.unwrap_or_default())
        .with("reference", reference),
    ))
  }

  async fn search_results(&self, query: &str) -> Result<Vec<GameSearchResult>, ProviderError> {
    let items = self.provider.search(query).await?;
    Ok(
      items
        .into_iter()
        .map(|item| GameSearchResult {
          id:           item.id,
          image:        cover_image(item.cover.as_ref()),
          release_date: item.first_release_date.and_then(text::date_from_unix),
          title:        item.name,
        })
        .collect(),
    )
  }
}

impl<P: GameProvider> Domain for Games<P> {
  type Entity = Game;
  type Key = i64;
  type Payload = IgdbGame;
  type Root = GameFragment;
  type SearchResult = GameSearchResult;

  const NAME: &'static str = "game";
  const ROOT_TABLE: &'static str = "games";
  const ROOT_KEY: &'static str = "reference";
  const CATEGORIES: &'static [Category] = &[FRANCHISES, GENRES, PLATFORMS, STUDIOS];

  fn normalize_key(&self, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
      Ok(id) if id > 0 => Ok(id),
      _ => Err(Error::InvalidInput(format!("`{}` is not an IGDB game id", raw.trim()))),
    }
  }

  fn existing(&self, key: &i64) -> Constraint { Constraint::eq("reference", *key) }

  fn fetch<'a>(
    &'a self,
    key: &'a i64,
  ) -> impl Future<Output = Result<Option<IgdbGame>, ProviderError>> + Send + 'a {
    self.provider.game(*key)
  }

  fn decompose(&self, game: IgdbGame) -> Decomposition {
    let root = Fragment::new()
      .with("title", game.name.trim())
      .with("summary", game.summary.unwrap_or_default())
      .with("storyline", game.storyline.unwrap_or_default())
      .with("release_date", game.first_release_date.and_then(text::date_from_unix))
      .with("image", cover_image(game.cover.as_ref()))
      .with("reference", game.id);

    let studios = game
      .involved_companies
      .iter()
      .filter(|c| c.developer && c.company > 0)
      .map(|c| RelatedDraft::keyed(STUDIOS.key_column, c.company))
      .collect();

    Decomposition {
      root,
      related: vec![
        named_drafts(&game.franchises),
        named_drafts(&game.genres),
        named_drafts(&game.platforms),
        studios,
      ],
    }
  }

  fn enrich<'a>(
    &'a self,
    category: &'a Category,
    draft: RelatedDraft,
  ) -> impl Future<Output = Result<Option<Fragment>, ProviderError>> + Send + 'a {
    async move {
      if *category == STUDIOS
        && let Value::Integer(reference) = &draft.key
      {
        return self.studio_row(*reference).await;
      }
      Ok(Some(draft.row))
    }
  }

  fn assemble(&self, root: &Fragment, related: &[Vec<Fragment>]) -> Result<Game> {
    let scalars = GameFragment::from_fragment(root)?;
    Ok(Game {
      id:           scalars.id,
      title:        scalars.title,
      summary:      scalars.summary,
      storyline:    scalars.storyline,
      release_date: scalars.release_date,
      image:        scalars.image,
      reference:    scalars.reference,
      franchises:   decode_all(related_at(related, 0))?,
      genres:       decode_all(related_at(related, 1))?,
      platforms:    decode_all(related_at(related, 2))?,
      studios:      decode_all(related_at(related, 3))?,
    })
  }

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<GameSearchResult>, ProviderError>> + Send + 'a {
    self.search_results(query)
  }

  fn replacement(&self, root: GameFragment) -> Result<(i64, Fragment)> {
    if root.id <= 0 {
      return Err(Error::InvalidInput("game id must be positive".to_owned()));
    }
    Ok((root.id, root.to_row()))
  }
}
