//! Books, backed by OpenLibrary.
//!
//! A book is keyed by its OpenLibrary edition id. Lookups accept an ISBN-10,
//! an ISBN-13 (dashes allowed) or an edition id. Work-level metadata
//! (description, subjects) needs a second round-trip.

mod model;
pub mod openlibrary;

pub use model::{Author, Book, BookFragment, BookSearchResult, Publisher, Topic};
pub use openlibrary::{BookPayload, BookProvider};

use std::{collections::HashSet, future::Future};

use tracing::{debug, warn};

use crate::{
  Error, Result,
  domain::{Category, Decomposition, Domain, RelatedDraft, related_at},
  fragment::{Constraint, Fragment, FromFragment, Value, decode_all},
  provider::ProviderError,
  store::LinkTable,
  text,
};

const COVER_URL: &str = "https://covers.openlibrary.org";

pub const AUTHORS: Category = Category {
  name:       "authors",
  table:      "authors",
  key_column: "reference",
  link:       LinkTable { table: "books_authors", source: "book", destination: "author" },
};

pub const PUBLISHERS: Category = Category {
  name:       "publishers",
  table:      "publishers",
  key_column: "name",
  link:       LinkTable { table: "books_publishers", source: "book", destination: "publisher" },
};

pub const TOPICS: Category = Category {
  name:       "topics",
  table:      "topics",
  key_column: "name",
  link:       LinkTable { table: "books_topics", source: "book", destination: "topic" },
};

/// Every ISBN an edition lists, so that any of them finds the stored book.
pub const ISBNS: Category = Category {
  name:       "isbns",
  table:      "isbns",
  key_column: "isbn",
  link:       LinkTable { table: "books_isbns", source: "book", destination: "isbn" },
};

/// Cover image of an edition.
pub fn edition_image(olid: &str) -> String { format!("{COVER_URL}/b/olid/{olid}-L.jpg") }

/// Photo of an author.
pub fn author_image(olid: &str) -> String { format!("{COVER_URL}/a/olid/{olid}-L.jpg") }

/// The book domain over an OpenLibrary provider.
#[derive(Debug, Clone)]
pub struct Books<P> {
  provider: P,
}

impl<P: BookProvider> Books<P> {
  pub fn new(provider: P) -> Self { Self { provider } }

  pub fn provider(&self) -> &P { &self.provider }

  async fn fetch_payload(&self, key: &str) -> Result<Option<BookPayload>, ProviderError> {
    let Some(edition) = self.provider.edition(key).await? else {
      return Ok(None);
    };
    if !text::extract_resource_id(&edition.key).is_some_and(|olid| olid.ends_with('M')) {
      return Err(ProviderError::Incomplete(format!(
        "edition {key} has no edition id in `{}`",
        edition.key
      )));
    }

    let work_id = edition
      .works
      .first()
      .and_then(|w| text::extract_resource_id(&w.key))
      .ok_or_else(|| ProviderError::Incomplete(format!("edition {key} lists no work")))?;

    let work = self.provider.work(&work_id).await?;
    if work.is_none() {
      warn!(%key, %work_id, "work not found; storing edition data only");
    }

    Ok(Some(BookPayload { edition, work }))
  }

  async fn author_row(&self, reference: &str) -> Result<Option<Fragment>, ProviderError> {
    let Some(author) = self.provider.author(reference).await? else {
      return Ok(None);
    };
    let name = text::split_name(&author.name);
    Ok(Some(
      Fragment::new()
        .with("first_name", name.first)
        .with("middle_name", name.middle)
        .with("last_name", name.last)
        .with("biography", text::extract_description(&author.bio))
        .with("image", author_image(reference))
        .with("reference", reference),
    ))
  }

  async fn search_results(&self, query: &str) -> Result<Vec<BookSearchResult>, ProviderError> {
    let response = self.provider.search(query).await?;
    debug!(query, found = response.num_found, "openlibrary search");

    let results = response
      .docs
      .into_iter()
      .filter_map(|doc| {
        let Some(id) = doc.edition_key.first().cloned() else {
          debug!(title = %doc.title, "search hit has no edition key");
          return None;
        };
        if doc.author_name.is_empty() {
          debug!(%id, "search hit has no authors");
          return None;
        }
        let Some(publish_date) = text::last_parseable_date(&doc.publish_date) else {
          debug!(%id, "search hit has no parseable publish date");
          return None;
        };
        Some(BookSearchResult {
          image: edition_image(&id),
          id,
          title: doc.title,
          authors: doc.author_name,
          publish_date,
        })
      })
      .collect();
    Ok(results)
  }
}

/// Valid ISBNs, ISBN-13 first, normalized and without repeats.
fn isbn_drafts(isbn_13: &[String], isbn_10: &[String]) -> Vec<RelatedDraft> {
  let mut seen = HashSet::new();
  isbn_13
    .iter()
    .chain(isbn_10)
    .map(|raw| text::normalize_isbn(raw))
    .filter(|isbn| text::is_isbn(isbn) && seen.insert(isbn.clone()))
    .map(|isbn| RelatedDraft::keyed(ISBNS.key_column, isbn))
    .collect()
}

/// Trimmed, non-empty names as name-keyed drafts.
fn named_drafts<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<RelatedDraft> {
  names
    .into_iter()
    .map(|name| name.trim())
    .filter(|name| !name.is_empty())
    .map(|name| RelatedDraft::keyed("name", name))
    .collect()
}

impl<P: BookProvider> Domain for Books<P> {
  type Entity = Book;
  type Key = String;
  type Payload = BookPayload;
  type Root = BookFragment;
  type SearchResult = BookSearchResult;

  const NAME: &'static str = "book";
  const ROOT_TABLE: &'static str = "books";
  const ROOT_KEY: &'static str = "edition_reference";
  const CATEGORIES: &'static [Category] = &[AUTHORS, PUBLISHERS, TOPICS, ISBNS];

  fn normalize_key(&self, raw: &str) -> Result<String> {
    let isbn = text::normalize_isbn(raw);
    if text::is_isbn(&isbn) {
      return Ok(isbn);
    }
    let trimmed = raw.trim();
    match text::extract_resource_id(trimmed) {
      Some(olid) if olid == trimmed && olid.ends_with('M') => Ok(olid),
      _ => Err(Error::InvalidInput(format!(
        "`{trimmed}` is neither an ISBN nor an OpenLibrary edition id"
      ))),
    }
  }

  fn existing(&self, key: &String) -> Constraint {
    Constraint::Any(vec![
      Constraint::eq("isbn13", key.as_str()),
      Constraint::eq("isbn10", key.as_str()),
      Constraint::eq("edition_reference", key.as_str()),
    ])
  }

  fn alias(&self, key: &String) -> Option<(Category, Value)> {
    text::is_isbn(key).then(|| (ISBNS, Value::Text(key.clone())))
  }

  fn fetch<'a>(
    &'a self,
    key: &'a String,
  ) -> impl Future<Output = Result<Option<BookPayload>, ProviderError>> + Send + 'a {
    self.fetch_payload(key)
  }

  fn decompose(&self, payload: BookPayload) -> Decomposition {
    let BookPayload { edition, work } = payload;

    let edition_reference = text::extract_resource_id(&edition.key).unwrap_or_default();
    let image = if edition_reference.is_empty() {
      String::new()
    } else {
      edition_image(&edition_reference)
    };
    let work_reference = work
      .as_ref()
      .and_then(|w| text::extract_resource_id(&w.key))
      .or_else(|| edition.works.first().and_then(|w| text::extract_resource_id(&w.key)))
      .unwrap_or_default();
    let description = work
      .as_ref()
      .map(|w| text::extract_description(&w.description))
      .unwrap_or_default();

    let root = Fragment::new()
      .with("title", edition.title.trim())
      .with("subtitle", edition.subtitle.as_deref().unwrap_or_default().trim())
      .with("description", description)
      .with("publish_date", edition.publish_date.as_deref().and_then(text::parse_date))
      .with("pages", edition.number_of_pages.unwrap_or_default())
      .with("isbn10", edition.isbn_10.first().map(|i| text::normalize_isbn(i)).unwrap_or_default())
      .with("isbn13", edition.isbn_13.first().map(|i| text::normalize_isbn(i)).unwrap_or_default())
      .with("image", image)
      .with("edition_reference", edition_reference)
      .with("work_reference", work_reference);

    let author_keys: Vec<&str> = if edition.authors.is_empty() {
      work
        .iter()
        .flat_map(|w| w.authors.iter().map(|a| a.author.key.as_str()))
        .collect()
    } else {
      edition.authors.iter().map(|a| a.key.as_str()).collect()
    };
    let authors = author_keys
      .into_iter()
      .filter_map(text::extract_resource_id)
      .map(|olid| RelatedDraft::keyed(AUTHORS.key_column, olid))
      .collect();

    let publishers = named_drafts(&edition.publishers);
    let topics = named_drafts(work.iter().flat_map(|w| w.subjects.iter()));
    let isbns = isbn_drafts(&edition.isbn_13, &edition.isbn_10);

    Decomposition { root, related: vec![authors, publishers, topics, isbns] }
  }

  fn enrich<'a>(
    &'a self,
    category: &'a Category,
    draft: RelatedDraft,
  ) -> impl Future<Output = Result<Option<Fragment>, ProviderError>> + Send + 'a {
    async move {
      if *category == AUTHORS
        && let Value::Text(reference) = &draft.key
      {
        return self.author_row(reference).await;
      }
      Ok(Some(draft.row))
    }
  }

  fn assemble(&self, root: &Fragment, related: &[Vec<Fragment>]) -> Result<Book> {
    let scalars = BookFragment::from_fragment(root)?;
    Ok(Book {
      id:                scalars.id,
      title:             scalars.title,
      subtitle:          scalars.subtitle,
      description:       scalars.description,
      authors:           decode_all(related_at(related, 0))?,
      publishers:        decode_all(related_at(related, 1))?,
      topics:            decode_all(related_at(related, 2))?,
      isbns:             related_at(related, 3).iter().map(|f| f.text("isbn")).collect(),
      publish_date:      scalars.publish_date,
      pages:             scalars.pages,
      isbn10:            scalars.isbn10,
      isbn13:            scalars.isbn13,
      image:             scalars.image,
      edition_reference: scalars.edition_reference,
      work_reference:    scalars.work_reference,
    })
  }

  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<BookSearchResult>, ProviderError>> + Send + 'a {
    self.search_results(query)
  }

  fn replacement(&self, root: BookFragment) -> Result<(i64, Fragment)> {
    if root.id <= 0 {
      return Err(Error::InvalidInput("book id must be positive".to_owned()));
    }
    if root.edition_reference.trim().is_empty() {
      return Err(Error::InvalidInput("edition_reference must not be empty".to_owned()));
    }
    Ok((root.id, root.to_row()))
  }
}
