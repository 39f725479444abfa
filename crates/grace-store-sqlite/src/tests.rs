//! Integration tests for `SqliteStore` against an in-memory database.

use grace_core::{
  book,
  fragment::{Constraint, Fragment, Value},
  movie,
  store::{FragmentStore, LinkBatch, LinkReport, Relationship},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn topic(name: &str) -> Fragment { Fragment::new().with("name", name) }

fn movie_row(reference: i64) -> Fragment {
  Fragment::new()
    .with("title", "The Matrix")
    .with("tagline", "")
    .with("description", "")
    .with("release_date", Value::Null)
    .with("runtime", 136_i64)
    .with("image", "")
    .with("reference", reference)
}

// ─── Fragments ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn store_and_fetch_fragment() {
  let s = store().await;
  let id = s.store_fragment("topics", topic("Fantasy")).await.unwrap();

  let fetched = s
    .fetch_fragment("topics", Constraint::id(id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.id(), Some(id));
  assert_eq!(fetched.text("name"), "Fantasy");
}

#[tokio::test]
async fn fetch_fragment_missing_returns_none() {
  let s = store().await;
  let result = s
    .fetch_fragment("topics", Constraint::eq("name", "Nope"))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn fetch_fragment_slice_filters_with_any() {
  let s = store().await;
  s.store_fragment("topics", topic("Fantasy")).await.unwrap();
  s.store_fragment("topics", topic("Horror")).await.unwrap();
  s.store_fragment("topics", topic("Witchers")).await.unwrap();

  let rows = s
    .fetch_fragment_slice(
      "topics",
      Constraint::Any(vec![Constraint::eq("name", "Fantasy"), Constraint::eq("name", "Witchers")]),
    )
    .await
    .unwrap();
  let names: Vec<_> = rows.iter().map(|r| r.text("name")).collect();
  assert_eq!(names, vec!["Fantasy", "Witchers"]);
}

#[tokio::test]
async fn constraint_values_are_bound_not_spliced() {
  let s = store().await;
  s.store_fragment("topics", topic("x' OR '1'='1")).await.unwrap();
  s.store_fragment("topics", topic("other")).await.unwrap();

  let rows = s
    .fetch_fragment_slice("topics", Constraint::eq("name", "x' OR '1'='1"))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn plain_insert_violating_unique_key_fails() {
  let s = store().await;
  s.store_fragment("topics", topic("Fantasy")).await.unwrap();
  assert!(s.store_fragment("topics", topic("Fantasy")).await.is_err());

  let rows = s.fetch_fragment_slice("topics", Constraint::All(vec![])).await.unwrap();
  assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn unique_insert_returns_existing_row() {
  let s = store().await;
  let first = s
    .store_unique_fragment("topics", "name", topic("Fantasy"))
    .await
    .unwrap();
  let second = s
    .store_unique_fragment("topics", "name", topic("Fantasy"))
    .await
    .unwrap();

  assert!(first.created);
  assert!(!second.created);
  assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn unknown_table_is_rejected_before_sql() {
  let s = store().await;
  let err = s
    .store_fragment("topics; DROP TABLE books", topic("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::InvalidIdentifier(_)));
}

#[tokio::test]
async fn update_replaces_scalars() {
  let s = store().await;
  let id = s.store_fragment("movies", movie_row(603)).await.unwrap();

  let replaced = movie_row(603).with("title", "The Matrix (1999)").with("runtime", 137_i64);
  assert_eq!(s.update_fragment("movies", id, replaced).await.unwrap(), Some(id));

  let row = s.fetch_fragment("movies", Constraint::id(id)).await.unwrap().unwrap();
  assert_eq!(row.text("title"), "The Matrix (1999)");
  assert_eq!(row.integer("runtime"), Some(137));
}

#[tokio::test]
async fn update_missing_row_returns_none() {
  let s = store().await;
  assert_eq!(s.update_fragment("movies", 42, movie_row(1)).await.unwrap(), None);
}

#[tokio::test]
async fn list_fragment_ids_is_ascending() {
  let s = store().await;
  let a = s.store_fragment("movies", movie_row(1)).await.unwrap();
  let b = s.store_fragment("movies", movie_row(2)).await.unwrap();
  assert_eq!(s.list_fragment_ids("movies").await.unwrap(), vec![a, b]);
  assert!(s.list_fragment_ids("books").await.unwrap().is_empty());
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn relationships_keep_insertion_order() {
  let s = store().await;
  let link = movie::GENRES.link;
  let movie = s.store_fragment("movies", movie_row(603)).await.unwrap();
  let action = s
    .store_fragment("movie_genres", Fragment::new().with("name", "Action").with("reference", 28_i64))
    .await
    .unwrap();
  let scifi = s
    .store_fragment("movie_genres", Fragment::new().with("name", "Sci-Fi").with("reference", 878_i64))
    .await
    .unwrap();

  let report = s.store_relationship_slice(link, movie, vec![scifi, action]).await;
  assert_eq!(report, LinkReport { stored: 2, failed: 0 });

  let rows = s.fetch_relationship_slice(link, movie).await.unwrap();
  assert_eq!(
    rows,
    vec![
      Relationship { source: movie, destination: scifi },
      Relationship { source: movie, destination: action },
    ]
  );
}

#[tokio::test]
async fn relationships_are_found_by_destination() {
  let s = store().await;
  let link = movie::GENRES.link;
  let matrix = s.store_fragment("movies", movie_row(603)).await.unwrap();
  let reloaded = s.store_fragment("movies", movie_row(604)).await.unwrap();
  let action = s
    .store_fragment("movie_genres", Fragment::new().with("name", "Action").with("reference", 28_i64))
    .await
    .unwrap();

  s.store_relationship_slice(link, reloaded, vec![action]).await;
  s.store_relationship_slice(link, matrix, vec![action]).await;

  let rows = s.fetch_relationship_sources(link, action).await.unwrap();
  assert_eq!(
    rows,
    vec![
      Relationship { source: reloaded, destination: action },
      Relationship { source: matrix, destination: action },
    ]
  );
  assert!(s.fetch_relationship_sources(link, action + 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_relationship_is_ignored() {
  let s = store().await;
  let link = movie::GENRES.link;
  let movie = s.store_fragment("movies", movie_row(603)).await.unwrap();
  let genre = s
    .store_fragment("movie_genres", Fragment::new().with("name", "Action").with("reference", 28_i64))
    .await
    .unwrap();

  let pair = Relationship { source: movie, destination: genre };
  s.store_relationship(link, pair).await.unwrap();
  s.store_relationship(link, pair).await.unwrap();

  assert_eq!(s.fetch_relationship_slice(link, movie).await.unwrap().len(), 1);
}

#[tokio::test]
async fn relationship_slice_continues_past_failures() {
  let s = store().await;
  let link = movie::GENRES.link;
  let movie = s.store_fragment("movies", movie_row(603)).await.unwrap();
  let genre = s
    .store_fragment("movie_genres", Fragment::new().with("name", "Action").with("reference", 28_i64))
    .await
    .unwrap();

  // 999 does not exist; the foreign key rejects it.
  let report = s.store_relationship_slice(link, movie, vec![999, genre]).await;
  assert_eq!(report, LinkReport { stored: 1, failed: 1 });
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn aggregate_writes_root_and_links_together() {
  let s = store().await;
  let author = s
    .store_unique_fragment("authors", "reference", Fragment::new().with("reference", "OL1416948A"))
    .await
    .unwrap();
  let root = Fragment::new()
    .with("title", "The Last Wish")
    .with("edition_reference", "OL26423297M");
  let links = vec![LinkBatch { link: book::AUTHORS.link, destinations: vec![author.id] }];

  let (stored, report) = s
    .store_aggregate("books", "edition_reference", root, links)
    .await
    .unwrap();
  assert!(stored.created);
  assert_eq!(report, LinkReport { stored: 1, failed: 0 });

  let rows = s.fetch_relationship_slice(book::AUTHORS.link, stored.id).await.unwrap();
  assert_eq!(rows, vec![Relationship { source: stored.id, destination: author.id }]);
}

#[tokio::test]
async fn aggregate_skips_a_failing_link_only() {
  let s = store().await;
  let topic_id = s.store_fragment("topics", topic("Fantasy")).await.unwrap();
  let root = Fragment::new().with("title", "x").with("edition_reference", "OL1M");
  let links = vec![
    LinkBatch { link: book::AUTHORS.link, destinations: vec![12345] },
    LinkBatch { link: book::TOPICS.link, destinations: vec![topic_id] },
  ];

  let (stored, report) = s
    .store_aggregate("books", "edition_reference", root, links)
    .await
    .unwrap();
  assert!(stored.created);
  assert_eq!(report, LinkReport { stored: 1, failed: 1 });
  assert!(s.fetch_relationship_slice(book::AUTHORS.link, stored.id).await.unwrap().is_empty());
  assert_eq!(s.fetch_relationship_slice(book::TOPICS.link, stored.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn aggregate_with_existing_key_writes_nothing() {
  let s = store().await;
  let topic_id = s.store_fragment("topics", topic("Fantasy")).await.unwrap();
  let root = || Fragment::new().with("title", "x").with("edition_reference", "OL1M");

  let (first, _) = s
    .store_aggregate("books", "edition_reference", root(), vec![])
    .await
    .unwrap();
  let links = vec![LinkBatch { link: book::TOPICS.link, destinations: vec![topic_id] }];
  let (second, report) = s
    .store_aggregate("books", "edition_reference", root(), links)
    .await
    .unwrap();

  assert!(!second.created);
  assert_eq!(second.id, first.id);
  assert_eq!(report, LinkReport::default());
  assert!(s.fetch_relationship_slice(book::TOPICS.link, first.id).await.unwrap().is_empty());
}
