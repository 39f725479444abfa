//! SQL schema for the Grace SQLite store.
//!
//! Table and column names mirror the category descriptors in `grace-core`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Books ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS books (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT    NOT NULL DEFAULT '',
    subtitle          TEXT    NOT NULL DEFAULT '',
    description       TEXT    NOT NULL DEFAULT '',
    publish_date      TEXT,            -- YYYY-MM-DD or NULL
    pages             INTEGER NOT NULL DEFAULT 0,
    isbn10            TEXT    NOT NULL DEFAULT '',
    isbn13            TEXT    NOT NULL DEFAULT '',
    image             TEXT    NOT NULL DEFAULT '',
    edition_reference TEXT    NOT NULL UNIQUE,
    work_reference    TEXT    NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS books_isbn10 ON books(isbn10);
CREATE INDEX IF NOT EXISTS books_isbn13 ON books(isbn13);

CREATE TABLE IF NOT EXISTS authors (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT NOT NULL DEFAULT '',
    middle_name TEXT NOT NULL DEFAULT '',
    last_name   TEXT NOT NULL DEFAULT '',
    biography   TEXT NOT NULL DEFAULT '',
    image       TEXT NOT NULL DEFAULT '',
    reference   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS publishers (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS topics (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books_authors (
    book   INTEGER NOT NULL REFERENCES books(id),
    author INTEGER NOT NULL REFERENCES authors(id),
    PRIMARY KEY (book, author)
);

CREATE TABLE IF NOT EXISTS books_publishers (
    book      INTEGER NOT NULL REFERENCES books(id),
    publisher INTEGER NOT NULL REFERENCES publishers(id),
    PRIMARY KEY (book, publisher)
);

CREATE TABLE IF NOT EXISTS books_topics (
    book  INTEGER NOT NULL REFERENCES books(id),
    topic INTEGER NOT NULL REFERENCES topics(id),
    PRIMARY KEY (book, topic)
);

CREATE TABLE IF NOT EXISTS isbns (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    isbn TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books_isbns (
    book INTEGER NOT NULL REFERENCES books(id),
    isbn INTEGER NOT NULL REFERENCES isbns(id),
    PRIMARY KEY (book, isbn)
);

CREATE INDEX IF NOT EXISTS books_isbns_isbn ON books_isbns(isbn);

-- ── Games ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS games (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT    NOT NULL DEFAULT '',
    summary      TEXT    NOT NULL DEFAULT '',
    storyline    TEXT    NOT NULL DEFAULT '',
    release_date TEXT,
    image        TEXT    NOT NULL DEFAULT '',
    reference    INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS franchises (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL DEFAULT '',
    reference INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS game_genres (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL DEFAULT '',
    reference INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS platforms (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL DEFAULT '',
    reference INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS studios (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL DEFAULT '',
    description TEXT    NOT NULL DEFAULT '',
    reference   INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS games_franchises (
    game      INTEGER NOT NULL REFERENCES games(id),
    franchise INTEGER NOT NULL REFERENCES franchises(id),
    PRIMARY KEY (game, franchise)
);

CREATE TABLE IF NOT EXISTS games_genres (
    game  INTEGER NOT NULL REFERENCES games(id),
    genre INTEGER NOT NULL REFERENCES game_genres(id),
    PRIMARY KEY (game, genre)
);

CREATE TABLE IF NOT EXISTS games_platforms (
    game     INTEGER NOT NULL REFERENCES games(id),
    platform INTEGER NOT NULL REFERENCES platforms(id),
    PRIMARY KEY (game, platform)
);

CREATE TABLE IF NOT EXISTS games_studios (
    game   INTEGER NOT NULL REFERENCES games(id),
    studio INTEGER NOT NULL REFERENCES studios(id),
    PRIMARY KEY (game, studio)
);

-- ── Movies ───────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS movies (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT    NOT NULL DEFAULT '',
    tagline      TEXT    NOT NULL DEFAULT '',
    description  TEXT    NOT NULL DEFAULT '',
    release_date TEXT,
    runtime      INTEGER NOT NULL DEFAULT 0,
    image        TEXT    NOT NULL DEFAULT '',
    reference    INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS movie_genres (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL DEFAULT '',
    reference INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS production_companies (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL DEFAULT '',
    image     TEXT    NOT NULL DEFAULT '',
    reference INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS movies_genres (
    movie INTEGER NOT NULL REFERENCES movies(id),
    genre INTEGER NOT NULL REFERENCES movie_genres(id),
    PRIMARY KEY (movie, genre)
);

CREATE TABLE IF NOT EXISTS movies_production_companies (
    movie              INTEGER NOT NULL REFERENCES movies(id),
    production_company INTEGER NOT NULL REFERENCES production_companies(id),
    PRIMARY KEY (movie, production_company)
);
";
