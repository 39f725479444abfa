//! Normalization helpers for identifiers, names, dates and free text coming
//! back from providers.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

static RESOURCE_ID: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"OL[A-Z0-9]+[A-Z]").expect("valid regex"));

/// Date layouts accepted from provider text, tried in order.
const DATE_LAYOUTS: &[&str] = &[
  "%B %d, %Y",
  "%b %d, %Y",
  "%Y-%m-%d",
  "%Y/%m/%d",
  "%m-%d-%Y",
  "%m/%d/%Y",
];

/// Strip dashes and surrounding whitespace from an ISBN.
pub fn format_isbn(raw: &str) -> String {
  raw.trim().chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// [`format_isbn`], with an ISBN-10 check digit `x` upper-cased.
pub fn normalize_isbn(raw: &str) -> String { format_isbn(raw).to_ascii_uppercase() }

/// Whether `isbn` (already formatted) looks like an ISBN-10 or ISBN-13.
pub fn is_isbn(isbn: &str) -> bool {
  let bytes = isbn.as_bytes();
  match bytes.len() {
    13 => bytes.iter().all(u8::is_ascii_digit),
    10 => {
      bytes[..9].iter().all(u8::is_ascii_digit)
        && (bytes[9].is_ascii_digit() || bytes[9] == b'X' || bytes[9] == b'x')
    }
    _ => false,
  }
}

/// Pull an OpenLibrary id (`OL…A`, `OL…M`, `OL…W`) out of a key such as
/// `/authors/OL1234A`.
pub fn extract_resource_id(key: &str) -> Option<String> {
  RESOURCE_ID.find(key).map(|m| m.as_str().to_owned())
}

/// OpenLibrary descriptions are either a string or `{ "value": "..." }`.
/// Anything else reads as empty.
pub fn extract_description(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::String(s) => s.clone(),
    serde_json::Value::Object(map) => match map.get("value") {
      Some(serde_json::Value::String(s)) => s.clone(),
      _ => String::new(),
    },
    _ => String::new(),
  }
}

/// A person's name split into first / middle / last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
  pub first:  String,
  pub middle: String,
  pub last:   String,
}

/// One token is a first name; two are first and last; three are first,
/// middle and last. Longer names are kept whole as the first name.
pub fn split_name(full: &str) -> PersonName {
  let parts: Vec<&str> = full.split_whitespace().collect();
  match parts.as_slice() {
    [first] => PersonName { first: (*first).to_owned(), ..Default::default() },
    [first, last] => PersonName {
      first: (*first).to_owned(),
      last: (*last).to_owned(),
      ..Default::default()
    },
    [first, middle, last] => PersonName {
      first:  (*first).to_owned(),
      middle: (*middle).to_owned(),
      last:   (*last).to_owned(),
    },
    _ => PersonName { first: full.trim().to_owned(), ..Default::default() },
  }
}

/// Parse a provider date. Besides the full layouts this accepts a bare year
/// and `Month YYYY`, both pinned to the first day of the period.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Some(date) = DATE_LAYOUTS
    .iter()
    .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
  {
    return Some(date);
  }
  if raw.len() == 4
    && let Ok(year) = raw.parse::<i32>()
  {
    return NaiveDate::from_ymd_opt(year, 1, 1);
  }
  NaiveDate::parse_from_str(&format!("1 {raw}"), "%d %B %Y").ok()
}

/// The last parseable date of a list, as OpenLibrary search reports several.
pub fn last_parseable_date<S: AsRef<str>>(dates: &[S]) -> Option<NaiveDate> {
  dates.iter().filter_map(|d| parse_date(d.as_ref())).last()
}

/// Calendar date of a unix timestamp in seconds.
pub fn date_from_unix(seconds: i64) -> Option<NaiveDate> {
  DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}
