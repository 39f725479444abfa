//! IGDB client, authenticated through the Twitch client-credentials flow.
//!
//! IGDB takes Apicalypse query bodies over `POST`. The bearer token is
//! fetched lazily, cached until shortly before it expires, and refreshed once
//! if IGDB rejects it.

use std::time::{Duration, Instant};

use grace_core::{
  game::igdb::{Company, GameProvider, GameSearchItem, IgdbGame},
  provider::ProviderError,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{Error, Result, http::handle_response};

const API_URL: &str = "https://api.igdb.com/v4";
const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Tokens are treated as expired this long before Twitch says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const GAME_FIELDS: &str = "id,cover.*,first_release_date,franchises.*,genres.*,\
                           involved_companies.*,name,platforms.*,storyline,summary";

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in:   u64,
  token_type:   String,
}

#[derive(Debug, Clone)]
struct AccessToken {
  value:      String,
  expires_at: Instant,
}

impl AccessToken {
  fn is_fresh(&self) -> bool { Instant::now() < self.expires_at }
}

/// Client for the IGDB v4 API.
#[derive(Debug)]
pub struct IgdbClient {
  client:        Client,
  client_id:     String,
  client_secret: String,
  api_url:       String,
  token_url:     String,
  token:         RwLock<Option<AccessToken>>,
}

impl IgdbClient {
  pub fn new(client: Client, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
    Self {
      client,
      client_id: client_id.into(),
      client_secret: client_secret.into(),
      api_url: API_URL.to_owned(),
      token_url: TOKEN_URL.to_owned(),
      token: RwLock::new(None),
    }
  }

  pub fn with_urls(mut self, api_url: impl Into<String>, token_url: impl Into<String>) -> Self {
    self.api_url = api_url.into().trim_end_matches('/').to_owned();
    self.token_url = token_url.into();
    self
  }

  /// A valid bearer token, exchanging client credentials when needed.
  async fn token(&self) -> Result<String> {
    if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
      return Ok(token.value.clone());
    }

    let mut cached = self.token.write().await;
    // Another request may have refreshed it while we waited.
    if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
      return Ok(token.value.clone());
    }

    let response = self
      .client
      .post(&self.token_url)
      .query(&[
        ("client_id", self.client_id.as_str()),
        ("client_secret", self.client_secret.as_str()),
        ("grant_type", "client_credentials"),
      ])
      .send()
      .await?;
    let token: TokenResponse = handle_response(response)
      .await?
      .ok_or_else(|| Error::Auth("token endpoint not found".to_owned()))?;
    let token = access_token(token)?;

    debug!("refreshed twitch access token");
    *cached = Some(token.clone());
    Ok(token.value)
  }

  /// POST an Apicalypse `body` to `/{endpoint}`, refreshing the token once
  /// if IGDB rejects it.
  async fn query<T: DeserializeOwned>(&self, endpoint: &str, body: String) -> Result<Vec<T>> {
    let url = format!("{}/{endpoint}", self.api_url);

    let mut response = self.send_query(&url, body.clone()).await?;
    if response.status() == StatusCode::UNAUTHORIZED {
      warn!(endpoint, "igdb rejected the access token; refreshing");
      *self.token.write().await = None;
      response = self.send_query(&url, body).await?;
      if response.status() == StatusCode::UNAUTHORIZED {
        return Err(Error::Auth("igdb rejected a freshly issued token".to_owned()));
      }
    }
    Ok(handle_response(response).await?.unwrap_or_default())
  }

  async fn send_query(&self, url: &str, body: String) -> Result<reqwest::Response> {
    let token = self.token().await?;
    Ok(
      self
        .client
        .post(url)
        .header("Client-ID", &self.client_id)
        .bearer_auth(&token)
        .body(body)
        .send()
        .await?,
    )
  }

  /// One game with its expanded relations.
  pub async fn get_game(&self, id: i64) -> Result<Option<IgdbGame>> {
    let games = self.query("games", game_query(id)).await?;
    Ok(games.into_iter().next())
  }

  pub async fn get_company(&self, id: i64) -> Result<Option<Company>> {
    let companies = self
      .query("companies", format!("fields id,name,description; where id = {id};"))
      .await?;
    Ok(companies.into_iter().next())
  }

  pub async fn search_games(&self, query: &str) -> Result<Vec<GameSearchItem>> {
    self.query("games", search_query(query)).await
  }
}

fn access_token(response: TokenResponse) -> Result<AccessToken> {
  if !response.token_type.eq_ignore_ascii_case("bearer") {
    return Err(Error::Auth(format!("unexpected token type `{}`", response.token_type)));
  }
  let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
  Ok(AccessToken { value: response.access_token, expires_at: Instant::now() + lifetime })
}

fn game_query(id: i64) -> String { format!("fields {GAME_FIELDS}; where id = {id};") }

/// Main games (category 0) that are released or have no status.
fn search_query(query: &str) -> String {
  let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
  format!(
    "fields id,name,cover.*,first_release_date; search \"{escaped}\"; \
     where (status = 0 | status = null) & category = 0;"
  )
}

impl GameProvider for IgdbClient {
  async fn game(&self, id: i64) -> Result<Option<IgdbGame>, ProviderError> {
    Ok(self.get_game(id).await?)
  }

  async fn company(&self, id: i64) -> Result<Option<Company>, ProviderError> {
    Ok(self.get_company(id).await?)
  }

  async fn search(&self, query: &str) -> Result<Vec<GameSearchItem>, ProviderError> {
    Ok(self.search_games(query).await?)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{Json, Router, response::IntoResponse as _, routing::post};
  use serde_json::json;
  use tokio::net::TcpListener;

  use super::*;
  use crate::http::decode_body;

  #[test]
  fn game_fixture_decodes_expanded_relations() {
    let games: Vec<IgdbGame> = decode_body(StatusCode::OK, include_str!("../fixtures/igdb_game.json"))
      .unwrap()
      .unwrap();
    let game = &games[0];
    assert_eq!(game.id, 1942);
    assert_eq!(game.cover.as_ref().map(|c| c.image_id.as_str()), Some("co1wyy"));
    assert_eq!(game.storyline, None);
    assert_eq!(game.platforms.len(), 2);
    assert!(game.involved_companies[0].developer);
    assert!(!game.involved_companies[1].developer);
  }

  #[test]
  fn search_query_escapes_quotes() {
    assert_eq!(
      search_query(r#"say "hi""#),
      "fields id,name,cover.*,first_release_date; search \"say \\\"hi\\\"\"; \
       where (status = 0 | status = null) & category = 0;"
    );
  }

  #[test]
  fn game_query_expands_relations() {
    let q = game_query(1942);
    assert!(q.starts_with("fields id,cover.*,first_release_date,franchises.*"));
    assert!(q.ends_with("where id = 1942;"));
  }

  #[tokio::test]
  async fn custom_urls_are_used() {
    let client = IgdbClient::new(Client::new(), "id", "secret")
      .with_urls("http://localhost:9000/v4/", "http://localhost:9001/token");
    assert_eq!(client.api_url, "http://localhost:9000/v4");
    assert_eq!(client.token_url, "http://localhost:9001/token");
    assert!(client.token.read().await.is_none());
  }

  /// Serves `/token` and `/v4/games` on a local port. `/v4/games` answers
  /// 401 to the first `rejections` requests and then an empty list.
  async fn fake_igdb(rejections: usize) -> (String, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let tokens = Arc::new(AtomicUsize::new(0));
    let queries = Arc::new(AtomicUsize::new(0));

    let issued = tokens.clone();
    let served = queries.clone();
    let app = Router::new()
      .route(
        "/token",
        post(move || async move {
          let n = issued.fetch_add(1, Ordering::SeqCst);
          Json(json!({
            "access_token": format!("t{n}"),
            "expires_in": 3600,
            "token_type": "bearer",
          }))
        }),
      )
      .route(
        "/v4/games",
        post(move || async move {
          if served.fetch_add(1, Ordering::SeqCst) < rejections {
            (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
          } else {
            Json(json!([])).into_response()
          }
        }),
      );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), tokens, queries)
  }

  fn client_for(base: &str) -> IgdbClient {
    IgdbClient::new(Client::new(), "id", "secret")
      .with_urls(format!("{base}/v4"), format!("{base}/token"))
  }

  #[tokio::test]
  async fn rejected_token_is_refreshed_once() {
    let (base, tokens, queries) = fake_igdb(1).await;
    let games = client_for(&base).search_games("witcher").await.unwrap();
    assert!(games.is_empty());
    assert_eq!(tokens.load(Ordering::SeqCst), 2);
    assert_eq!(queries.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn repeated_rejection_is_an_auth_error() {
    let (base, tokens, queries) = fake_igdb(usize::MAX).await;
    let err = client_for(&base).get_game(1942).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "{err:?}");
    assert_eq!(tokens.load(Ordering::SeqCst), 2);
    assert_eq!(queries.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn tokens_expire_early() {
    let token = access_token(TokenResponse {
      access_token: "abc".into(),
      expires_in:   30,
      token_type:   "bearer".into(),
    })
    .unwrap();
    assert!(!token.is_fresh());

    let token = access_token(TokenResponse {
      access_token: "abc".into(),
      expires_in:   5_000_000,
      token_type:   "bearer".into(),
    })
    .unwrap();
    assert!(token.is_fresh());
  }

  #[test]
  fn non_bearer_tokens_are_rejected() {
    let err = access_token(TokenResponse {
      access_token: "abc".into(),
      expires_in:   3600,
      token_type:   "mac".into(),
    })
    .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
  }
}
