//! Hearthstone catalog client backed by the Blizzard game data API
//!
//! Handles I/O only: OAuth, HTTP requests, and pagination. Slug resolution and
//! the conversion into [`Card`] values are delegated to the pure functions in
//! the core crate.

use super::CardCatalog;
use crate::config::Config;
use crate::prelude::Error;
use base64::Engine;
use cardlist_core::hearthstone::{
    card_search_params, mana_cost_filter, next_page, resolve_slug, transform_cards,
    AccessTokenResponse, Card, CardResponse, CardSearchResponse, Metadata,
};
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Cards requested per page of the `/cards` endpoint
const PAGE_SIZE: u32 = 500;

/// Tokens are refreshed this long before the upstream expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Client for the Hearthstone card search and metadata endpoints
pub struct BlizzardCatalog {
    client: reqwest::Client,
    endpoint_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
    locale: String,
    token: Mutex<Option<CachedToken>>,
}

/// Create the HTTP client used for every catalog request
pub fn create_catalog_client(config: &Config) -> Result<reqwest::Client, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .build()
        .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))
}

impl BlizzardCatalog {
    /// Build a client without contacting the API
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            client: create_catalog_client(config)?,
            endpoint_url: config.endpoint_url.trim_end_matches('/').to_string(),
            oauth_url: config.oauth_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            locale: config.locale.clone(),
            token: Mutex::new(None),
        })
    }

    /// Build a client and authenticate right away so bad credentials fail at startup
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let catalog = Self::new(config)?;
        catalog.access_token().await?;
        Ok(catalog)
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        let response = self
            .client
            .post(&self.oauth_url)
            .header(AUTHORIZATION, format!("Basic {encoded}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to request access token: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("[{status}] {body}")));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("access token: {e}")))?;

        log::debug!("Acquired access token valid for {}s", token.expires_in);

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    /// Current access token, requesting a new one when absent or expired
    async fn access_token(&self) -> Result<String, Error> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref().filter(|token| token.is_valid()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *slot = Some(token);

        Ok(value)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let token = self.access_token().await?;
        let url = format!("{}/{path}", self.endpoint_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Catalog { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("{path}: {e}")))
    }

    /// Fetch the category metadata used to resolve slugs and names
    pub async fn fetch_metadata(&self) -> Result<Metadata, Error> {
        self.get_json("metadata", &[("locale", self.locale.clone())])
            .await
    }

    /// Fetch every page of the card search for a single class
    async fn search_class(
        &self,
        class_slug: &str,
        mana_cost: &str,
        rarity_slug: &str,
    ) -> Result<Vec<CardResponse>, Error> {
        let mut cards = Vec::new();
        let mut page = 1;

        loop {
            let params = card_search_params(
                &self.locale,
                class_slug,
                mana_cost,
                rarity_slug,
                page,
                PAGE_SIZE,
            );
            let response: CardSearchResponse = self.get_json("cards", &params).await?;

            log::debug!(
                "Fetched page {page} of {} for class {class_slug} ({} cards)",
                response.page_count,
                response.cards.len()
            );

            let next = next_page(&response);
            cards.extend(response.cards);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(cards)
    }
}

#[async_trait::async_trait]
impl CardCatalog for BlizzardCatalog {
    async fn cards_by_classes_mana_rarity(
        &self,
        classes: &[String],
        mana_min: u32,
        mana_max: u32,
        rarity: &str,
    ) -> Result<Vec<Card>, Error> {
        let Some(mana_cost) = mana_cost_filter(mana_min, mana_max) else {
            log::debug!("Empty mana range {mana_min}..={mana_max}, skipping card search");
            return Ok(Vec::new());
        };

        let metadata = self.fetch_metadata().await?;
        let rarity_slug = resolve_slug(rarity, &metadata.rarities);

        let searches = classes.iter().map(|class| {
            let class_slug = resolve_slug(class, &metadata.classes);
            let mana_cost = mana_cost.as_str();
            let rarity_slug = rarity_slug.as_str();
            async move { self.search_class(&class_slug, mana_cost, rarity_slug).await }
        });

        let responses = try_join_all(searches).await?.into_iter().flatten().collect();

        Ok(transform_cards(responses, &metadata))
    }
}
