//! Paginating and synchronizing collection cursor.
//!
//! A [`Collection`] owns a request template and a [`Query`]. Each fetch
//! serializes the query into the request URL, executes it, and overwrites
//! the collection's page fields with the decoded response.
//!
//! Two paging modes exist and only one is active at a time:
//!
//! * skip paging: `skip = limit * (page - 1)`
//! * sync paging: once a sync token is known, every advance sends the
//!   token alone
//!
//! The page counter starts at 1 and grows by one after every successful
//! [`Collection::advance`], in either mode.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::{Error, ErrorDetails, Result, StructuralError};
use crate::http::HttpRequest;
use crate::query::Query;
use crate::resources::api_keys::ApiKey;
use crate::resources::assets::{Asset, LocalizedAsset};
use crate::resources::content_types::ContentType;
use crate::resources::entries::Entry;
use crate::resources::locales::Locale;
use crate::resources::scheduled_actions::ScheduledAction;
use crate::resources::spaces::Space;
use crate::resources::tags::Tag;
use crate::resources::webhooks::Webhook;
use crate::sync_token::extract_sync_token;
use crate::types::{Sys, deep_copy};

/// Page size used when none is configured.
pub const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Page size. `None` or 0 selects [`DEFAULT_LIMIT`].
    pub limit: Option<u32>,
}

impl CollectionOptions {
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Where a collection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    /// Nothing fetched yet.
    Fresh,
    /// Advancing by skip offsets.
    Paged,
    /// Advancing by sync token.
    Syncing,
    /// `drain_all` finished; `items` holds every page.
    Drained,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: DeserializeOwned"))]
struct Page<T> {
    #[serde(default)]
    sys: Option<Sys>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    skip: u64,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    includes: Map<String, Value>,
    #[serde(default)]
    next_page_url: Option<String>,
    #[serde(default)]
    next_sync_url: Option<String>,
    #[serde(default)]
    errors: Vec<StructuralError>,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

/// Cursor over a paginated or synchronized collection endpoint.
pub struct Collection<T = Value> {
    client: Client,
    request: HttpRequest,
    query: Query,
    page: u64,
    limit: u32,
    state: CollectionState,

    pub sys: Option<Sys>,
    /// Server-reported total; informational only.
    pub total: u64,
    pub skip: u64,
    /// Items of the last fetched page, or of every page after `drain_all`.
    pub items: Vec<T>,
    /// Linked entities keyed by type (`Entry`, `Asset`).
    pub includes: Map<String, Value>,
    pub next_page_url: Option<String>,
    pub next_sync_url: Option<String>,
    pub sync_token: Option<String>,
    /// Structural per-item errors (unresolvable links and the like). Never
    /// inspected by the cursor itself.
    pub errors: Vec<StructuralError>,
    pub details: Option<ErrorDetails>,
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("url", &self.request.url)
            .field("page", &self.page)
            .field("limit", &self.limit)
            .field("state", &self.state)
            .field("total", &self.total)
            .field("items", &self.items.len())
            .field("sync_token", &self.sync_token)
            .finish_non_exhaustive()
    }
}

impl<T> Collection<T> {
    /// Create a cursor over `request`.
    ///
    /// Query parameters already present in the request URL become the
    /// initial query; the page size is added to it.
    pub fn new(client: Client, request: HttpRequest, options: CollectionOptions) -> Result<Self> {
        let limit = options
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT);

        let mut query = Query::from_url(&Url::parse(&request.url)?);
        query.limit(limit);

        Ok(Self {
            client,
            request,
            query,
            page: 1,
            limit,
            state: CollectionState::Fresh,
            sys: None,
            total: 0,
            skip: 0,
            items: Vec::new(),
            includes: Map::new(),
            next_page_url: None,
            next_sync_url: None,
            sync_token: None,
            errors: Vec::new(),
            details: None,
        })
    }

    /// Seed the sync token; the next advance sends it alone.
    #[must_use]
    pub fn with_sync_token(mut self, token: impl Into<String>) -> Self {
        self.sync_token = Some(token.into());
        self
    }

    /// 1-based number of the next page to fetch.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Mutable query, for filters set before the first fetch.
    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// The request as last sent (or the template, before any fetch).
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    fn active_sync_token(&self) -> Option<String> {
        self.sync_token.clone().filter(|token| !token.is_empty())
    }
}

impl<T: DeserializeOwned> Collection<T> {
    /// Fetch the page selected by the current query. Neither the page
    /// counter nor the state changes.
    pub async fn fetch_once(&mut self) -> Result<&mut Self> {
        self.fetch().await?;
        Ok(self)
    }

    /// Fetch the next page and move the cursor forward.
    ///
    /// Fails with [`Error::MissingSyncToken`] when the response carries a
    /// continuation URL without a sync token.
    pub async fn advance(&mut self) -> Result<&mut Self> {
        if let Some(token) = self.active_sync_token() {
            self.query.clear();
            self.query.sync_token(&token);
        } else {
            let skip = u64::from(self.limit) * (self.page - 1);
            self.query.limit(self.limit).skip(skip);
        }

        self.fetch().await?;
        self.page += 1;

        let next_url = self
            .next_page_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.next_sync_url.as_deref().filter(|url| !url.is_empty()));
        if let Some(url) = next_url {
            let token = extract_sync_token(url).ok_or_else(|| Error::MissingSyncToken {
                url: url.to_string(),
            })?;
            self.sync_token = Some(token.to_string());
        }

        self.state = if self.active_sync_token().is_some() {
            CollectionState::Syncing
        } else {
            CollectionState::Paged
        };

        debug!(
            url = %self.request.url,
            page = self.page,
            items = self.items.len(),
            syncing = self.state == CollectionState::Syncing,
            "Advanced collection"
        );

        Ok(self)
    }

    /// Advance until a page holds fewer than `limit` items.
    ///
    /// On success `items` holds every page's items in fetch order. The
    /// first error is returned and anything accumulated is dropped.
    #[tracing::instrument(skip(self), fields(url = %self.request.url, limit = self.limit))]
    pub async fn drain_all(&mut self) -> Result<&mut Self> {
        let mut all = Vec::new();
        loop {
            self.advance().await?;
            let count = self.items.len();
            all.append(&mut self.items);
            if count < self.limit as usize {
                break;
            }
        }

        debug!(total_items = all.len(), pages = self.page - 1, "Drained collection");
        self.items = all;
        self.state = CollectionState::Drained;
        Ok(self)
    }

    async fn fetch(&mut self) -> Result<()> {
        let mut url = Url::parse(&self.request.url)?;
        self.query.apply_to(&mut url);
        self.request.url = url.into();

        let page: Page<T> = self.client.execute(&self.request).await?;
        self.sys = page.sys;
        self.total = page.total;
        self.skip = page.skip;
        self.items = page.items;
        self.includes = page.includes;
        self.next_page_url = page.next_page_url;
        self.next_sync_url = page.next_sync_url;
        self.errors = page.errors;
        self.details = page.details;
        Ok(())
    }
}

impl<T: Serialize> Collection<T> {
    /// Re-decode the current items as `U`.
    pub fn cast_items<U: DeserializeOwned>(&self) -> Result<Vec<U>> {
        deep_copy(&self.items)
    }

    /// Decode the included entities of type `kind` (`Entry`, `Asset`).
    pub fn includes_of<U: DeserializeOwned>(&self, kind: &str) -> Result<Vec<U>> {
        match self.includes.get(kind) {
            Some(value) => deep_copy(value),
            None => Ok(Vec::new()),
        }
    }

    /// Included entities of type `kind`, keyed by `sys.id`. Elements
    /// without an id are skipped.
    pub fn includes_map<U: DeserializeOwned>(&self, kind: &str) -> Result<HashMap<String, U>> {
        let Some(Value::Array(elements)) = self.includes.get(kind) else {
            return Ok(HashMap::new());
        };

        let mut map = HashMap::with_capacity(elements.len());
        for element in elements {
            let Some(id) = element
                .get("sys")
                .and_then(|sys| sys.get("id"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            map.insert(id.to_string(), deep_copy(element)?);
        }
        Ok(map)
    }

    pub fn to_entries(&self) -> Result<Vec<Entry>> {
        self.cast_items()
    }

    pub fn to_assets(&self) -> Result<Vec<Asset>> {
        self.cast_items()
    }

    pub fn to_content_types(&self) -> Result<Vec<ContentType>> {
        self.cast_items()
    }

    pub fn to_spaces(&self) -> Result<Vec<Space>> {
        self.cast_items()
    }

    pub fn to_locales(&self) -> Result<Vec<Locale>> {
        self.cast_items()
    }

    pub fn to_webhooks(&self) -> Result<Vec<Webhook>> {
        self.cast_items()
    }

    pub fn to_api_keys(&self) -> Result<Vec<ApiKey>> {
        self.cast_items()
    }

    pub fn to_tags(&self) -> Result<Vec<Tag>> {
        self.cast_items()
    }

    pub fn to_scheduled_actions(&self) -> Result<Vec<ScheduledAction>> {
        self.cast_items()
    }

    pub fn includes_entry_map(&self) -> Result<HashMap<String, Entry>> {
        self.includes_map("Entry")
    }

    /// Included assets as the delivery API returns them: one locale, plain
    /// field values.
    pub fn includes_asset_map(&self) -> Result<HashMap<String, LocalizedAsset>> {
        self.includes_map("Asset")
    }

    /// Included assets fetched with `locale=*`, fields keyed by locale.
    pub fn includes_localized_asset_map(&self) -> Result<HashMap<String, Asset>> {
        self.includes_map("Asset")
    }
}
