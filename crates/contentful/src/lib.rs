//! Contentful - A typed async client for the Contentful APIs.
//!
//! One [`Client`] talks to the Content Management API (CMA), the Content
//! Delivery API (CDA) or the Content Preview API (CPA). List endpoints
//! return a [`Collection`] cursor that pages by skip offset or, once the
//! server hands out a sync token, by token. Requests rejected with a rate
//! limit are retried after the server-advertised reset.
//!
//! # Example
//!
//! ```ignore
//! use contentful::{Client, ClientConfig};
//!
//! let client = Client::new("cma-token", ClientConfig::cma().with_environment("master"))?;
//!
//! // Every entry in the space
//! let mut entries = client.entries().list("space-id")?;
//! entries.drain_all().await?;
//!
//! // Initial sync, then continue from the stored token
//! let mut sync = client.entries().sync("space-id", true, None)?;
//! sync.advance().await?;
//! let token = sync.sync_token.clone();
//! ```

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod rate_limit;
pub mod resources;
pub mod sync_token;
pub mod types;

pub use client::Client;
pub use collection::{Collection, CollectionOptions, CollectionState, DEFAULT_LIMIT};
pub use config::{ApiKind, ClientConfig};
pub use error::{Error, Result, classify, short_error_message};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use query::{Query, RangeOp};
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use resources::{
    api_keys::ApiKey,
    assets::{Asset, AssetFields, File, LocalizedAsset},
    content_types::{ContentType, Field},
    entries::{Entry, EntryField},
    locales::Locale,
    scheduled_actions::ScheduledAction,
    spaces::Space,
    tags::Tag,
    uploads::Upload,
    webhooks::Webhook,
};
pub use sync_token::extract_sync_token;
pub use types::{Link, Metadata, Sys, Versioned, deep_copy};
