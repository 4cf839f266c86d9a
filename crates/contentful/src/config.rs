//! Client configuration.
//!
//! Example (JSON or any other serde format):
//! ```json
//! {
//!   "api": "cma",
//!   "environment": "staging",
//!   "organization": "org-id",
//!   "timeout_secs": 30,
//!   "debug": false,
//!   "requests_per_second": 7
//! }
//! ```
//!
//! Missing fields fall back to the defaults of the selected API.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Content Management API host.
pub const CMA_BASE_URL: &str = "https://api.contentful.com";
/// Content Delivery API host.
pub const CDA_BASE_URL: &str = "https://cdn.contentful.com";
/// Content Preview API host.
pub const CPA_BASE_URL: &str = "https://preview.contentful.com";
/// Upload API host.
pub const UPLOAD_BASE_URL: &str = "https://upload.contentful.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which Contentful API a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    /// Content Management API.
    #[default]
    Cma,
    /// Content Delivery API.
    Cda,
    /// Content Preview API.
    Cpa,
}

impl ApiKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ApiKind::Cma => "CMA",
            ApiKind::Cda => "CDA",
            ApiKind::Cpa => "CPA",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ApiKind::Cma => CMA_BASE_URL,
            ApiKind::Cda => CDA_BASE_URL,
            ApiKind::Cpa => CPA_BASE_URL,
        }
    }

    /// Default `Content-Type` header; the preview API sends none.
    #[must_use]
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            ApiKind::Cma => Some("application/vnd.contentful.management.v1+json"),
            ApiKind::Cda => Some("application/vnd.contentful.delivery.v1+json"),
            ApiKind::Cpa => None,
        }
    }

    /// Value of `X-Contentful-User-Agent`; the preview API sends none.
    #[must_use]
    pub fn user_agent(self) -> Option<String> {
        let version = env!("CARGO_PKG_VERSION");
        match self {
            ApiKind::Cma => Some(format!("sdk contentful.rs/{version}")),
            ApiKind::Cda => Some(format!("contentful.rs/{version}")),
            ApiKind::Cpa => None,
        }
    }
}

/// Static configuration of a [`crate::Client`]. Read-only once the client
/// is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API flavour, which selects default host and headers.
    pub api: ApiKind,
    /// Base URL; defaults to the host of `api`.
    pub base_url: Option<String>,
    /// Upload API base URL, used for paths ending in `/uploads`.
    pub upload_url: String,
    /// Environment inserted after the space segment (`/environments/{id}`).
    pub environment: Option<String>,
    /// Sent as `X-Contentful-Organization` when set.
    pub organization: Option<String>,
    /// Query parameters added to every request.
    pub query_params: BTreeMap<String, String>,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
    /// Log a curl reproduction of every request at debug level.
    pub debug: bool,
    /// Proactive client-side pacing. `None` disables it.
    pub requests_per_second: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_api(ApiKind::Cma)
    }
}

impl ClientConfig {
    #[must_use]
    pub fn for_api(api: ApiKind) -> Self {
        Self {
            api,
            base_url: None,
            upload_url: UPLOAD_BASE_URL.to_string(),
            environment: None,
            organization: None,
            query_params: BTreeMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
            requests_per_second: None,
        }
    }

    #[must_use]
    pub fn cma() -> Self {
        Self::for_api(ApiKind::Cma)
    }

    #[must_use]
    pub fn cda() -> Self {
        Self::for_api(ApiKind::Cda)
    }

    #[must_use]
    pub fn cpa() -> Self {
        Self::for_api(ApiKind::Cpa)
    }

    /// Effective base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.api.default_base_url())
            .trim_end_matches('/')
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }
}
