//! Contentful API client: request construction and the request executor.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::collection::{Collection, CollectionOptions};
use crate::config::ClientConfig;
use crate::error::{Error, Result, classify};
use crate::http::{
    HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    header_set,
};
use crate::query::Query;
use crate::rate_limit::ApiRateLimiter;
use crate::resources::api_keys::ApiKeysService;
use crate::resources::assets::AssetsService;
use crate::resources::content_types::ContentTypesService;
use crate::resources::entries::EntriesService;
use crate::resources::locales::LocalesService;
use crate::resources::scheduled_actions::ScheduledActionsService;
use crate::resources::spaces::SpacesService;
use crate::resources::tags::TagsService;
use crate::resources::uploads::UploadsService;
use crate::resources::webhooks::WebhooksService;

/// Optimistic-concurrency version sent with every mutation.
pub const VERSION_HEADER: &str = "X-Contentful-Version";
/// Content type of an entry being created or updated.
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";
/// Seconds until the rate-limit quota resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-Contentful-Ratelimit-Reset";
pub const ORGANIZATION_HEADER: &str = "X-Contentful-Organization";
pub const USER_AGENT_HEADER: &str = "X-Contentful-User-Agent";

/// Crate version, reported in the user agent header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Contentful API client.
///
/// Cheap to clone: the transport, configuration, and default headers are
/// shared. All clones observe the same cancellation token.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
    headers: Arc<HttpHeaders>,
    rate_limiter: Option<ApiRateLimiter>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api", &self.config.api)
            .field("base_url", &self.config.base_url())
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use contentful::{Client, ClientConfig};
    ///
    /// let client = Client::new("CFPAT-token", ClientConfig::cma().with_environment("master"))?;
    /// let mut spaces = client.spaces().list()?;
    /// spaces.drain_all().await?;
    /// ```
    pub fn new(token: &str, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.timeout())?;
        Ok(Self::new_with_transport(token, config, Arc::new(transport)))
    }

    /// Management API client with default configuration.
    pub fn cma(token: &str) -> Result<Self> {
        Self::new(token, ClientConfig::cma())
    }

    /// Delivery API client with default configuration.
    pub fn cda(token: &str) -> Result<Self> {
        Self::new(token, ClientConfig::cda())
    }

    /// Preview API client with default configuration.
    pub fn cpa(token: &str) -> Result<Self> {
        Self::new(token, ClientConfig::cpa())
    }

    pub fn new_with_transport(
        token: &str,
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut headers: HttpHeaders =
            vec![("Authorization".to_string(), format!("Bearer {token}"))];
        if let Some(content_type) = config.api.content_type() {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        if let Some(user_agent) = config.api.user_agent() {
            headers.push((USER_AGENT_HEADER.to_string(), user_agent));
        }
        if let Some(organization) = &config.organization {
            headers.push((ORGANIZATION_HEADER.to_string(), organization.clone()));
        }

        let rate_limiter = config.requests_per_second.map(ApiRateLimiter::new);

        Self {
            transport,
            config: Arc::new(config),
            headers: Arc::new(headers),
            rate_limiter,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort rate-limit waits when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request.
    pub fn default_headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// `/environments/{id}` when an environment is configured, else empty.
    pub fn environment_path(&self) -> String {
        match &self.config.environment {
            Some(env) if !env.is_empty() => format!("/environments/{env}"),
            _ => String::new(),
        }
    }

    /// `/spaces/{space}` plus the environment segment.
    pub fn space_path(&self, space_id: &str) -> String {
        format!("/spaces/{space_id}{}", self.environment_path())
    }

    /// Build a request against the configured host.
    ///
    /// Any query string already present in `path` is dropped. Paths whose
    /// last segment is `uploads` go to the upload host. Configured default
    /// query parameters override same-named entries of `query`, and
    /// `extra_headers` override the default headers.
    pub fn new_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&Query>,
        body: Vec<u8>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest> {
        let path = path.split('?').next().unwrap_or_default();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let last_segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        let base = if last_segment == "uploads" {
            self.config.upload_url.trim_end_matches('/')
        } else {
            self.config.base_url()
        };

        let mut url = Url::parse(&format!("{base}{path}"))?;
        let mut query = query.cloned().unwrap_or_default();
        for (name, value) in &self.config.query_params {
            query.set(name.as_str(), value.as_str());
        }
        query.apply_to(&mut url);

        let mut headers = self.headers.as_ref().clone();
        for (name, value) in extra_headers {
            header_set(&mut headers, name, *value);
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Wrap a GET request for `path` into a fresh collection cursor.
    pub(crate) fn collection<T>(
        &self,
        path: &str,
        query: Option<&Query>,
        options: CollectionOptions,
    ) -> Result<Collection<T>> {
        let request = self.new_request(HttpMethod::Get, path, query, Vec::new(), &[])?;
        Collection::new(self.clone(), request, options)
    }

    /// Send `request` and decode a successful response body as JSON.
    pub async fn execute<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T> {
        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Send `request`, ignoring the body of a successful response.
    pub async fn execute_unit(&self, request: &HttpRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    /// Send until the response is not a retryable rate-limit error.
    ///
    /// The same request is resent verbatim after the server-supplied reset
    /// delay; there is no attempt ceiling.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            if self.config.debug {
                debug!(curl = %request.to_curl(), "Contentful request");
            }
            debug!(
                method = request.method.as_str(),
                url = %request.url,
                attempt,
                "Sending request"
            );

            let response = self.transport.send(request.clone()).await?;
            if (200..400).contains(&response.status) {
                return Ok(response);
            }

            let err = classify(request, &response);
            if self.config.debug {
                debug!(
                    status = response.status,
                    body = %String::from_utf8_lossy(&response.body),
                    "Contentful error response"
                );
            }
            if !err.is_rate_limited() {
                return Err(err);
            }

            let Some(retry_after_secs) = response
                .header(RATE_LIMIT_RESET_HEADER)
                .and_then(|value| value.trim().parse::<u64>().ok())
            else {
                warn!(
                    url = %request.url,
                    "Rate limited without a usable {RATE_LIMIT_RESET_HEADER} header"
                );
                return Err(err);
            };

            debug!(
                retry_after_secs,
                attempt,
                url = %request.url,
                "Rate limited, waiting before resending"
            );

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(Duration::from_secs(retry_after_secs)) => {}
            }
        }
    }

    pub fn spaces(&self) -> SpacesService<'_> {
        SpacesService::new(self)
    }

    pub fn entries(&self) -> EntriesService<'_> {
        EntriesService::new(self)
    }

    pub fn assets(&self) -> AssetsService<'_> {
        AssetsService::new(self)
    }

    pub fn content_types(&self) -> ContentTypesService<'_> {
        ContentTypesService::new(self)
    }

    pub fn locales(&self) -> LocalesService<'_> {
        LocalesService::new(self)
    }

    pub fn webhooks(&self) -> WebhooksService<'_> {
        WebhooksService::new(self)
    }

    pub fn api_keys(&self) -> ApiKeysService<'_> {
        ApiKeysService::new(self)
    }

    pub fn tags(&self) -> TagsService<'_> {
        TagsService::new(self)
    }

    pub fn uploads(&self) -> UploadsService<'_> {
        UploadsService::new(self)
    }

    pub fn scheduled_actions(&self) -> ScheduledActionsService<'_> {
        ScheduledActionsService::new(self)
    }
}
