//! Integration tests for collection paging, sync and rate-limit handling.
//!
//! A scripted transport replays canned responses in order and records every
//! request, so these tests drive the public API end to end without network.
//!
//! Key scenarios tested:
//! - Draining a multi-page collection accumulates every page in order
//! - A sync continuation sends only the token
//! - Rate-limited requests are resent after the advertised reset
//! - Cancellation aborts a rate-limit wait

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contentful::http::HttpError;
use contentful::{
    Client, ClientConfig, CollectionOptions, CollectionState, Error, HttpRequest, HttpResponse,
    HttpTransport,
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; set `RUST_LOG=contentful=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replays queued responses in FIFO order.
#[derive(Clone, Default)]
struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    fn push(&self, status: u16, headers: &[(&str, &str)], body: Value) {
        let response = HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: serde_json::to_vec(&body).expect("serialize body"),
        };
        self.responses.lock().unwrap().push_back(response);
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let missing = format!(
            "no scripted response for {} {}",
            request.method.as_str(),
            request.url
        );
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(HttpError::Transport(missing))
    }
}

fn client(transport: &ScriptedTransport) -> Client {
    Client::new_with_transport(
        "token",
        ClientConfig::cma().with_environment("master"),
        Arc::new(transport.clone()),
    )
}

fn items(ids: &[&str]) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({"sys": {"id": id}})).collect();
    json!({ "items": items })
}

fn rate_limited() -> Value {
    json!({"sys": {"id": "RateLimitExceeded"}, "message": "Rate limit exceeded"})
}

#[tokio::test]
async fn drain_all_collects_every_page() {
    init_tracing();
    let transport = ScriptedTransport::default();
    transport.push(200, &[], items(&["a", "b"]));
    transport.push(200, &[], items(&["c", "d"]));
    transport.push(200, &[], items(&["e"]));

    let client = client(&transport);
    let mut spaces = client
        .spaces()
        .list_with(CollectionOptions::with_limit(2))
        .expect("collection");

    tokio::time::timeout(Duration::from_secs(5), spaces.drain_all())
        .await
        .expect("drain should not hang")
        .expect("drain");

    let ids: Vec<_> = spaces
        .to_spaces()
        .expect("spaces")
        .into_iter()
        .filter_map(|s| s.sys.and_then(|sys| sys.id))
        .collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(spaces.page(), 4);
    assert_eq!(spaces.state(), CollectionState::Drained);

    assert_eq!(
        transport.urls(),
        vec![
            "https://api.contentful.com/spaces?limit=2&skip=0",
            "https://api.contentful.com/spaces?limit=2&skip=2",
            "https://api.contentful.com/spaces?limit=2&skip=4",
        ]
    );
}

#[tokio::test]
async fn drain_all_on_empty_collection_stops_after_one_request() {
    let transport = ScriptedTransport::default();
    transport.push(200, &[], items(&[]));

    let client = client(&transport);
    let mut entries = client.entries().list("s1").expect("collection");
    entries.drain_all().await.expect("drain");

    assert!(entries.items.is_empty());
    assert_eq!(transport.urls().len(), 1);
}

#[tokio::test]
async fn sync_continuation_sends_token_only() {
    init_tracing();
    let transport = ScriptedTransport::default();
    transport.push(
        200,
        &[],
        json!({
            "items": [{"sys": {"id": "e1", "type": "Entry"}}],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s1/sync?sync_token=tok-1"
        }),
    );
    transport.push(
        200,
        &[],
        json!({
            "items": [],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s1/sync?sync_token=tok-2"
        }),
    );

    let client = client(&transport);
    let mut sync = client
        .entries()
        .sync("s1", true, None)
        .expect("collection");

    sync.advance().await.expect("initial sync");
    assert_eq!(sync.sync_token.as_deref(), Some("tok-1"));
    assert_eq!(sync.state(), CollectionState::Syncing);

    sync.advance().await.expect("delta sync");
    assert_eq!(sync.sync_token.as_deref(), Some("tok-2"));
    assert_eq!(sync.page(), 3);

    let urls = transport.urls();
    assert!(urls[0].contains("initial=true"), "{}", urls[0]);
    assert_eq!(
        urls[1],
        "https://api.contentful.com/spaces/s1/environments/master/sync?sync_token=tok-1"
    );
}

#[tokio::test]
async fn resumed_sync_skips_initial_request() {
    let transport = ScriptedTransport::default();
    transport.push(
        200,
        &[],
        json!({
            "items": [],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s1/sync?sync_token=tok-9"
        }),
    );

    let client = client(&transport);
    let mut sync = client
        .entries()
        .sync("s1", false, Some("tok-8"))
        .expect("collection");
    sync.advance().await.expect("sync");

    assert_eq!(
        transport.urls(),
        vec!["https://api.contentful.com/spaces/s1/environments/master/sync?sync_token=tok-8"]
    );
    assert_eq!(sync.sync_token.as_deref(), Some("tok-9"));
}

#[tokio::test]
async fn continuation_without_token_is_an_error() {
    let transport = ScriptedTransport::default();
    transport.push(
        200,
        &[],
        json!({
            "items": [],
            "nextPageUrl": "https://cdn.contentful.com/spaces/s1/sync?page=2"
        }),
    );

    let client = client(&transport);
    let mut sync = client
        .entries()
        .sync("s1", true, None)
        .expect("collection");

    let err = sync.advance().await.expect_err("missing token");
    assert!(matches!(err, Error::MissingSyncToken { .. }), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn rate_limited_page_is_resent_after_reset() {
    init_tracing();
    let transport = ScriptedTransport::default();
    transport.push(429, &[("X-Contentful-Ratelimit-Reset", "3")], rate_limited());
    transport.push(429, &[("X-Contentful-Ratelimit-Reset", "1")], rate_limited());
    transport.push(200, &[], items(&["a"]));

    let client = client(&transport);
    let mut locales = client.locales().list("s1").expect("collection");

    let start = tokio::time::Instant::now();
    locales.advance().await.expect("page after retries");

    assert!(start.elapsed() >= Duration::from_secs(4));
    assert_eq!(locales.items.len(), 1);

    let urls = transport.urls();
    assert_eq!(urls.len(), 3);
    assert!(urls.iter().all(|u| u == &urls[0]));
}

#[tokio::test]
async fn rate_limit_without_reset_header_is_returned() {
    let transport = ScriptedTransport::default();
    transport.push(429, &[], rate_limited());

    let client = client(&transport);
    let mut webhooks = client.webhooks().list("s1").expect("collection");

    let err = webhooks.advance().await.expect_err("rate limited");
    assert!(err.is_rate_limited());
    assert_eq!(err.status(), Some(429));
    assert_eq!(transport.urls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_rate_limit_wait() {
    let transport = ScriptedTransport::default();
    transport.push(429, &[("X-Contentful-Ratelimit-Reset", "3600")], rate_limited());

    let cancel = CancellationToken::new();
    let client = client(&transport).with_cancellation(cancel.clone());
    let mut tags = client.tags().list("s1").expect("collection");

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });

    let err = tags.advance().await.expect_err("cancelled");
    assert!(matches!(err, Error::Cancelled), "{err:?}");
    canceller.await.expect("canceller");
    assert_eq!(transport.urls().len(), 1);
}

#[tokio::test]
async fn not_found_is_classified() {
    let transport = ScriptedTransport::default();
    transport.push(
        404,
        &[],
        json!({"sys": {"type": "Error", "id": "NotFound"}, "message": "The resource could not be found."}),
    );

    let client = client(&transport);
    let err = client
        .content_types()
        .get("s1", "missing")
        .await
        .expect_err("not found");

    assert!(matches!(err, Error::NotFound { .. }), "{err:?}");
    assert_eq!(err.to_string(), "the requested resource can not be found");
}
