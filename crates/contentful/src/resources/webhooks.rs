//! Webhook definitions.

use serde::{Deserialize, Serialize};

use super::{body_without_sys, is_persisted, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// Events that trigger the webhook, e.g. `Entry.publish` or `*.*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_basic_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_basic_password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<WebhookHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookHeader {
    pub key: String,
    pub value: String,
}

impl Versioned for Webhook {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

pub struct WebhooksService<'a> {
    client: &'a Client,
}

impl<'a> WebhooksService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/webhook_definitions", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<Webhook>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<Webhook>> {
        self.client
            .collection(&self.base_path(space_id), None, options)
    }

    pub async fn get(&self, space_id: &str, webhook_id: &str) -> Result<Webhook> {
        let path = format!("{}/{webhook_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, None, Vec::new(), &[])?;
        self.client.execute(&request).await
    }

    pub async fn upsert(&self, space_id: &str, webhook: &Webhook) -> Result<Webhook> {
        let body = body_without_sys(webhook)?;
        let (method, path) = if is_persisted(webhook.sys.as_ref()) {
            let id = require_id(webhook, "webhook")?;
            (HttpMethod::Put, format!("{}/{id}", self.base_path(space_id)))
        } else {
            (HttpMethod::Post, self.base_path(space_id))
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, webhook);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, webhook: &Webhook) -> Result<()> {
        let id = require_id(webhook, "webhook")?;
        let path = format!("{}/{id}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(HttpMethod::Delete, &path, None, Vec::new(), &[])?;
        set_version(&mut request, webhook);
        self.client.execute_unit(&request).await
    }
}
