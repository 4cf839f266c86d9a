//! Delivery API keys.

use serde::{Deserialize, Serialize};

use super::{is_persisted, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Link, Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<ApiKeyPolicy>,
    #[serde(
        rename = "preview_api_key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_api_key: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyPolicy {
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub actions: String,
}

impl Versioned for ApiKey {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

/// Only these fields are accepted on create/update.
#[derive(Serialize)]
struct ApiKeyPayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

pub struct ApiKeysService<'a> {
    client: &'a Client,
}

impl<'a> ApiKeysService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/api_keys", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<ApiKey>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<ApiKey>> {
        self.client
            .collection(&self.base_path(space_id), None, options)
    }

    pub async fn get(&self, space_id: &str, api_key_id: &str) -> Result<ApiKey> {
        let path = format!("{}/{api_key_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, None, Vec::new(), &[])?;
        self.client.execute(&request).await
    }

    pub async fn upsert(&self, space_id: &str, api_key: &ApiKey) -> Result<ApiKey> {
        let body = serde_json::to_vec(&ApiKeyPayload {
            name: &api_key.name,
            description: api_key.description.as_deref(),
        })?;
        let (method, path) = if is_persisted(api_key.sys.as_ref()) {
            let id = require_id(api_key, "api key")?;
            (HttpMethod::Put, format!("{}/{id}", self.base_path(space_id)))
        } else {
            (HttpMethod::Post, self.base_path(space_id))
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, api_key);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, api_key: &ApiKey) -> Result<()> {
        let id = require_id(api_key, "api key")?;
        let path = format!("{}/{id}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(HttpMethod::Delete, &path, None, Vec::new(), &[])?;
        set_version(&mut request, api_key);
        self.client.execute_unit(&request).await
    }
}
