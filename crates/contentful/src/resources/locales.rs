//! Locales.

use serde::{Deserialize, Serialize};

use super::{body_without_sys, is_persisted, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
    /// Language code, e.g. `en-US`.
    #[serde(default)]
    pub code: String,
    /// Locale served when this one has no content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_code: Option<String>,
    #[serde(default)]
    pub default: bool,
    /// Entries with required fields can be published while this locale is empty.
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub content_delivery_api: bool,
    #[serde(default)]
    pub content_management_api: bool,
}

impl Versioned for Locale {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

pub struct LocalesService<'a> {
    client: &'a Client,
}

impl<'a> LocalesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/locales", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<Locale>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<Locale>> {
        self.client
            .collection(&self.base_path(space_id), None, options)
    }

    pub async fn get(&self, space_id: &str, locale_id: &str) -> Result<Locale> {
        let path = format!("{}/{locale_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, None, Vec::new(), &[])?;
        self.client.execute(&request).await
    }

    /// Create the locale, or update it when the server already knows it.
    pub async fn upsert(&self, space_id: &str, locale: &Locale) -> Result<Locale> {
        let body = body_without_sys(locale)?;
        let (method, path) = if is_persisted(locale.sys.as_ref()) {
            let id = require_id(locale, "locale")?;
            (HttpMethod::Put, format!("{}/{id}", self.base_path(space_id)))
        } else {
            (HttpMethod::Post, self.base_path(space_id))
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, locale);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, locale: &Locale) -> Result<()> {
        let id = require_id(locale, "locale")?;
        let path = format!("{}/{id}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(HttpMethod::Delete, &path, None, Vec::new(), &[])?;
        set_version(&mut request, locale);
        self.client.execute_unit(&request).await
    }
}
