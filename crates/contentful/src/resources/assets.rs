//! Assets: metadata, file processing and publication.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{body_without_sys, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::config::ApiKind;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::query::Query;
use crate::types::{Link, Metadata, Sys, Versioned};

/// Wildcard locale requesting every locale at once.
pub const ALL_LOCALES: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Remote URL the server should fetch the file from.
    #[serde(rename = "upload", default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Link to a previously created upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_from: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FileDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub width: u32,
    pub height: u32,
}

/// Asset fields keyed by locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub file: BTreeMap<String, File>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub fields: AssetFields,
}

impl Versioned for Asset {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

/// Asset fields for a single locale, as returned by the delivery API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedAssetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<File>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub fields: LocalizedAssetFields,
}

impl LocalizedAsset {
    /// Lift single-locale fields into locale-keyed maps under `sys.locale`.
    fn into_asset(self) -> Asset {
        let locale = self
            .sys
            .as_ref()
            .and_then(|sys| sys.locale.clone())
            .unwrap_or_default();
        let LocalizedAssetFields {
            title,
            description,
            file,
        } = self.fields;

        Asset {
            metadata: None,
            sys: self.sys,
            fields: AssetFields {
                title: title.map(|t| (locale.clone(), t)).into_iter().collect(),
                description: description
                    .map(|d| (locale.clone(), d))
                    .into_iter()
                    .collect(),
                file: file.map(|f| (locale, f)).into_iter().collect(),
            },
        }
    }
}

impl Asset {
    /// The asset's fields in its own `sys.locale`, or `None` when the asset
    /// was fetched for all locales.
    pub fn localized(&self) -> Option<LocalizedAsset> {
        let locale = self.sys.as_ref()?.locale.as_deref()?;
        Some(LocalizedAsset {
            sys: self.sys.clone(),
            fields: LocalizedAssetFields {
                title: self.fields.title.get(locale).cloned(),
                description: self.fields.description.get(locale).cloned(),
                file: self.fields.file.get(locale).cloned(),
            },
        })
    }
}

pub struct AssetsService<'a> {
    client: &'a Client,
}

impl<'a> AssetsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/assets", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<Asset>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<Asset>> {
        self.client
            .collection(&self.base_path(space_id), None, options)
    }

    /// Fetch one asset.
    ///
    /// The delivery API returns single-locale fields unless every locale is
    /// requested; those are normalized into locale-keyed maps.
    pub async fn get(&self, space_id: &str, asset_id: &str, locale: Option<&str>) -> Result<Asset> {
        let delivery = self.client.config().api == ApiKind::Cda;
        let mut query = Query::new();
        if delivery && let Some(locale) = locale {
            query.locale(locale);
        }

        let path = format!("{}/{asset_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, Some(&query), Vec::new(), &[])?;

        if delivery && locale != Some(ALL_LOCALES) {
            let localized: LocalizedAsset = self.client.execute(&request).await?;
            return Ok(localized.into_asset());
        }
        self.client.execute(&request).await
    }

    /// Create (POST, no id) or update (PUT, with id) an asset.
    pub async fn upsert(&self, space_id: &str, asset: &Asset) -> Result<Asset> {
        let body = body_without_sys(asset)?;
        let (method, path) = match asset.id().filter(|id| !id.is_empty()) {
            Some(id) => (HttpMethod::Put, format!("{}/{id}", self.base_path(space_id))),
            None => (HttpMethod::Post, self.base_path(space_id)),
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, asset);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, asset: &Asset) -> Result<()> {
        let id = require_id(asset, "asset")?;
        let path = format!("{}/{id}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(HttpMethod::Delete, &path, None, Vec::new(), &[])?;
        set_version(&mut request, asset);
        self.client.execute_unit(&request).await
    }

    /// Ask the server to process the file of every locale present.
    pub async fn process(&self, space_id: &str, asset: &Asset) -> Result<()> {
        let id = require_id(asset, "asset")?;
        for locale in asset.fields.file.keys() {
            let path = format!("{}/{id}/files/{locale}/process", self.base_path(space_id));
            let mut request = self
                .client
                .new_request(HttpMethod::Put, &path, None, Vec::new(), &[])?;
            set_version(&mut request, asset);
            self.client.execute_unit(&request).await?;
        }
        Ok(())
    }

    pub async fn publish(&self, space_id: &str, asset: &Asset) -> Result<()> {
        self.action(HttpMethod::Put, space_id, asset, "published").await
    }

    pub async fn unpublish(&self, space_id: &str, asset: &Asset) -> Result<()> {
        self.action(HttpMethod::Delete, space_id, asset, "published")
            .await
    }

    pub async fn archive(&self, space_id: &str, asset: &Asset) -> Result<()> {
        self.action(HttpMethod::Put, space_id, asset, "archived").await
    }

    pub async fn unarchive(&self, space_id: &str, asset: &Asset) -> Result<()> {
        self.action(HttpMethod::Delete, space_id, asset, "archived")
            .await
    }

    async fn action(
        &self,
        method: HttpMethod,
        space_id: &str,
        asset: &Asset,
        action: &str,
    ) -> Result<()> {
        let id = require_id(asset, "asset")?;
        let path = format!("{}/{id}/{action}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(method, &path, None, Vec::new(), &[])?;
        set_version(&mut request, asset);
        self.client.execute_unit(&request).await
    }
}
