//! Spaces.

use serde::{Deserialize, Serialize};

use super::{is_persisted, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
}

impl Versioned for Space {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

/// Only these fields are accepted on create/update.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpacePayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_locale: Option<&'a str>,
}

pub struct SpacesService<'a> {
    client: &'a Client,
}

impl<'a> SpacesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Collection<Space>> {
        self.list_with(CollectionOptions::default())
    }

    pub fn list_with(&self, options: CollectionOptions) -> Result<Collection<Space>> {
        self.client.collection("/spaces", None, options)
    }

    pub async fn get(&self, space_id: &str) -> Result<Space> {
        let request = self.client.new_request(
            HttpMethod::Get,
            &format!("/spaces/{space_id}"),
            None,
            Vec::new(),
            &[],
        )?;
        self.client.execute(&request).await
    }

    /// Create the space, or update it when the server already knows it.
    pub async fn upsert(&self, space: &Space) -> Result<Space> {
        let body = serde_json::to_vec(&SpacePayload {
            name: &space.name,
            default_locale: space.default_locale.as_deref(),
        })?;

        let (method, path) = if is_persisted(space.sys.as_ref()) {
            let id = require_id(space, "space")?;
            (HttpMethod::Put, self.client.space_path(id))
        } else {
            (HttpMethod::Post, "/spaces".to_string())
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, space);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space: &Space) -> Result<()> {
        let id = require_id(space, "space")?;
        let mut request = self.client.new_request(
            HttpMethod::Delete,
            &format!("/spaces/{id}"),
            None,
            Vec::new(),
            &[],
        )?;
        set_version(&mut request, space);
        self.client.execute_unit(&request).await
    }
}
