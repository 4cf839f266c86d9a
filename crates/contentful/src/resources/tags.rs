//! Content tags.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
}

impl Versioned for Tag {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

pub struct TagsService<'a> {
    client: &'a Client,
}

impl<'a> TagsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/tags", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<Tag>> {
        self.client.collection(
            &self.base_path(space_id),
            None,
            CollectionOptions::default(),
        )
    }

    pub async fn get(&self, space_id: &str, tag_id: &str) -> Result<Tag> {
        let path = format!("{}/{tag_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, None, Vec::new(), &[])?;
        self.client.execute(&request).await
    }
}
