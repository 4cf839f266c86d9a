//! Binary uploads, sent to the upload host.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Link, Sys, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default)]
    pub sys: Sys,
}

impl Upload {
    /// Link suitable for [`File::upload_from`](super::assets::File::upload_from).
    pub fn link(&self) -> Option<Link> {
        self.sys.id.as_deref().map(|id| Link::new("Upload", id))
    }
}

impl Versioned for Upload {
    fn sys(&self) -> Option<&Sys> {
        Some(&self.sys)
    }
}

pub struct UploadsService<'a> {
    client: &'a Client,
}

impl<'a> UploadsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Upload raw bytes and return the upload reference.
    pub async fn create(&self, space_id: &str, data: Vec<u8>) -> Result<Upload> {
        let path = format!("{}/uploads", self.client.space_path(space_id));
        let request = self.client.new_request(
            HttpMethod::Post,
            &path,
            None,
            data,
            &[("Content-Type", "application/octet-stream")],
        )?;
        self.client.execute(&request).await
    }
}
