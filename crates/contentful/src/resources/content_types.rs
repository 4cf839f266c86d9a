//! Content types and their field definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{body_without_sys, require_id, set_version};
use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Sys, Versioned};

/// Field type names used in content type definitions.
pub mod field_type {
    pub const SYMBOL: &str = "Symbol";
    pub const TEXT: &str = "Text";
    pub const RICH_TEXT: &str = "RichText";
    pub const INTEGER: &str = "Integer";
    pub const NUMBER: &str = "Number";
    pub const DATE: &str = "Date";
    pub const LOCATION: &str = "Location";
    pub const BOOLEAN: &str = "Boolean";
    pub const OBJECT: &str = "Object";
    pub const LINK: &str = "Link";
    pub const ARRAY: &str = "Array";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl ContentType {
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id.as_deref() == Some(id))
    }
}

impl Versioned for ContentType {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

/// One field of a content type. Validations are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub omitted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<Value>,
}

/// Element type of an `Array` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldItems {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<Value>,
}

pub struct ContentTypesService<'a> {
    client: &'a Client,
}

impl<'a> ContentTypesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(&self, space_id: &str) -> String {
        format!("{}/content_types", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<ContentType>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<ContentType>> {
        self.client
            .collection(&self.base_path(space_id), None, options)
    }

    pub async fn get(&self, space_id: &str, content_type_id: &str) -> Result<ContentType> {
        let path = format!("{}/{content_type_id}", self.base_path(space_id));
        let request = self
            .client
            .new_request(HttpMethod::Get, &path, None, Vec::new(), &[])?;
        self.client.execute(&request).await
    }

    /// Create (POST, no id) or update (PUT, with id) a content type.
    pub async fn upsert(&self, space_id: &str, content_type: &ContentType) -> Result<ContentType> {
        let body = body_without_sys(content_type)?;
        let (method, path) = match content_type.id().filter(|id| !id.is_empty()) {
            Some(id) => (HttpMethod::Put, format!("{}/{id}", self.base_path(space_id))),
            None => (HttpMethod::Post, self.base_path(space_id)),
        };

        let mut request = self.client.new_request(method, &path, None, body, &[])?;
        set_version(&mut request, content_type);
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, content_type: &ContentType) -> Result<()> {
        let id = require_id(content_type, "content type")?;
        let path = format!("{}/{id}", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(HttpMethod::Delete, &path, None, Vec::new(), &[])?;
        set_version(&mut request, content_type);
        self.client.execute_unit(&request).await
    }

    /// Publish the content type so entries can use it.
    pub async fn activate(
        &self,
        space_id: &str,
        content_type: &ContentType,
    ) -> Result<ContentType> {
        self.published(HttpMethod::Put, space_id, content_type)
            .await
    }

    pub async fn deactivate(
        &self,
        space_id: &str,
        content_type: &ContentType,
    ) -> Result<ContentType> {
        self.published(HttpMethod::Delete, space_id, content_type)
            .await
    }

    async fn published(
        &self,
        method: HttpMethod,
        space_id: &str,
        content_type: &ContentType,
    ) -> Result<ContentType> {
        let id = require_id(content_type, "content type")?;
        let path = format!("{}/{id}/published", self.base_path(space_id));
        let mut request = self
            .client
            .new_request(method, &path, None, Vec::new(), &[])?;
        set_version(&mut request, content_type);
        self.client.execute(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::VERSION_HEADER;
    use crate::config::ClientConfig;
    use crate::http::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    const BASE: &str = "https://api.contentful.com/spaces/s1/content_types";

    fn setup() -> (Client, MockTransport) {
        let transport = MockTransport::new();
        let client =
            Client::new_with_transport("token", ClientConfig::cma(), Arc::new(transport.clone()));
        (client, transport)
    }

    fn blog_post(version: Option<u64>) -> ContentType {
        ContentType {
            sys: Some(Sys {
                id: Some("blogPost".to_string()),
                version,
                ..Sys::default()
            }),
            name: "Blog Post".to_string(),
            display_field: Some("title".to_string()),
            fields: vec![Field {
                id: Some("title".to_string()),
                name: "Title".to_string(),
                kind: Some(field_type::SYMBOL.to_string()),
                required: true,
                ..Field::default()
            }],
            ..ContentType::default()
        }
    }

    #[test]
    fn decodes_array_fields_and_validations() {
        let ct: ContentType = serde_json::from_value(json!({
            "sys": {"id": "gallery"},
            "name": "Gallery",
            "fields": [{
                "id": "images",
                "name": "Images",
                "type": "Array",
                "items": {"type": "Link", "linkType": "Asset", "validations": [{"linkMimetypeGroup": ["image"]}]},
                "validations": [{"size": {"min": 1}}]
            }]
        }))
        .expect("content type");

        let images = ct.field("images").expect("images field");
        assert_eq!(images.kind.as_deref(), Some(field_type::ARRAY));
        let items = images.items.as_ref().expect("items");
        assert_eq!(items.link_type.as_deref(), Some("Asset"));
        assert_eq!(items.validations.len(), 1);
        assert_eq!(images.validations, vec![json!({"size": {"min": 1}})]);
    }

    #[tokio::test]
    async fn upsert_puts_definition_without_sys() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Put,
            format!("{BASE}/blogPost"),
            200,
            json!({"sys": {"id": "blogPost", "version": 3}, "name": "Blog Post"}),
        );

        let saved = client
            .content_types()
            .upsert("s1", &blog_post(Some(2)))
            .await
            .expect("saved");
        assert_eq!(saved.version(), 3);

        let sent = &transport.requests()[0];
        assert_eq!(sent.header(VERSION_HEADER), Some("2"));
        let body: Value = serde_json::from_slice(&sent.body).expect("json");
        assert!(body.get("sys").is_none());
        assert_eq!(body["displayField"], "title");
        assert_eq!(body["fields"][0]["type"], "Symbol");
    }

    #[tokio::test]
    async fn activate_and_deactivate_use_published_path() {
        let (client, transport) = setup();
        let url = format!("{BASE}/blogPost/published");
        transport.push_json(
            HttpMethod::Put,
            url.clone(),
            200,
            json!({"sys": {"id": "blogPost", "version": 4}}),
        );
        transport.push_json(
            HttpMethod::Delete,
            url,
            200,
            json!({"sys": {"id": "blogPost", "version": 5}}),
        );

        let service = client.content_types();
        let active = service
            .activate("s1", &blog_post(Some(3)))
            .await
            .expect("activated");
        let inactive = service.deactivate("s1", &active).await.expect("deactivated");
        assert_eq!(inactive.version(), 5);

        let sent = transport.requests();
        assert_eq!(sent[0].header(VERSION_HEADER), Some("3"));
        assert_eq!(sent[1].header(VERSION_HEADER), Some("4"));
    }

    #[tokio::test]
    async fn version_conflict_surfaces_sent_version() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Delete,
            format!("{BASE}/blogPost"),
            409,
            json!({"sys": {"type": "Error", "id": "VersionMismatch"}, "requestId": "r"}),
        );

        let err = client
            .content_types()
            .delete("s1", &blog_post(Some(7)))
            .await
            .expect_err("conflict");
        assert_eq!(err.to_string(), "Version 7 is mismatched");
    }
}
