//! Entries, including caller-defined entry types and the sync endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::content_types::ContentType;
use super::{require_id, set_version};
use crate::client::{CONTENT_TYPE_HEADER, Client};
use crate::collection::{Collection, CollectionOptions};
use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::query::Query;
use crate::types::{Link, Metadata, Sys, Versioned, deep_copy};

/// An entry with untyped, localized fields (`fields.{id}.{locale}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// A new, unsaved entry of the given content type.
    pub fn new(content_type_id: impl Into<String>) -> Self {
        Self {
            metadata: None,
            sys: Some(Sys {
                content_type: Some(Link::new("ContentType", content_type_id)),
                ..Sys::default()
            }),
            fields: Map::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set the value of `key` for one locale.
    pub fn set_field(&mut self, key: &str, locale: &str, value: Value) -> &mut Self {
        let slot = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(locales) = slot {
            locales.insert(locale.to_string(), value);
        } else {
            *slot = json!({ locale: value });
        }
        self
    }

    pub fn content_type_id(&self) -> Option<&str> {
        self.sys
            .as_ref()
            .and_then(|sys| sys.content_type.as_ref())
            .map(Link::id)
    }
}

impl Versioned for Entry {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

/// A field value together with its declared content-type field type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryField {
    value: Option<Value>,
    data_type: Option<String>,
}

impl EntryField {
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Field type as declared by the content type (`Symbol`, `Link`, ...).
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}

pub struct EntriesService<'a> {
    client: &'a Client,
}

impl<'a> EntriesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn entries_path(&self, space_id: &str) -> String {
        format!("{}/entries", self.client.space_path(space_id))
    }

    fn entry_path(&self, space_id: &str, entry_id: &str) -> String {
        format!("{}/entries/{entry_id}", self.client.space_path(space_id))
    }

    pub fn list(&self, space_id: &str) -> Result<Collection<Entry>> {
        self.list_with(space_id, CollectionOptions::default())
    }

    pub fn list_with(
        &self,
        space_id: &str,
        options: CollectionOptions,
    ) -> Result<Collection<Entry>> {
        self.client.collection(&self.entries_path(space_id), None, options)
    }

    /// List entries decoded as a caller-defined type.
    pub fn list_as<T>(&self, space_id: &str) -> Result<Collection<T>> {
        self.client
            .collection(&self.entries_path(space_id), None, CollectionOptions::default())
    }

    /// Cursor over the sync endpoint.
    ///
    /// `initial` requests a full initial sync; `sync_token` resumes a
    /// previous one. The sync token, once known, replaces every other
    /// query parameter.
    pub fn sync(
        &self,
        space_id: &str,
        initial: bool,
        sync_token: Option<&str>,
    ) -> Result<Collection<Value>> {
        let mut query = Query::new();
        if initial {
            query.initial();
        }
        let path = format!("{}/sync", self.client.space_path(space_id));
        let collection = self
            .client
            .collection(&path, Some(&query), CollectionOptions::default())?;

        Ok(match sync_token {
            Some(token) => collection.with_sync_token(token),
            None => collection,
        })
    }

    pub async fn get(&self, space_id: &str, entry_id: &str, locale: Option<&str>) -> Result<Entry> {
        self.get_as(space_id, entry_id, locale).await
    }

    pub async fn get_as<T: DeserializeOwned>(
        &self,
        space_id: &str,
        entry_id: &str,
        locale: Option<&str>,
    ) -> Result<T> {
        let mut query = Query::new();
        if let Some(locale) = locale {
            query.locale(locale);
        }
        let request = self.client.new_request(
            HttpMethod::Get,
            &self.entry_path(space_id, entry_id),
            Some(&query),
            Vec::new(),
            &[],
        )?;
        self.client.execute(&request).await
    }

    pub async fn delete(&self, space_id: &str, entry_id: &str) -> Result<()> {
        let request = self.client.new_request(
            HttpMethod::Delete,
            &self.entry_path(space_id, entry_id),
            None,
            Vec::new(),
            &[],
        )?;
        self.client.execute_unit(&request).await
    }

    /// Create (POST, no id) or update (PUT, with id) an entry.
    ///
    /// Only `fields` is sent. The entry must name its content type.
    pub async fn upsert(&self, space_id: &str, entry: &Entry) -> Result<Entry> {
        self.upsert_as(space_id, entry).await
    }

    /// [`upsert`](Self::upsert) for caller-defined entry types. The value
    /// is read through its JSON form, so it must serialize with the usual
    /// `sys` and `fields` keys.
    pub async fn upsert_as<T>(&self, space_id: &str, entry: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let base: Entry = deep_copy(entry)?;
        let content_type = base
            .content_type_id()
            .ok_or_else(|| {
                Error::invalid_request("creating or updating an entry requires a content type")
            })?
            .to_string();

        let body = serde_json::to_vec(&json!({ "fields": base.fields }))?;
        let (method, path) = match base.id().filter(|id| !id.is_empty()) {
            Some(id) => (HttpMethod::Put, self.entry_path(space_id, id)),
            None => (HttpMethod::Post, self.entries_path(space_id)),
        };

        let mut request = self.client.new_request(
            method,
            &path,
            None,
            body,
            &[(CONTENT_TYPE_HEADER, content_type.as_str())],
        )?;
        set_version(&mut request, &base);
        self.client.execute(&request).await
    }

    pub async fn publish<E: Versioned + ?Sized>(&self, space_id: &str, entry: &E) -> Result<()> {
        self.action(HttpMethod::Put, space_id, entry, "published").await
    }

    pub async fn unpublish<E: Versioned + ?Sized>(&self, space_id: &str, entry: &E) -> Result<()> {
        self.action(HttpMethod::Delete, space_id, entry, "published")
            .await
    }

    pub async fn archive<E: Versioned + ?Sized>(&self, space_id: &str, entry: &E) -> Result<()> {
        self.action(HttpMethod::Put, space_id, entry, "archived").await
    }

    pub async fn unarchive<E: Versioned + ?Sized>(&self, space_id: &str, entry: &E) -> Result<()> {
        self.action(HttpMethod::Delete, space_id, entry, "archived")
            .await
    }

    async fn action<E: Versioned + ?Sized>(
        &self,
        method: HttpMethod,
        space_id: &str,
        entry: &E,
        action: &str,
    ) -> Result<()> {
        let id = require_id(entry, "entry")?;
        let path = format!("{}/{action}", self.entry_path(space_id, id));
        let mut request = self
            .client
            .new_request(method, &path, None, Vec::new(), &[])?;
        set_version(&mut request, entry);
        self.client.execute_unit(&request).await
    }

    /// Look up `key` on `entry` together with its declared field type.
    ///
    /// The entry's space and content type come from its `sys` links; the
    /// first page of the space's content types is searched.
    pub async fn entry_field(&self, entry: &Entry, key: &str) -> Result<EntryField> {
        let sys = entry
            .sys
            .as_ref()
            .ok_or_else(|| Error::invalid_request("entry has no sys"))?;
        let space_id = sys
            .space
            .as_ref()
            .map(Link::id)
            .ok_or_else(|| Error::invalid_request("entry has no space link"))?;
        let content_type_id = entry
            .content_type_id()
            .ok_or_else(|| Error::invalid_request("entry has no content type link"))?;

        let mut content_types = self.client.content_types().list(space_id)?;
        content_types.advance().await?;

        let data_type = content_types
            .items
            .iter()
            .filter(|ct: &&ContentType| ct.id() == Some(content_type_id))
            .flat_map(|ct| ct.fields.iter())
            .filter(|field| field.id.as_deref() == Some(key))
            .filter_map(|field| field.kind.clone())
            .last();

        Ok(EntryField {
            value: entry.fields.get(key).cloned(),
            data_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::VERSION_HEADER;
    use crate::config::ClientConfig;
    use crate::http::MockTransport;
    use std::sync::Arc;

    const ENTRIES_URL: &str = "https://api.contentful.com/spaces/s1/environments/master/entries";

    fn setup() -> (Client, MockTransport) {
        let transport = MockTransport::new();
        let client = Client::new_with_transport(
            "token",
            ClientConfig::cma().with_environment("master"),
            Arc::new(transport.clone()),
        );
        (client, transport)
    }

    fn saved_entry(version: Option<u64>) -> Entry {
        let mut entry = Entry::new("blogPost");
        if let Some(sys) = entry.sys.as_mut() {
            sys.id = Some("e1".to_string());
            sys.version = version;
        }
        entry.set_field("title", "en-US", json!("Hello"));
        entry
    }

    #[test]
    fn set_field_builds_locale_map() {
        let mut entry = Entry::new("blogPost");
        entry
            .set_field("title", "en-US", json!("Hello"))
            .set_field("title", "de-DE", json!("Hallo"));
        assert_eq!(
            entry.field("title"),
            Some(&json!({"en-US": "Hello", "de-DE": "Hallo"}))
        );
        assert_eq!(entry.content_type_id(), Some("blogPost"));
    }

    #[tokio::test]
    async fn upsert_with_id_puts_fields_only() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Put,
            format!("{ENTRIES_URL}/e1"),
            200,
            json!({"sys": {"id": "e1", "version": 6}, "fields": {"title": {"en-US": "Hello"}}}),
        );

        let updated = client
            .entries()
            .upsert("s1", &saved_entry(Some(5)))
            .await
            .expect("updated");
        assert_eq!(updated.version(), 6);

        let sent = &transport.requests()[0];
        assert_eq!(sent.header(VERSION_HEADER), Some("5"));
        assert_eq!(sent.header(CONTENT_TYPE_HEADER), Some("blogPost"));
        let body: Value = serde_json::from_slice(&sent.body).expect("json body");
        assert_eq!(body, json!({"fields": {"title": {"en-US": "Hello"}}}));
    }

    #[tokio::test]
    async fn upsert_without_id_posts_with_default_version() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Post,
            ENTRIES_URL,
            201,
            json!({"sys": {"id": "generated", "version": 1}}),
        );

        let created = client
            .entries()
            .upsert("s1", &Entry::new("blogPost"))
            .await
            .expect("created");
        assert_eq!(created.id(), Some("generated"));
        assert_eq!(transport.requests()[0].header(VERSION_HEADER), Some("1"));
    }

    #[tokio::test]
    async fn upsert_requires_content_type() {
        let (client, transport) = setup();
        let err = client
            .entries()
            .upsert("s1", &Entry::default())
            .await
            .expect_err("no content type");
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn publish_sends_version_header() {
        let (client, transport) = setup();
        let url = format!("{ENTRIES_URL}/e1/published");
        transport.push_json(HttpMethod::Put, url.clone(), 200, json!({}));
        transport.push_json(HttpMethod::Delete, url, 200, json!({}));

        let entries = client.entries();
        entries
            .publish("s1", &saved_entry(Some(5)))
            .await
            .expect("published");
        entries
            .unpublish("s1", &saved_entry(None))
            .await
            .expect("unpublished");

        let sent = transport.requests();
        assert_eq!(sent[0].header(VERSION_HEADER), Some("5"));
        assert_eq!(sent[1].header(VERSION_HEADER), Some("1"));
    }

    #[tokio::test]
    async fn archive_and_unarchive_use_archived_path() {
        let (client, transport) = setup();
        let url = format!("{ENTRIES_URL}/e1/archived");
        transport.push_json(HttpMethod::Put, url.clone(), 200, json!({}));
        transport.push_json(HttpMethod::Delete, url, 200, json!({}));

        let entry = saved_entry(Some(2));
        client.entries().archive("s1", &entry).await.expect("archived");
        client
            .entries()
            .unarchive("s1", &entry)
            .await
            .expect("unarchived");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn get_passes_locale() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Get,
            format!("{ENTRIES_URL}/e1?locale=de-DE"),
            200,
            json!({"sys": {"id": "e1"}, "fields": {"title": "Hallo"}}),
        );

        let entry = client
            .entries()
            .get("s1", "e1", Some("de-DE"))
            .await
            .expect("entry");
        assert_eq!(entry.field("title"), Some(&json!("Hallo")));
    }

    #[tokio::test]
    async fn typed_entries_round_trip_through_json() {
        #[derive(Debug, Serialize, Deserialize)]
        struct BlogPost {
            sys: Sys,
            fields: BlogFields,
        }
        #[derive(Debug, Serialize, Deserialize)]
        struct BlogFields {
            title: std::collections::BTreeMap<String, String>,
        }

        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Get,
            format!("{ENTRIES_URL}/e1"),
            200,
            json!({
                "sys": {"id": "e1", "version": 3, "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "blogPost"}}},
                "fields": {"title": {"en-US": "Typed"}}
            }),
        );
        transport.push_json(
            HttpMethod::Put,
            format!("{ENTRIES_URL}/e1"),
            200,
            json!({"sys": {"id": "e1", "version": 4}, "fields": {"title": {"en-US": "Typed"}}}),
        );

        let post: BlogPost = client
            .entries()
            .get_as("s1", "e1", None)
            .await
            .expect("typed entry");
        assert_eq!(post.fields.title.get("en-US").map(String::as_str), Some("Typed"));

        let saved = client.entries().upsert_as("s1", &post).await.expect("saved");
        assert_eq!(saved.sys.version, Some(4));
        let sent = &transport.requests()[1];
        assert_eq!(sent.header(VERSION_HEADER), Some("3"));
        assert_eq!(sent.header(CONTENT_TYPE_HEADER), Some("blogPost"));
    }

    #[tokio::test]
    async fn sync_seeds_initial_and_token() {
        let (client, _) = setup();
        let initial = client.entries().sync("s1", true, None).expect("collection");
        assert_eq!(initial.query().get("initial"), Some("true"));
        assert!(initial.sync_token.is_none());

        let resumed = client
            .entries()
            .sync("s1", false, Some("tok"))
            .expect("collection");
        assert_eq!(resumed.sync_token.as_deref(), Some("tok"));
        assert!(!resumed.query().contains("initial"));
        assert_eq!(
            resumed.request().url,
            "https://api.contentful.com/spaces/s1/environments/master/sync"
        );
    }

    #[tokio::test]
    async fn entry_field_reports_declared_type() {
        let (client, transport) = setup();
        transport.push_json(
            HttpMethod::Get,
            "https://api.contentful.com/spaces/s1/environments/master/content_types?limit=100&skip=0",
            200,
            json!({"items": [
                {"sys": {"id": "other"}, "name": "Other", "fields": [{"id": "title", "name": "T", "type": "Text"}]},
                {"sys": {"id": "blogPost"}, "name": "Blog", "fields": [
                    {"id": "title", "name": "Title", "type": "Symbol"},
                    {"id": "body", "name": "Body", "type": "Text"}
                ]}
            ]}),
        );

        let mut entry = saved_entry(Some(1));
        if let Some(sys) = entry.sys.as_mut() {
            sys.space = Some(Link::new("Space", "s1"));
        }

        let field = client
            .entries()
            .entry_field(&entry, "title")
            .await
            .expect("field");
        assert_eq!(field.data_type(), Some("Symbol"));
        assert_eq!(field.value(), Some(&json!({"en-US": "Hello"})));

        let missing = EntryField {
            value: None,
            data_type: None,
        };
        assert_eq!(missing.into_value(), None);
    }
}
