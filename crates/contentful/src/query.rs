//! Query parameters for collection and single-entity requests.
//!
//! Parameters live in a sorted map so the encoded query string is
//! deterministic. Setters mirror the Contentful search syntax
//! (`fields.title[ne]=x`, `sys.id[in]=a,b`, ...).

use std::collections::BTreeMap;

use url::Url;

/// Comparison operators for range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl RangeOp {
    fn as_str(self) -> &'static str {
        match self {
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
        }
    }
}

/// Ordered mapping from parameter name to one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: BTreeMap<String, Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the query string of `url` into a `Query`.
    pub fn from_url(url: &Url) -> Self {
        let mut query = Self::new();
        for (name, value) in url.query_pairs() {
            query.add(name, value);
        }
        query
    }

    /// Set `name` to a single value, replacing existing values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(name.into(), vec![value.into()]);
        self
    }

    /// Append a value to `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.params.remove(name);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    /// All (name, value) pairs in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Replace the query string of `url` with this query.
    pub fn apply_to(&self, url: &mut Url) {
        if self.is_empty() {
            url.set_query(None);
            return;
        }
        url.set_query(Some(&self.encode()));
    }

    /// Form-encode the query (`a=1&b=2`).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.iter() {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.set("limit", limit.to_string())
    }

    pub fn skip(&mut self, skip: u64) -> &mut Self {
        self.set("skip", skip.to_string())
    }

    pub fn sync_token(&mut self, token: &str) -> &mut Self {
        self.set("sync_token", token)
    }

    /// Request an initial sync.
    pub fn initial(&mut self) -> &mut Self {
        self.set("initial", "true")
    }

    pub fn order(&mut self, field: &str) -> &mut Self {
        self.set("order", field)
    }

    pub fn select(&mut self, fields: &[&str]) -> &mut Self {
        self.set("select", fields.join(","))
    }

    /// Levels of linked entities to resolve (0–10).
    pub fn include(&mut self, levels: u8) -> &mut Self {
        self.set("include", levels.min(10).to_string())
    }

    pub fn locale(&mut self, locale: &str) -> &mut Self {
        self.set("locale", locale)
    }

    pub fn content_type(&mut self, id: &str) -> &mut Self {
        self.set("content_type", id)
    }

    /// Full-text search across all text fields.
    pub fn full_text(&mut self, term: &str) -> &mut Self {
        self.set("query", term)
    }

    pub fn equal(&mut self, field: &str, value: &str) -> &mut Self {
        self.set(field, value)
    }

    pub fn not_equal(&mut self, field: &str, value: &str) -> &mut Self {
        self.set(format!("{field}[ne]"), value)
    }

    pub fn all(&mut self, field: &str, values: &[&str]) -> &mut Self {
        self.set(format!("{field}[all]"), values.join(","))
    }

    pub fn within(&mut self, field: &str, values: &[&str]) -> &mut Self {
        self.set(format!("{field}[in]"), values.join(","))
    }

    pub fn not_within(&mut self, field: &str, values: &[&str]) -> &mut Self {
        self.set(format!("{field}[nin]"), values.join(","))
    }

    pub fn exists(&mut self, field: &str, exists: bool) -> &mut Self {
        self.set(format!("{field}[exists]"), exists.to_string())
    }

    pub fn matches(&mut self, field: &str, term: &str) -> &mut Self {
        self.set(format!("{field}[match]"), term)
    }

    pub fn range(&mut self, field: &str, op: RangeOp, value: &str) -> &mut Self {
        self.set(format!("{field}[{}]", op.as_str()), value)
    }

    /// Filter assets by MIME type group (`image`, `video`, ...).
    pub fn mime_type(&mut self, group: &str) -> &mut Self {
        self.set("mimetype_group", group)
    }

    pub fn links_to_entry(&mut self, id: &str) -> &mut Self {
        self.set("links_to_entry", id)
    }

    pub fn links_to_asset(&mut self, id: &str) -> &mut Self {
        self.set("links_to_asset", id)
    }
}
