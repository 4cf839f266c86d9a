//! Shared entity metadata and helpers.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// System metadata attached to every Contentful entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_counter: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_by: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<Link>,
}

/// A reference to another entity (`{"sys": {"type": "Link", ...}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(rename = "type", default = "link_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

fn link_kind() -> String {
    "Link".to_string()
}

impl Link {
    /// Build a link of the given type (`Entry`, `Asset`, `ContentType`, ...).
    pub fn new(link_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                id: id.into(),
                kind: link_kind(),
                link_type: Some(link_type.into()),
            },
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Tag metadata carried by entries and assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tags: Vec<Link>,
}

/// An entity that takes part in optimistic concurrency.
///
/// Mutations send the entity's current version in `X-Contentful-Version`;
/// the server rejects the request with a version conflict when it does not
/// match the stored version.
pub trait Versioned {
    fn sys(&self) -> Option<&Sys>;

    /// Current version, or 1 when the entity carries none.
    fn version(&self) -> u64 {
        self.sys().and_then(|sys| sys.version).unwrap_or(1)
    }

    fn id(&self) -> Option<&str> {
        self.sys().and_then(|sys| sys.id.as_deref())
    }
}

impl Versioned for Sys {
    fn sys(&self) -> Option<&Sys> {
        Some(self)
    }
}

/// Convert one serializable shape into another through JSON.
///
/// Used to read `sys` out of caller-defined entry types and to cast raw
/// collection items into typed models. The scratch buffer lives for the
/// duration of the call only.
pub fn deep_copy<S, D>(src: &S) -> Result<D>
where
    S: Serialize + ?Sized,
    D: DeserializeOwned,
{
    let buf = serde_json::to_vec(src)?;
    Ok(serde_json::from_slice(&buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Bare {
        sys: Option<Sys>,
    }

    impl Versioned for Bare {
        fn sys(&self) -> Option<&Sys> {
            self.sys.as_ref()
        }
    }

    #[test]
    fn version_defaults_to_one_without_sys() {
        assert_eq!(Bare { sys: None }.version(), 1);
        assert_eq!(
            Bare {
                sys: Some(Sys::default())
            }
            .version(),
            1
        );
    }

    #[test]
    fn version_reads_sys_version() {
        let sys = Sys {
            version: Some(5),
            ..Sys::default()
        };
        assert_eq!(Bare { sys: Some(sys) }.version(), 5);
    }

    #[test]
    fn sys_deserializes_camel_case_fields_and_links() {
        let sys: Sys = serde_json::from_value(json!({
            "id": "5KsDBWseXY6QegucYAoacS",
            "type": "Entry",
            "version": 3,
            "createdAt": "2017-05-18T13:35:42.024Z",
            "publishedCounter": 1,
            "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "cat"}},
            "space": {"sys": {"type": "Link", "linkType": "Space", "id": "cfexampleapi"}}
        }))
        .expect("sys should decode");

        assert_eq!(sys.id.as_deref(), Some("5KsDBWseXY6QegucYAoacS"));
        assert_eq!(sys.kind.as_deref(), Some("Entry"));
        assert_eq!(sys.version, Some(3));
        assert!(sys.created_at.is_some());
        assert_eq!(sys.content_type.as_ref().map(Link::id), Some("cat"));
        assert_eq!(sys.space.as_ref().map(Link::id), Some("cfexampleapi"));
    }

    #[test]
    fn sys_serialization_skips_absent_fields() {
        let sys = Sys {
            id: Some("NotFound".to_string()),
            kind: Some("Error".to_string()),
            ..Sys::default()
        };
        let value = serde_json::to_value(&sys).expect("sys should encode");
        assert_eq!(value, json!({"id": "NotFound", "type": "Error"}));
    }

    #[test]
    fn link_new_sets_link_kind() {
        let link = Link::new("Asset", "img");
        let value = serde_json::to_value(&link).expect("link should encode");
        assert_eq!(
            value,
            json!({"sys": {"id": "img", "type": "Link", "linkType": "Asset"}})
        );
    }

    #[test]
    fn deep_copy_converts_between_shapes_and_reports_mismatches() {
        #[derive(Serialize)]
        struct Source {
            sys: Sys,
            extra: u32,
        }
        #[derive(Deserialize)]
        struct Target {
            sys: Sys,
        }

        let source = Source {
            sys: Sys {
                id: Some("abc".to_string()),
                ..Sys::default()
            },
            extra: 7,
        };
        let target: Target = deep_copy(&source).expect("compatible shapes");
        assert_eq!(target.sys.id.as_deref(), Some("abc"));

        let mismatch: Result<Vec<String>> = deep_copy(&source);
        assert!(mismatch.is_err());
    }
}
