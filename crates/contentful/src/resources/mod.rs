//! Per-resource services.
//!
//! Each service borrows the [`Client`](crate::Client), builds requests for
//! one resource type, and hands them to the executor or wraps them in a
//! [`Collection`](crate::Collection).

pub mod api_keys;
pub mod assets;
pub mod content_types;
pub mod entries;
pub mod locales;
pub mod scheduled_actions;
pub mod spaces;
pub mod tags;
pub mod uploads;
pub mod webhooks;

use serde::Serialize;
use serde_json::Value;

use crate::client::VERSION_HEADER;
use crate::error::{Error, Result};
use crate::http::HttpRequest;
use crate::types::{Sys, Versioned};

/// Send the entity's current version for optimistic concurrency.
pub(crate) fn set_version<V: Versioned + ?Sized>(request: &mut HttpRequest, entity: &V) {
    request.set_header(VERSION_HEADER, entity.version().to_string());
}

/// The entity's `sys.id`, or an invalid-request error naming `kind`.
pub(crate) fn require_id<'a, V: Versioned + ?Sized>(entity: &'a V, kind: &str) -> Result<&'a str> {
    entity
        .id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::invalid_request(format!("{kind} has no sys.id")))
}

/// Whether the server has already created the entity.
pub(crate) fn is_persisted(sys: Option<&Sys>) -> bool {
    sys.is_some_and(|sys| sys.created_at.is_some())
}

/// JSON body of `entity` with its `sys` block removed.
pub(crate) fn body_without_sys<T: Serialize + ?Sized>(entity: &T) -> Result<Vec<u8>> {
    let mut value = serde_json::to_value(entity)?;
    if let Value::Object(ref mut map) = value {
        map.remove("sys");
    }
    Ok(serde_json::to_vec(&value)?)
}
