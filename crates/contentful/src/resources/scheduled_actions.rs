//! Scheduled publish/unpublish actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::collection::{Collection, CollectionOptions};
use crate::error::Result;
use crate::query::Query;
use crate::types::{Link, Sys, Versioned};

/// Environment used when the client has none configured.
pub const DEFAULT_ENVIRONMENT: &str = "master";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Link>,
    /// `publish` or `unpublish`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<ScheduledFor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Versioned for ScheduledAction {
    fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }
}

pub struct ScheduledActionsService<'a> {
    client: &'a Client,
}

impl<'a> ScheduledActionsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Pending actions scheduled for one entity in the client's environment.
    ///
    /// Scheduled actions live at the space level; the environment is a
    /// query filter, not a path segment.
    pub fn list(&self, space_id: &str, entity_id: &str) -> Result<Collection<ScheduledAction>> {
        let environment = self
            .client
            .config()
            .environment
            .as_deref()
            .filter(|env| !env.is_empty())
            .unwrap_or(DEFAULT_ENVIRONMENT);

        let mut query = Query::new();
        query
            .equal("entity.sys.id", entity_id)
            .equal("environment.sys.id", environment)
            .within("status", &["scheduled"]);

        self.client.collection(
            &format!("/spaces/{space_id}/scheduled_actions"),
            Some(&query),
            CollectionOptions::default(),
        )
    }
}
