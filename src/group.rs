//! Host group model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, independently activatable block of hosts-file text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostGroup {
    pub id: String,
    pub title: String,
    /// Raw hosts text; never parsed.
    pub content: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(
        default,
        rename = "remoteURL",
        alias = "remoteUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Advisory id of another group; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl HostGroup {
    /// New inactive group with a fresh id, stamped `now`.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        is_remote: bool,
        remote_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            is_active: false,
            is_remote,
            remote_url: remote_url.filter(|u| !u.is_empty()),
            created_at: now,
            last_updated: now,
            tags: BTreeSet::new(),
            parent: None,
        }
    }

    /// Bump `last_updated`, never moving it before `created_at`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now.max(self.created_at);
    }
}
