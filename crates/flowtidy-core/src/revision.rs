//! The optimistic concurrency token attached to every remote component.

use serde::{Deserialize, Serialize};

/// Revision of a remote component.
///
/// Returned with every fetch and required on every update; the remote
/// service rejects an update whose version is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    #[serde(default)]
    version: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

impl Revision {
    pub fn new(version: u64, client_id: Option<String>) -> Self {
        Self { version, client_id }
    }

    /// Returns the revision version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the client id recorded with this revision, if any.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns this revision with `client_id` filled in when it has none.
    pub fn or_client_id(mut self, client_id: Option<&str>) -> Self {
        if self.client_id.is_none() {
            self.client_id = client_id.map(str::to_string);
        }
        self
    }
}
