//! The remote flow service capability.
//!
//! [`FlowService`] is the seam between the arranging logic and the transport.
//! The production implementation talks HTTP; tests substitute an in-memory
//! fake.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    geometry::Point,
    identity::{ComponentIdentity, ComponentKind},
    revision::Revision,
    snapshot::FlowSnapshot,
};

/// Failures reported by a [`FlowService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("could not reach {url}: {message}")]
    Connection { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} was not found")]
    NotFound { url: String },

    #[error("revision conflict at {url}: {message}")]
    Conflict { url: String, message: String },

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ServiceError {
    /// Returns `true` when the update was rejected because of a stale revision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict { .. })
    }
}

/// Operations the arranger needs from the remote service.
///
/// Every call is blocking. Per-kind dispatch of [`component`] and
/// [`update_component`] is the implementor's responsibility and must cover
/// every [`ComponentKind`].
///
/// [`component`]: FlowService::component
/// [`update_component`]: FlowService::update_component
pub trait FlowService {
    /// Check that the service answers at all.
    fn test_connectivity(&self) -> Result<(), ServiceError>;

    /// Fetch the current topology of a process group.
    fn flow_snapshot(&self, group_id: &str) -> Result<FlowSnapshot, ServiceError>;

    /// Fetch the current representation and revision of one component.
    fn component(&self, identity: &ComponentIdentity) -> Result<FetchedComponent, ServiceError>;

    /// Submit a position patch guarded by the revision it carries.
    fn update_component(&self, patch: &PositionPatch) -> Result<(), ServiceError>;
}

/// A component as freshly fetched from the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedComponent {
    identity: ComponentIdentity,
    revision: Revision,
    position: Option<Point>,
    entity: Value,
}

#[derive(Deserialize)]
struct EntityHeader {
    id: String,
    #[serde(default)]
    revision: Revision,
    #[serde(default)]
    position: Option<Point>,
}

impl FetchedComponent {
    pub fn new(identity: ComponentIdentity, revision: Revision, entity: Value) -> Self {
        Self {
            identity,
            revision,
            position: None,
            entity,
        }
    }

    /// Interpret a component entity document returned for `kind`.
    ///
    /// # Errors
    ///
    /// Returns the serde message when the document has no `id` or a
    /// malformed `revision` / `position`.
    pub fn from_entity(kind: ComponentKind, entity: Value) -> Result<Self, String> {
        let header: EntityHeader =
            serde_json::from_value(entity.clone()).map_err(|err| err.to_string())?;

        Ok(Self {
            identity: ComponentIdentity::new(header.id, kind),
            revision: header.revision,
            position: header.position,
            entity,
        })
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Returns the concurrency token received with this fetch.
    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Returns the position the component currently has on the canvas.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Returns the display name from the fetched entity, if it has one.
    ///
    /// Labels and funnels carry no name.
    pub fn name(&self) -> Option<&str> {
        self.entity
            .pointer("/component/name")
            .and_then(Value::as_str)
    }
}

/// Position-only update for one component.
///
/// Serializes to `{"revision": .., "component": {"id": .., "position": ..}}`;
/// fields absent from `component` are left untouched by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPatch {
    #[serde(skip)]
    kind: ComponentKind,
    revision: Revision,
    component: PatchedComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct PatchedComponent {
    id: String,
    position: Point,
}

impl PositionPatch {
    /// Build a patch from a fresh fetch, replacing only the position.
    ///
    /// The id and revision come from `fetched`, never from an older snapshot.
    pub fn from_fetched(fetched: &FetchedComponent, position: Point, client_id: Option<&str>) -> Self {
        Self {
            kind: fetched.identity.kind(),
            revision: fetched.revision.clone().or_client_id(client_id),
            component: PatchedComponent {
                id: fetched.identity.id().to_string(),
                position,
            },
        }
    }

    pub fn identity(&self) -> ComponentIdentity {
        ComponentIdentity::new(self.component.id.clone(), self.kind)
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn position(&self) -> Point {
        self.component.position
    }
}
