//! Reference resolution for connection endpoints.
//!
//! A connection may end on a port nested inside a child process group or a
//! remote process group. Those ports are not drawn on the canvas being laid
//! out; the edge is anchored at the child group's node instead.

use thiserror::Error;

use flowtidy_core::{
    identity::{ComponentIdentity, ComponentKind},
    snapshot::ConnectionEndpointRaw,
};

/// Errors raised while resolving an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("remote port `{0}` is reported as drawn directly on the group canvas")]
    RemotePortOnCanvas(String),
}

/// Resolves raw endpoints against the group currently being laid out.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    group_id: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(group_id: &'a str) -> Self {
        Self { group_id }
    }

    /// Returns the identity of the node the endpoint is drawn at.
    ///
    /// - Owned by the current group: the endpoint itself, unchanged.
    /// - Owned by another group and a remote port: that remote process group.
    /// - Owned by another group otherwise: that child process group.
    ///
    /// Earlier revisions of this rule substituted a process group for every
    /// nested endpoint, which left edges to remote ports dangling; remote
    /// ports now resolve to their remote process group.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::RemotePortOnCanvas`] for a remote port owned by
    /// the current group, which the service never produces for a consistent
    /// snapshot.
    pub fn resolve(
        &self,
        endpoint: &ConnectionEndpointRaw,
    ) -> Result<ComponentIdentity, ResolveError> {
        let kind = endpoint.kind();

        if endpoint.owning_group_id() != self.group_id {
            let group_kind = if kind.is_remote_port() {
                ComponentKind::RemoteProcessGroup
            } else {
                ComponentKind::ProcessGroup
            };
            return Ok(ComponentIdentity::new(
                endpoint.owning_group_id(),
                group_kind,
            ));
        }

        kind.component_kind()
            .map(|kind| ComponentIdentity::new(endpoint.component_id(), kind))
            .ok_or_else(|| ResolveError::RemotePortOnCanvas(endpoint.component_id().to_string()))
    }
}
