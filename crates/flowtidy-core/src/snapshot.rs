//! Point-in-time topology of one process group.
//!
//! [`FlowSnapshot`] mirrors the `ProcessGroupFlowEntity` document returned by
//! the remote service. Only the fields needed to arrange the canvas are
//! modelled; everything else in the document is ignored during
//! deserialization.
//!
//! Raw connection endpoints are converted to [`RawConnection`] values with
//! [`ConnectionEntry::to_raw`], which is where endpoint kind strings are
//! validated against the closed [`EndpointKind`] set.

use serde::Deserialize;

use crate::{
    geometry::Size,
    identity::{EndpointKind, KindError},
};

/// Snapshot of a process group's canvas.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    process_group_flow: ProcessGroupFlow,
}

#[derive(Debug, Clone, Deserialize)]
struct ProcessGroupFlow {
    id: String,
    #[serde(default)]
    flow: Flow,
}

impl FlowSnapshot {
    /// Start building a snapshot by hand for the given group.
    pub fn builder(group_id: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder {
            group_id: group_id.into(),
            flow: Flow::default(),
        }
    }

    /// Returns the id of the process group this snapshot describes.
    pub fn group_id(&self) -> &str {
        &self.process_group_flow.id
    }

    /// Returns the components and connections drawn on the group canvas.
    pub fn flow(&self) -> &Flow {
        &self.process_group_flow.flow
    }
}

/// The component collections of one canvas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flow {
    process_groups: Vec<ComponentEntry>,
    remote_process_groups: Vec<ComponentEntry>,
    processors: Vec<ComponentEntry>,
    input_ports: Vec<ComponentEntry>,
    output_ports: Vec<ComponentEntry>,
    labels: Vec<LabelEntry>,
    funnels: Vec<ComponentEntry>,
    connections: Vec<ConnectionEntry>,
}

impl Flow {
    pub fn process_groups(&self) -> &[ComponentEntry] {
        &self.process_groups
    }

    pub fn remote_process_groups(&self) -> &[ComponentEntry] {
        &self.remote_process_groups
    }

    pub fn processors(&self) -> &[ComponentEntry] {
        &self.processors
    }

    pub fn input_ports(&self) -> &[ComponentEntry] {
        &self.input_ports
    }

    pub fn output_ports(&self) -> &[ComponentEntry] {
        &self.output_ports
    }

    pub fn labels(&self) -> &[LabelEntry] {
        &self.labels
    }

    pub fn funnels(&self) -> &[ComponentEntry] {
        &self.funnels
    }

    pub fn connections(&self) -> &[ConnectionEntry] {
        &self.connections
    }
}

/// A fixed-size component listed in a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    id: String,
}

impl ComponentEntry {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A label listed in a snapshot, with the dimensions the user resized it to.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEntry {
    id: String,
    #[serde(default)]
    dimensions: Option<Size>,
}

impl LabelEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the dimensions reported for this label, if any.
    pub fn dimensions(&self) -> Option<Size> {
        self.dimensions
    }
}

/// A connection as listed in a snapshot, with unvalidated endpoint kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEntry {
    id: String,
    source_id: String,
    source_group_id: String,
    source_type: String,
    destination_id: String,
    destination_group_id: String,
    destination_type: String,
}

impl ConnectionEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Validate the endpoint kinds and convert into a [`RawConnection`].
    ///
    /// # Errors
    ///
    /// Returns [`KindError::UnknownEndpoint`] if either endpoint reports a
    /// kind outside the [`EndpointKind`] set.
    pub fn to_raw(&self) -> Result<RawConnection, KindError> {
        let source = ConnectionEndpointRaw::new(
            &self.source_id,
            self.source_type.parse()?,
            &self.source_group_id,
        );
        let destination = ConnectionEndpointRaw::new(
            &self.destination_id,
            self.destination_type.parse()?,
            &self.destination_group_id,
        );
        Ok(RawConnection::new(&self.id, source, destination))
    }
}

/// A connection endpoint exactly as the remote service reports it.
///
/// This is not necessarily the component an edge should be drawn against:
/// an endpoint owned by a child group is drawn at that group's node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpointRaw {
    component_id: String,
    kind: EndpointKind,
    owning_group_id: String,
}

impl ConnectionEndpointRaw {
    pub fn new(
        component_id: impl Into<String>,
        kind: EndpointKind,
        owning_group_id: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            kind,
            owning_group_id: owning_group_id.into(),
        }
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    pub fn owning_group_id(&self) -> &str {
        &self.owning_group_id
    }
}

/// A directed connection between two raw endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConnection {
    id: String,
    source: ConnectionEndpointRaw,
    destination: ConnectionEndpointRaw,
}

impl RawConnection {
    pub fn new(
        id: impl Into<String>,
        source: ConnectionEndpointRaw,
        destination: ConnectionEndpointRaw,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            destination,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &ConnectionEndpointRaw {
        &self.source
    }

    pub fn destination(&self) -> &ConnectionEndpointRaw {
        &self.destination
    }
}

/// Builder for hand-made snapshots, mainly for tests and fixtures.
///
/// # Examples
///
/// ```
/// use flowtidy_core::snapshot::FlowSnapshot;
///
/// let snapshot = FlowSnapshot::builder("root")
///     .processor("proc1")
///     .process_group("pg1")
///     .connection("c1", ("proc1", "root", "PROCESSOR"), ("in1", "pg1", "INPUT_PORT"))
///     .build();
///
/// assert_eq!(snapshot.group_id(), "root");
/// assert_eq!(snapshot.flow().connections().len(), 1);
/// ```
#[derive(Debug)]
pub struct SnapshotBuilder {
    group_id: String,
    flow: Flow,
}

impl SnapshotBuilder {
    pub fn process_group(mut self, id: &str) -> Self {
        self.flow.process_groups.push(entry(id));
        self
    }

    pub fn remote_process_group(mut self, id: &str) -> Self {
        self.flow.remote_process_groups.push(entry(id));
        self
    }

    pub fn processor(mut self, id: &str) -> Self {
        self.flow.processors.push(entry(id));
        self
    }

    pub fn input_port(mut self, id: &str) -> Self {
        self.flow.input_ports.push(entry(id));
        self
    }

    pub fn output_port(mut self, id: &str) -> Self {
        self.flow.output_ports.push(entry(id));
        self
    }

    pub fn label(mut self, id: &str, dimensions: Option<Size>) -> Self {
        self.flow.labels.push(LabelEntry {
            id: id.to_string(),
            dimensions,
        });
        self
    }

    pub fn funnel(mut self, id: &str) -> Self {
        self.flow.funnels.push(entry(id));
        self
    }

    /// Add a connection; endpoints are `(component id, owning group id, kind)`.
    pub fn connection(
        mut self,
        id: &str,
        source: (&str, &str, &str),
        destination: (&str, &str, &str),
    ) -> Self {
        self.flow.connections.push(ConnectionEntry {
            id: id.to_string(),
            source_id: source.0.to_string(),
            source_group_id: source.1.to_string(),
            source_type: source.2.to_string(),
            destination_id: destination.0.to_string(),
            destination_group_id: destination.1.to_string(),
            destination_type: destination.2.to_string(),
        });
        self
    }

    pub fn build(self) -> FlowSnapshot {
        FlowSnapshot {
            process_group_flow: ProcessGroupFlow {
                id: self.group_id,
                flow: self.flow,
            },
        }
    }
}

fn entry(id: &str) -> ComponentEntry {
    ComponentEntry { id: id.to_string() }
}
