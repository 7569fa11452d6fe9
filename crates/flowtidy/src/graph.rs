//! Graph construction from a catalog and its connections.
//!
//! The built [`FlowGraph`] is a strict simple digraph: one node per catalog
//! entry, at most one edge per resolved (source, destination) pair, and no
//! self-loops. Node sizes are held in layout units, see [`Scale`].

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use thiserror::Error;

use flowtidy_core::{
    geometry::{Point, Size},
    identity::{ComponentIdentity, KindError},
    snapshot::{ConnectionEndpointRaw, FlowSnapshot, RawConnection},
};

use crate::{
    catalog::Catalog,
    resolver::{ResolveError, Resolver},
};

/// Errors raised while building a [`FlowGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("connection `{connection}` has an invalid endpoint: {source}")]
    EndpointKind {
        connection: String,
        source: KindError,
    },

    #[error("connection `{connection}`: {source}")]
    Resolve {
        connection: String,
        source: ResolveError,
    },

    #[error(
        "connection `{connection}` ends at {identity}, which is not on the canvas of group `{group_id}`"
    )]
    UnknownEndpoint {
        connection: String,
        identity: ComponentIdentity,
        group_id: String,
    },
}

/// Linear conversion between native canvas units and layout units.
///
/// Native units are one to two orders of magnitude larger than what the
/// layout engines work in; one layout unit is `ratio` native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    ratio: f64,
}

impl Scale {
    /// Create a scale; `ratio` must be positive and finite.
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(self) -> f64 {
        self.ratio
    }

    /// Convert a native size to layout units.
    pub fn to_layout(self, size: Size) -> Size {
        Size::new(size.width() / self.ratio, size.height() / self.ratio)
    }

    /// Convert a layout size back to native units.
    pub fn to_native(self, size: Size) -> Size {
        size.scale(self.ratio)
    }

    /// Convert a layout-space centre to the native top-left position of a
    /// component of `native_size`.
    pub fn to_native_position(self, centre: Point, native_size: Size) -> Point {
        centre.scale(self.ratio).sub_point(native_size.half_extent())
    }
}

/// A sized graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    identity: ComponentIdentity,
    native_size: Size,
    size: Size,
}

impl FlowNode {
    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Returns the size in native canvas units.
    pub fn native_size(&self) -> Size {
        self.native_size
    }

    /// Returns the size in layout units.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Strict simple digraph of one group canvas.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    group_id: String,
    scale: Scale,
    graph: DiGraph<FlowNode, ()>,
    indices: HashMap<ComponentIdentity, NodeIndex>,
}

impl FlowGraph {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Returns the underlying petgraph graph; node indices follow identity order.
    pub fn graph(&self) -> &DiGraph<FlowNode, ()> {
        &self.graph
    }

    pub fn node(&self, identity: &ComponentIdentity) -> Option<&FlowNode> {
        self.indices.get(identity).map(|&index| &self.graph[index])
    }

    /// Iterate over nodes in identity order.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.graph.node_weights()
    }

    /// Iterate over edges as (source, destination) identity pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&ComponentIdentity, &ComponentIdentity)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()].identity,
                &self.graph[edge.target()].identity,
            )
        })
    }

    pub fn contains_edge(&self, source: &ComponentIdentity, destination: &ComponentIdentity) -> bool {
        match (self.indices.get(source), self.indices.get(destination)) {
            (Some(&source), Some(&destination)) => self.graph.contains_edge(source, destination),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Validate the endpoint kinds of every connection in a snapshot.
///
/// # Errors
///
/// Returns [`GraphError::EndpointKind`] for the first connection with an
/// endpoint kind outside the known set.
pub fn raw_connections(snapshot: &FlowSnapshot) -> Result<Vec<RawConnection>, GraphError> {
    snapshot
        .flow()
        .connections()
        .iter()
        .map(|entry| {
            entry.to_raw().map_err(|source| GraphError::EndpointKind {
                connection: entry.id().to_string(),
                source,
            })
        })
        .collect()
}

/// Builds [`FlowGraph`]s at a fixed [`Scale`].
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    scale: Scale,
}

impl GraphBuilder {
    pub fn new(scale: Scale) -> Self {
        Self { scale }
    }

    /// Build the graph of a catalog and the connections drawn between its
    /// components.
    ///
    /// Both endpoints of every connection are resolved against the catalog's
    /// group. Self-loops are skipped and parallel connections collapse into a
    /// single edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when an endpoint cannot be resolved or resolves
    /// to a component missing from the catalog.
    pub fn build(
        &self,
        catalog: &Catalog,
        connections: &[RawConnection],
    ) -> Result<FlowGraph, GraphError> {
        let mut graph = DiGraph::with_capacity(catalog.len(), connections.len());
        let mut indices = HashMap::with_capacity(catalog.len());

        for (identity, native_size) in catalog.iter() {
            let index = graph.add_node(FlowNode {
                identity: identity.clone(),
                native_size,
                size: self.scale.to_layout(native_size),
            });
            indices.insert(identity.clone(), index);
        }

        let resolver = Resolver::new(catalog.group_id());
        let mut edges = BTreeSet::new();

        for connection in connections {
            let source = resolve_endpoint(&resolver, catalog, connection, connection.source())?;
            let destination =
                resolve_endpoint(&resolver, catalog, connection, connection.destination())?;

            if source == destination {
                trace!(connection = connection.id(); "Skipping self-loop");
                continue;
            }
            if !edges.insert((source, destination)) {
                trace!(connection = connection.id(); "Coalescing parallel connection");
            }
        }

        for (source, destination) in &edges {
            graph.add_edge(indices[source], indices[destination], ());
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            connections = connections.len();
            "Graph built"
        );

        Ok(FlowGraph {
            group_id: catalog.group_id().to_string(),
            scale: self.scale,
            graph,
            indices,
        })
    }
}

fn resolve_endpoint(
    resolver: &Resolver<'_>,
    catalog: &Catalog,
    connection: &RawConnection,
    endpoint: &ConnectionEndpointRaw,
) -> Result<ComponentIdentity, GraphError> {
    let identity = resolver
        .resolve(endpoint)
        .map_err(|source| GraphError::Resolve {
            connection: connection.id().to_string(),
            source,
        })?;

    if !catalog.contains(&identity) {
        return Err(GraphError::UnknownEndpoint {
            connection: connection.id().to_string(),
            identity,
            group_id: catalog.group_id().to_string(),
        });
    }
    Ok(identity)
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use float_cmp::approx_eq;
    use flowtidy_core::identity::ComponentKind;
    use proptest::prelude::*;

    use super::*;

    const PROCESSORS: usize = 6;

    // ===================
    // Strategies
    // ===================

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1.0f64..2000.0, 1.0f64..2000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    fn ratio_strategy() -> impl Strategy<Value = f64> {
        0.5f64..200.0
    }

    /// Endpoint `PROCESSORS` stands for a port nested in child group `pg`.
    fn connections_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0..=PROCESSORS, 0..=PROCESSORS), 0..40)
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn scale_round_trip(size in size_strategy(), ratio in ratio_strategy()) {
            check_scale_round_trip(size, ratio)?;
        }

        #[test]
        fn graph_is_strict_and_simple(pairs in connections_strategy()) {
            check_graph_is_strict_and_simple(&pairs)?;
        }
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Converting a native size to layout units and back recovers it.
    fn check_scale_round_trip(size: Size, ratio: f64) -> Result<(), TestCaseError> {
        let scale = Scale::new(ratio);
        let back = scale.to_native(scale.to_layout(size));

        prop_assert!(approx_eq!(f64, back.width(), size.width(), ulps = 4));
        prop_assert!(approx_eq!(f64, back.height(), size.height(), ulps = 4));
        Ok(())
    }

    /// One edge per distinct resolved pair, none for self-loops, and every
    /// endpoint a catalog member.
    fn check_graph_is_strict_and_simple(pairs: &[(usize, usize)]) -> Result<(), TestCaseError> {
        let endpoint = |index: usize| -> (String, &'static str, &'static str) {
            if index == PROCESSORS {
                ("pg-port".to_string(), "pg", "INPUT_PORT")
            } else {
                (format!("p{index}"), "root", "PROCESSOR")
            }
        };
        let identity = |index: usize| {
            if index == PROCESSORS {
                ComponentIdentity::new("pg", ComponentKind::ProcessGroup)
            } else {
                ComponentIdentity::new(format!("p{index}"), ComponentKind::Processor)
            }
        };

        let mut builder = FlowSnapshot::builder("root").process_group("pg");
        for index in 0..PROCESSORS {
            builder = builder.processor(&format!("p{index}"));
        }
        for (n, &(source, destination)) in pairs.iter().enumerate() {
            let (source_id, source_group, source_kind) = endpoint(source);
            let (destination_id, destination_group, destination_kind) = endpoint(destination);
            builder = builder.connection(
                &format!("c{n}"),
                (source_id.as_str(), source_group, source_kind),
                (destination_id.as_str(), destination_group, destination_kind),
            );
        }
        let snapshot = builder.build();

        let catalog = Catalog::from_snapshot(&snapshot).unwrap();
        let connections = raw_connections(&snapshot).unwrap();
        let graph = GraphBuilder::new(Scale::new(40.0))
            .build(&catalog, &connections)
            .unwrap();

        let expected: BTreeSet<_> = pairs
            .iter()
            .filter(|(source, destination)| source != destination)
            .map(|&(source, destination)| (identity(source), identity(destination)))
            .collect();

        prop_assert_eq!(graph.node_count(), PROCESSORS + 1);
        prop_assert_eq!(graph.edge_count(), expected.len());
        for (source, destination) in &expected {
            prop_assert!(graph.contains_edge(source, destination));
        }
        for (source, destination) in graph.edges() {
            prop_assert!(source != destination);
            prop_assert!(catalog.contains(source) && catalog.contains(destination));
        }
        Ok(())
    }
}
