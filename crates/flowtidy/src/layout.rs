//! Layout invocation.
//!
//! Placement algorithms sit behind the [`Engine`] trait so the concrete
//! algorithm is swappable and mockable. [`invoke`] wraps a call with the
//! checks every engine result has to pass, then anchors the result so the
//! top-left corner of the diagram's bounding box is at the origin.

mod engines;

pub use engines::EngineBuilder;

use std::collections::HashMap;

use log::debug;
use petgraph::graph::NodeIndex;
use thiserror::Error;

use flowtidy_core::{geometry::Point, identity::ComponentIdentity};

use crate::graph::FlowGraph;

/// Node centres in layout units, keyed by identity.
pub type Placement = HashMap<ComponentIdentity, Point>;

/// Errors raised by layout invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("process group `{0}` has no components to lay out")]
    EmptyGraph(String),

    #[error("layout engine returned no position for {0}")]
    MissingPosition(ComponentIdentity),

    #[error("layout engine returned a position for unknown node {0}")]
    UnexpectedPosition(ComponentIdentity),

    #[error("layout engine returned a non-finite position for {0}")]
    NonFinite(ComponentIdentity),

    #[error("layout engine failed: {0}")]
    Engine(String),
}

/// A placement algorithm.
pub trait Engine {
    /// Place every node of `graph`, returning node centres in layout units.
    fn calculate(&self, graph: &FlowGraph) -> Result<Placement, LayoutError>;
}

/// Run `engine` on `graph` and check its result.
///
/// # Errors
///
/// Returns [`LayoutError`] for an empty graph, an engine failure, or a
/// result that does not hold exactly one finite point per node.
pub fn invoke(engine: &dyn Engine, graph: &FlowGraph) -> Result<Placement, LayoutError> {
    if graph.is_empty() {
        return Err(LayoutError::EmptyGraph(graph.group_id().to_string()));
    }

    let mut placement = engine.calculate(graph)?;

    for node in graph.nodes() {
        match placement.get(node.identity()) {
            None => return Err(LayoutError::MissingPosition(node.identity().clone())),
            Some(point) if !point.is_finite() => {
                return Err(LayoutError::NonFinite(node.identity().clone()));
            }
            Some(_) => {}
        }
    }
    if placement.len() != graph.node_count() {
        if let Some(extra) = placement.keys().find(|identity| graph.node(identity).is_none()) {
            return Err(LayoutError::UnexpectedPosition(extra.clone()));
        }
    }

    anchor_at_origin(&mut placement, graph);
    debug!(nodes = placement.len(); "Layout calculated");
    Ok(placement)
}

/// Translate `placement` so the bounding box of all nodes starts at (0, 0).
fn anchor_at_origin(placement: &mut Placement, graph: &FlowGraph) {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;

    for node in graph.nodes() {
        if let Some(centre) = placement.get(node.identity()) {
            let corner = centre.sub_point(node.size().half_extent());
            min_x = min_x.min(corner.x());
            min_y = min_y.min(corner.y());
        }
    }

    let offset = Point::new(min_x, min_y);
    for centre in placement.values_mut() {
        *centre = centre.sub_point(offset);
    }
}

/// Key index-addressed positions by node identity.
fn keyed(graph: &FlowGraph, positions: HashMap<NodeIndex, Point>) -> Placement {
    positions
        .into_iter()
        .map(|(index, point)| (graph.graph()[index].identity().clone(), point))
        .collect()
}

#[cfg(test)]
mod tests {
    use flowtidy_core::{identity::ComponentKind, snapshot::FlowSnapshot};

    use super::*;
    use crate::{
        catalog::Catalog,
        graph::{GraphBuilder, Scale, raw_connections},
    };

    struct Fixed(Placement);

    impl Engine for Fixed {
        fn calculate(&self, _graph: &FlowGraph) -> Result<Placement, LayoutError> {
            Ok(self.0.clone())
        }
    }

    fn graph(snapshot: &FlowSnapshot) -> FlowGraph {
        let catalog = Catalog::from_snapshot(snapshot).unwrap();
        let connections = raw_connections(snapshot).unwrap();
        GraphBuilder::new(Scale::new(10.0))
            .build(&catalog, &connections)
            .unwrap()
    }

    fn funnel(id: &str) -> ComponentIdentity {
        ComponentIdentity::new(id, ComponentKind::Funnel)
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        let graph = graph(&FlowSnapshot::builder("empty").build());
        let engine = Fixed(Placement::new());

        assert_eq!(
            invoke(&engine, &graph),
            Err(LayoutError::EmptyGraph("empty".to_string()))
        );
    }

    #[test]
    fn test_missing_position_is_rejected() {
        let graph = graph(&FlowSnapshot::builder("g").funnel("a").funnel("b").build());
        let engine = Fixed(Placement::from([(funnel("a"), Point::new(0.0, 0.0))]));

        assert_eq!(
            invoke(&engine, &graph),
            Err(LayoutError::MissingPosition(funnel("b")))
        );
    }

    #[test]
    fn test_extra_and_non_finite_positions_are_rejected() {
        let graph = graph(&FlowSnapshot::builder("g").funnel("a").build());

        let extra = Fixed(Placement::from([
            (funnel("a"), Point::new(0.0, 0.0)),
            (funnel("z"), Point::new(1.0, 1.0)),
        ]));
        assert_eq!(
            invoke(&extra, &graph),
            Err(LayoutError::UnexpectedPosition(funnel("z")))
        );

        let nan = Fixed(Placement::from([(funnel("a"), Point::new(f64::NAN, 0.0))]));
        assert_eq!(
            invoke(&nan, &graph),
            Err(LayoutError::NonFinite(funnel("a")))
        );
    }

    #[test]
    fn test_result_is_anchored_at_origin() {
        // Funnels are 50 x 50 native, 5 x 5 layout units at ratio 10.
        let graph = graph(&FlowSnapshot::builder("g").funnel("a").funnel("b").build());
        let engine = Fixed(Placement::from([
            (funnel("a"), Point::new(-20.0, 4.0)),
            (funnel("b"), Point::new(10.0, 30.0)),
        ]));

        let placement = invoke(&engine, &graph).unwrap();

        assert_eq!(placement[&funnel("a")], Point::new(2.5, 2.5));
        assert_eq!(placement[&funnel("b")], Point::new(32.5, 28.5));
    }
}
