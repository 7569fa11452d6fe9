//! Basic layered layout engine
//!
//! This module provides a simple, deterministic placement: components are
//! assigned to columns by breadth-first distance from the flow's sources and
//! stacked top to bottom inside each column.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use flowtidy_core::geometry::Point;

use crate::{
    graph::{FlowGraph, FlowNode},
    layout::{self, LayoutError, Placement},
};

/// Basic layout engine
#[derive(Default)]
pub struct Engine {
    spacing: f64,
}

impl Engine {
    /// Create a new basic layout engine
    pub fn new() -> Self {
        Self { spacing: 2.0 }
    }

    /// Set the gap between columns and between stacked components
    pub fn set_spacing(&mut self, spacing: f64) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Assign every node to a layer
    ///
    /// Layers are found by BFS from the nodes without incoming edges. Nodes
    /// not reached that way (those on a cycle with no entry) start a new
    /// search at layer zero, in index order.
    fn assign_layers(graph: &DiGraph<FlowNode, ()>) -> Vec<Vec<NodeIndex>> {
        let mut layers: Vec<Vec<NodeIndex>> = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        let roots = graph.node_indices().filter(|&index| {
            graph
                .neighbors_directed(index, Direction::Incoming)
                .next()
                .is_none()
        });
        queue.extend(roots.map(|index| (index, 0)));

        let mut remaining = graph.node_indices();
        loop {
            while let Some((index, layer)) = queue.pop_front() {
                if !visited.insert(index) {
                    continue;
                }
                while layers.len() <= layer {
                    layers.push(Vec::new());
                }
                layers[layer].push(index);

                for child in graph.neighbors(index) {
                    if !visited.contains(&child) {
                        queue.push_back((child, layer + 1));
                    }
                }
            }

            match remaining.find(|index| !visited.contains(index)) {
                Some(index) => queue.push_back((index, 0)),
                None => break,
            }
        }

        layers
    }

    /// Calculate centre positions from the layer assignment
    fn positions(
        &self,
        graph: &DiGraph<FlowNode, ()>,
        layers: &[Vec<NodeIndex>],
    ) -> HashMap<NodeIndex, Point> {
        let mut positions = HashMap::with_capacity(graph.node_count());
        let mut x_pos = 0.0;

        for layer in layers {
            let width = layer
                .iter()
                .map(|&index| graph[index].size().width())
                .fold(0.0, f64::max);
            let x = x_pos + width / 2.0;

            let mut y_pos = 0.0;
            for (j, &index) in layer.iter().enumerate() {
                let height = graph[index].size().height();
                if j > 0 {
                    y_pos += self.spacing;
                }
                positions.insert(index, Point::new(x, y_pos + height / 2.0));
                y_pos += height;
            }

            x_pos += width + self.spacing;
        }

        positions
    }
}

impl super::super::Engine for Engine {
    fn calculate(&self, graph: &FlowGraph) -> Result<Placement, LayoutError> {
        let layers = Self::assign_layers(graph.graph());
        debug!(layers = layers.len(); "Assigned basic layout layers");

        let positions = self.positions(graph.graph(), &layers);
        Ok(layout::keyed(graph, positions))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use flowtidy_core::{
        identity::{ComponentIdentity, ComponentKind},
        snapshot::FlowSnapshot,
    };

    use super::*;
    use crate::{
        catalog::Catalog,
        graph::{GraphBuilder, Scale, raw_connections},
        layout::Engine as _,
    };

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
    fn test_chain_is_laid_out_left_to_right() {
        // Funnels are 5 x 5 layout units at ratio 10.
        let graph = graph(
            &FlowSnapshot::builder("g")
                .funnel("a")
                .funnel("b")
                .funnel("c")
                .connection("c1", ("a", "g", "FUNNEL"), ("b", "g", "FUNNEL"))
                .connection("c2", ("b", "g", "FUNNEL"), ("c", "g", "FUNNEL"))
                .build(),
        );

        let mut engine = Engine::new();
        engine.set_spacing(1.0);
        let placement = engine.calculate(&graph).unwrap();

        assert_approx_eq!(f64, placement[&funnel("a")].x(), 2.5);
        assert_approx_eq!(f64, placement[&funnel("b")].x(), 8.5);
        assert_approx_eq!(f64, placement[&funnel("c")].x(), 14.5);
        assert_approx_eq!(f64, placement[&funnel("c")].y(), 2.5);
    }

    #[test]
    fn test_siblings_are_stacked() {
        let graph = graph(
            &FlowSnapshot::builder("g")
                .funnel("a")
                .funnel("b")
                .build(),
        );

        let mut engine = Engine::new();
        engine.set_spacing(1.0);
        let placement = engine.calculate(&graph).unwrap();

        let a = placement[&funnel("a")];
        let b = placement[&funnel("b")];
        assert_approx_eq!(f64, a.x(), b.x());
        assert_approx_eq!(f64, (a.y() - b.y()).abs(), 6.0);
    }

    #[test]
    fn test_cycle_without_entry_is_placed() {
        let graph = graph(
            &FlowSnapshot::builder("g")
                .funnel("a")
                .funnel("b")
                .connection("c1", ("a", "g", "FUNNEL"), ("b", "g", "FUNNEL"))
                .connection("c2", ("b", "g", "FUNNEL"), ("a", "g", "FUNNEL"))
                .build(),
        );

        let placement = Engine::new().calculate(&graph).unwrap();

        assert_eq!(placement.len(), 2);
        assert_ne!(placement[&funnel("a")], placement[&funnel("b")]);
    }
}
