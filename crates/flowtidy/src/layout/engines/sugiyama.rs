//! Sugiyama layered layout engine
//!
//! Places components in layers along the direction of the flow using the
//! rust-sugiyama implementation. The crate works on bare edge lists, so
//! components without any connection are placed by this module on a row
//! below the layered part.

use std::{collections::HashMap, panic};

use log::debug;
use petgraph::graph::NodeIndex;
use rust_sugiyama::configure::Config;

use flowtidy_core::geometry::Point;

use crate::{
    graph::FlowGraph,
    layout::{self, LayoutError, Placement},
};

/// The Sugiyama layout engine
pub struct Engine {
    /// Gap between neighbouring components, in layout units
    spacing: f64,
}

impl Engine {
    /// Create a new Sugiyama layout engine
    pub fn new() -> Self {
        Self { spacing: 2.0 }
    }

    /// Set the gap between neighbouring components
    pub fn set_spacing(&mut self, spacing: f64) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Run rust-sugiyama over the edge list, one result per connected part
    fn layer(edges: Vec<(u32, u32)>) -> Result<Vec<Vec<(usize, Point)>>, LayoutError> {
        let layouts = panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: 1.0,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        })
        .map_err(|err| {
            let message = err
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "rust-sugiyama panicked".to_string());
            LayoutError::Engine(message)
        })?;

        Ok(layouts
            .into_iter()
            .map(|(coords, _, _)| {
                coords
                    .into_iter()
                    .map(|(id, (x, y))| (id as usize, Point::new(x as f64, y as f64)))
                    .collect()
            })
            .collect())
    }
}

impl super::super::Engine for Engine {
    fn calculate(&self, graph: &FlowGraph) -> Result<Placement, LayoutError> {
        let inner = graph.graph();

        let edges: Vec<(u32, u32)> = inner
            .edge_indices()
            .filter_map(|edge| inner.edge_endpoints(edge))
            .map(|(source, target)| (source.index() as u32, target.index() as u32))
            .collect();

        // One grid cell fits the largest component plus the gap
        let (cell_width, cell_height) = inner.node_weights().fold((0.0, 0.0), |(w, h), node| {
            (
                f64::max(w, node.size().width()),
                f64::max(h, node.size().height()),
            )
        });
        let pitch = Point::new(cell_width + self.spacing, cell_height + self.spacing);

        debug!(
            nodes = graph.node_count(),
            edges = edges.len();
            "Applying Sugiyama algorithm"
        );

        let mut positions = HashMap::with_capacity(graph.node_count());
        let mut column = 0.0;
        let mut rows: f64 = 0.0;

        let parts = if edges.is_empty() {
            Vec::new()
        } else {
            Self::layer(edges)?
        };

        // Connected parts sit side by side, each normalized to start at (0, 0)
        for part in parts {
            let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
            let mut max_x = f64::MIN;
            for (_, point) in &part {
                min_x = min_x.min(point.x());
                min_y = min_y.min(point.y());
                max_x = max_x.max(point.x());
            }

            for (id, point) in part {
                if id >= inner.node_count() {
                    return Err(LayoutError::Engine(format!(
                        "rust-sugiyama returned unknown vertex {id}"
                    )));
                }
                let index = NodeIndex::new(id);
                let row = point.y() - min_y;
                rows = rows.max(row + 1.0);
                let cell = Point::new(column + point.x() - min_x, row);
                positions.insert(index, Point::new(cell.x() * pitch.x(), cell.y() * pitch.y()));
            }

            column += max_x - min_x + 1.0;
        }

        // Unconnected components go on a row of their own
        let mut slot = 0.0;
        for index in inner.node_indices() {
            if positions.contains_key(&index) {
                continue;
            }
            positions.insert(index, Point::new(slot * pitch.x(), rows * pitch.y()));
            slot += 1.0;
        }

        Ok(layout::keyed(graph, positions))
    }
}
