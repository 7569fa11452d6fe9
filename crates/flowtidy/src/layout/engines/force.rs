//! Force-directed layout engine
//!
//! This module implements a force-directed placement for process group
//! canvases. It runs a physics simulation in which every pair of components
//! repels, every connection acts as a spring, and a weak pull towards the
//! centroid keeps disconnected parts of the flow together.

use std::collections::HashMap;

use log::debug;
use petgraph::visit::EdgeRef;
use rand::{Rng, SeedableRng, rngs::StdRng};

use flowtidy_core::geometry::{Point, Size};

use crate::{
    graph::{FlowGraph, FlowNode},
    layout::{self, LayoutError, Placement},
};

/// Force layout engine
///
/// The simulation cools linearly: the largest step a component may take
/// shrinks to zero over the configured number of iterations, so the result
/// settles. The initial jitter is seeded, which makes the layout a pure
/// function of the graph and the configuration.
pub struct Engine {
    // Simulation parameters
    iterations: usize,
    spring_constant: f64,
    repulsion_constant: f64,
    gravity_constant: f64,
    damping_factor: f64,
    max_step: f64,
    // Gap kept between component borders
    min_distance: f64,
    seed: u64,
}

impl Engine {
    /// Create a new force layout engine
    pub fn new() -> Self {
        Self {
            iterations: 300,
            spring_constant: 0.1,
            repulsion_constant: 8.0,
            gravity_constant: 0.05,
            damping_factor: 0.85,
            max_step: 4.0,
            min_distance: 2.0,
            seed: 0,
        }
    }

    /// Set the number of iterations for the force simulation
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the minimum distance between component borders
    pub fn set_min_distance(&mut self, distance: f64) -> &mut Self {
        self.min_distance = distance;
        self
    }

    /// Set the seed of the initial jitter
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Place components on a jittered grid
    fn initialize_positions(&self, sizes: &[Size]) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let grid_size = (sizes.len() as f64).sqrt().ceil().max(1.0) as usize;
        let largest = sizes
            .iter()
            .map(|size| size.width().max(size.height()))
            .fold(0.0, f64::max);
        let cell_size = largest + self.min_distance;

        (0..sizes.len())
            .map(|i| {
                let row = i / grid_size;
                let col = i % grid_size;
                let base = Point::new(col as f64 * cell_size, row as f64 * cell_size);

                // Avoid perfect alignment, which cancels repulsion symmetrically
                let jitter = Point::new(
                    rng.random_range(-0.5..0.5) * cell_size,
                    rng.random_range(-0.5..0.5) * cell_size,
                );
                base.add_point(jitter)
            })
            .collect()
    }

    /// Run the force-directed simulation
    fn run_force_simulation(&self, graph: &FlowGraph) -> Vec<Point> {
        let inner = graph.graph();
        let sizes: Vec<Size> = inner.node_weights().map(FlowNode::size).collect();
        let count = sizes.len();

        let mut positions = self.initialize_positions(&sizes);
        let mut velocities = vec![Point::default(); count];

        for step in 0..self.iterations {
            let mut forces = vec![Point::default(); count];

            // Repulsive forces between all components
            for i in 0..count {
                for j in 0..count {
                    if i == j {
                        continue;
                    }

                    let trans = positions[i].sub_point(positions[j]);

                    // Distance at which two components start to overlap, plus the gap
                    let min_dist = (sizes[i].width()
                        + sizes[j].width()
                        + sizes[i].height()
                        + sizes[j].height())
                        / 4.0
                        + self.min_distance;

                    let distance = trans.hypot().max(0.01);

                    // Stronger repulsion when components are too close
                    let force_factor = if distance < min_dist {
                        self.repulsion_constant * (min_dist / distance).powi(2)
                    } else {
                        self.repulsion_constant / distance
                    };

                    forces[i] = forces[i].add_point(trans.scale(force_factor / distance));
                }
            }

            // Spring forces between connected components
            for edge in inner.edge_references() {
                let source = edge.source().index();
                let target = edge.target().index();

                let pull = positions[source]
                    .sub_point(positions[target])
                    .scale(self.spring_constant);

                forces[source] = forces[source].sub_point(pull);
                forces[target] = forces[target].add_point(pull);
            }

            // Gravity towards the centroid
            let centroid = positions
                .iter()
                .fold(Point::default(), |sum, p| sum.add_point(*p))
                .scale(1.0 / count as f64);
            for (force, position) in forces.iter_mut().zip(&positions) {
                *force = force.sub_point(position.sub_point(centroid).scale(self.gravity_constant));
            }

            // Update velocities and positions, capped by the current temperature
            let temperature = self.max_step * (1.0 - step as f64 / self.iterations as f64);
            for i in 0..count {
                let mut velocity = velocities[i].add_point(forces[i]).scale(self.damping_factor);
                let speed = velocity.hypot();
                if speed > temperature {
                    velocity = velocity.scale(temperature / speed);
                }
                velocities[i] = velocity;
                positions[i] = positions[i].add_point(velocity);
            }
        }

        positions
    }
}

impl super::super::Engine for Engine {
    fn calculate(&self, graph: &FlowGraph) -> Result<Placement, LayoutError> {
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            iterations = self.iterations;
            "Running force simulation"
        );

        let positions: HashMap<_, _> = graph
            .graph()
            .node_indices()
            .zip(self.run_force_simulation(graph))
            .collect();

        Ok(layout::keyed(graph, positions))
    }
}
