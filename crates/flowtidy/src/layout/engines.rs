//! Layout engine factory module
//!
//! This module selects and configures the placement algorithm named by
//! [`LayoutEngine`]. It uses a builder pattern so callers can tune the shared
//! options before asking for an engine.

mod basic;
mod force;
mod sugiyama;

use crate::{config::LayoutConfig, config::LayoutEngine, layout::Engine};

/// Builder for creating and configuring layout engines.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    engine: LayoutEngine,
    spacing: f64,
    force_iterations: usize,
    seed: u64,
}

impl EngineBuilder {
    /// Create a builder for the given engine with default options
    pub fn new(engine: LayoutEngine) -> Self {
        let defaults = LayoutConfig::default();
        Self {
            engine,
            spacing: defaults.spacing(),
            force_iterations: defaults.iterations(),
            seed: defaults.seed(),
        }
    }

    /// Create a builder from the layout section of the configuration
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.engine())
            .with_spacing(config.spacing())
            .with_force_iterations(config.iterations())
            .with_seed(config.seed())
    }

    /// Set the minimum gap between components, in layout units
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the number of iterations for force-directed layout simulation
    pub fn with_force_iterations(mut self, iterations: usize) -> Self {
        self.force_iterations = iterations;
        self
    }

    /// Set the seed of the force-directed initial jitter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the configured engine
    pub fn build(&self) -> Box<dyn Engine> {
        match self.engine {
            LayoutEngine::Basic => {
                let mut engine = basic::Engine::new();
                engine.set_spacing(self.spacing);
                Box::new(engine)
            }
            LayoutEngine::Force => {
                let mut engine = force::Engine::new();
                engine
                    .set_min_distance(self.spacing)
                    .set_iterations(self.force_iterations)
                    .set_seed(self.seed);
                Box::new(engine)
            }
            LayoutEngine::Sugiyama => {
                let mut engine = sugiyama::Engine::new();
                engine.set_spacing(self.spacing);
                Box::new(engine)
            }
        }
    }
}
