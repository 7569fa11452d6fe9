//! Configuration types for arranging a process group canvas.
//!
//! This module provides configuration structures that control layout,
//! reconciliation, and transport behaviour. All types implement
//! [`serde::Deserialize`] with every field defaulted, so a partial TOML file
//! is always valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Which [`LayoutEngine`] runs and how canvas units scale.
//! - [`ReconcileConfig`] - Conflict retry policy and the overall deadline.
//! - [`ClientConfig`] - Per-request timeout and revision client id.
//!
//! # Example
//!
//! ```
//! # use flowtidy::config::{AppConfig, LayoutEngine};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().engine(), LayoutEngine::Force);
//! assert!(config.validate().is_ok());
//! ```

use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("layout.scale_ratio must be a positive number, got {0}")]
    ScaleRatio(f64),

    #[error("layout.spacing must be a non-negative number, got {0}")]
    Spacing(f64),

    #[error("layout.iterations must be at least 1")]
    Iterations,

    #[error("client.timeout_secs must be at least 1")]
    Timeout,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Reconciliation configuration section.
    #[serde(default)]
    reconcile: ReconcileConfig,

    /// Transport configuration section.
    #[serde(default)]
    client: ClientConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, reconcile: ReconcileConfig, client: ClientConfig) -> Self {
        Self {
            layout,
            reconcile,
            client,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the layout configuration for modification.
    pub fn layout_mut(&mut self) -> &mut LayoutConfig {
        &mut self.layout
    }

    /// Returns the reconciliation configuration.
    pub fn reconcile(&self) -> &ReconcileConfig {
        &self.reconcile
    }

    /// Returns the reconciliation configuration for modification.
    pub fn reconcile_mut(&mut self) -> &mut ReconcileConfig {
        &mut self.reconcile
    }

    /// Returns the transport configuration.
    pub fn client(&self) -> &ClientConfig {
        &self.client
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if !(layout.scale_ratio.is_finite() && layout.scale_ratio > 0.0) {
            return Err(ConfigError::ScaleRatio(layout.scale_ratio));
        }
        if !(layout.spacing.is_finite() && layout.spacing >= 0.0) {
            return Err(ConfigError::Spacing(layout.spacing));
        }
        if layout.iterations == 0 {
            return Err(ConfigError::Iterations);
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        Ok(())
    }
}

/// The placement algorithm handed the built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Force-directed placement, suited to large graphs
    #[default]
    Force,
    /// Layered (Sugiyama) placement
    Sugiyama,
    /// Breadth-first columns
    Basic,
}

impl FromStr for LayoutEngine {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "force" => Ok(Self::Force),
            "sugiyama" => Ok(Self::Sugiyama),
            "basic" => Ok(Self::Basic),
            _ => Err("Unsupported layout engine"),
        }
    }
}

impl From<LayoutEngine> for &'static str {
    fn from(val: LayoutEngine) -> Self {
        match val {
            LayoutEngine::Force => "force",
            LayoutEngine::Sugiyama => "sugiyama",
            LayoutEngine::Basic => "basic",
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

/// Layout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Placement algorithm.
    engine: LayoutEngine,

    /// Native canvas units per layout unit.
    ///
    /// Larger values pack the diagram tighter relative to component sizes,
    /// smaller values spread it out.
    scale_ratio: f64,

    /// Gap between components, in layout units.
    spacing: f64,

    /// Number of force simulation steps.
    iterations: usize,

    /// Seed of the force engine's initial jitter.
    seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            scale_ratio: 40.0,
            spacing: 2.0,
            iterations: 300,
            seed: 0x5eed,
        }
    }
}

impl LayoutConfig {
    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn set_engine(&mut self, engine: LayoutEngine) -> &mut Self {
        self.engine = engine;
        self
    }

    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    pub fn set_scale_ratio(&mut self, ratio: f64) -> &mut Self {
        self.scale_ratio = ratio;
        self
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Extra fetch-patch-submit cycles allowed after a revision conflict.
    conflict_retries: u32,

    /// Overall deadline for the reconciliation pass, in seconds.
    deadline_secs: Option<u64>,
}

impl ReconcileConfig {
    pub fn conflict_retries(&self) -> u32 {
        self.conflict_retries
    }

    pub fn set_conflict_retries(&mut self, retries: u32) -> &mut Self {
        self.conflict_retries = retries;
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout, in seconds.
    timeout_secs: u64,

    /// Client id recorded on revisions this tool submits.
    client_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            client_id: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.layout().engine(), LayoutEngine::Force);
        assert_eq!(config.layout().scale_ratio(), 40.0);
        assert_eq!(config.reconcile().conflict_retries(), 0);
        assert_eq!(config.reconcile().deadline(), None);
        assert_eq!(config.client().timeout(), Duration::from_secs(30));
        assert_eq!(config.client().client_id(), None);
    }

    #[test]
    fn test_layout_engine_from_str() {
        assert_eq!("force".parse::<LayoutEngine>(), Ok(LayoutEngine::Force));
        assert_eq!("sugiyama".parse::<LayoutEngine>(), Ok(LayoutEngine::Sugiyama));
        assert_eq!("basic".parse::<LayoutEngine>(), Ok(LayoutEngine::Basic));
        assert!("neato".parse::<LayoutEngine>().is_err());
        assert_eq!(LayoutEngine::Sugiyama.to_string(), "sugiyama");
    }

    #[test]
    fn test_validate_rejects_bad_scale_ratio() {
        let mut config = AppConfig::default();
        config.layout_mut().set_scale_ratio(0.0);
        assert_eq!(config.validate(), Err(ConfigError::ScaleRatio(0.0)));

        config.layout_mut().set_scale_ratio(f64::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::ScaleRatio(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.layout_mut().set_engine(LayoutEngine::Basic);
        config.reconcile_mut().set_conflict_retries(2);

        assert_eq!(config.layout().engine(), LayoutEngine::Basic);
        assert_eq!(config.reconcile().conflict_retries(), 2);
    }
}
