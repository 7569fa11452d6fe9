//! Flowtidy - automatic canvas layout for NiFi process groups.
//!
//! A run reads one snapshot of a process group and works through a fixed
//! pipeline:
//!
//! 1. [`catalog`] sizes every component drawn on the canvas.
//! 2. [`resolver`] maps each connection endpoint to the node it is drawn at.
//! 3. [`graph`] builds a strict simple digraph in layout units.
//! 4. [`layout`] places the nodes with the configured engine.
//! 5. [`reconcile`] writes the native positions back, one component at a time.
//!
//! The remote service is reached only through the
//! [`FlowService`](flowtidy_core::service::FlowService) trait, so the whole
//! pipeline runs against an in-memory fake as easily as against NiFi.

pub mod catalog;
pub mod config;
pub mod graph;
pub mod layout;
pub mod plan;
pub mod reconcile;
pub mod resolver;

mod error;

pub use flowtidy_core::{geometry, identity, revision, service, snapshot};

pub use error::FlowtidyError;

use log::{debug, info};

use flowtidy_core::{service::FlowService, snapshot::FlowSnapshot};

use catalog::Catalog;
use config::AppConfig;
use graph::{GraphBuilder, Scale};
use layout::EngineBuilder;
use plan::LayoutPlan;
use reconcile::{CancelFlag, ReconcileOptions, ReconcileReport, Reconciler};

/// Entry point for arranging process groups.
///
/// Planning is pure: [`Arranger::plan`] turns a snapshot into a
/// [`LayoutPlan`] without touching the service. [`Arranger::apply`] writes a
/// plan back and [`Arranger::arrange`] does the whole run.
///
/// # Examples
///
/// ```
/// use flowtidy::{Arranger, config::AppConfig, snapshot::FlowSnapshot};
///
/// let snapshot = FlowSnapshot::builder("root")
///     .processor("fetch")
///     .processor("store")
///     .connection("c1", ("fetch", "root", "PROCESSOR"), ("store", "root", "PROCESSOR"))
///     .build();
///
/// let plan = Arranger::new(AppConfig::default())
///     .plan(&snapshot)
///     .expect("Failed to plan");
///
/// assert_eq!(plan.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Arranger {
    config: AppConfig,
}

impl Arranger {
    /// Create a new arranger with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Compute native positions for every component of `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowtidyError`] for an invalid configuration, a component
    /// that cannot be sized, a connection that cannot be resolved, or a
    /// layout failure.
    pub fn plan(&self, snapshot: &FlowSnapshot) -> Result<LayoutPlan, FlowtidyError> {
        self.config.validate()?;
        let layout_config = self.config.layout();

        info!(group_id = snapshot.group_id(); "Cataloguing components");
        let catalog = Catalog::from_snapshot(snapshot)?;
        let connections = graph::raw_connections(snapshot)?;

        let graph = GraphBuilder::new(Scale::new(layout_config.scale_ratio()))
            .build(&catalog, &connections)?;

        info!(
            engine:% = layout_config.engine(),
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Calculating layout"
        );
        let engine = EngineBuilder::from_config(layout_config).build();
        let placement = layout::invoke(engine.as_ref(), &graph)?;

        let plan = LayoutPlan::from_placement(&graph, &placement);
        debug!(positions = plan.len(); "Layout plan ready");
        Ok(plan)
    }

    /// Check connectivity, fetch the snapshot of `group_id` and plan it.
    ///
    /// # Errors
    ///
    /// Returns [`FlowtidyError::Connectivity`] or [`FlowtidyError::Snapshot`]
    /// when the service cannot be used, otherwise as [`Arranger::plan`].
    pub fn fetch_plan<S: FlowService + ?Sized>(
        &self,
        service: &S,
        group_id: &str,
    ) -> Result<LayoutPlan, FlowtidyError> {
        service
            .test_connectivity()
            .map_err(FlowtidyError::Connectivity)?;
        debug!("Service is reachable");

        let snapshot =
            service
                .flow_snapshot(group_id)
                .map_err(|source| FlowtidyError::Snapshot {
                    group_id: group_id.to_string(),
                    source,
                })?;

        self.plan(&snapshot)
    }

    /// Write `plan` back through `service`.
    ///
    /// Never fails as a whole; per-node failures are in the report.
    pub fn apply<S: FlowService + ?Sized>(
        &self,
        service: &S,
        plan: &LayoutPlan,
        cancel: &CancelFlag,
    ) -> ReconcileReport {
        info!(group_id = plan.group_id(), nodes = plan.len(); "Writing positions back");
        Reconciler::new(service, ReconcileOptions::from_config(&self.config)).reconcile(plan, cancel)
    }

    /// Arrange the canvas of `group_id` end to end.
    ///
    /// # Errors
    ///
    /// As [`Arranger::fetch_plan`].
    pub fn arrange<S: FlowService + ?Sized>(
        &self,
        service: &S,
        group_id: &str,
        cancel: &CancelFlag,
    ) -> Result<ReconcileReport, FlowtidyError> {
        let plan = self.fetch_plan(service, group_id)?;
        Ok(self.apply(service, &plan, cancel))
    }
}
