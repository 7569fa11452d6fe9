//! Error types for flowtidy runs.
//!
//! [`FlowtidyError`] covers every condition that aborts a run. Failures of
//! single nodes during write-back are not errors at this level; they are
//! recorded in the [`ReconcileReport`](crate::reconcile::ReconcileReport).

use thiserror::Error;

use flowtidy_core::service::ServiceError;

use crate::{
    catalog::CatalogError, config::ConfigError, graph::GraphError, layout::LayoutError,
};

/// The main error type for flowtidy operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowtidyError {
    #[error("connectivity check failed: {0}")]
    Connectivity(#[source] ServiceError),

    #[error("could not fetch the flow of process group `{group_id}`: {source}")]
    Snapshot {
        group_id: String,
        source: ServiceError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}
