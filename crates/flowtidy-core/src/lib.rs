//! Flowtidy Core Types and Definitions
//!
//! This crate provides the vocabulary shared by every Flowtidy crate. It includes:
//!
//! - **Identity**: Component kinds and composite identities ([`identity`] module)
//! - **Geometry**: Points and sizes in canvas units ([`geometry`] module)
//! - **Revision**: The optimistic concurrency token ([`revision::Revision`])
//! - **Snapshot**: The serde model of a process group flow ([`snapshot`] module)
//! - **Service**: The remote flow service capability ([`service::FlowService`])

pub mod geometry;
pub mod identity;
pub mod revision;
pub mod service;
pub mod snapshot;
