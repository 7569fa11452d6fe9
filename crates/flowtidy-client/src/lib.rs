//! Blocking NiFi REST transport.
//!
//! [`NifiClient`] implements [`FlowService`](flowtidy_core::service::FlowService)
//! on top of the NiFi REST API:
//!
//! | Operation | Request |
//! |---|---|
//! | connectivity | `GET {root}/flow/about` |
//! | snapshot | `GET {root}/flow/process-groups/{id}` |
//! | fetch component | `GET {root}/{resource}/{id}` |
//! | update component | `PUT {root}/{resource}/{id}` |
//!
//! where `{resource}` is picked per [`ComponentKind`](flowtidy_core::identity::ComponentKind)
//! by [`resource`].

mod client;
mod error;

pub use client::{NifiClient, NifiClientBuilder, resource};
pub use error::ClientError;
