//! Lifecycle management for VCF Automation Supervisor Namespaces.
//!
//! - [`vcfa`] - Control plane client and HTTP transport
//! - [`supervisor_namespace`] - The resource: CRUD, waiting, projection
//! - [`config`] - Persistent settings and their environment overrides
//! - [`error`] - Error taxonomy

pub mod config;
pub mod error;
pub mod supervisor_namespace;
pub mod vcfa;

pub use error::{Error, Operation, Result};
