//! Supervisor Namespace resource
//!
//! A Supervisor Namespace lives in a Project and is provisioned asynchronously
//! by the control plane. Creating one is a single POST, but the object only
//! becomes usable once its phase reaches `CREATED`; deleting it is a DELETE
//! followed by waiting until reads return "not found".
//!
//! # Architecture
//!
//! - [`id`] - Local state id and import key encoding
//! - [`endpoint`] - Collection and instance URLs
//! - [`model`] - Wire representation (spec, status, metadata)
//! - [`api`] - One-request CRUD functions
//! - [`wait`] - Phase polling with timeout and cancellation
//! - [`state`] - Local declared configuration and its attribute metadata
//! - [`projector`] - Remote object to local state
//! - [`resource`] - Create / read / update / delete / import orchestration
//!
//! # Example
//!
//! ```ignore
//! use vcfa_supervisor_ns::supervisor_namespace::SupervisorNamespaceResource;
//!
//! async fn provision(client: VcfaClient, config: SupervisorNamespaceState) -> Result<()> {
//!     let resource = SupervisorNamespaceResource::new(client);
//!     let state = resource.create(&config, &CancellationToken::new()).await?;
//!     println!("{} is {}", state.name, state.phase);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod endpoint;
pub mod id;
pub mod model;
pub mod projector;
pub mod resource;
pub mod state;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use model::SupervisorNamespace;
pub use resource::{SupervisorNamespaceResource, Timeouts};
pub use state::SupervisorNamespaceState;
pub use wait::{Clock, ManualClock, TokioClock, WaitPolicy};
