//! VCFA API interaction module
//!
//! This module provides the plumbing for talking to the VCF Automation control
//! plane: the request transport and the client that carries it.
//!
//! # Module Structure
//!
//! - [`client`] - Client holding the endpoint and an injected transport
//! - [`http`] - Transport trait and its reqwest implementation
//!
//! # Example
//!
//! ```ignore
//! use vcfa_supervisor_ns::vcfa::client::VcfaClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = VcfaClient::new("https://vcfa.example.com", Some(token))?;
//!     let server = client.cci_server();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

pub use client::VcfaClient;
pub use http::{HttpTransport, Transport, TransportError};
