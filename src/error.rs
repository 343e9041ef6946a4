//! Error types
//!
//! Domain errors surfaced by the Supervisor Namespace lifecycle. Every variant
//! carries enough context (resource label, project, name, cause) for the caller
//! to log or display it directly.

use crate::supervisor_namespace::state::SupervisorNamespaceState;
use crate::vcfa::http::TransportError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Human readable label used in every message about this resource
pub const LABEL: &str = "Supervisor Namespace";

/// Lifecycle step an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "creating",
            Self::Read => "reading",
            Self::Update => "updating",
            Self::Delete => "deleting",
            Self::Import => "importing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the Supervisor Namespace lifecycle
#[derive(Debug, Error)]
pub enum Error {
    /// A required local field is missing or invalid. Raised before any network call.
    #[error("invalid {} configuration: {field}: {reason}", LABEL)]
    Validation { field: &'static str, reason: String },

    /// Network or HTTP failure other than "not found".
    #[error("error {operation} {} {name} in Project {project}", LABEL)]
    Transport {
        operation: Operation,
        project: String,
        name: String,
        #[source]
        source: TransportError,
    },

    /// The backend reported the object does not exist.
    #[error("error {operation} {} {name} in Project {project}: not found", LABEL)]
    NotFound {
        operation: Operation,
        project: String,
        name: String,
    },

    /// A local identifier or import key could not be decoded.
    #[error("malformed {} identifier {id:?}: {reason}", LABEL)]
    MalformedIdentifier { id: String, reason: String },

    /// The endpoint URL could not be composed.
    #[error("error building {} URL {url:?}: {reason}", LABEL)]
    UrlConstruction { url: String, reason: String },

    /// The backend accepted a request but returned something unusable.
    #[error("error {operation} {} in Project {project}: {reason}", LABEL)]
    IncompleteResponse {
        operation: Operation,
        project: String,
        reason: String,
    },

    /// The remote object reached the ERROR phase.
    #[error("{} {name} in Project {project} is in an ERROR state", LABEL)]
    BackendErrorState { project: String, name: String },

    /// The bounded wait elapsed while the object was still pending.
    #[error(
        "timeout while waiting for {} {name} in Project {project} to be {target} \
         (waited {timeout:?}, {polls} polls)",
        LABEL
    )]
    WaitTimeout {
        project: String,
        name: String,
        target: &'static str,
        timeout: Duration,
        polls: u32,
    },

    /// The operation was aborted by the cancellation signal.
    #[error("cancelled while waiting for {} {name} in Project {project} to be {target}", LABEL)]
    Cancelled {
        project: String,
        name: String,
        target: &'static str,
    },

    /// The object reached `CREATED` but reading it back failed. `state` holds
    /// its identity so the caller can still record it.
    #[error(
        "{} {} was created in Project {} but could not be read back",
        LABEL,
        .state.name,
        .state.project_name
    )]
    CreatedUnread {
        state: Box<SupervisorNamespaceState>,
        #[source]
        source: Box<Error>,
    },

    /// Updates are rejected: the backend has no modification endpoint.
    #[error("{} updates are not supported (changed: {})", LABEL, .fields.join(", "))]
    UnsupportedOperation { fields: Vec<&'static str> },
}

impl Error {
    /// Whether the backend reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// State of an object that exists remotely even though the operation failed
    pub fn created_state(&self) -> Option<&SupervisorNamespaceState> {
        match self {
            Self::CreatedUnread { state, .. } => Some(state),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a transport failure, splitting out "not found"
    pub(crate) fn from_transport(
        operation: Operation,
        project: &str,
        name: &str,
        source: TransportError,
    ) -> Self {
        if source.is_not_found() {
            return Self::NotFound {
                operation,
                project: project.to_string(),
                name: name.to_string(),
            };
        }
        Self::Transport {
            operation,
            project: project.to_string(),
            name: name.to_string(),
            source,
        }
    }
}

/// Result type for Supervisor Namespace operations
pub type Result<T> = std::result::Result<T, Error>;
