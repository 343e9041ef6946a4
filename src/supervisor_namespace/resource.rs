//! Supervisor Namespace lifecycle
//!
//! Ties the CRUD requests, the waits and the projection together into the
//! create / read / update / delete / import operations on the local state.

use super::api;
use super::id;
use super::model::SupervisorNamespace;
use super::projector;
use super::state::SupervisorNamespaceState;
use super::wait::{self, Clock, TokioClock, WaitPolicy};
use crate::error::{Error, Operation, Result, LABEL};
use crate::vcfa::client::VcfaClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Bounds for the create and delete waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Falls back to `delete` when unset
    pub create: Option<Duration>,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: None,
            delete: wait::DEFAULT_TIMEOUT,
        }
    }
}

impl Timeouts {
    pub fn create(&self) -> Duration {
        self.create.unwrap_or(self.delete)
    }
}

/// Lifecycle manager for Supervisor Namespaces
#[derive(Clone)]
pub struct SupervisorNamespaceResource {
    client: VcfaClient,
    clock: Arc<dyn Clock>,
    policy: WaitPolicy,
    timeouts: Timeouts,
}

impl SupervisorNamespaceResource {
    pub fn new(client: VcfaClient) -> Self {
        Self {
            client,
            clock: Arc::new(TokioClock),
            policy: WaitPolicy::default(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Polling cadence; the timeout part is replaced per wait from [`Timeouts`]
    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn client(&self) -> &VcfaClient {
        &self.client
    }

    /// Create the namespace declared in `config` and wait until it is `CREATED`.
    ///
    /// On a wait failure the remote object is left in place; the error names
    /// it so it can be imported or cleaned up. If only the final read fails,
    /// [`Error::CreatedUnread`] carries the state with its identity.
    pub async fn create(
        &self,
        config: &SupervisorNamespaceState,
        cancel: &CancellationToken,
    ) -> Result<SupervisorNamespaceState> {
        config.validate()?;

        let project = config.project_name.as_str();
        let span = tracing::info_span!(
            "create",
            operation_id = %Uuid::new_v4(),
            project,
            name_prefix = %config.name_prefix
        );

        async move {
            let policy = self.policy.with_timeout(self.timeouts.create());
            policy.deadline(self.clock.now())?;

            let object = SupervisorNamespace::new(project, &config.name_prefix, config.to_spec());
            let submitted = cancellable(
                cancel,
                project,
                &config.name_prefix,
                "created",
                api::create(&self.client, project, &object),
            )
            .await?;
            let name = submitted.name().to_string();
            tracing::info!("{} {} submitted in Project {}", LABEL, name, project);

            let created = wait::wait_for_create(
                &self.client,
                self.clock.as_ref(),
                &policy,
                cancel,
                project,
                &name,
            )
            .await?;
            tracing::info!("{} {} created in Project {}", LABEL, name, project);

            let mut state = projector::project(project, &name, &created)?;
            state.name_prefix = config.name_prefix.clone();

            match cancellable(cancel, project, &name, "read", self.refresh(project, &name)).await {
                Ok(mut refreshed) => {
                    refreshed.name_prefix = config.name_prefix.clone();
                    Ok(refreshed)
                }
                Err(source) => {
                    tracing::warn!("{} {} created but reading it back failed: {}", LABEL, name, source);
                    Err(Error::CreatedUnread {
                        state: Box::new(state),
                        source: Box::new(source),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Refresh every field of `state` from the backend
    pub async fn read(
        &self,
        state: &SupervisorNamespaceState,
        cancel: &CancellationToken,
    ) -> Result<SupervisorNamespaceState> {
        let (project, name) = self.identity(state)?;
        let mut refreshed = cancellable(cancel, &project, &name, "read", self.refresh(&project, &name))
            .instrument(tracing::debug_span!("read", project = %project, name = %name))
            .await?;
        if refreshed.name_prefix.is_empty() {
            refreshed.name_prefix = state.name_prefix.clone();
        }
        Ok(refreshed)
    }

    /// Always fails: the backend cannot modify a Supervisor Namespace.
    /// `prior` is left untouched and no request is made.
    pub fn update(
        &self,
        prior: &SupervisorNamespaceState,
        planned: &SupervisorNamespaceState,
    ) -> Result<SupervisorNamespaceState> {
        api::update(prior, planned)?;
        Ok(prior.clone())
    }

    /// Delete the namespace and wait until it is gone. The returned state has
    /// its identity cleared.
    pub async fn delete(
        &self,
        state: &SupervisorNamespaceState,
        cancel: &CancellationToken,
    ) -> Result<SupervisorNamespaceState> {
        let (project, name) = self.identity(state)?;
        let span = tracing::info_span!(
            "delete",
            operation_id = %Uuid::new_v4(),
            project = %project,
            name = %name
        );

        async {
            let policy = self.policy.with_timeout(self.timeouts.delete);
            policy.deadline(self.clock.now())?;

            cancellable(
                cancel,
                &project,
                &name,
                "deleted",
                api::delete(&self.client, &project, &name),
            )
            .await?;
            tracing::info!("{} {} deletion requested in Project {}", LABEL, name, project);

            wait::wait_for_delete(
                &self.client,
                self.clock.as_ref(),
                &policy,
                cancel,
                &project,
                &name,
            )
            .await?;
            tracing::info!("{} {} deleted from Project {}", LABEL, name, project);

            Ok(SupervisorNamespaceState {
                id: None,
                ..state.clone()
            })
        }
        .instrument(span)
        .await
    }

    /// Attach an existing namespace given `<project_name>.<name>`
    pub async fn import(
        &self,
        import_key: &str,
        cancel: &CancellationToken,
    ) -> Result<SupervisorNamespaceState> {
        let (project, name) = id::parse_import_key(import_key)?;
        let span = tracing::info_span!(
            "import",
            operation_id = %Uuid::new_v4(),
            project = %project,
            name = %name
        );

        async {
            let object = cancellable(
                cancel,
                &project,
                &name,
                "imported",
                api::read(&self.client, &project, &name),
            )
            .await
            .map_err(|err| match err {
                Error::NotFound { project, name, .. } => Error::NotFound {
                    operation: Operation::Import,
                    project,
                    name,
                },
                other => other,
            })?;
            let state = projector::project(&project, &name, &object)?;
            tracing::info!("{} {} imported from Project {}", LABEL, name, project);
            Ok(state)
        }
        .instrument(span)
        .await
    }

    async fn refresh(&self, project: &str, name: &str) -> Result<SupervisorNamespaceState> {
        let object = api::read(&self.client, project, name).await?;
        projector::project(project, name, &object)
    }

    fn identity(&self, state: &SupervisorNamespaceState) -> Result<(String, String)> {
        let id = state
            .id
            .as_deref()
            .ok_or_else(|| Error::validation("id", "resource has no identity"))?;
        id::decode(id)
    }
}

/// Run a single request, giving up as soon as `cancel` fires
async fn cancellable<T>(
    cancel: &CancellationToken,
    project: &str,
    name: &str,
    target: &'static str,
    request: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled {
            project: project.to_string(),
            name: name.to_string(),
            target,
        }),
        result = request => result,
    }
}
