//! Supervisor Namespace CRUD requests
//!
//! Each function performs exactly one REST call and does not wait for the
//! backend to settle; see [`super::wait`] for that.

use super::endpoint::build_url;
use super::model::SupervisorNamespace;
use super::state::SupervisorNamespaceState;
use crate::error::{Error, Operation, Result, LABEL};
use crate::vcfa::client::VcfaClient;
use crate::vcfa::http::TransportError;
use serde_json::Value;
use url::Url;

fn resource_url(client: &VcfaClient, project: &str, name: Option<&str>) -> Result<Url> {
    let server = client.cci_server().ok_or_else(|| Error::UrlConstruction {
        url: client.endpoint.clone(),
        reason: "endpoint is not an absolute URL".to_string(),
    })?;
    build_url(&server, project, name)
}

fn decode(value: Value) -> std::result::Result<SupervisorNamespace, TransportError> {
    Ok(serde_json::from_value(value)?)
}

/// Submit a new Supervisor Namespace under `project`.
///
/// `object` carries a name prefix; the returned object holds the generated
/// name and is usually still in `CREATING` or `WAITING`.
pub async fn create(
    client: &VcfaClient,
    project: &str,
    object: &SupervisorNamespace,
) -> Result<SupervisorNamespace> {
    let url = resource_url(client, project, None)?;
    let prefix = object.metadata.generate_name.as_str();
    let body = serde_json::to_value(object)
        .map_err(|e| Error::from_transport(Operation::Create, project, prefix, e.into()))?;

    let created = client
        .post(&url, &body)
        .await
        .and_then(decode)
        .map_err(|e| Error::from_transport(Operation::Create, project, prefix, e))?;

    if created.name().is_empty() {
        return Err(Error::IncompleteResponse {
            operation: Operation::Create,
            project: project.to_string(),
            reason: format!("the created {} has no name", LABEL),
        });
    }

    tracing::debug!(
        "{} {} submitted in Project {} (phase {:?})",
        LABEL,
        created.name(),
        project,
        created.phase()
    );
    Ok(created)
}

/// Fetch the current state. A missing object yields [`Error::NotFound`].
pub async fn read(client: &VcfaClient, project: &str, name: &str) -> Result<SupervisorNamespace> {
    let url = resource_url(client, project, Some(name))?;
    client
        .get(&url)
        .await
        .and_then(decode)
        .map_err(|e| Error::from_transport(Operation::Read, project, name, e))
}

/// Updates are not supported by the backend. Always fails, without any request.
pub fn update(prior: &SupervisorNamespaceState, planned: &SupervisorNamespaceState) -> Result<()> {
    Err(Error::UnsupportedOperation {
        fields: prior.changed_fields(planned),
    })
}

/// Request deletion. Removal completes asynchronously.
pub async fn delete(client: &VcfaClient, project: &str, name: &str) -> Result<()> {
    let url = resource_url(client, project, Some(name))?;
    client
        .delete(&url)
        .await
        .map_err(|e| Error::from_transport(Operation::Delete, project, name, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor_namespace::state::tests::declared;
    use crate::supervisor_namespace::testing::ScriptedTransport;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<ScriptedTransport>) -> VcfaClient {
        VcfaClient::with_transport("https://vcfa.example.com", transport)
    }

    #[tokio::test]
    async fn test_create_posts_to_collection() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "metadata": {"name": "dev-x7k2p", "namespace": "my-project"},
            "status": {"phase": "CREATING"}
        }))]));
        let state = declared();
        let object = SupervisorNamespace::new(&state.project_name, &state.name_prefix, state.to_spec());

        let created = create(&client(transport.clone()), "my-project", &object).await.unwrap();

        assert_eq!(created.name(), "dev-x7k2p");
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert!(calls[0]
            .url
            .ends_with("/namespaces/my-project/supervisornamespaces"));
        assert_eq!(calls[0].body.as_ref().unwrap()["metadata"]["generateName"], "dev");
    }

    #[tokio::test]
    async fn test_create_without_generated_name_fails() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({"metadata": {}}))]));
        let object = SupervisorNamespace::new("my-project", "dev", declared().to_spec());
        let err = create(&client(transport), "my-project", &object).await.unwrap_err();
        assert!(matches!(err, Error::IncompleteResponse { .. }));
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(ScriptedTransport::not_found())]));
        let err = read(&client(transport), "my-project", "gone").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("gone"));
    }

    #[tokio::test]
    async fn test_read_server_error_is_transport() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(ScriptedTransport::server_error())]));
        let err = read(&client(transport), "my-project", "ns").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                operation: Operation::Read,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_url_fails_before_request() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let err = read(&client(transport.clone()), "my/project", "ns").await.unwrap_err();
        assert!(matches!(err, Error::UrlConstruction { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_issues_delete() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(Value::Null)]));
        delete(&client(transport.clone()), "my-project", "dev-x7k2p").await.unwrap();
        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::DELETE);
        assert!(calls[0].url.ends_with("/supervisornamespaces/dev-x7k2p"));
    }

    #[test]
    fn test_update_is_rejected() {
        let prior = declared();
        let mut planned = prior.clone();
        planned.description = "changed".to_string();
        match update(&prior, &planned) {
            Err(Error::UnsupportedOperation { fields }) => assert_eq!(fields, ["description"]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
