//! Endpoint construction for the Supervisor Namespace collection

use crate::error::{Error, Result};
use url::Url;

/// API group serving Supervisor Namespaces
pub const API_GROUP: &str = "infrastructure.cci.vmware.com";

/// Version segment used in the collection path
pub const API_PATH_VERSION: &str = "v1alpha1";

/// Plural resource name in the collection path
pub const RESOURCE_PLURAL: &str = "supervisornamespaces";

/// Build the collection URL under `project`, or the instance URL when `name`
/// is given.
///
/// `server` is the CCI base, e.g. `https://vcfa.example.com/cci/kubernetes`.
pub fn build_url(server: &str, project: &str, name: Option<&str>) -> Result<Url> {
    let server = server.trim_end_matches('/');
    let mut raw = format!(
        "{}/apis/{}/{}/namespaces/{}/{}",
        server, API_GROUP, API_PATH_VERSION, project, RESOURCE_PLURAL
    );
    if let Some(name) = name {
        raw.push('/');
        raw.push_str(name);
    }

    if server.is_empty() {
        return Err(url_error(&raw, "empty server"));
    }
    check_segment(&raw, "project", project)?;
    if let Some(name) = name {
        check_segment(&raw, "name", name)?;
    }

    let url = Url::parse(&raw).map_err(|e| url_error(&raw, e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(url_error(&raw, "not an absolute URL"));
    }
    Ok(url)
}

/// Path segments must stay a single segment and survive the URL parser verbatim
fn check_segment(raw: &str, what: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(url_error(raw, format!("empty {}", what)));
    }
    if let Some(c) = segment
        .chars()
        .find(|c| matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control())
    {
        return Err(url_error(raw, format!("invalid character {:?} in {}", c, what)));
    }
    Ok(())
}

fn url_error(raw: &str, reason: impl Into<String>) -> Error {
    Error::UrlConstruction {
        url: raw.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: &str = "https://vcfa.example.com/cci/kubernetes";

    #[test]
    fn test_collection_url() {
        let url = build_url(SERVER, "my-project", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://vcfa.example.com/cci/kubernetes/apis/infrastructure.cci.vmware.com/v1alpha1/namespaces/my-project/supervisornamespaces"
        );
    }

    #[test]
    fn test_instance_url() {
        let url = build_url(SERVER, "my-project", Some("dev-x7k2p")).unwrap();
        assert!(url.path().ends_with("/namespaces/my-project/supervisornamespaces/dev-x7k2p"));
    }

    #[test]
    fn test_trailing_slash_on_server() {
        let url = build_url("https://vcfa.example.com/cci/kubernetes/", "p", None).unwrap();
        assert!(!url.path().contains("//"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            build_url("", "p", None),
            Err(Error::UrlConstruction { .. })
        ));
        assert!(matches!(
            build_url("not a url", "p", None),
            Err(Error::UrlConstruction { .. })
        ));
        assert!(matches!(
            build_url(SERVER, "a/b", None),
            Err(Error::UrlConstruction { .. })
        ));
        assert!(matches!(
            build_url(SERVER, "p", Some("ns?x=1")),
            Err(Error::UrlConstruction { .. })
        ));
        assert!(matches!(
            build_url(SERVER, "", None),
            Err(Error::UrlConstruction { .. })
        ));
    }
}
