//! Resource identity
//!
//! A Supervisor Namespace is addressed by `(project, name)`. Locally that pair
//! is stored as a single opaque id `<project>:<name>`, where each component is
//! percent-encoded so a `:` inside either component can never be confused
//! with the separator. For DNS-label style names the encoding is the identity
//! and ids read as plain `project:name`.
//!
//! Imports use a different, user-facing key: `<project>.<name>`.

use crate::error::{Error, Result};
use std::borrow::Cow;

/// Separator of the local state id
pub const ID_SEPARATOR: char = ':';

/// Separator of the user supplied import key
pub const IMPORT_SEPARATOR: char = '.';

/// Join project and name into the local state id
pub fn encode(project: &str, name: &str) -> Result<String> {
    if project.is_empty() {
        return Err(Error::validation("project_name", "must not be empty"));
    }
    if name.is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    Ok(format!(
        "{}{}{}",
        urlencoding::encode(project),
        ID_SEPARATOR,
        urlencoding::encode(name)
    ))
}

/// Split a local state id back into `(project, name)`
pub fn decode(id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(Error::malformed(
            id,
            format!("expected exactly one '{}' separator", ID_SEPARATOR),
        ));
    }

    let project = decode_component(id, parts[0])?;
    let name = decode_component(id, parts[1])?;
    if project.is_empty() || name.is_empty() {
        return Err(Error::malformed(id, "empty project or name"));
    }

    Ok((project, name))
}

fn decode_component(id: &str, component: &str) -> Result<String> {
    urlencoding::decode(component)
        .map(Cow::into_owned)
        .map_err(|e| Error::malformed(id, format!("invalid escape: {}", e)))
}

/// Parse an import key `<project_name>.<supervisor_namespace_name>`
pub fn parse_import_key(key: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = key.split(IMPORT_SEPARATOR).collect();
    match parts.as_slice() {
        [project, name] if !project.is_empty() && !name.is_empty() => {
            Ok((project.to_string(), name.to_string()))
        }
        _ => Err(Error::malformed(
            key,
            format!(
                "expected import ID to be <project_name>{}<supervisor_namespace_name>",
                IMPORT_SEPARATOR
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_encode_readably() {
        assert_eq!(encode("my-project", "dev-x7k2p").unwrap(), "my-project:dev-x7k2p");
    }

    #[test]
    fn test_round_trip() {
        let id = encode("my-project", "dev-x7k2p").unwrap();
        assert_eq!(
            decode(&id).unwrap(),
            ("my-project".to_string(), "dev-x7k2p".to_string())
        );
    }

    #[test]
    fn test_separator_inside_component_round_trips() {
        let id = encode("team:a", "ns:1").unwrap();
        assert_eq!(id.matches(ID_SEPARATOR).count(), 1);
        assert_eq!(decode(&id).unwrap(), ("team:a".to_string(), "ns:1".to_string()));
    }

    #[test]
    fn test_encode_rejects_empty_components() {
        assert!(matches!(encode("", "ns"), Err(Error::Validation { .. })));
        assert!(matches!(encode("proj", ""), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for id in ["no-separator-here", "a:b:c", "", ":ns", "proj:"] {
            assert!(
                matches!(decode(id), Err(Error::MalformedIdentifier { .. })),
                "{id:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_import_key() {
        assert_eq!(
            parse_import_key("my-project.dev-x7k2p").unwrap(),
            ("my-project".to_string(), "dev-x7k2p".to_string())
        );
        assert!(parse_import_key("my-project:dev-x7k2p").is_err());
        assert!(parse_import_key("a.b.c").is_err());
        assert!(parse_import_key(".ns").is_err());
    }
}
