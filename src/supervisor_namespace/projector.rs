//! Projection of a remote object onto the local representation

use super::id;
use super::model::{Condition, SupervisorNamespace};
use super::state::{StorageClass, SupervisorNamespaceState, VmClass, Zone};
use crate::error::Result;

/// Whether any condition reports `Ready=True` (case-insensitive)
pub fn is_ready(conditions: &[Condition]) -> bool {
    conditions.iter().any(|c| {
        c.condition_type.eq_ignore_ascii_case("ready") && c.status.eq_ignore_ascii_case("true")
    })
}

/// Build the local representation of `remote`, addressed as `(project, name)`.
///
/// Collections keep the order the backend returned them in. `name_prefix`
/// is taken from the echoed `generateName` and may be empty.
pub fn project(project: &str, name: &str, remote: &SupervisorNamespace) -> Result<SupervisorNamespaceState> {
    let spec = &remote.spec;
    let status = &remote.status;
    let overrides = &spec.initial_class_config_overrides;

    Ok(SupervisorNamespaceState {
        id: Some(id::encode(project, name)?),
        name_prefix: remote.metadata.generate_name.clone(),
        project_name: project.to_string(),
        class_name: spec.class_name.clone(),
        description: spec.description.clone(),
        region_name: spec.region_name.clone(),
        vpc_name: spec.vpc_name.clone(),
        storage_classes_initial_class_config_overrides: overrides
            .storage_classes
            .iter()
            .map(StorageClass::from)
            .collect(),
        zones_initial_class_config_overrides: overrides.zones.iter().map(Zone::from).collect(),
        name: name.to_string(),
        phase: status.phase.clone(),
        ready: is_ready(&status.conditions),
        namespace_endpoint_url: status.namespace_endpoint_url.clone(),
        storage_classes: status.storage_classes.iter().map(StorageClass::from).collect(),
        vm_classes: status.vm_classes.iter().map(VmClass::from).collect(),
        zones: status.zones.iter().map(Zone::from).collect(),
    })
}
