//! Wire model of a Supervisor Namespace as served by the CCI API

use serde::{Deserialize, Serialize};

pub const KIND: &str = "SupervisorNamespace";
pub const API_VERSION: &str = "infrastructure.cci.vmware.com/v1alpha";

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// One Supervisor Namespace object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorNamespace {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: SupervisorNamespaceSpec,
    /// Server computed; never sent on create
    #[serde(default, skip_serializing_if = "is_default")]
    pub status: SupervisorNamespaceStatus,
}

impl SupervisorNamespace {
    /// New object to submit under `project`; the backend generates the final
    /// name from `generate_name`
    pub fn new(project: &str, generate_name: &str, spec: SupervisorNamespaceSpec) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: String::new(),
                generate_name: generate_name.to_string(),
                namespace: project.to_string(),
            },
            spec,
            status: SupervisorNamespaceStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn phase(&self) -> &str {
        &self.status.phase
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generate_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

/// Desired state. Write-once: there is no endpoint to modify it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorNamespaceSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub initial_class_config_overrides: InitialClassConfigOverrides,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vpc_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialClassConfigOverrides {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage_classes: Vec<StorageClassOverride>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageClassOverride {
    pub name: String,
    #[serde(rename = "limitMiB")]
    pub limit_mib: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverride {
    pub name: String,
    #[serde(rename = "cpuLimitMHz")]
    pub cpu_limit_mhz: i64,
    #[serde(rename = "cpuReservationMHz")]
    pub cpu_reservation_mhz: i64,
    #[serde(rename = "memoryLimitMiB")]
    pub memory_limit_mib: i64,
    #[serde(rename = "memoryReservationMiB")]
    pub memory_reservation_mib: i64,
}

/// Observed state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorNamespaceStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(
        default,
        rename = "namespaceEndpointURL",
        skip_serializing_if = "String::is_empty"
    )]
    pub namespace_endpoint_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phase: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage_classes: Vec<StorageClassStatus>,
    #[serde(default, rename = "vmClasses", skip_serializing_if = "Vec::is_empty")]
    pub vm_classes: Vec<VmClassStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageClassStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "limitMiB")]
    pub limit_mib: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmClassStatus {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "cpuLimitMHz")]
    pub cpu_limit_mhz: i64,
    #[serde(default, rename = "cpuReservationMHz")]
    pub cpu_reservation_mhz: i64,
    #[serde(default, rename = "memoryLimitMiB")]
    pub memory_limit_mib: i64,
    #[serde(default, rename = "memoryReservationMiB")]
    pub memory_reservation_mib: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_omits_status_and_name() {
        let spec = SupervisorNamespaceSpec {
            class_name: "small".to_string(),
            initial_class_config_overrides: InitialClassConfigOverrides {
                storage_classes: vec![StorageClassOverride {
                    name: "vsan-default".to_string(),
                    limit_mib: 1024,
                }],
                zones: vec![],
            },
            region_name: "region-a".to_string(),
            vpc_name: "vpc-a".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(SupervisorNamespace::new("proj", "dev-", spec)).unwrap();

        assert_eq!(body["apiVersion"], API_VERSION);
        assert_eq!(body["kind"], KIND);
        assert_eq!(body["metadata"], json!({"generateName": "dev-", "namespace": "proj"}));
        assert!(body.get("status").is_none());
        assert!(body["spec"].get("description").is_none());
        assert_eq!(
            body["spec"]["initialClassConfigOverrides"]["storageClasses"][0],
            json!({"name": "vsan-default", "limitMiB": 1024})
        );
    }

    #[test]
    fn test_decode_full_object() {
        let object: SupervisorNamespace = serde_json::from_value(json!({
            "apiVersion": API_VERSION,
            "kind": KIND,
            "metadata": {"name": "dev-x7k2p", "namespace": "proj", "uid": "ignored"},
            "spec": {"className": "small", "regionName": "region-a", "vpcName": "vpc-a"},
            "status": {
                "phase": "CREATED",
                "namespaceEndpointURL": "https://10.0.0.1",
                "conditions": [{"type": "Ready", "status": "True"}],
                "vmClasses": [{"name": "best-effort-small"}],
                "zones": [{"name": "zone-1", "cpuLimitMHz": 2000, "memoryLimitMiB": 4096}]
            }
        }))
        .unwrap();

        assert_eq!(object.name(), "dev-x7k2p");
        assert_eq!(object.phase(), "CREATED");
        assert_eq!(object.status.namespace_endpoint_url, "https://10.0.0.1");
        assert_eq!(object.status.conditions[0].condition_type, "Ready");
        assert_eq!(object.status.vm_classes.len(), 1);
        assert_eq!(object.status.zones[0].cpu_limit_mhz, 2000);
        assert_eq!(object.status.zones[0].cpu_reservation_mhz, 0);
        assert!(object.status.storage_classes.is_empty());
    }

    #[test]
    fn test_decode_minimal_object() {
        let object: SupervisorNamespace =
            serde_json::from_value(json!({"metadata": {"name": "dev-x7k2p"}})).unwrap();
        assert_eq!(object.phase(), "");
        assert!(object.status.conditions.is_empty());
    }
}
