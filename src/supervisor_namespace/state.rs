//! Local declared configuration
//!
//! [`SupervisorNamespaceState`] is the user facing mirror of a Supervisor
//! Namespace: the declared inputs used on create plus every computed field
//! filled in after a read. [`ATTRIBUTES`] tags each field as required,
//! optional or computed; validation and update detection are driven by it.

use super::model::{
    InitialClassConfigOverrides, StorageClassOverride, StorageClassStatus,
    SupervisorNamespaceSpec, VmClassStatus, ZoneOverride, ZoneStatus,
};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// RFC 1123 label: lower case alphanumerics and '-', alphanumeric at both ends
const RFC1123_LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const RFC1123_LABEL_MAX_LEN: usize = 63;

fn rfc1123_label_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(RFC1123_LABEL_PATTERN).expect("valid RFC 1123 label pattern"))
}

/// How a field participates in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be set by the user; sent on create
    Required,
    /// May be set by the user; sent on create
    Optional,
    /// Only ever written from a read of the remote object
    Computed,
}

/// Field level metadata of the local representation
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub presence: Presence,
    /// Changing the value requires a new object
    pub force_new: bool,
    /// Minimum number of entries for collection fields
    pub min_items: usize,
    pub description: &'static str,
}

const fn attr(name: &'static str, presence: Presence, description: &'static str) -> Attribute {
    Attribute {
        name,
        presence,
        force_new: false,
        min_items: 0,
        description,
    }
}

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute {
        force_new: true,
        ..attr("name_prefix", Presence::Required, "Prefix for the Supervisor Namespace name")
    },
    attr("name", Presence::Computed, "Name of the Supervisor Namespace"),
    attr(
        "project_name",
        Presence::Required,
        "The name of the Project the Supervisor Namespace belongs to",
    ),
    attr("class_name", Presence::Required, "The name of the Supervisor Namespace Class"),
    attr("description", Presence::Optional, "Description"),
    attr("phase", Presence::Computed, "Phase of the Supervisor Namespace"),
    attr(
        "ready",
        Presence::Computed,
        "Whether the Supervisor Namespace is in a ready status or not",
    ),
    attr("region_name", Presence::Required, "Name of the Region"),
    attr("vpc_name", Presence::Required, "Name of the VPC"),
    attr(
        "namespace_endpoint_url",
        Presence::Computed,
        "Endpoint URL of the Supervisor Namespace",
    ),
    attr("storage_classes", Presence::Computed, "Supervisor Namespace Storage Classes"),
    Attribute {
        min_items: 1,
        ..attr(
            "storage_classes_initial_class_config_overrides",
            Presence::Required,
            "Initial Class Config Overrides for Storage Classes",
        )
    },
    attr("vm_classes", Presence::Computed, "Supervisor Namespace VM Classes"),
    attr("zones", Presence::Computed, "Supervisor Namespace Zones"),
    Attribute {
        min_items: 1,
        ..attr(
            "zones_initial_class_config_overrides",
            Presence::Required,
            "Initial Class Config Overrides for Zones",
        )
    },
];

/// Look up the metadata of a field
pub fn attribute(name: &str) -> Option<&'static Attribute> {
    ATTRIBUTES.iter().find(|a| a.name == name)
}

/// Storage class entry, used both for initial overrides and observed classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageClass {
    pub name: String,
    #[serde(default)]
    pub limit_mib: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmClass {
    pub name: String,
}

/// Zone entry, used both for initial overrides and observed zones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub cpu_limit_mhz: i64,
    #[serde(default)]
    pub cpu_reservation_mhz: i64,
    #[serde(default)]
    pub memory_limit_mib: i64,
    #[serde(default)]
    pub memory_reservation_mib: i64,
}

impl From<&StorageClassOverride> for StorageClass {
    fn from(value: &StorageClassOverride) -> Self {
        Self {
            name: value.name.clone(),
            limit_mib: value.limit_mib,
        }
    }
}

impl From<&StorageClassStatus> for StorageClass {
    fn from(value: &StorageClassStatus) -> Self {
        Self {
            name: value.name.clone(),
            limit_mib: value.limit_mib,
        }
    }
}

impl From<&VmClassStatus> for VmClass {
    fn from(value: &VmClassStatus) -> Self {
        Self {
            name: value.name.clone(),
        }
    }
}

impl From<&ZoneOverride> for Zone {
    fn from(value: &ZoneOverride) -> Self {
        Self {
            name: value.name.clone(),
            cpu_limit_mhz: value.cpu_limit_mhz,
            cpu_reservation_mhz: value.cpu_reservation_mhz,
            memory_limit_mib: value.memory_limit_mib,
            memory_reservation_mib: value.memory_reservation_mib,
        }
    }
}

impl From<&ZoneStatus> for Zone {
    fn from(value: &ZoneStatus) -> Self {
        Self {
            name: value.name.clone(),
            cpu_limit_mhz: value.cpu_limit_mhz,
            cpu_reservation_mhz: value.cpu_reservation_mhz,
            memory_limit_mib: value.memory_limit_mib,
            memory_reservation_mib: value.memory_reservation_mib,
        }
    }
}

/// Typed view of a single field, see [`SupervisorNamespaceState::get`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Bool(bool),
    StorageClasses(&'a [StorageClass]),
    VmClasses(&'a [VmClass]),
    Zones(&'a [Zone]),
}

impl FieldValue<'_> {
    /// Whether the field holds no user supplied value
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Bool(_) => false,
            Self::StorageClasses(v) => v.is_empty(),
            Self::VmClasses(v) => v.is_empty(),
            Self::Zones(v) => v.is_empty(),
        }
    }

    /// Entry count for collections, `None` for scalars
    pub fn items(&self) -> Option<usize> {
        match self {
            Self::StorageClasses(v) => Some(v.len()),
            Self::VmClasses(v) => Some(v.len()),
            Self::Zones(v) => Some(v.len()),
            Self::Str(_) | Self::Bool(_) => None,
        }
    }
}

/// Local representation of one Supervisor Namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupervisorNamespaceState {
    /// Local identity, `None` until created or imported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name_prefix: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub region_name: String,
    #[serde(default)]
    pub vpc_name: String,
    #[serde(default)]
    pub storage_classes_initial_class_config_overrides: Vec<StorageClass>,
    #[serde(default)]
    pub zones_initial_class_config_overrides: Vec<Zone>,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub namespace_endpoint_url: String,
    #[serde(default)]
    pub storage_classes: Vec<StorageClass>,
    #[serde(default)]
    pub vm_classes: Vec<VmClass>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl SupervisorNamespaceState {
    /// Typed read access by field name
    pub fn get(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "name_prefix" => FieldValue::Str(&self.name_prefix),
            "name" => FieldValue::Str(&self.name),
            "project_name" => FieldValue::Str(&self.project_name),
            "class_name" => FieldValue::Str(&self.class_name),
            "description" => FieldValue::Str(&self.description),
            "phase" => FieldValue::Str(&self.phase),
            "ready" => FieldValue::Bool(self.ready),
            "region_name" => FieldValue::Str(&self.region_name),
            "vpc_name" => FieldValue::Str(&self.vpc_name),
            "namespace_endpoint_url" => FieldValue::Str(&self.namespace_endpoint_url),
            "storage_classes" => FieldValue::StorageClasses(&self.storage_classes),
            "storage_classes_initial_class_config_overrides" => {
                FieldValue::StorageClasses(&self.storage_classes_initial_class_config_overrides)
            }
            "vm_classes" => FieldValue::VmClasses(&self.vm_classes),
            "zones" => FieldValue::Zones(&self.zones),
            "zones_initial_class_config_overrides" => {
                FieldValue::Zones(&self.zones_initial_class_config_overrides)
            }
            _ => return None,
        };
        Some(value)
    }

    /// Check the declared inputs needed for create
    pub fn validate(&self) -> Result<()> {
        for attribute in ATTRIBUTES.iter().filter(|a| a.presence == Presence::Required) {
            let Some(value) = self.get(attribute.name) else {
                continue;
            };
            if value.is_unset() {
                return Err(Error::validation(attribute.name, "not specified"));
            }
            if let Some(items) = value.items() {
                if items < attribute.min_items {
                    return Err(Error::validation(
                        attribute.name,
                        format!("at least {} entries required", attribute.min_items),
                    ));
                }
            }
        }

        if self.name_prefix.len() > RFC1123_LABEL_MAX_LEN
            || !rfc1123_label_regex().is_match(&self.name_prefix)
        {
            return Err(Error::validation(
                "name_prefix",
                "Name must match RFC 1123 Label name (lower case alphabet, 0-9 and hyphen -)",
            ));
        }

        if self
            .storage_classes_initial_class_config_overrides
            .iter()
            .any(|sc| sc.name.is_empty())
        {
            return Err(Error::validation(
                "storage_classes_initial_class_config_overrides",
                "every entry needs a name",
            ));
        }
        if self
            .zones_initial_class_config_overrides
            .iter()
            .any(|z| z.name.is_empty())
        {
            return Err(Error::validation(
                "zones_initial_class_config_overrides",
                "every entry needs a name",
            ));
        }

        Ok(())
    }

    /// Desired spec sent on create
    pub fn to_spec(&self) -> SupervisorNamespaceSpec {
        SupervisorNamespaceSpec {
            class_name: self.class_name.clone(),
            description: self.description.clone(),
            initial_class_config_overrides: InitialClassConfigOverrides {
                storage_classes: self
                    .storage_classes_initial_class_config_overrides
                    .iter()
                    .map(|sc| StorageClassOverride {
                        name: sc.name.clone(),
                        limit_mib: sc.limit_mib,
                    })
                    .collect(),
                zones: self
                    .zones_initial_class_config_overrides
                    .iter()
                    .map(|z| ZoneOverride {
                        name: z.name.clone(),
                        cpu_limit_mhz: z.cpu_limit_mhz,
                        cpu_reservation_mhz: z.cpu_reservation_mhz,
                        memory_limit_mib: z.memory_limit_mib,
                        memory_reservation_mib: z.memory_reservation_mib,
                    })
                    .collect(),
            },
            region_name: self.region_name.clone(),
            vpc_name: self.vpc_name.clone(),
        }
    }

    /// Declared fields whose value differs between `self` and `planned`
    pub fn changed_fields(&self, planned: &Self) -> Vec<&'static str> {
        ATTRIBUTES
            .iter()
            .filter(|a| a.presence != Presence::Computed)
            .filter(|a| self.get(a.name) != planned.get(a.name))
            .map(|a| a.name)
            .collect()
    }
}
