//! Pulp v2 data model
//!
//! Field names follow the service's JSON. Absent values are skipped on
//! serialization so an object sent to the server comes back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The service sends `null` for empty collections in places
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// MongoDB object id as rendered by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

/// Image tag recorded in a repository scratchpad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(rename = "tag", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Free-form plugin data attached to a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scratchpad {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scratchpad {
    fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.extra.is_empty()
    }
}

/// Distributor attached to a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributor {
    /// Distributor id, unique within the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<ObjectId>,
    #[serde(rename = "_ns", default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
    #[serde(default)]
    pub auto_publish: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_publish: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// Importer attached to a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Importer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<ObjectId>,
    #[serde(rename = "_ns", default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importer_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// A content repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDetails {
    /// Repository id; required when creating
    #[serde(default)]
    pub id: String,
    #[serde(rename = "_href", default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<ObjectId>,
    #[serde(rename = "_ns", default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub notes: BTreeMap<String, Value>,
    /// Number of content units per unit type
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub content_unit_counts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_unit_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_unit_removed: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Scratchpad::is_empty"
    )]
    pub scratchpad: Scratchpad,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub distributors: Vec<Distributor>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub importers: Vec<Importer>,
}

impl RepositoryDetails {
    /// Minimal repository for a create request
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The plugin type recorded in `notes._repo-type`
    pub fn repo_type(&self) -> Option<&str> {
        self.notes.get("_repo-type").and_then(Value::as_str)
    }

    /// Total content units across all types
    pub fn total_units(&self) -> u64 {
        self.content_unit_counts.values().sum()
    }
}

/// Ids of the open upload requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequests {
    #[serde(default)]
    pub upload_ids: Vec<String>,
}

/// A freshly created upload request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(rename = "_href")]
    pub href: String,
    pub upload_id: String,
}

/// Client certificate and private key issued by login, both PEM
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCertificate {
    pub certificate: String,
    pub key: String,
}

impl fmt::Debug for SessionCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCertificate")
            .field("certificate", &format!("<{} bytes>", self.certificate.len()))
            .field("key", &"<redacted>")
            .finish()
    }
}
