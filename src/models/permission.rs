use serde::{Deserialize, Serialize};

/// Flat permission record as stored by the backend. `parent_id` may point
/// at another permission; a dangling reference is tolerated at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
    pub name: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` detaches the permission from its parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

/// Permission with its derived children, produced by the hierarchy builder.
/// Never persisted; the backend only ever sees the flat records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    /// The flat record this node was built from, children stripped.
    pub fn record(&self) -> Permission {
        Permission {
            id: self.id.clone(),
            name: self.name.clone(),
            parent_id: self.parent_id.clone(),
        }
    }
}
