use crate::client::EntityClient;
use crate::models::{NewPermission, Permission, PermissionNode, PermissionPatch};
use crate::services::hierarchy::{build_forest, flatten_forest};

use super::{require, user_message, Phase, ScreenError};

/// Permissions screen: the derived forest for the tree view plus the flat
/// records backing the parent dropdown. Mutations re-fetch and rebuild
/// instead of patching the tree locally; deleting a parent therefore shows
/// its children promoted to roots on the next build, not removed.
#[derive(Debug, Default)]
pub struct PermissionsScreen {
    pub forest: Vec<PermissionNode>,
    pub phase: Phase,
    pub error: Option<String>,
}

/// Tree flattened for rendering: one row per node with its nesting depth.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub depth: usize,
}

impl PermissionsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, client: &EntityClient) {
        self.phase = Phase::Loading;

        let flat = match client.list_permissions().await {
            Ok(flat) => flat,
            Err(err) => {
                tracing::error!("Failed to load permissions screen: {}", err);
                self.phase = Phase::Error;
                self.error = Some(user_message("loading permissions", &err));
                return;
            }
        };

        match build_forest(&flat) {
            Ok(forest) => {
                self.forest = forest;
                self.phase = Phase::Ready;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to build permission hierarchy: {}", err);
                self.phase = Phase::Error;
                self.error = Some(format!(
                    "Failed to display permissions: {}. Fix the parent reference and reload.",
                    err
                ));
            }
        }
    }

    pub async fn create_permission(
        &mut self,
        client: &EntityClient,
        permission: NewPermission,
    ) -> Result<(), ScreenError> {
        if let Err(err) = require("Permission name", &permission.name) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        match client.create_permission(&permission).await {
            Ok(created) => {
                tracing::info!("Permission created: id={}", created.id);
                self.error = None;
                self.load(client).await;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("saving the permission", &err));
                Err(err.into())
            }
        }
    }

    pub async fn update_permission(
        &mut self,
        client: &EntityClient,
        id: &str,
        patch: PermissionPatch,
    ) -> Result<(), ScreenError> {
        if let Some(name) = patch.name.as_deref() {
            if let Err(err) = require("Permission name", name) {
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        }

        match client.update_permission(id, &patch).await {
            Ok(_echoed) => {
                self.error = None;
                self.load(client).await;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("saving the permission", &err));
                Err(err.into())
            }
        }
    }

    pub async fn delete_permission(
        &mut self,
        client: &EntityClient,
        id: &str,
    ) -> Result<(), ScreenError> {
        match client.delete_permission(id).await {
            Ok(()) => {
                self.error = None;
                self.load(client).await;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("deleting the permission", &err));
                Err(err.into())
            }
        }
    }

    /// Depth-first rows for the indented list rendering.
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for node in &self.forest {
            push_rows(node, 0, &mut rows);
        }
        rows
    }

    /// Flat records for the parent dropdown, every node included.
    pub fn parent_choices(&self) -> Vec<Permission> {
        flatten_forest(&self.forest)
    }

    pub fn find(&self, id: &str) -> Option<Permission> {
        self.parent_choices()
            .into_iter()
            .find(|perm| perm.id == id)
    }
}

fn push_rows(node: &PermissionNode, depth: usize, rows: &mut Vec<TreeRow>) {
    rows.push(TreeRow {
        id: node.id.clone(),
        name: node.name.clone(),
        depth,
    });
    for child in &node.children {
        push_rows(child, depth + 1, rows);
    }
}
