use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{Permission, PermissionNode};

/// Bound on nesting depth when materializing the forest. Parent chains are
/// user-entered data, so a cycle must surface as an error instead of
/// unbounded recursion.
pub const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("permission hierarchy contains a cycle through {id:?}")]
    CycleDetected { id: String },
}

/// Converts a flat, unordered permission list into a rooted forest.
///
/// Two passes: the first indexes every record by id (a duplicate id keeps
/// its first position but the later record wins), the second links each
/// record under its resolved parent or appends it to the roots. A record
/// whose parent id does not resolve is promoted to a root with a warning
/// rather than dropped. Children and roots preserve input order.
///
/// A self-referencing or cyclic parent chain is unreachable from any root;
/// such records are reported as [`HierarchyError::CycleDetected`] so the
/// caller never renders a tree that silently lost records.
pub fn build_forest(permissions: &[Permission]) -> Result<Vec<PermissionNode>, HierarchyError> {
    let mut order: Vec<&str> = Vec::with_capacity(permissions.len());
    let mut index: HashMap<&str, &Permission> = HashMap::with_capacity(permissions.len());
    for perm in permissions {
        if index.insert(perm.id.as_str(), perm).is_some() {
            tracing::warn!(permission = %perm.id, "duplicate permission id, keeping the later record");
        } else {
            order.push(perm.id.as_str());
        }
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for &id in &order {
        match index[id].parent_id.as_deref() {
            Some(parent) if index.contains_key(parent) => {
                children.entry(parent).or_default().push(id);
            }
            Some(parent) => {
                tracing::warn!(
                    permission = %id,
                    parent = %parent,
                    "parent permission not found, promoting to root"
                );
                roots.push(id);
            }
            None => roots.push(id),
        }
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(order.len());
    let mut forest = Vec::with_capacity(roots.len());
    for &root in &roots {
        forest.push(materialize(root, &index, &children, 0, &mut seen)?);
    }

    // Records caught in a parent cycle hang off no root and were never
    // visited; surfacing them beats rendering an incomplete tree.
    if seen.len() != order.len() {
        let stranded = order
            .iter()
            .find(|id| !seen.contains(*id))
            .map(|id| id.to_string())
            .unwrap_or_default();
        return Err(HierarchyError::CycleDetected { id: stranded });
    }

    Ok(forest)
}

fn materialize<'a>(
    id: &'a str,
    index: &HashMap<&str, &Permission>,
    children: &HashMap<&str, Vec<&'a str>>,
    depth: usize,
    seen: &mut HashSet<&'a str>,
) -> Result<PermissionNode, HierarchyError> {
    if depth >= MAX_TREE_DEPTH {
        return Err(HierarchyError::CycleDetected { id: id.to_string() });
    }
    seen.insert(id);

    let record = index[id];
    let nested = children
        .get(id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|&child| materialize(child, index, children, depth + 1, seen))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PermissionNode {
        id: record.id.clone(),
        name: record.name.clone(),
        parent_id: record.parent_id.clone(),
        children: nested,
    })
}

/// Recursively strips the derived children back into flat records, in
/// depth-first order. Rebuilding from the result yields an equivalent forest.
pub fn flatten_forest(forest: &[PermissionNode]) -> Vec<Permission> {
    let mut flat = Vec::new();
    for node in forest {
        flatten_into(node, &mut flat);
    }
    flat
}

fn flatten_into(node: &PermissionNode, out: &mut Vec<Permission>) {
    out.push(node.record());
    for child in &node.children {
        flatten_into(child, out);
    }
}

/// Counts every node in the forest, descendants included.
pub fn count_nodes(forest: &[PermissionNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}
