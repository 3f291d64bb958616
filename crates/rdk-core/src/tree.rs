//! Kinematic tree building and queries
//!
//! Links live in a flat arena owned by [`KinematicTree`]; parent/child
//! relations are [`LinkId`] indices into it.

use std::collections::HashMap;

use crate::error::LoadError;
use crate::model::{JointInfo, LinkId, LinkRecord};
use crate::parser::JointDecl;

/// Why a joint declaration was not linked into the tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum JointRejection {
    #[error("no {0} link given")]
    MissingReference(&'static str),
    #[error("link '{0}' does not exist")]
    UnknownLink(String),
    #[error("parent and child are the same link")]
    SelfLoop,
    #[error("child already has parent '{0}'")]
    SecondParent(String),
    #[error("would create a cycle")]
    Cycle,
}

/// Links of one loaded description, linked into a tree
#[derive(Debug, Clone)]
pub struct KinematicTree {
    links: Vec<LinkRecord>,
    root: LinkId,
    /// Parentless links other than the root, in document order
    detached: Vec<LinkId>,
    name_index: HashMap<String, LinkId>,
}

/// Link `links` together using `joints` and pick the root
///
/// Joints that cannot be linked (unknown names, a second parent for the
/// child, self-loops, cycles) are skipped with a warning. The first
/// parentless link in document order becomes the root; any further
/// parentless links are detached, or fail the load when
/// `strict_single_root` is set.
pub fn build_tree(
    mut links: Vec<LinkRecord>,
    joints: &[JointDecl],
    strict_single_root: bool,
) -> Result<KinematicTree, LoadError> {
    let mut name_index = HashMap::with_capacity(links.len());
    for (index, link) in links.iter().enumerate() {
        if name_index.insert(link.name.clone(), LinkId(index)).is_some() {
            return Err(LoadError::DuplicateLink(link.name.clone()));
        }
    }

    for joint in joints {
        match resolve_joint(&links, &name_index, joint) {
            Ok((parent, child)) => {
                let record = &mut links[child.0];
                record.parent = Some(parent);
                record.joint = JointInfo {
                    name: joint.name.clone(),
                    kind: joint.kind.clone(),
                    origin: joint.origin,
                    axis: joint.axis,
                    limits: joint.limits,
                };
                links[parent.0].children.push(child);
            }
            Err(reason) => {
                tracing::warn!("Skipping joint '{}': {}", joint.name, reason);
            }
        }
    }

    let mut roots = links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.parent.is_none())
        .map(|(index, _)| LinkId(index));
    let root = roots.next().ok_or(LoadError::NoRoot)?;
    let detached: Vec<LinkId> = roots.collect();

    if !detached.is_empty() {
        if strict_single_root {
            let names = std::iter::once(root)
                .chain(detached.iter().copied())
                .map(|id| links[id.0].name.clone())
                .collect();
            return Err(LoadError::MultipleRoots(names));
        }
        for id in &detached {
            tracing::warn!(
                "Link '{}' has no parent and is detached from root '{}'",
                links[id.0].name,
                links[root.0].name
            );
        }
    }

    Ok(KinematicTree {
        links,
        root,
        detached,
        name_index,
    })
}

fn resolve_joint(
    links: &[LinkRecord],
    name_index: &HashMap<String, LinkId>,
    joint: &JointDecl,
) -> Result<(LinkId, LinkId), JointRejection> {
    let lookup = |side: &'static str, name: Option<&String>| -> Result<LinkId, JointRejection> {
        let name = name.ok_or(JointRejection::MissingReference(side))?;
        name_index
            .get(name)
            .copied()
            .ok_or_else(|| JointRejection::UnknownLink(name.clone()))
    };
    let parent = lookup("parent", joint.parent.as_ref())?;
    let child = lookup("child", joint.child.as_ref())?;

    if parent == child {
        return Err(JointRejection::SelfLoop);
    }
    if let Some(existing) = links[child.0].parent {
        return Err(JointRejection::SecondParent(links[existing.0].name.clone()));
    }

    // Linking would close a loop if the child is already above the parent
    let mut cursor = links[parent.0].parent;
    while let Some(id) = cursor {
        if id == child {
            return Err(JointRejection::Cycle);
        }
        cursor = links[id.0].parent;
    }

    Ok((parent, child))
}

impl KinematicTree {
    pub fn root(&self) -> LinkId {
        self.root
    }

    pub fn root_link(&self) -> &LinkRecord {
        &self.links[self.root.0]
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkRecord> {
        self.links.get(id.0)
    }

    /// All links in document order (index = `LinkId::index`)
    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkId, &LinkRecord)> {
        self.links
            .iter()
            .enumerate()
            .map(|(index, link)| (LinkId(index), link))
    }

    /// Parentless links that are not the root
    pub fn detached(&self) -> &[LinkId] {
        &self.detached
    }

    /// Find a link by name
    pub fn find(&self, name: &str) -> Option<LinkId> {
        self.name_index.get(name).copied()
    }

    /// Find the link whose parent joint has the given name
    pub fn find_by_joint(&self, joint_name: &str) -> Option<LinkId> {
        self.iter()
            .find(|(_, link)| link.parent.is_some() && link.joint.name == joint_name)
            .map(|(id, _)| id)
    }

    /// Links reachable from the root, depth-first, root first
    pub fn depth_first(&self) -> Vec<LinkId> {
        let mut result = Vec::with_capacity(self.links.len());
        self.collect_depth_first(self.root, &mut result);
        result
    }

    /// All links below `id`, depth-first, excluding `id` itself
    pub fn descendants(&self, id: LinkId) -> Vec<LinkId> {
        let mut result = Vec::new();
        if let Some(link) = self.link(id) {
            for &child in &link.children {
                self.collect_depth_first(child, &mut result);
            }
        }
        result
    }

    fn collect_depth_first(&self, id: LinkId, result: &mut Vec<LinkId>) {
        result.push(id);
        for &child in &self.links[id.0].children {
            self.collect_depth_first(child, result);
        }
    }

    /// Number of joints between `id` and its top-most ancestor
    pub fn depth(&self, id: LinkId) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = self.link(id)?.parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.links[parent.0].parent;
        }
        Some(depth)
    }

    /// Set a link's joint angle in degrees; false if the id is unknown
    pub fn set_joint_angle(&mut self, id: LinkId, degrees: f32) -> bool {
        match self.links.get_mut(id.0) {
            Some(link) => {
                link.current_angle = degrees;
                true
            }
            None => false,
        }
    }

    pub fn reset_joint_angles(&mut self) {
        for link in &mut self.links {
            link.current_angle = 0.0;
        }
    }
}
