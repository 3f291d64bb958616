//! Forward kinematics
//!
//! Every evaluation walks the tree from the root and recomputes all frames
//! from the current joint angles; nothing is cached between calls.
//!
//! Two frames exist per link:
//! - the **joint frame**, `parent joint frame * origin * axis rotation`,
//!   which is handed down to the children;
//! - one **visual frame** per visual, `joint frame * offset * mesh correction
//!   * scale`, which is only handed to the renderer.

use glam::{Mat4, Quat, Vec3};

use crate::frame::{BasePlacement, joint_transform, visual_transform};
use crate::mesh::GeometryHandle;
use crate::model::{LinkId, LinkRecord};
use crate::tree::KinematicTree;

/// Everything the renderer needs to draw one visual
#[derive(Debug, Clone)]
pub struct VisualPose {
    pub link: LinkId,
    /// Index into the link's `visuals`
    pub visual_index: usize,
    pub world_transform: Mat4,
    pub geometry: GeometryHandle,
    pub color: Vec3,
    pub has_texture: bool,
}

/// Renderer collaborator receiving one call per visual
pub trait RenderSink {
    fn draw_visual(&mut self, pose: &VisualPose);
}

impl<F: FnMut(&VisualPose)> RenderSink for F {
    fn draw_visual(&mut self, pose: &VisualPose) {
        self(pose)
    }
}

/// Joint frame per link, indexed by [`LinkId`]; `None` for links not reachable from the root
#[derive(Debug, Clone, PartialEq)]
pub struct LinkFrames(Vec<Option<Mat4>>);

impl LinkFrames {
    pub fn get(&self, id: LinkId) -> Option<Mat4> {
        self.0.get(id.index()).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkId, Mat4)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, frame)| frame.map(|m| (LinkId(index), m)))
    }
}

/// Evaluates world transforms for one tree and one base placement
#[derive(Debug, Clone, Copy)]
pub struct ForwardKinematics<'a> {
    tree: &'a KinematicTree,
    placement: BasePlacement,
    mesh_correction: Quat,
}

impl<'a> ForwardKinematics<'a> {
    pub fn new(tree: &'a KinematicTree, placement: BasePlacement, mesh_correction: Quat) -> Self {
        Self {
            tree,
            placement,
            mesh_correction,
        }
    }

    /// Hand every visual reachable from the root to `sink`, depth-first
    pub fn draw(&self, sink: &mut impl RenderSink) {
        self.walk(self.tree.root(), self.placement.to_mat4(), &mut |id, link, joint| {
            for (visual_index, visual) in link.visuals.iter().enumerate() {
                let local = visual_transform(&visual.offset, self.mesh_correction, visual.scale);
                sink.draw_visual(&VisualPose {
                    link: id,
                    visual_index,
                    world_transform: joint * local,
                    geometry: visual.geometry.clone(),
                    color: visual.color,
                    has_texture: visual.has_texture(),
                });
            }
        });
    }

    /// All visual poses in draw order
    pub fn visual_poses(&self) -> Vec<VisualPose> {
        let mut poses = Vec::new();
        self.draw(&mut |pose: &VisualPose| poses.push(pose.clone()));
        poses
    }

    /// Joint frame of every link reachable from the root
    pub fn link_frames(&self) -> LinkFrames {
        let mut frames = vec![None; self.tree.link_count()];
        self.walk(self.tree.root(), self.placement.to_mat4(), &mut |id, _, joint| {
            frames[id.index()] = Some(joint);
        });
        LinkFrames(frames)
    }

    fn walk<F>(&self, id: LinkId, parent: Mat4, visit: &mut F)
    where
        F: FnMut(LinkId, &LinkRecord, Mat4),
    {
        let Some(link) = self.tree.link(id) else {
            return;
        };
        // The root's own joint is identity, so it sits exactly at the base placement
        let joint =
            parent * joint_transform(&link.joint.origin, link.joint.axis, link.current_angle);
        visit(id, link, joint);
        for &child in link.children() {
            self.walk(child, joint, visit);
        }
    }
}
