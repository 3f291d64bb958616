//! Robot: owns one loaded description and its joint angles

use std::path::Path;

use glam::{Quat, Vec3};

use crate::constants::MESH_CORRECTION_DEG;
use crate::dialect::Dialect;
use crate::error::LoadError;
use crate::frame::{BasePlacement, rpy_degrees_to_quat};
use crate::kinematics::{ForwardKinematics, LinkFrames, RenderSink, VisualPose};
use crate::loader::{DescriptionLoader, LoadedRobot};
use crate::mesh::GeometryLoader;
use crate::model::{LinkId, LinkRecord};
use crate::resolve::AssetLocator;
use crate::tree::KinematicTree;

/// A robot placed in the scene
///
/// Empty until a load succeeds. A failed load leaves it empty again, so
/// stale links never survive a reload.
#[derive(Debug, Clone)]
pub struct Robot {
    loaded: Option<LoadedRobot>,
    placement: BasePlacement,
    mesh_correction: Quat,
}

impl Default for Robot {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Robot {
    pub fn new(base_position: Vec3) -> Self {
        let placement = BasePlacement {
            position: base_position,
            ..BasePlacement::default()
        };
        Self {
            loaded: None,
            placement,
            mesh_correction: rpy_degrees_to_quat(MESH_CORRECTION_DEG),
        }
    }

    /// Load a description file, replacing whatever was loaded before
    pub fn load<G, L>(
        &mut self,
        path: impl AsRef<Path>,
        loader: &DescriptionLoader<G, L>,
    ) -> Result<(), LoadError>
    where
        G: GeometryLoader,
        L: AssetLocator,
    {
        self.clear();
        let loaded = loader.load_file(path)?;
        self.install(loaded, loader);
        Ok(())
    }

    /// Load a description from XML text, replacing whatever was loaded before
    pub fn load_str<G, L>(
        &mut self,
        xml: &str,
        loader: &DescriptionLoader<G, L>,
    ) -> Result<(), LoadError>
    where
        G: GeometryLoader,
        L: AssetLocator,
    {
        self.clear();
        let loaded = loader.load_str(xml)?;
        self.install(loaded, loader);
        Ok(())
    }

    fn install<G, L>(&mut self, loaded: LoadedRobot, loader: &DescriptionLoader<G, L>)
    where
        G: GeometryLoader,
        L: AssetLocator,
    {
        let config = loader.config();
        self.placement = config.base_placement(self.placement.position);
        self.mesh_correction = config.mesh_correction();
        self.loaded = Some(loaded);
    }

    /// Drop all links
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.name.as_str())
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.loaded.as_ref().map(|l| l.dialect)
    }

    pub fn tree(&self) -> Option<&KinematicTree> {
        self.loaded.as_ref().map(|l| &l.tree)
    }

    pub fn root(&self) -> Option<LinkId> {
        self.tree().map(KinematicTree::root)
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkRecord> {
        self.tree()?.link(id)
    }

    /// All links in document order; empty when nothing is loaded
    pub fn links(&self) -> &[LinkRecord] {
        self.tree().map(KinematicTree::links).unwrap_or_default()
    }

    pub fn find_link(&self, name: &str) -> Option<LinkId> {
        self.tree()?.find(name)
    }

    pub fn find_link_by_joint(&self, joint_name: &str) -> Option<LinkId> {
        self.tree()?.find_by_joint(joint_name)
    }

    /// Parentless links that are not drawn
    pub fn detached_links(&self) -> &[LinkId] {
        self.tree().map(KinematicTree::detached).unwrap_or_default()
    }

    // ============== Joint Angles ==============

    /// Set the angle (degrees) of the joint above `id`; no range clamping
    pub fn set_joint_angle(&mut self, id: LinkId, degrees: f32) -> bool {
        match self.loaded.as_mut() {
            Some(loaded) => loaded.tree.set_joint_angle(id, degrees),
            None => false,
        }
    }

    /// Set a joint angle by joint name
    pub fn set_joint_angle_by_name(&mut self, joint_name: &str, degrees: f32) -> bool {
        match self.find_link_by_joint(joint_name) {
            Some(id) => self.set_joint_angle(id, degrees),
            None => false,
        }
    }

    pub fn joint_angle(&self, id: LinkId) -> Option<f32> {
        self.link(id).map(|l| l.current_angle)
    }

    pub fn reset_joint_angles(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.tree.reset_joint_angles();
        }
    }

    // ============== Placement ==============

    pub fn base_position(&self) -> Vec3 {
        self.placement.position
    }

    pub fn set_base_position(&mut self, position: Vec3) {
        self.placement.position = position;
    }

    pub fn placement(&self) -> BasePlacement {
        self.placement
    }

    // ============== Forward Kinematics ==============

    fn kinematics(&self) -> Option<ForwardKinematics<'_>> {
        self.tree()
            .map(|tree| ForwardKinematics::new(tree, self.placement, self.mesh_correction))
    }

    /// Hand every visual's world transform to the renderer
    pub fn draw(&self, sink: &mut impl RenderSink) {
        if let Some(fk) = self.kinematics() {
            fk.draw(sink);
        }
    }

    pub fn visual_poses(&self) -> Vec<VisualPose> {
        self.kinematics()
            .map(|fk| fk.visual_poses())
            .unwrap_or_default()
    }

    pub fn link_frames(&self) -> Option<LinkFrames> {
        self.kinematics().map(|fk| fk.link_frames())
    }
}
