//! Description loading: parse, resolve meshes, import geometry, build the tree

use std::path::Path;

use crate::config::LoaderConfig;
use crate::dialect::Dialect;
use crate::error::LoadError;
use crate::mesh::{GeometryLoader, MeshImporter};
use crate::model::{LinkRecord, VisualEntry};
use crate::parser::{LinkDecl, parse_description};
use crate::resolve::{AssetLocator, PathResolver, RootedLocator};
use crate::tree::{KinematicTree, build_tree};

/// Result of one successful load
#[derive(Debug, Clone)]
pub struct LoadedRobot {
    pub name: String,
    pub dialect: Dialect,
    pub tree: KinematicTree,
}

impl LoadedRobot {
    pub fn visual_count(&self) -> usize {
        self.tree.links().iter().map(|l| l.visuals.len()).sum()
    }
}

/// Loads robot descriptions with a given config, path resolver and geometry loader
#[derive(Debug)]
pub struct DescriptionLoader<G = MeshImporter, L = RootedLocator> {
    config: LoaderConfig,
    resolver: PathResolver<L>,
    geometry: G,
}

impl DescriptionLoader {
    /// Loader backed by the STL/OBJ importer and the filesystem locator
    pub fn new(config: LoaderConfig) -> Self {
        let geometry = MeshImporter::new(config.mesh_unit);
        let resolver = PathResolver::from_config(&config);
        Self {
            config,
            resolver,
            geometry,
        }
    }
}

impl Default for DescriptionLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<G: GeometryLoader, L: AssetLocator> DescriptionLoader<G, L> {
    /// Replace the geometry loader
    pub fn with_geometry_loader<G2: GeometryLoader>(
        self,
        geometry: G2,
    ) -> DescriptionLoader<G2, L> {
        DescriptionLoader {
            config: self.config,
            resolver: self.resolver,
            geometry,
        }
    }

    /// Replace the path resolver
    pub fn with_resolver<L2: AssetLocator>(
        self,
        resolver: PathResolver<L2>,
    ) -> DescriptionLoader<G, L2> {
        DescriptionLoader {
            config: self.config,
            resolver,
            geometry: self.geometry,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn geometry_loader(&self) -> &G {
        &self.geometry
    }

    pub fn resolver(&self) -> &PathResolver<L> {
        &self.resolver
    }

    /// Load a description file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedRobot, LoadError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_str(&xml)
    }

    /// Load a description from XML text
    pub fn load_str(&self, xml: &str) -> Result<LoadedRobot, LoadError> {
        self.geometry.begin_load();
        let description = parse_description(xml)?;

        let links = description
            .links
            .into_iter()
            .map(|decl| self.build_link(decl))
            .collect();
        let tree = build_tree(links, &description.joints, self.config.strict_single_root)?;

        let loaded = LoadedRobot {
            name: description.name,
            dialect: description.dialect,
            tree,
        };
        tracing::info!(
            "Loaded {:?} robot '{}': root '{}', {} links, {} visuals",
            loaded.dialect,
            loaded.name,
            loaded.tree.root_link().name,
            loaded.tree.link_count(),
            loaded.visual_count()
        );
        Ok(loaded)
    }

    /// Import geometry for each visual; visuals that fail to import are dropped
    fn build_link(&self, decl: LinkDecl) -> LinkRecord {
        let mut link = LinkRecord::new(decl.name);
        for visual in decl.visuals {
            let path = self.resolver.resolve(&visual.mesh);
            let geometry = match self.geometry.load_geometry(&path) {
                Ok(geometry) => geometry,
                Err(e) => {
                    tracing::warn!(
                        "Link '{}': dropping visual '{}' ({}): {}",
                        link.name,
                        visual.mesh,
                        path.display(),
                        e
                    );
                    continue;
                }
            };
            link.visuals.push(VisualEntry {
                name: visual.name,
                geometry,
                offset: visual.origin,
                scale: visual.scale,
                color: visual.color.unwrap_or_else(|| self.config.default_color()),
            });
        }
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::{RecordingLoader, TRIANGLE_STL};
    use glam::Vec3;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const ARM: &str = r#"<robot name="arm">
  <link name="base_link">
    <visual>
      <geometry><mesh filename="package://drake_models/iiwa_description/meshes/base.obj"/></geometry>
    </visual>
  </link>
  <link name="link_1">
    <visual>
      <origin xyz="0 0 0.2"/>
      <geometry><mesh filename="meshes/missing.stl"/></geometry>
    </visual>
    <visual>
      <geometry><mesh filename="meshes/textured.obj"/></geometry>
      <material name="red"><color rgba="1 0 0 1"/></material>
    </visual>
  </link>
  <joint name="joint_1" type="revolute">
    <parent link="base_link"/>
    <child link="link_1"/>
    <axis xyz="0 0 1"/>
  </joint>
</robot>"#;

    fn recording_loader() -> DescriptionLoader<RecordingLoader> {
        let config = LoaderConfig::default();
        DescriptionLoader::new(config.clone())
            .with_resolver(PathResolver::with_locator(&config, RootedLocator::new("/project")))
            .with_geometry_loader(RecordingLoader::default())
    }

    #[test]
    fn test_resolved_paths_reach_geometry_loader() {
        let loader = recording_loader();
        loader.load_str(ARM).unwrap();
        assert_eq!(
            loader.geometry_loader().requested(),
            vec![
                PathBuf::from("/project/assets/kuka/meshes/base.obj"),
                PathBuf::from("/project/assets/meshes/missing.stl"),
                PathBuf::from("/project/assets/meshes/textured.obj"),
            ]
        );
    }

    #[test]
    fn test_failed_geometry_drops_only_that_visual() {
        let loaded = recording_loader().load_str(ARM).unwrap();
        let link_1 = loaded.tree.link(loaded.tree.find("link_1").unwrap()).unwrap();
        assert_eq!(link_1.visuals.len(), 1);
        assert_eq!(link_1.visuals[0].color, Vec3::X);
        assert!(link_1.visuals[0].has_texture());
        assert_eq!(loaded.visual_count(), 2);
    }

    #[test]
    fn test_default_color_applied() {
        let loaded = recording_loader().load_str(ARM).unwrap();
        let base = loaded.tree.root_link();
        assert_eq!(base.visuals[0].color, Vec3::splat(0.8));
        assert!(!base.visuals[0].has_texture());
    }

    #[test]
    fn test_configured_default_color() {
        let config = LoaderConfig {
            default_color: [0.1, 0.2, 0.3],
            ..LoaderConfig::default()
        };
        let loader =
            DescriptionLoader::new(config).with_geometry_loader(RecordingLoader::default());
        let loaded = loader.load_str(ARM).unwrap();
        assert_eq!(loaded.tree.root_link().visuals[0].color, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_joint_metadata_copied_to_child() {
        let loaded = recording_loader().load_str(ARM).unwrap();
        let link_1 = loaded.tree.link(loaded.tree.find("link_1").unwrap()).unwrap();
        assert_eq!(link_1.joint.name, "joint_1");
        assert_eq!(link_1.joint.axis, Vec3::Z);
        assert_eq!(loaded.name, "arm");
        assert_eq!(loaded.dialect, Dialect::Urdf);
    }

    #[test]
    fn test_load_file_with_real_meshes() {
        let temp = tempdir().unwrap();
        let meshes = temp.path().join("assets").join("meshes");
        fs::create_dir_all(&meshes).unwrap();
        fs::write(meshes.join("base.stl"), TRIANGLE_STL).unwrap();

        let urdf = temp.path().join("robot.urdf");
        fs::write(
            &urdf,
            r#"<robot name="r">
  <link name="base"><visual><geometry><mesh filename="meshes/base.stl"/></geometry></visual></link>
  <link name="tip"><visual><geometry><mesh filename="meshes/base.stl"/></geometry></visual></link>
  <joint name="j" type="fixed"><parent link="base"/><child link="tip"/></joint>
</robot>"#,
        )
        .unwrap();

        let config = LoaderConfig {
            filesystem_root: Some(temp.path().to_path_buf()),
            ..LoaderConfig::default()
        };
        let loader = DescriptionLoader::new(config.clone())
            .with_resolver(PathResolver::with_locator(&config, RootedLocator::new(temp.path())));
        let loaded = loader.load_file(&urdf).unwrap();

        assert_eq!(loaded.visual_count(), 2);
        // Both visuals share one cached mesh
        assert_eq!(loader.geometry_loader().cached_count(), 1);
    }

    #[test]
    fn test_load_file_missing() {
        let result = DescriptionLoader::default().load_file("/nonexistent/robot.urdf");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_parse_failure_propagates() {
        let result = recording_loader().load_str("<robot>");
        assert!(matches!(result, Err(LoadError::Xml(_))));
    }
}
