//! Mesh path resolution
//!
//! Maps a description-internal mesh reference (`package://...`, `file://...`
//! or a raw relative path) onto the local asset store. This is a best-effort
//! remap: it always produces a path, and a wrong guess surfaces later as a
//! mesh-import failure for that one visual.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::constants::{FILE_SCHEME, PACKAGE_SCHEME};

/// Replace a known-wrong vendor prefix with a local asset directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRemap {
    pub from: String,
    pub to: String,
}

impl PrefixRemap {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Replace the first occurrence of `from`, if any
    fn apply(&self, path: &str) -> Option<String> {
        if self.from.is_empty() {
            return None;
        }
        path.find(&self.from).map(|pos| {
            let mut out = String::with_capacity(path.len() + self.to.len());
            out.push_str(&path[..pos]);
            out.push_str(&self.to);
            out.push_str(&path[pos + self.from.len()..]);
            out
        })
    }
}

/// Turns a path relative to the asset store into a loadable absolute path
pub trait AssetLocator {
    fn locate(&self, relative: &Path) -> PathBuf;
}

/// Locator that joins paths onto a fixed filesystem root
#[derive(Debug, Clone)]
pub struct RootedLocator {
    root: PathBuf,
}

impl RootedLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLocator for RootedLocator {
    fn locate(&self, relative: &Path) -> PathBuf {
        let joined = self.root.join(relative);
        std::path::absolute(&joined).unwrap_or(joined)
    }
}

/// Resolves mesh references to loadable paths
#[derive(Debug, Clone)]
pub struct PathResolver<L = RootedLocator> {
    asset_root: String,
    remaps: Vec<PrefixRemap>,
    package_paths: HashMap<String, PathBuf>,
    locator: L,
}

impl PathResolver<RootedLocator> {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::with_locator(
            config,
            RootedLocator::new(config.effective_filesystem_root()),
        )
    }
}

impl<L: AssetLocator> PathResolver<L> {
    pub fn with_locator(config: &LoaderConfig, locator: L) -> Self {
        Self {
            asset_root: config.asset_root.clone(),
            remaps: config.prefix_remaps.clone(),
            package_paths: config.package_paths.clone(),
            locator,
        }
    }

    /// Resolve a mesh reference to an absolute path
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let reference = reference.trim();

        if let Some(rest) = reference.strip_prefix(PACKAGE_SCHEME) {
            if let Some(path) = self.resolve_explicit_package(rest) {
                tracing::debug!("Resolved '{}' via package path: {}", reference, path.display());
                return path;
            }
            return self.resolve_relative(rest, reference);
        }

        let stripped = reference.strip_prefix(FILE_SCHEME).unwrap_or(reference);
        if Path::new(stripped).is_absolute() {
            tracing::debug!("Resolved '{}' as absolute path", reference);
            return PathBuf::from(stripped);
        }

        self.resolve_relative(stripped, reference)
    }

    /// `package://<name>/<rest>` with an explicitly configured package root
    fn resolve_explicit_package(&self, rest: &str) -> Option<PathBuf> {
        let (package_name, relative) = rest.split_once('/')?;
        let root = self.package_paths.get(package_name)?;
        Some(self.locator.locate(&root.join(relative)))
    }

    fn resolve_relative(&self, path: &str, original: &str) -> PathBuf {
        let mapped = self
            .remaps
            .iter()
            .find_map(|remap| remap.apply(path))
            .unwrap_or_else(|| join_asset_root(&self.asset_root, path));

        let resolved = self.locator.locate(Path::new(&mapped));
        tracing::debug!("Resolved '{}' -> {}", original, resolved.display());
        resolved
    }
}

fn join_asset_root(asset_root: &str, path: &str) -> String {
    let root = asset_root.trim_end_matches('/');
    if root.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", root, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        let config = LoaderConfig {
            filesystem_root: Some(PathBuf::from("/project")),
            ..LoaderConfig::default()
        };
        PathResolver::with_locator(&config, RootedLocator::new("/project"))
    }

    #[test]
    fn test_strips_package_and_remaps_vendor_prefix() {
        let path = resolver().resolve(
            "package://drake_models/iiwa_description/meshes/iiwa14/visual/link_1.obj",
        );
        assert_eq!(
            path,
            PathBuf::from("/project/assets/kuka/meshes/iiwa14/visual/link_1.obj")
        );
    }

    #[test]
    fn test_unknown_package_gets_asset_root() {
        let path = resolver().resolve("package://other_robot/meshes/base.stl");
        assert_eq!(path, PathBuf::from("/project/assets/other_robot/meshes/base.stl"));
    }

    #[test]
    fn test_raw_relative_path_gets_asset_root() {
        let path = resolver().resolve("meshes/base.stl");
        assert_eq!(path, PathBuf::from("/project/assets/meshes/base.stl"));
    }

    #[test]
    fn test_vendor_prefix_inside_relative_path() {
        let path = resolver().resolve("models/drake_models/iiwa_description/link_0.stl");
        assert_eq!(path, PathBuf::from("/project/models/assets/kuka/link_0.stl"));
    }

    #[test]
    fn test_absolute_and_file_uri_pass_through() {
        let r = resolver();
        assert_eq!(r.resolve("/data/mesh.stl"), PathBuf::from("/data/mesh.stl"));
        assert_eq!(r.resolve("file:///data/mesh.stl"), PathBuf::from("/data/mesh.stl"));
    }

    #[test]
    fn test_explicit_package_path_takes_precedence() {
        let mut config = LoaderConfig::default();
        config.add_package_path("drake_models", "/opt/drake_models");
        let r = PathResolver::with_locator(&config, RootedLocator::new("/project"));

        let path = r.resolve("package://drake_models/iiwa_description/meshes/link_1.obj");
        assert_eq!(
            path,
            PathBuf::from("/opt/drake_models/iiwa_description/meshes/link_1.obj")
        );
    }

    #[test]
    fn test_relative_root_is_absolutised() {
        let config = LoaderConfig::default();
        let r = PathResolver::with_locator(&config, RootedLocator::new("relative_root"));
        assert!(r.resolve("meshes/base.stl").is_absolute());
    }

    #[test]
    fn test_first_matching_remap_wins() {
        let config = LoaderConfig {
            prefix_remaps: vec![
                PrefixRemap::new("vendor/", "assets/first/"),
                PrefixRemap::new("vendor/", "assets/second/"),
            ],
            ..LoaderConfig::default()
        };
        let r = PathResolver::with_locator(&config, RootedLocator::new("/p"));
        assert_eq!(r.resolve("vendor/a.stl"), PathBuf::from("/p/assets/first/a.stl"));
    }
}
