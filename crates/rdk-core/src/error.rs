//! Load-level errors

/// Errors that fail a whole description load
///
/// Sub-element problems (dangling joints, unresolvable meshes, malformed
/// numbers) are recovered locally and only logged; they never show up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse XML: {0}")]
    Xml(String),

    #[error("Unsupported document root <{0}> (expected <robot> or <sdf>)")]
    UnsupportedRoot(String),

    #[error("SDF document has no <model> element")]
    MissingModel,

    #[error("No root link found (no links, or every link has a parent)")]
    NoRoot,

    #[error("Multiple root links: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("Duplicate link name: '{0}'")]
    DuplicateLink(String),
}

/// Configuration file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LoadError::UnsupportedRoot("world".into()).to_string(),
            "Unsupported document root <world> (expected <robot> or <sdf>)"
        );
        assert_eq!(
            LoadError::MultipleRoots(vec!["base".into(), "island".into()]).to_string(),
            "Multiple root links: base, island"
        );
        assert_eq!(
            LoadError::DuplicateLink("link_1".into()).to_string(),
            "Duplicate link name: 'link_1'"
        );
    }
}
