//! Robot Description Kit Core
//!
//! Loads URDF and SDF robot descriptions into a kinematic tree and evaluates
//! forward kinematics for rendering:
//! - Parser: dual-dialect XML to flat link/joint declarations
//! - PathResolver: mesh references to files in the local asset store
//! - KinematicTree: arena of links with parent/child indices
//! - ForwardKinematics: per-link joint frames and per-visual world transforms
//! - Robot: owns a loaded tree and its joint angles

pub mod config;
pub mod constants;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod kinematics;
pub mod loader;
pub mod math;
pub mod mesh;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod robot;
pub mod tree;

pub use config::*;
pub use constants::*;
pub use dialect::{Dialect, Field, FieldSource, PoseEncoding};
pub use error::*;
pub use frame::*;
pub use kinematics::*;
pub use loader::*;
pub use mesh::*;
pub use model::*;
pub use parser::*;
pub use resolve::*;
pub use robot::*;
pub use tree::*;
