//! Description document parsing
//!
//! Turns URDF (`<robot>`) or SDF (`<sdf><model>`) text into a flat list of
//! link and joint declarations. No files are touched here: mesh references
//! stay unresolved strings and joints stay name references, so this stage is
//! testable without assets and without tree building.

use std::collections::HashMap;

use glam::Vec3;
use roxmltree::Node;

use crate::dialect::{Dialect, Field, child, children, fields, read_pose};
use crate::error::LoadError;
use crate::frame::Pose;
use crate::math::{parse_f32, parse_rgb, parse_vec3, parse_vec3_strict};
use crate::model::{JointKind, JointLimits};

/// Parsed document before geometry import and tree building
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub name: String,
    pub dialect: Dialect,
    /// Named materials declared at document level
    pub materials: HashMap<String, Vec3>,
    pub links: Vec<LinkDecl>,
    pub joints: Vec<JointDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDecl {
    pub name: String,
    pub visuals: Vec<VisualDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualDecl {
    pub name: Option<String>,
    pub origin: Pose,
    /// Unresolved mesh reference as written in the document
    pub mesh: String,
    pub scale: Vec3,
    /// Inline or library color; `None` means "use the default"
    pub color: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointDecl {
    pub name: String,
    pub kind: JointKind,
    pub parent: Option<String>,
    pub child: Option<String>,
    pub origin: Pose,
    pub axis: Vec3,
    pub limits: Option<JointLimits>,
}

/// Parse a description document
pub fn parse_description(xml: &str) -> Result<Description, LoadError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| LoadError::Xml(e.to_string()))?;

    let (dialect, root) = find_model_root(doc.root_element())?;
    let name = root.attribute("name").unwrap_or_default().to_string();
    let materials = collect_materials(root);

    let links = children(root, "link")
        .map(|node| parse_link(node, &materials))
        .collect();
    let joints = children(root, "joint").map(parse_joint).collect();

    Ok(Description {
        name,
        dialect,
        materials,
        links,
        joints,
    })
}

/// `<robot>` is its own root; `<sdf>` is unwrapped to its `<model>`
fn find_model_root<'a, 'input>(
    top: Node<'a, 'input>,
) -> Result<(Dialect, Node<'a, 'input>), LoadError> {
    match top.tag_name().name() {
        "robot" => Ok((Dialect::Urdf, top)),
        "sdf" => {
            let mut models = children(top, "model");
            let model = models.next().ok_or(LoadError::MissingModel)?;
            if models.next().is_some() {
                tracing::warn!(
                    "SDF document has several <model> elements; using '{}'",
                    model.attribute("name").unwrap_or_default()
                );
            }
            Ok((Dialect::Sdf, model))
        }
        other => Err(LoadError::UnsupportedRoot(other.to_string())),
    }
}

/// Collect document-level `<material name="..">` declarations
fn collect_materials(root: Node) -> HashMap<String, Vec3> {
    let mut materials = HashMap::new();
    for node in children(root, "material") {
        let (Some(name), Some(rgba)) = (node.attribute("name"), fields::MATERIAL_COLOR.read(node))
        else {
            continue;
        };
        if materials.contains_key(name) {
            tracing::warn!("Duplicate material '{}' ignored", name);
            continue;
        }
        materials.insert(name.to_string(), parse_rgb(rgba));
    }
    materials
}

fn parse_link(node: Node, materials: &HashMap<String, Vec3>) -> LinkDecl {
    let name = node.attribute("name").unwrap_or_default().to_string();
    let visuals = children(node, "visual")
        .filter_map(|visual| parse_visual(visual, &name, materials))
        .collect();
    LinkDecl { name, visuals }
}

/// Parse a `<visual>`; visuals without a mesh reference are dropped
fn parse_visual(
    node: Node,
    link_name: &str,
    materials: &HashMap<String, Vec3>,
) -> Option<VisualDecl> {
    let mesh_node = child(node, "geometry").and_then(|g| child(g, "mesh"));
    let Some(mesh) = mesh_node.and_then(|m| fields::MESH_URI.read(m)) else {
        tracing::warn!("Link '{}': visual has no mesh filename, dropped", link_name);
        return None;
    };

    let scale = mesh_node
        .and_then(|m| fields::MESH_SCALE.read(m))
        .and_then(parse_vec3_strict)
        .unwrap_or(Vec3::ONE);

    Some(VisualDecl {
        name: node.attribute("name").map(str::to_string),
        origin: read_pose(node),
        mesh: mesh.to_string(),
        scale,
        color: visual_color(node, materials),
    })
}

/// Inline color first, then the named library material
fn visual_color(visual: Node, materials: &HashMap<String, Vec3>) -> Option<Vec3> {
    let material = child(visual, "material")?;
    if let Some(rgba) = fields::MATERIAL_COLOR.read(material) {
        return Some(parse_rgb(rgba));
    }
    material
        .attribute("name")
        .and_then(|name| materials.get(name))
        .copied()
}

fn parse_joint(node: Node) -> JointDecl {
    let link_ref = |tag: &str| {
        child(node, tag)
            .and_then(|n| fields::LINK_REF.read(n))
            .map(str::to_string)
    };

    let axis_node = child(node, "axis");
    let axis = axis_node
        .and_then(|a| fields::AXIS_XYZ.read(a))
        .map(parse_vec3)
        .unwrap_or(Vec3::ZERO);

    // URDF: <joint><limit/>, SDF: <joint><axis><limit>
    let limits = child(node, "limit")
        .or_else(|| axis_node.and_then(|a| child(a, "limit")))
        .map(parse_limits);

    JointDecl {
        name: node.attribute("name").unwrap_or_default().to_string(),
        kind: JointKind::parse(node.attribute("type").unwrap_or_default()),
        parent: link_ref("parent"),
        child: link_ref("child"),
        origin: read_pose(node),
        axis,
        limits,
    }
}

fn parse_limits(node: Node) -> JointLimits {
    let value = |field: Field| field.read(node).map(parse_f32).unwrap_or(0.0);
    JointLimits {
        lower: value(fields::LIMIT_LOWER),
        upper: value(fields::LIMIT_UPPER),
        effort: value(fields::LIMIT_EFFORT),
        velocity: value(fields::LIMIT_VELOCITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LINK_URDF: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <material name="orange">
    <color rgba="1 0.5 0 1"/>
  </material>
  <link name="base_link">
    <visual>
      <origin xyz="0 0 0.1" rpy="0 0 1.5"/>
      <geometry>
        <mesh filename="package://drake_models/iiwa_description/meshes/base.obj"/>
      </geometry>
      <material name="grey">
        <color rgba="0.4 0.4 0.4 1.0"/>
      </material>
    </visual>
  </link>
  <link name="link_1">
    <visual>
      <geometry><mesh filename="meshes/link_1.stl" scale="0.001 0.001 0.001"/></geometry>
      <material name="orange"/>
    </visual>
    <visual>
      <geometry><mesh filename="meshes/band.stl"/></geometry>
    </visual>
    <visual>
      <geometry><box size="1 1 1"/></geometry>
    </visual>
  </link>
  <joint name="joint_1" type="revolute">
    <parent link="base_link"/>
    <child link="link_1"/>
    <origin xyz="0 0 0.1575" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-2.96" upper="2.96" effort="320" velocity="1.48"/>
  </joint>
</robot>"#;

    const TWO_LINK_SDF: &str = r#"<?xml version="1.0"?>
<sdf version="1.6">
  <model name="arm">
    <link name="base_link">
      <visual name="base_visual">
        <pose>0 0 0.1 0 0 1.5</pose>
        <geometry><mesh><uri>model://arm/meshes/base.obj</uri><scale>2 2 2</scale></mesh></geometry>
        <material><diffuse>0 1 0 1</diffuse></material>
      </visual>
    </link>
    <link name="link_1"/>
    <joint name="joint_1" type="revolute">
      <parent>base_link</parent>
      <child>link_1</child>
      <pose>0 0 0.1575 0 0 0</pose>
      <axis>
        <xyz>0 0 1</xyz>
        <limit><lower>-1</lower><upper>1</upper></limit>
      </axis>
    </joint>
  </model>
</sdf>"#;

    #[test]
    fn test_parse_urdf_links_and_visuals() {
        let desc = parse_description(TWO_LINK_URDF).unwrap();
        assert_eq!(desc.name, "arm");
        assert_eq!(desc.dialect, Dialect::Urdf);
        assert_eq!(desc.links.len(), 2);

        let base = &desc.links[0];
        assert_eq!(base.name, "base_link");
        assert_eq!(base.visuals.len(), 1);
        let visual = &base.visuals[0];
        assert_eq!(visual.origin.xyz, Vec3::new(0.0, 0.0, 0.1));
        assert_eq!(visual.origin.rpy, Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(
            visual.mesh,
            "package://drake_models/iiwa_description/meshes/base.obj"
        );
        assert_eq!(visual.color, Some(Vec3::new(0.4, 0.4, 0.4)));
        assert_eq!(visual.scale, Vec3::ONE);
    }

    #[test]
    fn test_visual_without_mesh_is_dropped() {
        let desc = parse_description(TWO_LINK_URDF).unwrap();
        let link_1 = &desc.links[1];
        // The <box> visual has no mesh filename
        assert_eq!(link_1.visuals.len(), 2);
        assert_eq!(link_1.visuals[0].scale, Vec3::splat(0.001));
    }

    #[test]
    fn test_material_library_and_missing_material() {
        let desc = parse_description(TWO_LINK_URDF).unwrap();
        assert_eq!(desc.materials["orange"], Vec3::new(1.0, 0.5, 0.0));
        let link_1 = &desc.links[1];
        assert_eq!(link_1.visuals[0].color, Some(Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(link_1.visuals[1].color, None);
    }

    #[test]
    fn test_parse_urdf_joint() {
        let desc = parse_description(TWO_LINK_URDF).unwrap();
        assert_eq!(desc.joints.len(), 1);
        let joint = &desc.joints[0];
        assert_eq!(joint.name, "joint_1");
        assert_eq!(joint.kind, JointKind::Revolute);
        assert_eq!(joint.parent.as_deref(), Some("base_link"));
        assert_eq!(joint.child.as_deref(), Some("link_1"));
        assert_eq!(joint.origin.xyz, Vec3::new(0.0, 0.0, 0.1575));
        assert_eq!(joint.axis, Vec3::Z);
        let limits = joint.limits.unwrap();
        assert_eq!(limits.lower, -2.96);
        assert_eq!(limits.velocity, 1.48);
    }

    #[test]
    fn test_parse_sdf_model() {
        let desc = parse_description(TWO_LINK_SDF).unwrap();
        assert_eq!(desc.dialect, Dialect::Sdf);
        assert_eq!(desc.name, "arm");
        assert_eq!(desc.links.len(), 2);

        let visual = &desc.links[0].visuals[0];
        assert_eq!(visual.name.as_deref(), Some("base_visual"));
        assert_eq!(visual.origin, Pose::from_six([0.0, 0.0, 0.1, 0.0, 0.0, 1.5]));
        assert_eq!(visual.mesh, "model://arm/meshes/base.obj");
        assert_eq!(visual.scale, Vec3::splat(2.0));
        assert_eq!(visual.color, Some(Vec3::Y));

        let joint = &desc.joints[0];
        assert_eq!(joint.parent.as_deref(), Some("base_link"));
        assert_eq!(joint.child.as_deref(), Some("link_1"));
        assert_eq!(joint.origin.xyz, Vec3::new(0.0, 0.0, 0.1575));
        assert_eq!(joint.axis, Vec3::Z);
        assert_eq!(joint.limits.unwrap().upper, 1.0);
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let xml = r#"<robot name="r">
  <link name="a"/>
  <link name="b"/>
  <joint name="j" type="revolute">
    <parent link="a"/><child link="b"/>
    <origin xyz="1 oops 3" rpy="bad"/>
    <axis xyz=""/>
  </joint>
</robot>"#;
        let desc = parse_description(xml).unwrap();
        let joint = &desc.joints[0];
        assert_eq!(joint.origin.xyz, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(joint.origin.rpy, Vec3::ZERO);
        assert_eq!(joint.axis, Vec3::ZERO);
        assert!(joint.limits.is_none());
    }

    #[test]
    fn test_missing_link_reference_is_none() {
        let xml =
            r#"<robot name="r"><link name="a"/><joint name="j"><child link="a"/></joint></robot>"#;
        let desc = parse_description(xml).unwrap();
        assert_eq!(desc.joints[0].parent, None);
        assert_eq!(desc.joints[0].kind, JointKind::Fixed);
    }

    #[test]
    fn test_unsupported_root() {
        let result = parse_description("<world/>");
        assert_eq!(result, Err(LoadError::UnsupportedRoot("world".into())));
    }

    #[test]
    fn test_sdf_without_model() {
        let result = parse_description(r#"<sdf version="1.6"><world name="w"/></sdf>"#);
        assert_eq!(result, Err(LoadError::MissingModel));
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse_description("<robot><link name=\"a\"></robot>");
        assert!(matches!(result, Err(LoadError::Xml(_))));
    }
}
