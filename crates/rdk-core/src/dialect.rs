//! URDF / SDF encoding differences
//!
//! The two dialects carry the same information in different places: URDF
//! prefers attributes (`<parent link="base"/>`), SDF prefers child element
//! text (`<parent>base</parent>`). Each field lists its encodings in
//! preference order; the first one present on the element is used.

use glam::Vec3;
use roxmltree::Node;

use crate::frame::Pose;
use crate::math::{parse_floats, parse_vec3};

/// Description dialect of a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `<robot>` root
    Urdf,
    /// `<sdf><model>` root
    Sdf,
}

/// One place a value can be encoded on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Attribute on the element: `<parent link="base"/>`
    Attribute(&'static str),
    /// Attribute on a child element: `<material><color rgba="..."/></material>`
    ChildAttribute(&'static str, &'static str),
    /// Text of a child element: `<axis><xyz>0 0 1</xyz></axis>`
    ChildText(&'static str),
    /// Text of the element itself: `<parent>base</parent>`
    Text,
}

impl FieldSource {
    /// Read the trimmed, non-empty value from `node`
    pub fn read<'a>(self, node: Node<'a, '_>) -> Option<&'a str> {
        let raw = match self {
            FieldSource::Attribute(name) => node.attribute(name),
            FieldSource::ChildAttribute(tag, name) => {
                child(node, tag).and_then(|c| c.attribute(name))
            }
            FieldSource::ChildText(tag) => child(node, tag).and_then(|c| c.text()),
            FieldSource::Text => node.text(),
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A field with its encodings in preference order
#[derive(Debug, Clone, Copy)]
pub struct Field(pub &'static [FieldSource]);

impl Field {
    /// Encoding used by `node`, if any
    pub fn source(&self, node: Node<'_, '_>) -> Option<FieldSource> {
        self.0.iter().copied().find(|s| s.read(node).is_some())
    }

    /// Value from the first encoding present on `node`
    pub fn read<'a>(&self, node: Node<'a, '_>) -> Option<&'a str> {
        self.0.iter().find_map(|s| s.read(node))
    }
}

/// Field tables shared by both dialects
pub mod fields {
    use super::{Field, FieldSource::*};

    /// `<parent link=".."/>` / `<parent>..</parent>` (same for `<child>`)
    pub const LINK_REF: Field = Field(&[Attribute("link"), Text]);
    /// `<mesh filename=".."/>` / `<mesh><uri>..</uri></mesh>`
    pub const MESH_URI: Field = Field(&[Attribute("filename"), ChildText("uri")]);
    pub const MESH_SCALE: Field = Field(&[Attribute("scale"), ChildText("scale")]);
    /// `<axis xyz=".."/>` / `<axis><xyz>..</xyz></axis>`
    pub const AXIS_XYZ: Field = Field(&[Attribute("xyz"), ChildText("xyz")]);
    /// `<material><color rgba=".."/></material>` / `<material><diffuse>..</diffuse></material>`
    pub const MATERIAL_COLOR: Field =
        Field(&[ChildAttribute("color", "rgba"), ChildText("diffuse")]);
    pub const LIMIT_LOWER: Field = Field(&[Attribute("lower"), ChildText("lower")]);
    pub const LIMIT_UPPER: Field = Field(&[Attribute("upper"), ChildText("upper")]);
    pub const LIMIT_EFFORT: Field = Field(&[Attribute("effort"), ChildText("effort")]);
    pub const LIMIT_VELOCITY: Field = Field(&[Attribute("velocity"), ChildText("velocity")]);
}

/// Where a construct's local pose is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseEncoding {
    /// `<origin xyz=".." rpy=".."/>`
    OriginAttributes,
    /// `<pose>x y z roll pitch yaw</pose>`
    PoseText,
}

impl PoseEncoding {
    /// Encoding present on `node`, preferring `<origin>`
    pub fn detect(node: Node<'_, '_>) -> Option<Self> {
        if child(node, "origin").is_some() {
            Some(PoseEncoding::OriginAttributes)
        } else if child(node, "pose").is_some() {
            Some(PoseEncoding::PoseText)
        } else {
            None
        }
    }

    pub fn read(self, node: Node<'_, '_>) -> Pose {
        match self {
            PoseEncoding::OriginAttributes => {
                let Some(origin) = child(node, "origin") else {
                    return Pose::default();
                };
                let xyz = origin.attribute("xyz").map(parse_vec3).unwrap_or(Vec3::ZERO);
                let rpy = origin.attribute("rpy").map(parse_vec3).unwrap_or(Vec3::ZERO);
                Pose::new(xyz, rpy)
            }
            PoseEncoding::PoseText => {
                let text = child(node, "pose").and_then(|p| p.text()).unwrap_or("");
                Pose::from_six(parse_floats::<6>(text))
            }
        }
    }
}

/// Local pose of `node`, identity when neither encoding is present
pub fn read_pose(node: Node<'_, '_>) -> Pose {
    PoseEncoding::detect(node)
        .map(|encoding| encoding.read(node))
        .unwrap_or_default()
}

/// First child element with the given tag
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

/// All child elements with the given tag, in document order
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_link_ref_prefers_attribute() {
        let doc = Document::parse(r#"<parent link="base">ignored</parent>"#).unwrap();
        let node = doc.root_element();
        assert_eq!(fields::LINK_REF.read(node), Some("base"));
        assert_eq!(fields::LINK_REF.source(node), Some(FieldSource::Attribute("link")));
    }

    #[test]
    fn test_link_ref_falls_back_to_text() {
        let doc = Document::parse("<parent>\n  base  \n</parent>").unwrap();
        let node = doc.root_element();
        assert_eq!(fields::LINK_REF.read(node), Some("base"));
        assert_eq!(fields::LINK_REF.source(node), Some(FieldSource::Text));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let doc = Document::parse(r#"<parent link=""/>"#).unwrap();
        assert_eq!(fields::LINK_REF.read(doc.root_element()), None);
    }

    #[test]
    fn test_mesh_uri_both_dialects() {
        let urdf = Document::parse(r#"<mesh filename="package://r/m.stl"/>"#).unwrap();
        let sdf = Document::parse("<mesh><uri>model://r/m.stl</uri></mesh>").unwrap();
        assert_eq!(fields::MESH_URI.read(urdf.root_element()), Some("package://r/m.stl"));
        assert_eq!(fields::MESH_URI.read(sdf.root_element()), Some("model://r/m.stl"));
    }

    #[test]
    fn test_material_color_sources() {
        let urdf = Document::parse(r#"<material><color rgba="1 0 0 1"/></material>"#).unwrap();
        let sdf = Document::parse("<material><diffuse>0 1 0 1</diffuse></material>").unwrap();
        assert_eq!(fields::MATERIAL_COLOR.read(urdf.root_element()), Some("1 0 0 1"));
        assert_eq!(fields::MATERIAL_COLOR.read(sdf.root_element()), Some("0 1 0 1"));
    }

    #[test]
    fn test_read_pose_origin_attributes() {
        let doc =
            Document::parse(r#"<joint><origin xyz="0 0 0.1575" rpy="0 0 1"/></joint>"#).unwrap();
        let node = doc.root_element();
        assert_eq!(PoseEncoding::detect(node), Some(PoseEncoding::OriginAttributes));
        let pose = read_pose(node);
        assert_eq!(pose.xyz, Vec3::new(0.0, 0.0, 0.1575));
        assert_eq!(pose.rpy, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_read_pose_missing_rpy_is_zero() {
        let doc = Document::parse(r#"<visual><origin xyz="1 2 3"/></visual>"#).unwrap();
        let pose = read_pose(doc.root_element());
        assert_eq!(pose.rpy, Vec3::ZERO);
    }

    #[test]
    fn test_read_pose_six_float_text() {
        let doc = Document::parse("<visual><pose>1 2 3 0.1 0.2 0.3</pose></visual>").unwrap();
        let node = doc.root_element();
        assert_eq!(PoseEncoding::detect(node), Some(PoseEncoding::PoseText));
        assert_eq!(read_pose(node), Pose::from_six([1.0, 2.0, 3.0, 0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_read_pose_absent_is_identity() {
        let doc = Document::parse("<visual/>").unwrap();
        assert!(read_pose(doc.root_element()).is_identity());
    }
}
