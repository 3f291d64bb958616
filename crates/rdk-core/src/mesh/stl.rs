//! STL mesh file loading

use std::io::BufReader;
use std::path::Path;

use super::{MeshData, MeshError, MeshUnit};

/// Load an STL file (binary or ASCII)
pub fn load_stl(path: impl AsRef<Path>, unit: MeshUnit) -> Result<MeshData, MeshError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| MeshError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);

    let mesh = stl_io::read_stl(&mut reader).map_err(|e| MeshError::Parse(e.to_string()))?;
    if mesh.faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let scale = unit.scale_factor();
    let vertices = mesh
        .vertices
        .iter()
        .map(|v| [v[0] * scale, v[1] * scale, v[2] * scale])
        .collect();

    let mut normals = Vec::with_capacity(mesh.faces.len());
    let mut indices = Vec::with_capacity(mesh.faces.len() * 3);
    for face in &mesh.faces {
        normals.push([face.normal[0], face.normal[1], face.normal[2]]);
        indices.extend(face.vertices.iter().map(|&i| i as u32));
    }

    Ok(MeshData::new(path, vertices, normals, indices))
}
