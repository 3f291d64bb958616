//! OBJ mesh file loading

use std::path::{Path, PathBuf};

use super::{MeshData, MeshError, MeshUnit, calculate_face_normals};

/// Load an OBJ file, merging all of its models into one mesh
pub fn load_obj(path: impl AsRef<Path>, unit: MeshUnit) -> Result<MeshData, MeshError> {
    let path = path.as_ref();

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| match e {
        tobj::LoadError::OpenFileFailed => MeshError::Io(format!("cannot open {}", path.display())),
        other => MeshError::Parse(other.to_string()),
    })?;

    if models.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let scale = unit.scale_factor();
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let vertex_offset = vertices.len() as u32;

        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|c| [c[0] * scale, c[1] * scale, c[2] * scale]),
        );
        indices.extend(mesh.indices.iter().map(|&idx| vertex_offset + idx));
    }

    if indices.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // OBJ normals are per-vertex; keep one per triangle like STL
    let normals = calculate_face_normals(&vertices, &indices);

    // A missing .mtl file only means "no texture"
    let texture = materials
        .ok()
        .and_then(|mats| mats.into_iter().find_map(|m| m.diffuse_texture))
        .map(|name| texture_path(path, &name));

    let mut data = MeshData::new(path, vertices, normals, indices);
    data.texture = texture;
    Ok(data)
}

/// Texture names in .mtl files are relative to the OBJ file
fn texture_path(obj_path: &Path, name: &str) -> PathBuf {
    obj_path
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
