use std::path::Path;

use glam::Vec3;

use super::extension_lowercase;
use crate::error::AssetError;

/// Indexed triangle mesh. `uvs` is either empty or one per position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned bounds as `(min, max)`, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.positions.iter().copied().map(Vec3::from);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), point| {
            (min.min(point), max.max(point))
        }))
    }

    pub fn uv(&self, index: usize) -> [f32; 2] {
        self.uvs.get(index).copied().unwrap_or([0.0, 0.0])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<MeshData>,
}

impl Model {
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

/// Loads an `.obj`, `.gltf` or `.glb` file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    match extension_lowercase(path).as_deref() {
        Some("obj") => load_obj(path),
        Some("gltf" | "glb") => load_gltf(path),
        _ => Err(AssetError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn load_obj(path: &Path) -> Result<Model, AssetError> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, _materials) =
        tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            MeshData {
                positions: mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| [p[0], p[1], p[2]])
                    .collect(),
                // OBJ puts v = 0 at the bottom of the image.
                uvs: mesh
                    .texcoords
                    .chunks_exact(2)
                    .map(|t| [t[0], 1.0 - t[1]])
                    .collect(),
                indices: mesh.indices,
            }
        })
        .filter(|mesh| !mesh.indices.is_empty())
        .collect();

    Ok(Model { meshes })
}

fn load_gltf(path: &Path) -> Result<Model, AssetError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let uvs = reader
                .read_tex_coords(0)
                .map(|coords| coords.into_f32().collect())
                .unwrap_or_default();
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            meshes.push(MeshData {
                positions,
                uvs,
                indices,
            });
        }
    }

    Ok(Model { meshes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUAD_OBJ: &str = "\
o quad
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn obj_quad_is_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        fs::write(&path, QUAD_OBJ).unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.mesh_count(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.uv(0), [0.0, 1.0]);
        assert_eq!(
            mesh.bounds(),
            Some((Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn missing_obj_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_model(dir.path().join("cottage_obj.obj"));
        assert!(matches!(result, Err(AssetError::Obj { .. })));
    }

    #[test]
    fn recognised_but_unsupported_formats() {
        for name in ["voxels.vox", "rig.iqm", "bot.m3d", "notes.txt"] {
            let result = load_model(name);
            assert!(matches!(result, Err(AssetError::UnsupportedFormat(_))), "{name}");
        }
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert_eq!(MeshData::default().bounds(), None);
        assert_eq!(MeshData::default().uv(3), [0.0, 0.0]);
    }
}
