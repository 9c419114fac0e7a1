use crate::error::{DeformError, Result};
use nalgebra::{Transform3, Vector3};
use regex::Regex;
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

/// Rest positions plus triangle topology, the two inputs the simulator
/// takes from its asset source.
pub type LoadedMesh = (Vec<Vector3<f32>>, Vec<[u16; 3]>);

/// Loads the `v`/`f` subset of an OBJ file. Faces must be triangles with
/// plain 1-based indices.
pub fn load_mesh_with_transform(
  path: &Path,
  transform: Option<&Transform3<f32>>,
) -> Result<LoadedMesh> {
  let reader = BufReader::new(File::open(path)?);

  let vertex_re =
    Regex::new(r"^v +(-?\d*\.?\d+) +(-?\d*\.?\d+) +(-?\d*\.?\d+)").unwrap();
  let face_re = Regex::new(r"^f +(\d+) +(\d+) +(\d+)").unwrap();

  let mut vertices = Vec::new();
  let mut triangles = Vec::new();

  for line in reader.lines() {
    let line = line?;
    if let Some(matchs) = vertex_re.captures(&line) {
      debug_assert_eq!(matchs.len(), 4);

      let iter = matchs
        .iter()
        .skip(1)
        .map(|v| v.unwrap().as_str().parse().unwrap());

      let mut vert = Vector3::zeros();

      for (i, val) in iter.enumerate() {
        vert[i] = val;
      }

      if let Some(transform) = transform {
        vert = transform * vert;
      }

      vertices.push(vert);
    } else if let Some(matchs) = face_re.captures(&line) {
      debug_assert_eq!(matchs.len(), 4);

      let iter = matchs
        .iter()
        .skip(1)
        .map(|v| v.unwrap().as_str().parse::<u32>().unwrap());

      let mut triangle = [0; 3];

      for (i, val) in iter.enumerate() {
        if val == 0 {
          return Err(DeformError::InvalidTopology(format!(
            "face index must be 1-based: {}",
            line
          )));
        }
        // indices are 16 bit, refuse to wrap instead of garbling topology
        if val - 1 > u16::MAX as u32 {
          return Err(DeformError::InvalidTopology(format!(
            "face index exceeds 16-bit topology: {}",
            line
          )));
        }
        triangle[i] = (val - 1) as u16;
      }

      triangles.push(triangle);
    }
  }

  Ok((vertices, triangles))
}

pub fn load_mesh(path: &Path) -> Result<LoadedMesh> {
  load_mesh_with_transform(path, None)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use std::path::PathBuf;

  fn write_obj(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();

    path
  }

  #[test]
  fn loads_triangle_obj() {
    let path = write_obj(
      "jellymesh_loader_basic.obj",
      "v 0 0 0\nv 1.5 0 0\nv 0 -1.5 0\nf 1 2 3\n",
    );

    let (vertices, triangles) = load_mesh(&path).unwrap();

    assert_eq!(vertices.len(), 3);
    assert_eq!(vertices[1], Vector3::new(1.5, 0.0, 0.0));
    assert_eq!(triangles, vec![[0, 1, 2]]);
  }

  #[test]
  fn rejects_zero_face_index() {
    let path = write_obj(
      "jellymesh_loader_zero_index.obj",
      "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n",
    );

    let result = load_mesh(&path);

    assert!(matches!(result, Err(DeformError::InvalidTopology(_))));
  }

  #[test]
  fn rejects_face_index_above_16_bits() {
    // 65539 would wrap to index 3 if cast blindly
    let path = write_obj(
      "jellymesh_loader_wide_index.obj",
      "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 65540 1 2\n",
    );

    let result = load_mesh(&path);

    assert!(matches!(result, Err(DeformError::InvalidTopology(_))));
  }

  #[test]
  fn accepts_largest_16_bit_face_index() {
    let path = write_obj(
      "jellymesh_loader_max_index.obj",
      "v 0 0 0\nf 65536 65536 65536\n",
    );

    let (_, triangles) = load_mesh(&path).unwrap();

    assert_eq!(triangles, vec![[u16::MAX, u16::MAX, u16::MAX]]);
  }
}
