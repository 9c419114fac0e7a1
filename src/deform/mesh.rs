use crate::deform::S;
use crate::error::{DeformError, Result};
use crate::LoadedMesh;
use nalgebra::Vector3;

/// Rest positions and triangle topology, validated once and immutable for
/// the lifetime of the simulation.
#[derive(Clone)]
pub struct DeformMesh {
  rest_positions: Vec<Vector3<S>>,
  triangles: Vec<[u16; 3]>,
}

impl DeformMesh {
  pub fn new((rest_positions, triangles): LoadedMesh) -> Result<Self> {
    if rest_positions.is_empty() {
      return Err(DeformError::InvalidTopology(
        "mesh has no vertices".to_owned(),
      ));
    }

    if triangles.is_empty() {
      return Err(DeformError::InvalidTopology(
        "mesh has no triangles".to_owned(),
      ));
    }

    for (triangle_idx, triangle) in triangles.iter().enumerate() {
      for vertex_idx in triangle {
        if *vertex_idx as usize >= rest_positions.len() {
          return Err(DeformError::InvalidTopology(format!(
            "triangle {} references vertex {} but the mesh has {} vertices",
            triangle_idx,
            vertex_idx,
            rest_positions.len()
          )));
        }
      }
    }

    Ok(Self {
      rest_positions,
      triangles,
    })
  }

  pub fn num_vertices(&self) -> usize {
    self.rest_positions.len()
  }

  pub fn rest_positions(&self) -> &[Vector3<S>] {
    &self.rest_positions
  }

  pub fn triangles(&self) -> &[[u16; 3]] {
    &self.triangles
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::DeformError;

  fn unit_triangle() -> Vec<Vector3<S>> {
    vec![
      Vector3::new(0.0, 0.0, 0.0),
      Vector3::new(1.0, 0.0, 0.0),
      Vector3::new(0.0, 1.0, 0.0),
    ]
  }

  #[test]
  fn accepts_valid_topology() {
    let mesh = DeformMesh::new((unit_triangle(), vec![[0, 1, 2]])).unwrap();

    assert_eq!(mesh.num_vertices(), 3);
    assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
  }

  #[test]
  fn rejects_empty_vertices() {
    let result = DeformMesh::new((Vec::new(), vec![[0, 1, 2]]));

    assert!(matches!(result, Err(DeformError::InvalidTopology(_))));
  }

  #[test]
  fn rejects_empty_triangles() {
    let result = DeformMesh::new((unit_triangle(), Vec::new()));

    assert!(matches!(result, Err(DeformError::InvalidTopology(_))));
  }

  #[test]
  fn rejects_out_of_range_index() {
    let result = DeformMesh::new((unit_triangle(), vec![[0, 1, 3]]));

    assert!(matches!(result, Err(DeformError::InvalidTopology(_))));
  }
}
