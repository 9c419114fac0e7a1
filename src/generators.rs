use crate::LoadedMesh;
use nalgebra::Vector3;

/// UV sphere centered at the origin, wound so that area-weighted vertex
/// normals point outward. The seam column and pole rows duplicate
/// vertices, matching the usual UV layout.
pub fn uv_sphere(radius: f32, stacks: usize, slices: usize) -> LoadedMesh {
  let vertex_count = (stacks + 1) * (slices + 1);
  // topology indices are 16 bit
  assert!(vertex_count <= u16::MAX as usize + 1);

  let mut vertices = Vec::with_capacity(vertex_count);
  let mut triangles = Vec::with_capacity(stacks * slices * 2);

  for i in 0..=stacks {
    let phi = std::f32::consts::PI * i as f32 / stacks as f32;

    for j in 0..=slices {
      let theta = 2.0 * std::f32::consts::PI * j as f32 / slices as f32;

      vertices.push(
        radius
          * Vector3::new(
            phi.sin() * theta.cos(),
            phi.cos(),
            phi.sin() * theta.sin(),
          ),
      );
    }
  }

  for i in 0..stacks {
    for j in 0..slices {
      let a = (i * (slices + 1) + j) as u16;
      let b = a + (slices + 1) as u16;

      // skip the degenerate triangles at the poles
      if i != 0 {
        triangles.push([a, a + 1, b]);
      }

      if i != stacks - 1 {
        triangles.push([a + 1, b + 1, b]);
      }
    }
  }

  (vertices, triangles)
}

/// Cube of the given edge length centered at the origin, each face a
/// `subdiv x subdiv` quad grid. Face boundaries duplicate vertices.
pub fn cube_grid(subdiv: usize, size: f32) -> LoadedMesh {
  // (outward normal, u tangent, v tangent), with u x v = normal
  let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
    (Vector3::x(), Vector3::y(), Vector3::z()),
    (-Vector3::x(), Vector3::z(), Vector3::y()),
    (Vector3::y(), Vector3::z(), Vector3::x()),
    (-Vector3::y(), Vector3::x(), Vector3::z()),
    (Vector3::z(), Vector3::x(), Vector3::y()),
    (-Vector3::z(), Vector3::y(), Vector3::x()),
  ];

  let verts_per_side = subdiv + 1;
  let vertex_count = 6 * verts_per_side * verts_per_side;
  // topology indices are 16 bit
  assert!(vertex_count <= u16::MAX as usize + 1);

  let mut vertices = Vec::with_capacity(vertex_count);
  let mut triangles = Vec::with_capacity(6 * subdiv * subdiv * 2);

  for (normal, u_axis, v_axis) in faces.iter() {
    let base = vertices.len() as u16;

    for j in 0..verts_per_side {
      for i in 0..verts_per_side {
        let u = i as f32 / subdiv as f32 - 0.5;
        let v = j as f32 / subdiv as f32 - 0.5;

        vertices.push(size * (0.5 * normal + u * u_axis + v * v_axis));
      }
    }

    for j in 0..subdiv {
      for i in 0..subdiv {
        let a = base + (j * verts_per_side + i) as u16;
        let b = a + verts_per_side as u16;

        triangles.push([a, a + 1, b]);
        triangles.push([a + 1, b + 1, b]);
      }
    }
  }

  (vertices, triangles)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sphere_counts_and_indices() {
    let stacks = 8;
    let slices = 12;
    let (vertices, triangles) = uv_sphere(1.0, stacks, slices);

    assert_eq!(vertices.len(), (stacks + 1) * (slices + 1));
    assert_eq!(triangles.len(), stacks * slices * 2 - 2 * slices);

    for triangle in &triangles {
      for idx in triangle {
        assert!((*idx as usize) < vertices.len());
      }
    }

    for vertex in &vertices {
      assert!((vertex.norm() - 1.0).abs() < 1e-5);
    }
  }

  #[test]
  fn cube_counts_and_indices() {
    let subdiv = 3;
    let (vertices, triangles) = cube_grid(subdiv, 1.0);

    assert_eq!(vertices.len(), 6 * (subdiv + 1) * (subdiv + 1));
    assert_eq!(triangles.len(), 6 * subdiv * subdiv * 2);

    for triangle in &triangles {
      for idx in triangle {
        assert!((*idx as usize) < vertices.len());
      }
    }

    // every vertex lies on the surface of the cube
    for vertex in &vertices {
      let max_coord = vertex
        .iter()
        .map(|c| c.abs())
        .fold(0.0f32, |acc, c| acc.max(c));
      assert!((max_coord - 0.5).abs() < 1e-6);
    }
  }

  #[test]
  #[should_panic]
  fn sphere_rejects_16_bit_overflow() {
    // (257)^2 vertices cannot be indexed by u16
    uv_sphere(1.0, 256, 256);
  }

  #[test]
  #[should_panic]
  fn cube_rejects_16_bit_overflow() {
    // 6 * 105^2 vertices cannot be indexed by u16
    cube_grid(104, 1.0);
  }
}
