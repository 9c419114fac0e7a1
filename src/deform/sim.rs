use crate::deform::{DeformMesh, S};
use crate::error::{DeformError, Result};
use nalgebra::Vector3;
use rayon::prelude::*;

#[cfg(test)]
use crate::assert_float_eq;
#[cfg(test)]
use crate::generators::{cube_grid, uv_sphere};
#[cfg(test)]
use proptest::prelude::*;
#[cfg(test)]
use proptest_derive::Arbitrary;

#[derive(Debug, Clone, PartialEq)]
pub struct DeformParams {
  pub spring_force: S,
  pub damping: S,
  pub uniform_scale: S,
}

/// Ephemeral per-tick point force, already converted to local space by the
/// host.
#[derive(Debug, Clone, PartialEq)]
pub struct Impulse {
  pub point: Vector3<S>,
  pub magnitude: S,
}

#[derive(Clone)]
pub struct DeformState {
  pub displaced: Vec<Vector3<S>>, // per vertex
  pub velocities: Vec<Vector3<S>>, // per vertex
  pub normals: Vec<Vector3<S>>,   // per vertex
}

/// Spring-damper vertex deformation over an immutable triangle topology.
///
/// Owns all per-vertex state between construction and `teardown`. Every
/// vertex update reads only its own pre-step values, so steps are
/// order-independent and run in parallel past the size threshold.
pub struct Simulator {
  mesh: DeformMesh,
  state: Option<DeformState>,
}

impl Simulator {
  pub fn new(mesh: DeformMesh) -> Self {
    let num_vertices = mesh.num_vertices();

    let state = DeformState {
      displaced: mesh.rest_positions().to_vec(),
      velocities: vec![Vector3::zeros(); num_vertices],
      normals: vec![Vector3::zeros(); num_vertices],
    };

    Self {
      mesh,
      state: Some(state),
    }
  }

  pub fn mesh(&self) -> &DeformMesh {
    &self.mesh
  }

  pub fn state(&self) -> Result<&DeformState> {
    self.state.as_ref().ok_or(DeformError::NotInitialized)
  }

  /// Releases all per-vertex state. Later calls fail with `NotInitialized`.
  pub fn teardown(&mut self) {
    self.state = None;
  }

  fn update_vertex(
    rest: &Vector3<S>,
    displaced: &mut Vector3<S>,
    velocity: &mut Vector3<S>,
    delta_time: S,
    params: &DeformParams,
    impulse: Option<&Impulse>,
  ) {
    let mut accel =
      (rest - *displaced) * params.spring_force / params.uniform_scale;

    if let Some(impulse) = impulse {
      let offset = *displaced - impulse.point;
      let dist_sq = offset.norm_squared();

      // inverse-square falloff, directed radially away from the force
      // point; a vertex coincident with the point has no defined direction
      if dist_sq > 1e-12 {
        accel +=
          offset * (impulse.magnitude / ((1.0 + dist_sq) * dist_sq.sqrt()));
      }
    }

    *velocity += accel * delta_time;
    // floor the decay factor so damping can never invert the velocity
    *velocity *= (1.0 - params.damping * delta_time).max(0.0);
    *displaced += *velocity * delta_time;
  }

  pub fn step(
    &mut self,
    delta_time: S,
    params: &DeformParams,
    impulse: Option<&Impulse>,
  ) -> Result<()> {
    if delta_time <= 0.0 {
      return Err(DeformError::InvalidParameter(format!(
        "delta_time must be positive: {}",
        delta_time
      )));
    }

    if params.spring_force < 0.0 {
      return Err(DeformError::InvalidParameter(format!(
        "spring_force must be non-negative: {}",
        params.spring_force
      )));
    }

    if params.damping < 0.0 {
      return Err(DeformError::InvalidParameter(format!(
        "damping must be non-negative: {}",
        params.damping
      )));
    }

    if params.uniform_scale <= 0.0 {
      return Err(DeformError::InvalidParameter(format!(
        "uniform_scale must be positive: {}",
        params.uniform_scale
      )));
    }

    let state = self.state.as_mut().ok_or(DeformError::NotInitialized)?;
    let rest_positions = self.mesh.rest_positions();

    let use_par = rest_positions.len() > 300;

    if use_par {
      rest_positions
        .par_iter()
        .zip(state.displaced.par_iter_mut())
        .zip(state.velocities.par_iter_mut())
        .for_each(|((rest, displaced), velocity)| {
          Self::update_vertex(
            rest, displaced, velocity, delta_time, params, impulse,
          )
        });
    } else {
      rest_positions
        .iter()
        .zip(state.displaced.iter_mut())
        .zip(state.velocities.iter_mut())
        .for_each(|((rest, displaced), velocity)| {
          Self::update_vertex(
            rest, displaced, velocity, delta_time, params, impulse,
          )
        });
    }

    Ok(())
  }

  fn face_normal(triangle: [u16; 3], positions: &[Vector3<S>]) -> Vector3<S> {
    let a = positions[triangle[0] as usize];
    let edge_1 = positions[triangle[1] as usize] - a;
    let edge_2 = positions[triangle[2] as usize] - a;

    // magnitude is twice the face area
    edge_1.cross(&edge_2)
  }

  /// Area-weighted vertex normals over the displaced positions. Fully
  /// degenerate vertices keep a zero normal.
  pub fn recompute_normals(&mut self) -> Result<()> {
    let state = self.state.as_mut().ok_or(DeformError::NotInitialized)?;
    let triangles = self.mesh.triangles();
    let displaced = &state.displaced;

    let use_par = triangles.len() > 300;

    let face_normals = if use_par {
      triangles
        .par_iter()
        .map(|triangle| Self::face_normal(*triangle, displaced))
        .collect::<Vec<_>>()
    } else {
      triangles
        .iter()
        .map(|triangle| Self::face_normal(*triangle, displaced))
        .collect::<Vec<_>>()
    };

    for normal in state.normals.iter_mut() {
      *normal = Vector3::zeros();
    }

    for (triangle, face_normal) in triangles.iter().zip(&face_normals) {
      for vertex_idx in triangle {
        state.normals[*vertex_idx as usize] += face_normal;
      }
    }

    for normal in state.normals.iter_mut() {
      let len = normal.norm();
      if len > 1e-10 {
        *normal /= len;
      } else {
        *normal = Vector3::zeros();
      }
    }

    Ok(())
  }
}

#[cfg(test)]
fn basic_params() -> DeformParams {
  DeformParams {
    spring_force: 20.0,
    damping: 5.0,
    uniform_scale: 1.0,
  }
}

#[cfg(test)]
#[derive(Debug, Arbitrary)]
enum MeshOptions {
  Cube,
  Sphere,
}

#[cfg(test)]
impl MeshOptions {
  fn get_mesh(&self) -> DeformMesh {
    match self {
      MeshOptions::Cube => DeformMesh::new(cube_grid(3, 1.0)).unwrap(),
      MeshOptions::Sphere => DeformMesh::new(uv_sphere(1.0, 8, 12)).unwrap(),
    }
  }
}

#[test]
fn initialize_matches_rest() {
  let mesh = DeformMesh::new(cube_grid(3, 1.0)).unwrap();
  let simulator = Simulator::new(mesh);

  let state = simulator.state().unwrap();

  assert_eq!(state.displaced, simulator.mesh().rest_positions());
  for velocity in &state.velocities {
    assert_eq!(*velocity, Vector3::zeros());
  }
}

#[test]
fn step_rejects_bad_parameters() {
  let mut simulator = Simulator::new(MeshOptions::Cube.get_mesh());

  let bad_params = [
    (0.0, basic_params()),
    (-0.016, basic_params()),
    (
      0.016,
      DeformParams {
        spring_force: -1.0,
        ..basic_params()
      },
    ),
    (
      0.016,
      DeformParams {
        damping: -1.0,
        ..basic_params()
      },
    ),
    (
      0.016,
      DeformParams {
        uniform_scale: 0.0,
        ..basic_params()
      },
    ),
  ];

  for (delta_time, params) in bad_params.iter() {
    let result = simulator.step(*delta_time, params, None);
    assert!(matches!(result, Err(DeformError::InvalidParameter(_))));
  }

  // state is untouched by rejected steps
  let state = simulator.state().unwrap();
  assert_eq!(state.displaced, simulator.mesh().rest_positions());
}

#[test]
fn teardown_then_use_fails() {
  let mut simulator = Simulator::new(MeshOptions::Cube.get_mesh());

  simulator.teardown();

  assert!(matches!(
    simulator.step(0.016, &basic_params(), None),
    Err(DeformError::NotInitialized)
  ));
  assert!(matches!(
    simulator.recompute_normals(),
    Err(DeformError::NotInitialized)
  ));
  assert!(matches!(
    simulator.state(),
    Err(DeformError::NotInitialized)
  ));
}

#[test]
fn corner_impulse_bounded_then_converges() {
  let mesh = DeformMesh::new(cube_grid(3, 1.0)).unwrap();
  let mut simulator = Simulator::new(mesh);
  let params = basic_params();
  let delta_time = 0.016;

  let corner = Vector3::new(0.5, 0.5, 0.5);
  let corner_indices: Vec<usize> = simulator
    .mesh()
    .rest_positions()
    .iter()
    .enumerate()
    .filter(|(_, rest)| (*rest - corner).norm() < 1e-6)
    .map(|(idx, _)| idx)
    .collect();
  assert!(!corner_indices.is_empty());

  // the original offsets the hit point a bit along the surface normal
  let impulse = Impulse {
    point: corner + 0.1 * corner.normalize(),
    magnitude: 10.0,
  };

  simulator
    .step(delta_time, &params, Some(&impulse))
    .unwrap();

  for idx in &corner_indices {
    let state = simulator.state().unwrap();
    let moved = (state.displaced[*idx] - corner).norm();
    assert!(moved > 0.0);
    assert!(moved < params.uniform_scale);
  }

  for _ in 0..300 {
    simulator.step(delta_time, &params, None).unwrap();
  }

  let state = simulator.state().unwrap();
  for (displaced, rest) in state
    .displaced
    .iter()
    .zip(simulator.mesh().rest_positions())
  {
    assert!((displaced - rest).norm() < 1e-3);
  }
}

#[test]
fn zero_impulse_monotone_convergence() {
  // overdamped (damping above 2 * sqrt(spring_force)) so the distance to
  // rest can never overshoot
  let params = DeformParams {
    spring_force: 20.0,
    damping: 10.0,
    uniform_scale: 1.0,
  };
  let delta_time = 0.016;

  let mut simulator = Simulator::new(MeshOptions::Sphere.get_mesh());

  let offset = Vector3::new(0.1, 0.0, 0.0);
  for displaced in simulator.state.as_mut().unwrap().displaced.iter_mut() {
    *displaced += offset;
  }

  let max_dist = |simulator: &Simulator| {
    simulator
      .state()
      .unwrap()
      .displaced
      .iter()
      .zip(simulator.mesh().rest_positions())
      .map(|(displaced, rest)| (displaced - rest).norm())
      .fold(0.0f32, |acc, dist| acc.max(dist))
  };

  let mut prev = max_dist(&simulator);
  for _ in 0..200 {
    simulator.step(delta_time, &params, None).unwrap();

    let cur = max_dist(&simulator);
    assert!(cur <= prev + 1e-6);
    prev = cur;
  }

  assert!(prev < 1e-3);
}

#[test]
fn sphere_normals_match_analytic() {
  let stacks = 16;
  let slices = 24;
  let mesh = DeformMesh::new(uv_sphere(1.0, stacks, slices)).unwrap();
  let mut simulator = Simulator::new(mesh);

  simulator.recompute_normals().unwrap();

  let state = simulator.state().unwrap();

  // poles and the seam column accumulate from one side only, skip them
  for i in 1..stacks {
    for j in 1..slices {
      let idx = i * (slices + 1) + j;
      let normal = state.normals[idx];
      let analytic = state.displaced[idx].normalize();

      assert_float_eq!(normal.norm(), 1.0);
      assert!(
        normal.dot(&analytic) > 0.98,
        "vertex {}: {:?} vs {:?}",
        idx,
        normal,
        analytic
      );
    }
  }
}

#[test]
fn recompute_normals_idempotent() {
  let mut simulator = Simulator::new(MeshOptions::Sphere.get_mesh());
  let params = basic_params();

  let impulse = Impulse {
    point: Vector3::new(0.0, 1.1, 0.0),
    magnitude: 10.0,
  };
  simulator.step(0.016, &params, Some(&impulse)).unwrap();

  simulator.recompute_normals().unwrap();
  let first = simulator.state().unwrap().normals.clone();

  simulator.recompute_normals().unwrap();
  let second = &simulator.state().unwrap().normals;

  assert_eq!(&first, second);
}

#[test]
fn normals_do_not_touch_positions() {
  let mut simulator = Simulator::new(MeshOptions::Cube.get_mesh());

  let before = simulator.state().unwrap().displaced.clone();
  simulator.recompute_normals().unwrap();
  let state = simulator.state().unwrap();

  assert_eq!(before, state.displaced);
  for velocity in &state.velocities {
    assert_eq!(*velocity, Vector3::zeros());
  }
}

#[cfg(test)]
proptest! {
#[test]
fn damping_never_flips_velocity(
  damping in 0.0f32..60.0,
  velocity in prop::array::uniform3(-10.0f32..10.0),
  mesh_option: MeshOptions,
) {
  let mut simulator = Simulator::new(mesh_option.get_mesh());
  let velocity = Vector3::from(velocity);

  for v in simulator.state.as_mut().unwrap().velocities.iter_mut() {
    *v = velocity;
  }

  // spring force off, so only the damping factor acts on the velocity
  let params = DeformParams {
    spring_force: 0.0,
    damping,
    uniform_scale: 1.0,
  };

  simulator.step(0.016, &params, None).unwrap();

  for damped in &simulator.state().unwrap().velocities {
    for c in 0..3 {
      prop_assert!(damped[c] * velocity[c] >= 0.0);
    }
  }
}

#[test]
fn spring_pulls_toward_rest(
  spring_force in 0.1f32..100.0,
  damping in 0.0f32..10.0,
  offset in prop::array::uniform3(-0.5f32..0.5),
  mesh_option: MeshOptions,
) {
  let mut simulator = Simulator::new(mesh_option.get_mesh());
  let offset = Vector3::from(offset);

  for displaced in simulator.state.as_mut().unwrap().displaced.iter_mut() {
    *displaced += offset;
  }

  let params = DeformParams {
    spring_force,
    damping,
    uniform_scale: 1.0,
  };

  simulator.step(0.016, &params, None).unwrap();

  let state = simulator.state().unwrap();
  for (displaced, rest) in
    state.displaced.iter().zip(simulator.mesh().rest_positions())
  {
    prop_assert!((displaced - rest).norm() <= offset.norm() + 1e-6);
  }
}
}
