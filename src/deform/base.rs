use crate::{
  deform::{DeformMesh, DeformParams, Impulse, Simulator, S},
  pick::{pick_mesh, PickHit, Ray},
  CameraInfo, Result, Scene, SceneGenerator,
};
use kiss3d::resource::Mesh as Kiss3dMesh;
use kiss3d::scene::SceneNode;
use nalgebra::{Point3, Vector3};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct StepParams {
  pub time_step: S,
}

#[derive(Clone, Debug)]
pub struct SimulationParams {
  pub deform_params: DeformParams,
  pub step_params: StepParams,
}

pub struct DeformSceneGenerator {
  camera_info: CameraInfo,
  params: SimulationParams,
  mesh: DeformMesh,
}

impl DeformSceneGenerator {
  pub fn new(
    camera_info: CameraInfo,
    params: SimulationParams,
    mesh: DeformMesh,
  ) -> Self {
    Self {
      camera_info,
      params,
      mesh,
    }
  }
}

pub struct DeformScene {
  mesh_handle: Rc<RefCell<Kiss3dMesh>>,
  simulator: Simulator,
  params: SimulationParams,
}

// zero for a zero-length tick (a zero-elapsed frame is not an error, the
// scene just has nothing to advance)
fn substep_count(delta_secs: f32, time_step: f32) -> usize {
  if delta_secs <= 0.0 {
    return 0;
  }

  (delta_secs / time_step).ceil().max(1.0) as usize
}

impl Scene for DeformScene {
  fn update(
    &mut self,
    delta_secs: f32,
    impulse: Option<&Impulse>,
  ) -> Result<()> {
    let steps = substep_count(delta_secs, self.params.step_params.time_step);
    if steps == 0 {
      return Ok(());
    }
    let sub_step = delta_secs / steps as f32;

    for step_idx in 0..steps {
      // the impulse is one tick of input, apply it on the first sub step
      let impulse = if step_idx == 0 { impulse } else { None };

      self
        .simulator
        .step(sub_step, &self.params.deform_params, impulse)?;
    }

    self.simulator.recompute_normals()?;

    let state = self.simulator.state()?;

    let coords = state
      .displaced
      .iter()
      .map(|displaced| Point3::from(*displaced))
      .collect();
    let normals = state.normals.clone();
    let faces = self
      .simulator
      .mesh()
      .triangles()
      .iter()
      .map(|triangle| Point3::new(triangle[0], triangle[1], triangle[2]))
      .collect();

    self.mesh_handle.replace(Kiss3dMesh::new(
      coords,
      faces,
      Some(normals),
      None,
      true,
    ));

    Ok(())
  }

  fn pick(&self, ray: &Ray) -> Option<PickHit> {
    let state = self.simulator.state().ok()?;

    // the scene node scales the mesh by uniform_scale, so bring the
    // world-space ray into the mesh's local space first
    let local_ray = Ray {
      origin: ray.origin / self.params.deform_params.uniform_scale,
      dir: ray.dir,
    };

    pick_mesh(
      &local_ray,
      &state.displaced,
      self.simulator.mesh().triangles(),
    )
  }
}

impl SceneGenerator for DeformSceneGenerator {
  type S = DeformScene;

  fn init_objects(&self, node: &mut SceneNode) -> DeformScene {
    let mesh_handle = Rc::new(RefCell::new(Kiss3dMesh::new(
      Vec::new(),
      Vec::new(),
      None,
      None,
      true,
    )));

    let scale = self.params.deform_params.uniform_scale;
    let mut mesh_scene_node = node.add_mesh(
      mesh_handle.clone(),
      Vector3::new(scale, scale, scale),
    );

    mesh_scene_node.enable_backface_culling(false);
    mesh_scene_node.set_color(1.0, 0.4, 0.3);

    DeformScene {
      mesh_handle,
      simulator: Simulator::new(self.mesh.clone()),
      params: self.params.clone(),
    }
  }

  fn default_camera_info(&self) -> CameraInfo {
    self.camera_info.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_length_tick_runs_no_substeps() {
    assert_eq!(substep_count(0.0, 0.004), 0);
    assert_eq!(substep_count(-0.016, 0.004), 0);
  }

  #[test]
  fn positive_tick_always_substeps() {
    assert_eq!(substep_count(1.0, 0.25), 4);
    assert_eq!(substep_count(0.2, 1.0), 1);
  }
}
