use crate::deform::Impulse;
use crate::error::Result;
use crate::pick::{PickHit, Ray};
use kiss3d::scene::SceneNode;
use nalgebra::Point3;

#[derive(Clone, Debug)]
pub struct CameraInfo {
  pub eye: Point3<f32>,
  pub at: Point3<f32>,
}

pub trait Scene {
  /// Advances the scene by one external tick. The impulse, if any, is the
  /// input translated by the host for this tick only.
  fn update(&mut self, delta_secs: f32, impulse: Option<&Impulse>)
    -> Result<()>;

  /// Hit test supplied to the render loop in place of ambient engine
  /// globals. The hit is in the scene's local space.
  fn pick(&self, ray: &Ray) -> Option<PickHit>;
}

pub trait SceneGenerator {
  type S: Scene;

  fn init_objects(&self, node: &mut SceneNode) -> Self::S;

  fn default_camera_info(&self) -> CameraInfo;
}
