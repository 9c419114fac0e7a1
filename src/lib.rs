pub mod deform;
pub mod display;
pub mod error;
pub mod generators;
pub mod mesh;
pub mod pick;
pub mod scene;
pub mod utils;

pub use deform::{
  DeformMesh, DeformParams, DeformScene, DeformSceneGenerator, DeformState,
  Impulse, SimulationParams, Simulator, StepParams,
};
pub use display::display_scene;
pub use error::{DeformError, Result};
pub use mesh::{load_mesh, load_mesh_with_transform, LoadedMesh};
pub use pick::{pick_mesh, PickHit, Ray};
pub use scene::{CameraInfo, Scene, SceneGenerator};
