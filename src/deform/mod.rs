pub mod base;
pub mod mesh;
pub mod sim;

pub use base::{
  DeformScene, DeformSceneGenerator, SimulationParams, StepParams,
};
pub use mesh::DeformMesh;
pub use sim::{DeformParams, DeformState, Impulse, Simulator};

pub type S = f32;
