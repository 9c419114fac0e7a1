use clap::{ArgEnum, Parser};
use jellymesh::{
  display_scene, generators, load_mesh, CameraInfo, DeformMesh, DeformParams,
  DeformSceneGenerator, SimulationParams, StepParams,
};
use nalgebra::Point3;
use std::path::Path;
use tracing_subscriber::{
  layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(ArgEnum, Clone, Debug)]
enum Shape {
  Sphere,
  Cube,
}

#[derive(Parser)]
#[clap(version, about = "interactive spring-damper mesh deformation")]
struct Opts {
  /// OBJ file (v/f lines, triangle faces); a generated shape is used when
  /// absent
  #[clap(long)]
  mesh_file: Option<String>,

  #[clap(long, arg_enum, default_value = "sphere")]
  shape: Shape,

  #[clap(long, default_value = "20.0")]
  spring_force: f32,

  #[clap(long, default_value = "5.0")]
  damping: f32,

  #[clap(long, default_value = "1.0")]
  uniform_scale: f32,

  /// impulse magnitude applied while the mouse button is held
  #[clap(long, default_value = "10.0")]
  force: f32,

  /// fixed simulation sub step in seconds
  #[clap(long, default_value = "0.004")]
  time_step: f32,

  #[clap(long)]
  hide: bool,

  #[clap(short = 'r', long)]
  record_image_dir: Option<String>,

  #[clap(short = 'l', long)]
  frame_limit: Option<usize>,

  #[clap(long)]
  force_sim_fps: Option<f32>,
}

fn main() -> jellymesh::Result<()> {
  tracing_subscriber::registry()
    .with(EnvFilter::from_default_env())
    .with(tracing_subscriber::fmt::layer())
    .init();

  let opts: Opts = Opts::parse();

  let loaded = match &opts.mesh_file {
    Some(path) => load_mesh(Path::new(path))?,
    None => match opts.shape {
      Shape::Sphere => generators::uv_sphere(1.0, 24, 32),
      Shape::Cube => generators::cube_grid(8, 1.5),
    },
  };

  let mesh = DeformMesh::new(loaded)?;

  tracing::info!(
    vertices = mesh.num_vertices(),
    triangles = mesh.triangles().len(),
    "mesh ready"
  );

  display_scene(
    "jellymesh",
    opts.hide,
    opts.record_image_dir.as_ref().map(|v| Path::new(v)),
    opts.frame_limit,
    opts.force_sim_fps,
    opts.force,
    &mut DeformSceneGenerator::new(
      CameraInfo {
        eye: Point3::new(2.5, 2.5, 2.5),
        at: Point3::origin(),
      },
      SimulationParams {
        deform_params: DeformParams {
          spring_force: opts.spring_force,
          damping: opts.damping,
          uniform_scale: opts.uniform_scale,
        },
        step_params: StepParams {
          time_step: opts.time_step,
        },
      },
      mesh,
    ),
  )?;

  Ok(())
}
