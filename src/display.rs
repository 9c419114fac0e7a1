use crate::{
  deform::{Impulse, S},
  error::Result,
  pick::Ray,
  CameraInfo, Scene, SceneGenerator,
};
use indicatif::ProgressBar;
use kiss3d::camera::{Camera, FirstPerson};
use kiss3d::event::{Action, MouseButton, WindowEvent};
use kiss3d::light::Light;
use kiss3d::window::Window;
use nalgebra::{Point2, Vector2};
use std::fs::create_dir_all;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub fn display_scene<G: SceneGenerator>(
  window_name: &str,
  hide: bool,
  record_image_dir: Option<&Path>,
  frame_limit: Option<usize>,
  force_sim_fps: Option<f32>,
  impulse_force: S,
  scene_gen: &mut G,
) -> Result<()> {
  if let Some(record_image_dir) = record_image_dir {
    if record_image_dir.exists() {
      if !record_image_dir.is_dir() {
        eprintln!("Record image directory exists and isn't directory, exiting");
        return Ok(());
      }
    } else {
      create_dir_all(record_image_dir)?;
    }
  }

  let mut window = Window::new_hidden(window_name);

  if !hide {
    window.show();
  }

  let mut scene = scene_gen.init_objects(&mut window.add_group());

  window.set_light(Light::StickToCamera);

  let mut time_since_last = Instant::now();

  let CameraInfo { eye, at } = scene_gen.default_camera_info();

  let mut iters = 0;

  let mut cam = FirstPerson::new(eye, at);

  let mut frame_limit_bar = frame_limit
    .map(|frame_limit| (frame_limit, ProgressBar::new(frame_limit as u64)));

  let mut mouse_down = false;
  let mut cursor: Option<(f64, f64)> = None;

  while window.render_with_camera(&mut cam) {
    for event in window.events().iter() {
      match event.value {
        WindowEvent::MouseButton(MouseButton::Button1, action, _) => {
          mouse_down = action == Action::Press;
        }
        WindowEvent::CursorPos(x, y, _) => {
          cursor = Some((x, y));
        }
        _ => {}
      }
    }

    let delta_time = force_sim_fps
      .map(|fps| 1.0 / fps)
      .unwrap_or_else(|| time_since_last.elapsed().as_secs_f32());
    time_since_last = Instant::now();

    // while the button is held, raycast the cursor into the scene and turn
    // the hit into this tick's impulse (same scheme as poking the mesh in
    // a game viewport)
    let impulse = if mouse_down {
      cursor.and_then(|(x, y)| {
        let size = window.size();
        let (origin, dir) = cam.unproject(
          &Point2::new(x as f32, y as f32),
          &Vector2::new(size[0] as f32, size[1] as f32),
        );

        scene.pick(&Ray { origin, dir }).map(|hit| {
          debug!(toi = hit.toi, "impulse at picked point");

          // push the force point a little off the surface
          Impulse {
            point: hit.point + 0.1 * hit.normal,
            magnitude: impulse_force,
          }
        })
      })
    } else {
      None
    };

    if let Some(record_image_dir) = record_image_dir {
      window
        .snap_image()
        .save(record_image_dir.join(format!("output_{}.png", iters)))
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    }

    iters += 1;

    if let Some((frame_limit, p_bar)) = &mut frame_limit_bar {
      if iters >= *frame_limit {
        break;
      }
      p_bar.inc(1);
    }

    scene.update(delta_time, impulse.as_ref())?;
  }

  if let Some((_, p_bar)) = &mut frame_limit_bar {
    p_bar.finish();
  }

  Ok(())
}
