use crate::deform::S;
use nalgebra::{Point3, Vector3};

#[derive(Clone, Debug)]
pub struct Ray {
  pub origin: Point3<S>,
  pub dir: Vector3<S>,
}

/// Nearest surface hit, in the same space as the positions given to
/// `pick_mesh`.
#[derive(Clone, Debug)]
pub struct PickHit {
  pub point: Vector3<S>,
  pub normal: Vector3<S>,
  pub toi: S,
}

const EPSILON: S = 1e-7;

// Moller-Trumbore
fn intersect_triangle(
  ray: &Ray,
  a: &Vector3<S>,
  b: &Vector3<S>,
  c: &Vector3<S>,
) -> Option<S> {
  let edge_1 = b - a;
  let edge_2 = c - a;

  let p = ray.dir.cross(&edge_2);
  let det = edge_1.dot(&p);

  if det.abs() < EPSILON {
    return None;
  }

  let inv_det = 1.0 / det;
  let s = ray.origin.coords - a;

  let u = s.dot(&p) * inv_det;
  if u < 0.0 || u > 1.0 {
    return None;
  }

  let q = s.cross(&edge_1);
  let v = ray.dir.dot(&q) * inv_det;
  if v < 0.0 || u + v > 1.0 {
    return None;
  }

  let toi = edge_2.dot(&q) * inv_det;
  if toi > EPSILON {
    Some(toi)
  } else {
    None
  }
}

/// Casts the ray against every triangle and returns the nearest hit with
/// its face normal oriented toward the ray origin.
pub fn pick_mesh(
  ray: &Ray,
  positions: &[Vector3<S>],
  triangles: &[[u16; 3]],
) -> Option<PickHit> {
  let mut best: Option<PickHit> = None;

  for triangle in triangles {
    let a = positions[triangle[0] as usize];
    let b = positions[triangle[1] as usize];
    let c = positions[triangle[2] as usize];

    if let Some(toi) = intersect_triangle(ray, &a, &b, &c) {
      if best.as_ref().map_or(true, |hit| toi < hit.toi) {
        let mut normal = (b - a).cross(&(c - a));
        let len = normal.norm();
        if len > 1e-10 {
          normal /= len;
        }
        if normal.dot(&ray.dir) > 0.0 {
          normal = -normal;
        }

        best = Some(PickHit {
          point: ray.origin.coords + ray.dir * toi,
          normal,
          toi,
        });
      }
    }
  }

  best
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_float_eq;

  fn z_facing_quad(z: S) -> (Vec<Vector3<S>>, Vec<[u16; 3]>) {
    (
      vec![
        Vector3::new(-1.0, -1.0, z),
        Vector3::new(1.0, -1.0, z),
        Vector3::new(1.0, 1.0, z),
        Vector3::new(-1.0, 1.0, z),
      ],
      vec![[0, 1, 2], [0, 2, 3]],
    )
  }

  #[test]
  fn hits_facing_triangle() {
    let (positions, triangles) = z_facing_quad(0.0);
    let ray = Ray {
      origin: Point3::new(0.2, 0.3, 5.0),
      dir: Vector3::new(0.0, 0.0, -1.0),
    };

    let hit = pick_mesh(&ray, &positions, &triangles).unwrap();

    assert_float_eq!(hit.toi, 5.0);
    assert_float_eq!(hit.point[0], 0.2);
    assert_float_eq!(hit.point[1], 0.3);
    assert_float_eq!(hit.point[2], 0.0);
    // normal faces back toward the ray origin
    assert_float_eq!(hit.normal[2], 1.0);
  }

  #[test]
  fn misses_outside_triangle() {
    let (positions, triangles) = z_facing_quad(0.0);
    let ray = Ray {
      origin: Point3::new(3.0, 3.0, 5.0),
      dir: Vector3::new(0.0, 0.0, -1.0),
    };

    assert!(pick_mesh(&ray, &positions, &triangles).is_none());
  }

  #[test]
  fn misses_behind_origin() {
    let (positions, triangles) = z_facing_quad(0.0);
    let ray = Ray {
      origin: Point3::new(0.0, 0.0, 5.0),
      dir: Vector3::new(0.0, 0.0, 1.0),
    };

    assert!(pick_mesh(&ray, &positions, &triangles).is_none());
  }

  #[test]
  fn picks_nearest_of_stacked_quads() {
    let (mut positions, mut triangles) = z_facing_quad(0.0);
    let (far_positions, far_triangles) = z_facing_quad(-2.0);

    let base = positions.len() as u16;
    positions.extend(far_positions);
    triangles.extend(far_triangles.iter().map(|triangle| {
      [
        triangle[0] + base,
        triangle[1] + base,
        triangle[2] + base,
      ]
    }));

    let ray = Ray {
      origin: Point3::new(0.0, 0.0, 5.0),
      dir: Vector3::new(0.0, 0.0, -1.0),
    };

    let hit = pick_mesh(&ray, &positions, &triangles).unwrap();

    assert_float_eq!(hit.toi, 5.0);
  }
}
