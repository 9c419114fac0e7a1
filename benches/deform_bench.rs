use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jellymesh::generators::uv_sphere;
use jellymesh::{DeformMesh, DeformParams, Impulse, Simulator};
use nalgebra::Vector3;

fn sphere_simulator(stacks: usize, slices: usize) -> Simulator {
  let mesh = DeformMesh::new(uv_sphere(1.0, stacks, slices))
    .expect("generated sphere must be a valid topology");

  Simulator::new(mesh)
}

fn bench_step(c: &mut Criterion) {
  for (stacks, slices) in [(8, 12), (16, 24), (32, 48), (64, 96)].iter() {
    let mut simulator = sphere_simulator(*stacks, *slices);

    let params = DeformParams {
      spring_force: 20.0,
      damping: 5.0,
      uniform_scale: 1.0,
    };
    let impulse = Impulse {
      point: Vector3::new(0.0, 1.1, 0.0),
      magnitude: 10.0,
    };

    c.bench_function(&format!("step sphere {}x{}", stacks, slices), |b| {
      b.iter(|| {
        simulator
          .step(black_box(0.004), &params, Some(&impulse))
          .unwrap()
      })
    });
  }
}

fn bench_recompute_normals(c: &mut Criterion) {
  for (stacks, slices) in [(8, 12), (16, 24), (32, 48), (64, 96)].iter() {
    let mut simulator = sphere_simulator(*stacks, *slices);

    c.bench_function(
      &format!("recompute normals sphere {}x{}", stacks, slices),
      |b| b.iter(|| simulator.recompute_normals().unwrap()),
    );
  }
}

criterion_group!(benches, bench_step, bench_recompute_normals);
criterion_main!(benches);
