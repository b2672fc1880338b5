//! Ray batch sampling over virtual cameras
//!
//! Places cameras on a hemisphere around the origin and draws jittered ray
//! batches from a subset of them, without any captured data.
//!
//! Usage:
//!   cargo run --example ray_batch_sampling -- [nr_cameras] [batch_size]

use mvreel_data::Intrinsics;
use mvreel_train::{BatchRequest, TensorReel, sample_cameras_on_hemisphere};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let nr_cameras: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(100);
    let batch_size: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(512);

    let (width, height) = (800, 800);
    let intrinsics = Intrinsics::from_horizontal_fov(width, height, 0.6911);
    let mut rng = StdRng::seed_from_u64(0);
    let cameras = sample_cameras_on_hemisphere(intrinsics, width, height, 4.0, nr_cameras, &mut rng)?;
    info!("Sampled {} cameras on the hemisphere", cameras.len());

    let reel: TensorReel = TensorReel::new(cameras.into_iter().map(Arc::new), &[])?;
    let mut sampler = reel.sampler(0);
    let request = BatchRequest::new(batch_size)
        .cameras((0..reel.nr_cameras()).step_by(20))
        .jitter(true);

    for iteration in 0..10 {
        let batch = sampler.sample(&request)?;
        let mut hit = 0;
        for row in 0..batch.len() {
            // rays aimed near the origin pass within the unit sphere
            let (o, d) = (batch.rays_o.row(row), batch.rays_d.row(row));
            let t = -(o[0] * d[0] + o[1] * d[1] + o[2] * d[2]);
            let closest = [o[0] + t * d[0], o[1] + t * d[1], o[2] + t * d[2]];
            if closest.iter().map(|v| v * v).sum::<f32>() < 1.0 {
                hit += 1;
            }
        }
        info!(
            iteration,
            rays = batch.len(),
            bytes = batch.rays_o.as_bytes().len() + batch.rays_d.as_bytes().len(),
            unit_sphere_hits = hit,
            "sampled batch"
        );
    }

    Ok(())
}
