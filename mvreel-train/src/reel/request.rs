//! Parameters of a single sampling call.

use mvreel_data::Modality;
use std::collections::BTreeSet;

/// What to sample. Built with [`BatchRequest::new`] and refined with the
/// builder methods; unset candidate sets mean "the whole pool".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub batch_size: usize,
    /// Candidate pool positions, drawn uniformly with replacement.
    pub cameras: Option<Vec<usize>>,
    /// Candidate frame indices, drawn uniformly with replacement.
    pub frames: Option<Vec<usize>>,
    pub jitter_pixels: bool,
    pub rays_per_pixel: usize,
    /// Subset of the reel's modalities to gather; all of them when unset.
    pub modalities: Option<BTreeSet<Modality>>,
}

impl BatchRequest {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            cameras: None,
            frames: None,
            jitter_pixels: false,
            rays_per_pixel: 1,
            modalities: None,
        }
    }

    pub fn cameras(mut self, cameras: impl IntoIterator<Item = usize>) -> Self {
        self.cameras = Some(cameras.into_iter().collect());
        self
    }

    pub fn frames(mut self, frames: impl IntoIterator<Item = usize>) -> Self {
        self.frames = Some(frames.into_iter().collect());
        self
    }

    pub fn jitter(mut self, jitter_pixels: bool) -> Self {
        self.jitter_pixels = jitter_pixels;
        self
    }

    pub fn rays_per_pixel(mut self, rays_per_pixel: usize) -> Self {
        self.rays_per_pixel = rays_per_pixel;
        self
    }

    pub fn modalities(mut self, modalities: impl IntoIterator<Item = Modality>) -> Self {
        self.modalities = Some(modalities.into_iter().collect());
        self
    }

    /// Number of distinct pixel draws; each spawns `rays_per_pixel` rays.
    pub fn nr_pixels(&self) -> usize {
        self.batch_size / self.rays_per_pixel.max(1)
    }
}
