//! The camera pool and its batch sampling.

use super::batch::{ModalityValues, RayBatch};
use super::request::BatchRequest;
use super::ReelError;
use glam::{DMat3, DVec2, DVec3};
use mvreel_data::geometry::unproject;
use mvreel_data::{Camera, DeviceTensor, HostArray, Modality, PointArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Per-camera data precomputed at reel construction.
#[derive(Debug, Clone)]
struct PackedCamera {
    camera: Arc<Camera>,
    origin: DVec3,
    rotation: DMat3,
    intrinsics_inv: DMat3,
    width: u32,
    height: u32,
    nr_frames: usize,
}

impl PackedCamera {
    fn new(camera: Arc<Camera>) -> Result<Self, ReelError> {
        if camera.width() == 0 || camera.height() == 0 {
            return Err(ReelError::EmptyImage {
                camera_idx: camera.camera_idx(),
            });
        }
        Ok(Self {
            origin: camera.center(),
            rotation: camera.rotation(),
            intrinsics_inv: *camera.intrinsics_inv(),
            width: camera.width(),
            height: camera.height(),
            nr_frames: camera.nr_frames(),
            camera,
        })
    }
}

/// A single pixel draw, before it is expanded into rays.
#[derive(Debug, Clone, Copy)]
struct PixelDraw {
    camera: usize,
    frame: usize,
    x: u32,
    y: u32,
}

/// Immutable pool of cameras serving ray batches.
///
/// The output backend `T` is fixed when the reel is built; modality payloads
/// are copied into it once, at construction.
#[derive(Debug, Clone)]
pub struct TensorReel<T: PointArray = DeviceTensor> {
    cameras: Vec<PackedCamera>,
    modalities: BTreeMap<Modality, PackedModality<T>>,
}

/// One modality copied into the output backend.
#[derive(Debug, Clone)]
struct PackedModality<T> {
    channels: usize,
    /// Per pool position, a `frames * height * width` by `channels` array with
    /// row `(frame * height + y) * width + x`. `None` where the camera lacks
    /// the modality.
    payloads: Vec<Option<T>>,
}

impl<T: PointArray> PackedModality<T> {
    fn value(&self, camera: &PackedCamera, draw: &PixelDraw, channel: usize) -> Option<f64> {
        let payload = self.payloads[draw.camera].as_ref()?;
        let row = (draw.frame * camera.height as usize + draw.y as usize) * camera.width as usize
            + draw.x as usize;
        Some(payload.at(row, channel))
    }
}

impl<T: PointArray> TensorReel<T> {
    /// Pack `cameras` and the payloads of `modalities`. Every modality must be
    /// present on at least one camera with a consistent channel count.
    #[tracing::instrument(skip_all, fields(modalities = ?modalities))]
    pub fn new(
        cameras: impl IntoIterator<Item = Arc<Camera>>,
        modalities: &[Modality],
    ) -> Result<Self, ReelError> {
        let cameras = cameras
            .into_iter()
            .map(PackedCamera::new)
            .collect::<Result<Vec<_>, _>>()?;
        if cameras.is_empty() {
            return Err(ReelError::EmptyCameraPool);
        }

        let mut packed = BTreeMap::new();
        for &modality in modalities {
            let mut channels = None;
            for camera in &cameras {
                let Some(frames) = camera.camera.frames(modality) else {
                    continue;
                };
                match channels {
                    None => channels = Some(frames.channels()),
                    Some(expected) if expected != frames.channels() => {
                        return Err(ReelError::ChannelMismatch {
                            modality,
                            camera_idx: camera.camera.camera_idx(),
                            expected,
                            actual: frames.channels(),
                        });
                    }
                    Some(_) => {}
                }
            }
            let channels = channels.ok_or(ReelError::UnavailableModality(modality))?;
            let payloads = cameras
                .iter()
                .map(|camera| {
                    camera.camera.frames(modality).map(|frames| {
                        let data = frames.as_slice();
                        let rows = data.len() / channels;
                        T::from_fn(rows, channels, |r, c| data[r * channels + c] as f64)
                    })
                })
                .collect();
            packed.insert(modality, PackedModality { channels, payloads });
        }

        debug!(cameras = cameras.len(), "packed tensor reel");
        Ok(Self {
            cameras,
            modalities: packed,
        })
    }

    pub fn nr_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// Camera at pool position `index`.
    pub fn camera(&self, index: usize) -> Option<&Arc<Camera>> {
        self.cameras.get(index).map(|c| &c.camera)
    }

    pub fn modalities(&self) -> impl Iterator<Item = Modality> + '_ {
        self.modalities.keys().copied()
    }

    /// A sampler with its own random source seeded by `seed`.
    pub fn sampler(&self, seed: u64) -> ReelSampler<'_, T> {
        ReelSampler {
            reel: self,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one batch using `rng`. Stateless apart from the random source.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &BatchRequest,
    ) -> Result<RayBatch<T>, ReelError> {
        let modalities = self.check_request(request)?;
        let draws = self.draw_pixels(rng, request);
        let rays_per_pixel = request.rays_per_pixel;
        let batch_size = draws.len() * rays_per_pixel;

        let mut pixels = Vec::with_capacity(batch_size);
        let mut rows = Vec::with_capacity(batch_size);
        for draw in &draws {
            for _ in 0..rays_per_pixel {
                let offset = if request.jitter_pixels {
                    DVec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
                } else {
                    DVec2::splat(0.5)
                };
                pixels.push(DVec2::new(draw.x as f64, draw.y as f64) + offset);
                rows.push(*draw);
            }
        }

        let (origins, directions) = self.cast_rays(&rows, &pixels);
        let vals = modalities
            .into_iter()
            .filter_map(|(modality, packed)| {
                self.gather(&rows, packed).map(|values| (modality, values))
            })
            .collect();

        Ok(RayBatch {
            rays_o: T::from_vec3s(&origins),
            rays_d: T::from_vec3s(&directions),
            pixels: T::from_vec2s(&pixels),
            camera_indices: rows.iter().map(|d| d.camera).collect(),
            frame_indices: rows.iter().map(|d| d.frame).collect(),
            timestamps: rows
                .iter()
                .map(|d| self.cameras[d.camera].camera.timestamp(d.frame).unwrap_or(0.0))
                .collect(),
            vals,
        })
    }

    /// Validate preconditions and resolve the modalities to gather.
    fn check_request(
        &self,
        request: &BatchRequest,
    ) -> Result<Vec<(Modality, &PackedModality<T>)>, ReelError> {
        if request.batch_size == 0 {
            return Err(ReelError::EmptyBatch);
        }
        if request.rays_per_pixel == 0 {
            return Err(ReelError::ZeroRaysPerPixel);
        }
        if request.batch_size % request.rays_per_pixel != 0 {
            return Err(ReelError::IndivisibleBatch {
                batch_size: request.batch_size,
                rays_per_pixel: request.rays_per_pixel,
            });
        }
        if request.rays_per_pixel > 1 && !request.jitter_pixels {
            return Err(ReelError::JitterRequired);
        }

        let pool = self.cameras.len();
        if let Some(cameras) = &request.cameras {
            if cameras.is_empty() {
                return Err(ReelError::EmptyCandidates("camera"));
            }
            if let Some(&index) = cameras.iter().find(|&&i| i >= pool) {
                return Err(ReelError::CameraOutOfRange { index, pool });
            }
        }
        if let Some(frames) = &request.frames {
            if frames.is_empty() {
                return Err(ReelError::EmptyCandidates("frame"));
            }
            let candidates: Box<dyn Iterator<Item = usize> + '_> = match &request.cameras {
                Some(cameras) => Box::new(cameras.iter().copied()),
                None => Box::new(0..pool),
            };
            for camera in candidates {
                let nr_frames = self.cameras[camera].nr_frames;
                if let Some(&frame) = frames.iter().find(|&&f| f >= nr_frames) {
                    return Err(ReelError::FrameOutOfRange {
                        frame,
                        camera,
                        nr_frames,
                    });
                }
            }
        }

        match &request.modalities {
            None => Ok(self.modalities.iter().map(|(&m, p)| (m, p)).collect()),
            Some(requested) => requested
                .iter()
                .map(|&m| {
                    self.modalities
                        .get(&m)
                        .map(|p| (m, p))
                        .ok_or(ReelError::ModalityNotPacked(m))
                })
                .collect(),
        }
    }

    fn draw_pixels<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &BatchRequest,
    ) -> Vec<PixelDraw> {
        let mut draws = Vec::with_capacity(request.nr_pixels());
        for _ in 0..request.nr_pixels() {
            let camera = match &request.cameras {
                Some(candidates) => candidates[rng.gen_range(0..candidates.len())],
                None => rng.gen_range(0..self.cameras.len()),
            };
            let packed = &self.cameras[camera];
            let frame = match &request.frames {
                Some(candidates) => candidates[rng.gen_range(0..candidates.len())],
                None => rng.gen_range(0..packed.nr_frames),
            };
            draws.push(PixelDraw {
                camera,
                frame,
                x: rng.gen_range(0..packed.width),
                y: rng.gen_range(0..packed.height),
            });
        }
        draws
    }

    /// Unproject every ray's pixel, one kernel call per sampled camera.
    fn cast_rays(&self, rows: &[PixelDraw], pixels: &[DVec2]) -> (Vec<DVec3>, Vec<DVec3>) {
        let mut by_camera: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (row, draw) in rows.iter().enumerate() {
            by_camera.entry(draw.camera).or_default().push(row);
        }

        let mut origins = vec![DVec3::ZERO; rows.len()];
        let mut directions = vec![DVec3::ZERO; rows.len()];
        for (camera, members) in by_camera {
            let packed = &self.cameras[camera];
            let camera_pixels: Vec<DVec2> = members.iter().map(|&r| pixels[r]).collect();
            let camera_dirs: HostArray = unproject(
                &packed.intrinsics_inv,
                &<HostArray as PointArray>::from_vec2s(&camera_pixels),
            );
            for (j, &row) in members.iter().enumerate() {
                origins[row] = packed.origin;
                directions[row] = (packed.rotation * camera_dirs.vec3(j)).normalize();
            }
        }
        (origins, directions)
    }

    /// Nearest-neighbor lookup at each ray's integer pixel. `None` when no
    /// sampled camera carries `modality`.
    /// Read the packed payload under every row. Rows whose camera lacks the
    /// modality are NaN and marked absent.
    fn gather(&self, rows: &[PixelDraw], packed: &PackedModality<T>) -> Option<ModalityValues<T>> {
        let present: Vec<bool> = rows
            .iter()
            .map(|draw| packed.payloads[draw.camera].is_some())
            .collect();
        if !present.contains(&true) {
            return None;
        }
        let values = T::from_fn(rows.len(), packed.channels, |r, c| {
            let draw = &rows[r];
            packed
                .value(&self.cameras[draw.camera], draw, c)
                .unwrap_or(f64::NAN)
        });
        Some(ModalityValues { values, present })
    }
}

/// A reel paired with an owned, seeded random source.
#[derive(Debug, Clone)]
pub struct ReelSampler<'a, T: PointArray = DeviceTensor> {
    reel: &'a TensorReel<T>,
    rng: StdRng,
}

impl<T: PointArray> ReelSampler<'_, T> {
    pub fn sample(&mut self, request: &BatchRequest) -> Result<RayBatch<T>, ReelError> {
        self.reel.sample_with(&mut self.rng, request)
    }

    pub fn reel(&self) -> &TensorReel<T> {
        self.reel
    }
}
