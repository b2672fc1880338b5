//! Per-camera image-like payloads.

use crate::error::DataError;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named per-pixel data channel attached to a camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Rgb,
    Mask,
    Depth,
    Semantic,
    Instance,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::Rgb,
        Modality::Mask,
        Modality::Depth,
        Modality::Semantic,
        Modality::Instance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Modality::Rgb => "rgb",
            Modality::Mask => "mask",
            Modality::Depth => "depth",
            Modality::Semantic => "semantic",
            Modality::Instance => "instance",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modality::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown modality '{s}'"))
    }
}

/// A stack of frames shaped `frames x height x width x channels`, stored
/// contiguously as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStack {
    frames: usize,
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl FrameStack {
    pub fn new(
        frames: usize,
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, DataError> {
        if frames == 0 || height == 0 || width == 0 || channels == 0 {
            return Err(DataError::InvalidFrames(format!(
                "empty dimension in {frames}x{height}x{width}x{channels}"
            )));
        }
        let expected = frames * height * width * channels;
        if data.len() != expected {
            return Err(DataError::ShapeMismatch {
                expected: format!("{expected} values ({frames}x{height}x{width}x{channels})"),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self {
            frames,
            height,
            width,
            channels,
            data,
        })
    }

    /// Stack 8-bit RGB images into a `[0, 1]` float payload.
    pub fn from_rgb_images(images: &[RgbImage]) -> Result<Self, DataError> {
        let first = images
            .first()
            .ok_or_else(|| DataError::InvalidFrames("no RGB images".to_string()))?;
        let (width, height) = first.dimensions();
        let mut data = Vec::with_capacity(images.len() * (width * height * 3) as usize);
        for image in images {
            if image.dimensions() != (width, height) {
                return Err(DataError::ShapeMismatch {
                    expected: format!("{width}x{height}"),
                    actual: format!("{}x{}", image.width(), image.height()),
                });
            }
            data.extend(image.as_raw().iter().map(|&v| v as f32 / 255.0));
        }
        Self::new(images.len(), height as usize, width as usize, 3, data)
    }

    /// Stack 8-bit single-channel images (masks) into a `[0, 1]` payload.
    pub fn from_luma_images(images: &[GrayImage]) -> Result<Self, DataError> {
        let first = images
            .first()
            .ok_or_else(|| DataError::InvalidFrames("no luma images".to_string()))?;
        let (width, height) = first.dimensions();
        let mut data = Vec::with_capacity(images.len() * (width * height) as usize);
        for image in images {
            if image.dimensions() != (width, height) {
                return Err(DataError::ShapeMismatch {
                    expected: format!("{width}x{height}"),
                    actual: format!("{}x{}", image.width(), image.height()),
                });
            }
            data.extend(image.as_raw().iter().map(|&v| v as f32 / 255.0));
        }
        Self::new(images.len(), height as usize, width as usize, 1, data)
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Channel values at integer pixel `(x, y)` of `frame`.
    ///
    /// # Panics
    /// If any index is out of range.
    pub fn pixel(&self, frame: usize, x: usize, y: usize) -> &[f32] {
        assert!(frame < self.frames && x < self.width && y < self.height);
        let offset = ((frame * self.height + y) * self.width + x) * self.channels;
        &self.data[offset..offset + self.channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_names_round_trip() {
        for m in Modality::ALL {
            assert_eq!(m.name().parse::<Modality>().unwrap(), m);
        }
        assert!("normals".parse::<Modality>().is_err());
    }

    #[test]
    fn test_frame_stack_indexing() {
        let data: Vec<f32> = (0..2 * 2 * 3 * 1).map(|v| v as f32).collect();
        let stack = FrameStack::new(2, 2, 3, 1, data).unwrap();
        assert_eq!(stack.pixel(0, 0, 0), &[0.0]);
        assert_eq!(stack.pixel(0, 2, 1), &[5.0]);
        assert_eq!(stack.pixel(1, 1, 0), &[7.0]);
    }

    #[test]
    fn test_frame_stack_rejects_bad_shapes() {
        assert!(FrameStack::new(1, 2, 2, 3, vec![0.0; 11]).is_err());
        assert!(FrameStack::new(0, 2, 2, 3, vec![]).is_err());
    }

    #[test]
    fn test_from_rgb_images() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, image::Rgb([255, 0, 51]));
        let stack = FrameStack::from_rgb_images(&[img.clone(), img]).unwrap();
        assert_eq!(stack.frames(), 2);
        assert_eq!((stack.height(), stack.width(), stack.channels()), (1, 2, 3));
        assert_eq!(stack.pixel(1, 1, 0), &[1.0, 0.0, 0.2]);
    }

    #[test]
    fn test_from_luma_images_rejects_mixed_sizes() {
        let a = GrayImage::new(2, 2);
        let b = GrayImage::new(3, 2);
        assert!(FrameStack::from_luma_images(&[a, b]).is_err());
    }
}
