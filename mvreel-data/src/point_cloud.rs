//! Point clouds accompanying a scene.

use crate::backend::{HostArray, PointArray};
use crate::geometry::apply_transform;
use glam::{DMat4, DVec3, Vec3};

/// An ordered set of 3D points with optional per-point colors.
///
/// Used for scene-scale estimation and visualization only; ray sampling never
/// reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<DVec3>,
    /// RGB color (linear, 0-1 range), one per point when present.
    pub colors: Option<Vec<Vec3>>,
}

impl PointCloud {
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    /// Returns `None` if the color count differs from the point count.
    pub fn with_colors(points: Vec<DVec3>, colors: Vec<Vec3>) -> Option<Self> {
        (points.len() == colors.len()).then_some(Self {
            points,
            colors: Some(colors),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The cloud expressed in the frame given by `transform`. Colors are kept.
    pub fn transformed(&self, transform: &DMat4) -> Self {
        let out: HostArray = apply_transform(&HostArray::from_vec3s(&self.points), transform);
        Self {
            points: out.to_vec3s(),
            colors: self.colors.clone(),
        }
    }

    /// Mean of all points, or `None` for an empty cloud.
    pub fn centroid(&self) -> Option<DVec3> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().copied().sum::<DVec3>() / self.points.len() as f64)
    }

    /// Largest distance of any point from the origin.
    pub fn radius(&self) -> f64 {
        self.points.iter().map(|p| p.length()).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_cloud_transform_keeps_colors() {
        let cloud = PointCloud::with_colors(
            vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 2.0, 0.0)],
            vec![Vec3::X, Vec3::Y],
        )
        .unwrap();
        let t = DMat4::from_scale_rotation_translation(
            DVec3::splat(2.0),
            glam::DQuat::IDENTITY,
            DVec3::new(0.0, 0.0, 1.0),
        );
        let moved = cloud.transformed(&t);
        assert!(moved.points[0].abs_diff_eq(DVec3::new(2.0, 0.0, 1.0), 1e-12));
        assert!(moved.points[1].abs_diff_eq(DVec3::new(0.0, 4.0, 1.0), 1e-12));
        assert_eq!(moved.colors, cloud.colors);
    }

    #[test]
    fn test_centroid_and_radius() {
        let cloud = PointCloud::new(vec![DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 0.0)]);
        assert_eq!(cloud.centroid(), Some(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(cloud.radius(), 2.0);
        assert!(PointCloud::default().centroid().is_none());
    }

    #[test]
    fn test_color_count_mismatch() {
        assert!(PointCloud::with_colors(vec![DVec3::ZERO], vec![]).is_none());
    }
}
