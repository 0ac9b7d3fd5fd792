//! Scalar density volumes
//!
//! A [`DensityField`] is a flat, row-major grid of `f32` samples
//! (`index = x + y * width + z * width * height`) together with the
//! world-space mapping used by the surface constructor: the grid starts at
//! `-side_scale` in a box centred on the origin, and the shortest axis has
//! `2 / min(w, h, d)` world units between samples.
//!
//! The samples normally come from an external provider (a GPU compute
//! kernel, a file, a noise generator). [`DensityField::from_fn`] samples a
//! closure on the CPU with Rayon Z-slab parallelism for tests, benchmarks
//! and the CLI.

use glam::Vec3;
use rayon::prelude::*;
use thiserror::Error;

use crate::bounds::Aabb;

/// Errors raised while constructing a density field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Sample count does not match `width * height * depth`
    #[error("density field size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch {
        /// Required sample count
        expected: usize,
        /// Supplied sample count
        actual: usize,
    },

    /// `width * height * depth` does not fit in `usize`
    #[error("density field dimensions {0:?} overflow")]
    DimensionOverflow([usize; 3]),
}

/// Flat 3D grid of density samples
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    data: Vec<f32>,
    width: usize,
    height: usize,
    depth: usize,
}

fn sample_count(width: usize, height: usize, depth: usize) -> Result<usize, FieldError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(depth))
        .ok_or(FieldError::DimensionOverflow([width, height, depth]))
}

impl DensityField {
    /// Wrap caller-provided samples
    ///
    /// Fails when `data.len() != width * height * depth`, so the tetrahedron
    /// walk can never read outside the array.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<Self, FieldError> {
        let expected = sample_count(width, height, depth)?;
        if data.len() != expected {
            return Err(FieldError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(DensityField {
            data,
            width,
            height,
            depth,
        })
    }

    /// Field with every sample set to `value`
    pub fn constant(
        width: usize,
        height: usize,
        depth: usize,
        value: f32,
    ) -> Result<Self, FieldError> {
        let total = sample_count(width, height, depth)?;
        Self::new(vec![value; total], width, height, depth)
    }

    /// Sample `f` at the world position of every grid point
    ///
    /// Z-slices are evaluated in parallel.
    pub fn from_fn<F>(width: usize, height: usize, depth: usize, f: F) -> Result<Self, FieldError>
    where
        F: Fn(Vec3) -> f32 + Sync,
    {
        let total = sample_count(width, height, depth)?;
        let mut field = DensityField {
            data: vec![0.0; total],
            width,
            height,
            depth,
        };

        let origin = -field.side_scale();
        let step = field.spacing();
        let slice_size = width * height;
        if slice_size > 0 {
            field
                .data
                .par_chunks_mut(slice_size)
                .enumerate()
                .for_each(|(z, slice)| {
                    let z_pos = origin.z + z as f32 * step;
                    for y in 0..height {
                        let y_pos = origin.y + y as f32 * step;
                        let row = &mut slice[y * width..(y + 1) * width];
                        for (x, sample) in row.iter_mut().enumerate() {
                            let x_pos = origin.x + x as f32 * step;
                            *sample = f(Vec3::new(x_pos, y_pos, z_pos));
                        }
                    }
                });
        }

        Ok(field)
    }

    /// Signed distance to a ball of the given world-space radius: `|p| - radius`
    ///
    /// Negative inside, positive outside.
    pub fn sphere(
        width: usize,
        height: usize,
        depth: usize,
        radius: f32,
    ) -> Result<Self, FieldError> {
        Self::from_fn(width, height, depth, |p| p.length() - radius)
    }

    /// Samples along X
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Samples along Y
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples along Z
    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `[width, height, depth]`
    pub fn dimensions(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }

    /// Raw samples in row-major order
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the field and return its samples
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Flat index of grid point `(x, y, z)`
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.width + z * self.width * self.height
    }

    /// Sample at `(x, y, z)`, `None` outside the grid
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        Some(self.data[self.index(x, y, z)])
    }

    /// Number of cells along each axis (`dimension - 1`, saturating)
    pub fn cell_counts(&self) -> [usize; 3] {
        [
            self.width.saturating_sub(1),
            self.height.saturating_sub(1),
            self.depth.saturating_sub(1),
        ]
    }

    fn shortest_side(&self) -> f32 {
        self.width.min(self.height).min(self.depth).max(1) as f32
    }

    /// Half extents of the world-space box: `(w, h, d) / min(w, h, d)`
    pub fn side_scale(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.depth as f32) / self.shortest_side()
    }

    /// World-space distance between neighbouring samples (same on every axis)
    pub fn spacing(&self) -> f32 {
        2.0 / self.shortest_side()
    }

    /// World-space box the grid is mapped into
    pub fn bounds(&self) -> Aabb {
        let s = self.side_scale();
        Aabb::new(-s, s)
    }

    /// World position of grid point `(x, y, z)`
    #[inline(always)]
    pub fn world_position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        -self.side_scale() + self.spacing() * Vec3::new(x as f32, y as f32, z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch() {
        let err = DensityField::new(vec![0.0; 7], 2, 2, 2).unwrap_err();
        assert_eq!(err, FieldError::SizeMismatch { expected: 8, actual: 7 });
        assert!(format!("{err}").contains("expected 8"));
    }

    #[test]
    fn test_dimension_overflow() {
        let err = DensityField::constant(usize::MAX, 2, 1, 0.0).unwrap_err();
        assert!(matches!(err, FieldError::DimensionOverflow(_)));
    }

    #[test]
    fn test_row_major_indexing() {
        let data: Vec<f32> = (0..24).map(|i| i as f32).collect();
        let field = DensityField::new(data, 2, 3, 4).unwrap();
        assert_eq!(field.index(1, 0, 0), 1);
        assert_eq!(field.index(0, 1, 0), 2);
        assert_eq!(field.index(0, 0, 1), 6);
        assert_eq!(field.get(1, 2, 3), Some(23.0));
        assert_eq!(field.get(2, 0, 0), None);
        assert_eq!(field.cell_counts(), [1, 2, 3]);
    }

    #[test]
    fn test_world_mapping_shortest_axis_spans_two() {
        let field = DensityField::constant(4, 8, 4, 1.0).unwrap();
        assert_eq!(field.side_scale(), Vec3::new(1.0, 2.0, 1.0));
        assert!((field.spacing() - 0.5).abs() < 1e-6);
        assert_eq!(field.world_position(0, 0, 0), Vec3::new(-1.0, -2.0, -1.0));
        assert_eq!(field.world_position(2, 4, 2), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(field.bounds().size(), Vec3::new(2.0, 4.0, 2.0));
    }

    #[test]
    fn test_from_fn_matches_world_position() {
        let field = DensityField::from_fn(5, 4, 3, |p| p.x + 10.0 * p.y + 100.0 * p.z).unwrap();
        for z in 0..3 {
            for y in 0..4 {
                for x in 0..5 {
                    let p = field.world_position(x, y, z);
                    let expected = p.x + 10.0 * p.y + 100.0 * p.z;
                    let actual = field.get(x, y, z).unwrap();
                    assert!(
                        (actual - expected).abs() < 1e-4,
                        "({x},{y},{z}): {actual} vs {expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_sphere_sign() {
        let field = DensityField::sphere(9, 9, 9, 0.5).unwrap();
        let centre = field.world_position(4, 4, 4);
        assert!((field.get(4, 4, 4).unwrap() - (centre.length() - 0.5)).abs() < 1e-6);
        assert!(field.get(4, 4, 4).unwrap() < 0.0);
        assert!(field.get(0, 0, 0).unwrap() > 0.0);
    }

    #[test]
    fn test_empty_field() {
        let field = DensityField::from_fn(0, 3, 3, |_| 1.0).unwrap();
        assert!(field.data().is_empty());
        assert_eq!(field.cell_counts(), [0, 2, 2]);
    }
}
