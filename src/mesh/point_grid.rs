//! Bucket grid for approximate vertex deduplication
//!
//! Marching tetrahedra computes the same edge crossing once for every
//! tetrahedron sharing that edge. [`PointGrid`] buckets emitted positions so
//! a new crossing can be matched against earlier ones within [`EPSILON`],
//! letting adjacent tetrahedra share vertices.
//!
//! The query window is a fixed `±EPSILON` around the point, so buckets must be
//! much larger than `EPSILON` for lookups near a bucket border to see every
//! candidate.

use glam::Vec3;

use crate::bounds::Aabb;
use crate::mesh::TriSoup;

/// Distance under which two points are considered the same vertex
pub const EPSILON: f32 = 1e-4;
const EPSILON_SQ: f32 = EPSILON * EPSILON;

/// Most buckets a grid allocates; finer requests get coarser buckets
pub const MAX_BUCKETS: usize = 1 << 24;

/// Uniform grid of lazily allocated point buckets
#[derive(Debug, Clone)]
pub struct PointGrid {
    bounds: Aabb,
    cells: [i32; 3],
    buckets: Vec<Option<Vec<(Vec3, usize)>>>,
    bucket_dim: f32,
    len: usize,
}

impl PointGrid {
    /// Partition `bounds` into cubic buckets with edge length `bucket_dim`
    ///
    /// Each axis gets `ceil(extent / bucket_dim)` buckets, at least one.
    /// The bucket edge is doubled until at most [`MAX_BUCKETS`] buckets are
    /// needed; a non-positive or non-finite edge yields a single bucket.
    pub fn new(bounds: Aabb, bucket_dim: f32) -> Self {
        let size = bounds.size();
        let count = |extent: f32, dim: f32| -> i32 {
            let n = (extent / dim).ceil();
            if n.is_finite() && n >= 1.0 {
                n as i32
            } else {
                1
            }
        };
        let total_of = |cells: [i32; 3]| -> usize {
            cells
                .iter()
                .fold(1usize, |acc, &c| acc.saturating_mul(c as usize))
        };

        let mut dim = if bucket_dim.is_finite() && bucket_dim > 0.0 {
            bucket_dim
        } else {
            f32::INFINITY
        };
        let mut cells = [count(size.x, dim), count(size.y, dim), count(size.z, dim)];
        while total_of(cells) > MAX_BUCKETS {
            dim *= 2.0;
            cells = [count(size.x, dim), count(size.y, dim), count(size.z, dim)];
        }
        if dim != bucket_dim {
            tracing::debug!(requested = bucket_dim, used = dim, "point grid buckets coarsened");
        }
        let total = total_of(cells);

        PointGrid {
            bounds,
            cells,
            buckets: vec![None; total],
            bucket_dim: dim,
            len: 0,
        }
    }

    /// Buckets along each axis
    pub fn cell_counts(&self) -> [usize; 3] {
        [self.cells[0] as usize, self.cells[1] as usize, self.cells[2] as usize]
    }

    /// Number of registered points
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no point has been added
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn cell_coords(&self, point: Vec3) -> [i32; 3] {
        let cell = (point - self.bounds.min) / self.bucket_dim;
        [
            (cell.x as i32).clamp(0, self.cells[0] - 1),
            (cell.y as i32).clamp(0, self.cells[1] - 1),
            (cell.z as i32).clamp(0, self.cells[2] - 1),
        ]
    }

    #[inline(always)]
    fn offset(&self, [x, y, z]: [i32; 3]) -> usize {
        let pitch = self.cells[0] as usize;
        let slice_pitch = pitch * self.cells[1] as usize;
        x as usize + y as usize * pitch + z as usize * slice_pitch
    }

    /// Index of the first stored point within [`EPSILON`] of `point`
    ///
    /// Buckets are scanned in z, y, x order and entries in insertion order.
    pub fn find(&self, point: Vec3) -> Option<usize> {
        let lo = self.cell_coords(point - Vec3::splat(EPSILON));
        let hi = self.cell_coords(point + Vec3::splat(EPSILON));

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    let Some(bucket) = &self.buckets[self.offset([x, y, z])] else {
                        continue;
                    };
                    if let Some(&(_, index)) = bucket
                        .iter()
                        .find(|(p, _)| p.distance_squared(point) < EPSILON_SQ)
                    {
                        return Some(index);
                    }
                }
            }
        }

        None
    }

    /// Register `point` under `index` in the bucket containing it
    ///
    /// Points outside the bounds land in the nearest border bucket.
    pub fn add(&mut self, index: usize, point: Vec3) {
        let offset = self.offset(self.cell_coords(point));
        self.buckets[offset].get_or_insert_with(Vec::new).push((point, index));
        self.len += 1;
    }
}

/// Return the soup vertex at `point`, creating and registering it if needed
pub fn unique_add_vertex(mesh: &mut TriSoup, grid: &mut PointGrid, point: Vec3) -> usize {
    if let Some(index) = grid.find(point) {
        return index;
    }
    let index = mesh.add_vertex(point);
    grid.add(index, point);
    index
}
