//! Isosurface meshing and GPU-friendly mesh post-processing
//!
//! # Pipeline
//!
//! ```text
//! DensityField ─► surfcon (marching tetrahedra + PointGrid welding) ─► TriSoup
//!              ─► compute_normals ─► cache_sort ─► create_geom ─► GeomSink
//! ```
//!
//! [`density_to_mesh`] runs everything up to the cache sort according to a
//! [`MeshConfig`]; the caller exports with [`TriSoup::create_geom`] on the
//! thread that owns the GPU.

pub mod cache_sort;
pub mod geom;
pub mod point_grid;
mod soup;
pub mod surfcon;

pub use cache_sort::MAX_LRU_SIZE;
pub use geom::{
    AttributeSemantic, Geom, GeomSink, GeomVertex, IndexBuffer, PrimitiveTopology,
    VertexAttribute, VERTEX_LAYOUT, VERTEX_STRIDE,
};
pub use point_grid::{unique_add_vertex, PointGrid, MAX_BUCKETS};
pub use soup::{Face, TriSoup, Vertex};
pub use surfcon::{create_mesh_from_density_field, DEFAULT_BUCKET_DIM};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::DensityField;

/// Configuration for density field meshing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Iso-level the surface is extracted at
    pub iso_level: f32,
    /// PointGrid bucket edge in world units (keep well above 1e-4)
    pub bucket_size: f32,
    /// Whether to compute smooth vertex normals
    pub compute_normals: bool,
    /// Whether to reorder for the vertex cache
    pub cache_sort: bool,
    /// Simulated LRU size used by the cache sort
    pub lru_size: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        MeshConfig {
            iso_level: 0.0,
            bucket_size: DEFAULT_BUCKET_DIM,
            compute_normals: true,
            cache_sort: true,
            lru_size: 32,
        }
    }
}

/// Rejected [`MeshConfig`] values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Iso-level is NaN or infinite
    #[error("iso_level must be finite, got {0}")]
    IsoLevel(f32),

    /// Bucket edge is not a positive finite length
    #[error("bucket_size must be positive and finite, got {0}")]
    BucketSize(f32),

    /// LRU larger than [`MAX_LRU_SIZE`]
    #[error("lru_size {0} exceeds the maximum of 65536")]
    LruSize(usize),
}

impl MeshConfig {
    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.iso_level.is_finite() {
            return Err(ConfigError::IsoLevel(self.iso_level));
        }
        if !(self.bucket_size.is_finite() && self.bucket_size > 0.0) {
            return Err(ConfigError::BucketSize(self.bucket_size));
        }
        if self.lru_size > MAX_LRU_SIZE {
            return Err(ConfigError::LruSize(self.lru_size));
        }
        Ok(())
    }

    /// Default configuration at the given iso-level
    pub fn with_iso_level(iso_level: f32) -> Self {
        MeshConfig {
            iso_level,
            ..Default::default()
        }
    }

    /// Extraction only: no normals, no reordering
    pub fn raw(iso_level: f32) -> Self {
        MeshConfig {
            iso_level,
            compute_normals: false,
            cache_sort: false,
            ..Default::default()
        }
    }
}

/// Extract, shade and reorder the isosurface of `field`
///
/// # Arguments
/// * `field` - Density samples and their world mapping
/// * `config` - Meshing configuration
///
/// # Returns
/// Mesh ready for [`TriSoup::create_geom`]
pub fn density_to_mesh(field: &DensityField, config: &MeshConfig) -> TriSoup {
    let _span = tracing::info_span!("density_to_mesh", dims = ?field.dimensions()).entered();

    let mut mesh = create_mesh_from_density_field(config.iso_level, field, config.bucket_size);

    if config.compute_normals {
        mesh.compute_normals();
    }

    if config.cache_sort {
        mesh.cache_sort(config.lru_size);
    }

    tracing::info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "mesh built"
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MeshConfig::default();
        assert_eq!(config.lru_size, 32);
        assert!((config.bucket_size - 1.0 / 64.0).abs() < 1e-9);
        assert!(config.compute_normals && config.cache_sort);

        let raw = MeshConfig::raw(0.25);
        assert_eq!(raw.iso_level, 0.25);
        assert!(!raw.compute_normals && !raw.cache_sort);
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(MeshConfig::default().validate(), Ok(()));

        let config = MeshConfig {
            lru_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::LruSize(usize::MAX)));

        for bucket_size in [0.0, -0.5, f32::INFINITY] {
            let config = MeshConfig {
                bucket_size,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::BucketSize(bucket_size)));
        }

        assert!(matches!(
            MeshConfig::with_iso_level(f32::NAN).validate(),
            Err(ConfigError::IsoLevel(_))
        ));
    }

    #[test]
    fn test_pipeline_sphere() {
        let field = DensityField::sphere(12, 12, 12, 0.6).unwrap();
        let mesh = density_to_mesh(&field, &MeshConfig::default());

        assert!(mesh.face_count() > 0);
        for v in mesh.vertices() {
            assert!((v.normal.length() - 1.0).abs() < 1e-3);
            // Normals point out of the negative (inside) region
            assert!(v.normal.dot(v.position) > 0.0);
        }
    }

    #[test]
    fn test_pipeline_raw_matches_extraction() {
        let field = DensityField::sphere(10, 10, 10, 0.5).unwrap();
        let raw = density_to_mesh(&field, &MeshConfig::raw(0.0));
        let direct = create_mesh_from_density_field(0.0, &field, DEFAULT_BUCKET_DIM);
        assert_eq!(raw, direct);
    }

    #[test]
    fn test_sorted_pipeline_keeps_counts() {
        let field = DensityField::sphere(10, 10, 10, 0.5).unwrap();
        let raw = density_to_mesh(&field, &MeshConfig::raw(0.0));
        let sorted = density_to_mesh(&field, &MeshConfig::default());
        assert_eq!(raw.face_count(), sorted.face_count());
        assert_eq!(raw.vertex_count(), sorted.vertex_count());
    }
}
