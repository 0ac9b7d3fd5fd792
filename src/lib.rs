//! # isomesh
//!
//! Turns a volumetric scalar density field into a closed triangle mesh and
//! prepares it for fast GPU rendering.
//!
//! ## Features
//!
//! - **Extraction**: Marching Tetrahedra (6 tetrahedra per cell) with
//!   spatial vertex welding
//! - **Normals**: area weighted smooth vertex normals
//! - **Vertex cache optimization**: Tom Forsyth's LRU scoring heuristic with
//!   vertex compaction in first-use order
//! - **Export**: interleaved position/normal buffers with 16/32-bit indices,
//!   Wavefront OBJ
//!
//! ## Example
//!
//! ```rust
//! use isomesh::prelude::*;
//!
//! // 32^3 samples of a ball with radius 0.75
//! let field = DensityField::sphere(32, 32, 32, 0.75).unwrap();
//!
//! // Extract, compute normals and cache sort
//! let mesh = density_to_mesh(&field, &MeshConfig::default());
//! assert!(mesh.face_count() > 0);
//!
//! // Flatten for upload
//! let geom = mesh.create_geom();
//! assert_eq!(geom.indices.element_size(), 2);
//! ```

#![warn(missing_docs)]

pub mod bounds;
pub mod field;
pub mod io;
pub mod mesh;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::bounds::Aabb;
    pub use crate::field::{DensityField, FieldError};
    pub use crate::io::{export_obj, load_config, save_config, IoError, ObjConfig};
    pub use crate::mesh::{
        create_mesh_from_density_field, density_to_mesh, unique_add_vertex, ConfigError, Geom,
        GeomSink, GeomVertex, IndexBuffer, MeshConfig, PointGrid, TriSoup, Vertex,
    };
    pub use glam::Vec3;
}

// Re-exports for convenience
pub use field::DensityField;
pub use mesh::{density_to_mesh, MeshConfig, TriSoup};

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_workflow() {
        let field = DensityField::sphere(16, 16, 16, 0.7).unwrap();
        let mesh = density_to_mesh(&field, &MeshConfig::default());
        assert!(mesh.vertex_count() > 0);
        assert!(mesh.face_count() > 0);

        let geom = mesh.create_geom();
        assert_eq!(geom.vertices.len(), mesh.vertex_count());
        assert_eq!(geom.indices.len(), mesh.face_count() * 3);
    }

    #[test]
    fn test_caller_provided_samples() {
        // Plane z = 0 through a 3x3x3 field: samples are the z coordinate
        let data: Vec<f32> = (0..27).map(|i| (i / 9) as f32 - 1.0).collect();
        let field = DensityField::new(data, 3, 3, 3).unwrap();
        let mesh = density_to_mesh(&field, &MeshConfig::with_iso_level(0.5));

        assert!(mesh.face_count() > 0);
        for v in mesh.vertices() {
            // Iso 0.5 sits halfway between the z = 1 and z = 2 sample layers
            let expected = field.world_position(0, 0, 1).z + field.spacing() * 0.5;
            assert!((v.position.z - expected).abs() < 1e-5);
        }
    }
}
