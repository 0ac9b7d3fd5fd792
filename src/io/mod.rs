//! File I/O for meshes and meshing configuration
//!
//! - `.obj`: Wavefront OBJ export of a [`TriSoup`](crate::mesh::TriSoup)
//! - `.json`: human-readable [`MeshConfig`](crate::mesh::MeshConfig) files
//!
//! All file access goes through `BufReader`/`BufWriter`.

mod json;
pub mod obj;

pub use json::{load_config, save_config};
pub use obj::{export_obj, write_obj, ObjConfig};

use thiserror::Error;

use crate::mesh::ConfigError;

/// File I/O errors
#[derive(Error, Debug)]
pub enum IoError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unrepresentable JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed config with unusable values
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
