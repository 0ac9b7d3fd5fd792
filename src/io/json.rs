//! JSON files for [`MeshConfig`]
//!
//! Missing keys fall back to [`MeshConfig::default`], so a config file only
//! needs the settings it changes.

use crate::io::IoError;
use crate::mesh::MeshConfig;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `config` as pretty-printed JSON
pub fn save_config(config: &MeshConfig, path: impl AsRef<Path>) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.flush()?;

    Ok(())
}

/// Read a config written by [`save_config`] (or by hand)
///
/// Values that [`MeshConfig::validate`] rejects are reported as
/// [`IoError::InvalidConfig`].
pub fn load_config(path: impl AsRef<Path>) -> Result<MeshConfig, IoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let config: MeshConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    tracing::debug!(?config, "mesh config loaded");

    Ok(config)
}
