//! Wavefront OBJ export
//!
//! Positions, optional normals and 1-indexed triangle faces. Readable by
//! Blender, MeshLab and most DCC tools.

use crate::io::IoError;
use crate::mesh::TriSoup;
use std::io::Write;
use std::path::Path;

/// OBJ export configuration
#[derive(Debug, Clone)]
pub struct ObjConfig {
    /// Export normals (vn)
    pub export_normals: bool,
}

impl Default for ObjConfig {
    fn default() -> Self {
        ObjConfig {
            export_normals: true,
        }
    }
}

/// Export a mesh to a Wavefront OBJ file
///
/// The object is named after the file stem.
pub fn export_obj(
    mesh: &TriSoup,
    path: impl AsRef<Path>,
    config: &ObjConfig,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");

    write_obj(&mut w, mesh, stem, config)?;
    w.flush()?;

    tracing::info!(path = %path.display(), faces = mesh.face_count(), "OBJ written");
    Ok(())
}

/// Write a mesh as OBJ text into any writer
pub fn write_obj<W: Write>(
    w: &mut W,
    mesh: &TriSoup,
    name: &str,
    config: &ObjConfig,
) -> Result<(), IoError> {
    writeln!(w, "# isomesh OBJ Export")?;
    writeln!(w, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(w, "# Triangles: {}", mesh.face_count())?;
    writeln!(w, "o {}", name)?;

    for v in mesh.vertices() {
        writeln!(w, "v {} {} {}", v.position.x, v.position.y, v.position.z)?;
    }

    if config.export_normals {
        for v in mesh.vertices() {
            writeln!(w, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z)?;
        }
    }

    for face in mesh.faces() {
        // OBJ is 1-indexed
        let [a, b, c] = face.map(|i| i + 1);
        if config.export_normals {
            writeln!(w, "f {}//{} {}//{} {}//{}", a, a, b, b, c, c)?;
        } else {
            writeln!(w, "f {} {} {}", a, b, c)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quad() -> TriSoup {
        let mut mesh = TriSoup::new();
        mesh.add_vertex(Vec3::ZERO);
        mesh.add_vertex(Vec3::X);
        mesh.add_vertex(Vec3::new(1.0, 1.0, 0.0));
        mesh.add_vertex(Vec3::Y);
        mesh.add_face(0, 1, 2);
        mesh.add_face(0, 2, 3);
        mesh.compute_normals();
        mesh
    }

    fn to_text(mesh: &TriSoup, config: &ObjConfig) -> String {
        let mut buf = Vec::new();
        write_obj(&mut buf, mesh, "quad", config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_obj_with_normals() {
        let text = to_text(&quad(), &ObjConfig::default());

        assert!(text.contains("o quad"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert!(text.contains("vn 0 0 1"));
        assert!(text.contains("f 1//1 2//2 3//3"));
        assert!(text.contains("f 1//1 3//3 4//4"));
    }

    #[test]
    fn test_obj_minimal() {
        let config = ObjConfig {
            export_normals: false,
        };
        let text = to_text(&quad(), &config);

        assert!(!text.contains("vn "));
        assert!(text.contains("f 1 2 3"));
        assert!(text.contains("f 1 3 4"));
    }

    #[test]
    fn test_obj_export_file() {
        let path = std::env::temp_dir().join("isomesh_test_export.obj");
        export_obj(&quad(), &path, &ObjConfig::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("o isomesh_test_export"));
        assert!(text.contains("# Triangles: 2"));

        std::fs::remove_file(&path).ok();
    }
}
