//! Density field to mesh conversion using Marching Tetrahedra
//!
//! Every grid cell is split into six tetrahedra that share the cube's main
//! diagonal (corners 3 and 5). Neighbouring cubes split their common faces
//! the same way, so the triangulation is crack free. Each tetrahedron is
//! classified by the signs of its four corner samples and triangulated from
//! 16-entry tables. Edge crossings are welded through a [`PointGrid`], which
//! makes tetrahedra sharing an edge reuse one vertex.
//!
//! Cube corner numbering:
//!
//! ```text
//!     7 ------- 6        z
//!    /|        /|        |  y
//!   4 ------- 5 |        | /
//!   | 3 ------|-2        |/
//!   |/        |/         +---- x
//!   0 ------- 1
//! ```

use glam::Vec3;

use super::point_grid::{unique_add_vertex, PointGrid};
use super::soup::TriSoup;
use crate::field::DensityField;

/// Default PointGrid bucket edge in world units
pub const DEFAULT_BUCKET_DIM: f32 = 1.0 / 64.0;

/// Cube corner offsets in cell units
const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Cube corners of the six tetrahedra, in emission order
pub const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 3, 1, 5],
    [1, 3, 2, 5],
    [4, 5, 7, 3],
    [5, 6, 7, 3],
    [0, 5, 4, 3],
    [5, 2, 6, 3],
];

/// Tetrahedron edges as pairs of local corners
pub const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

/// Crossed edges (bit `i` = edge `i`) per classification
pub const TET_EDGE_TABLE: [u8; 16] = [
    0x00, // 0000
    0x0D, // 0001
    0x13, // 0010
    0x1E, // 0011
    0x26, // 0100
    0x2B, // 0101
    0x35, // 0110
    0x38, // 0111
    0x38, // 1000
    0x35, // 1001
    0x2B, // 1010
    0x26, // 1011
    0x1E, // 1100
    0x13, // 1101
    0x0D, // 1110
    0x00, // 1111
];

/// Triangles per classification as edge slots, `-1` terminated
pub const TET_TRI_TABLE: [[i8; 6]; 16] = [
    [-1, -1, -1, -1, -1, -1], // 0000
    [0, 3, 2, -1, -1, -1],    // 0001
    [0, 1, 4, -1, -1, -1],    // 0010
    [1, 4, 3, 1, 3, 2],       // 0011
    [1, 2, 5, -1, -1, -1],    // 0100
    [1, 3, 5, 1, 0, 3],       // 0101
    [2, 5, 4, 2, 4, 0],       // 0110
    [3, 5, 4, -1, -1, -1],    // 0111
    [3, 4, 5, -1, -1, -1],    // 1000
    [2, 4, 5, 2, 0, 4],       // 1001
    [1, 5, 3, 1, 3, 0],       // 1010
    [1, 5, 2, -1, -1, -1],    // 1011
    [1, 3, 4, 1, 2, 3],       // 1100
    [0, 4, 1, -1, -1, -1],    // 1101
    [0, 2, 3, -1, -1, -1],    // 1110
    [-1, -1, -1, -1, -1, -1], // 1111
];

/// Classification of four corner samples: bit `i` set when sample `i` is negative
#[inline(always)]
pub fn tetrahedron_index(samples: [f32; 4]) -> usize {
    samples
        .iter()
        .enumerate()
        .fold(0, |index, (i, &d)| if d < 0.0 { index | (1 << i) } else { index })
}

/// Zero crossing between `p0` (sample `d0`) and `p1` (sample `d1`)
///
/// The parameter is clamped to `[0, 1]`.
#[inline(always)]
fn interpolate_vertex(p0: Vec3, p1: Vec3, d0: f32, d1: f32) -> Vec3 {
    let t = (d0 / (d0 - d1)).clamp(0.0, 1.0);
    (1.0 - t) * p0 + t * p1
}

/// Triangulate one tetrahedron into `mesh`
///
/// `samples` are density minus isolevel. Returns the number of faces added.
pub fn polygonise_tetrahedron(
    mesh: &mut TriSoup,
    grid: &mut PointGrid,
    samples: [f32; 4],
    points: [Vec3; 4],
) -> usize {
    let tet_index = tetrahedron_index(samples);
    let edges = TET_EDGE_TABLE[tet_index];
    if edges == 0 {
        return 0;
    }

    let mut edge_verts = [usize::MAX; 6];
    for (e, &[a, b]) in TET_EDGES.iter().enumerate() {
        if edges & (1 << e) != 0 {
            let p = interpolate_vertex(points[a], points[b], samples[a], samples[b]);
            edge_verts[e] = unique_add_vertex(mesh, grid, p);
        }
    }

    let mut added = 0;
    for tri in TET_TRI_TABLE[tet_index].chunks_exact(3) {
        if tri[0] < 0 {
            break;
        }
        mesh.add_face(
            edge_verts[tri[0] as usize],
            edge_verts[tri[1] as usize],
            edge_verts[tri[2] as usize],
        );
        added += 1;
    }
    added
}

/// Triangulate one cube given its 8 corner samples and positions
fn polygonise_cube(
    mesh: &mut TriSoup,
    grid: &mut PointGrid,
    samples: &[f32; 8],
    points: &[Vec3; 8],
) {
    for &tet in &CUBE_TETRAHEDRA {
        polygonise_tetrahedron(
            mesh,
            grid,
            tet.map(|c| samples[c]),
            tet.map(|c| points[c]),
        );
    }
}

/// Extract the `isolevel` surface of `field` with Marching Tetrahedra
///
/// Samples below `isolevel` count as inside. Vertices closer than
/// [`super::point_grid::EPSILON`] are welded using buckets of `bucket_dim`
/// world units. The result has no normals; call
/// [`TriSoup::compute_normals`] afterwards.
///
/// Every axis walks its own cell count, so non-cubic fields are covered
/// completely. Fields with fewer than two samples along an axis produce an
/// empty mesh.
pub fn create_mesh_from_density_field(
    isolevel: f32,
    field: &DensityField,
    bucket_dim: f32,
) -> TriSoup {
    let mut mesh = TriSoup::new();
    let [cells_x, cells_y, cells_z] = field.cell_counts();
    let mut grid = PointGrid::new(field.bounds(), bucket_dim);

    let data = field.data();
    let origin = -field.side_scale();
    let inc = field.spacing();

    for z in 0..cells_z {
        for y in 0..cells_y {
            for x in 0..cells_x {
                let pt = origin + inc * Vec3::new(x as f32, y as f32, z as f32);

                let mut samples = [0.0f32; 8];
                let mut points = [Vec3::ZERO; 8];
                for (i, &[dx, dy, dz]) in CORNER_OFFSETS.iter().enumerate() {
                    samples[i] = data[field.index(x + dx, y + dy, z + dz)] - isolevel;
                    points[i] = pt + inc * Vec3::new(dx as f32, dy as f32, dz as f32);
                }

                polygonise_cube(&mut mesh, &mut grid, &samples, &points);
            }
        }
    }

    tracing::debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dims = ?field.dimensions(),
        isolevel,
        "isosurface extracted"
    );

    mesh
}
