//! Common test helpers for isomesh integration tests

use isomesh::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Standard test fields
// ============================================================================

/// Signed distance ball of radius 0.6 sampled `n`^3 times
#[allow(dead_code)]
pub fn test_sphere(n: usize) -> DensityField {
    DensityField::sphere(n, n, n, 0.6).unwrap()
}

/// Quadric ball on a 17^3 grid whose samples sit at least 0.5 from the surface
///
/// Samples are `|ijk - 8|^2 - 30.5`: integer squared distances never hit the
/// iso-level, so no crossing collapses onto a grid point.
#[allow(dead_code)]
pub fn test_quadric_ball() -> DensityField {
    let n = 17;
    let mut data = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let d = |c: usize| (c as f32 - 8.0).powi(2);
                data.push(d(x) + d(y) + d(z) - 30.5);
            }
        }
    }
    DensityField::new(data, n, n, n).unwrap()
}

/// Flat `n` x `n` grid of quads in scanline order
#[allow(dead_code)]
pub fn test_grid_mesh(n: usize) -> TriSoup {
    let mut mesh = TriSoup::new();
    for y in 0..=n {
        for x in 0..=n {
            mesh.add_vertex(Vec3::new(x as f32, y as f32, 0.0));
        }
    }
    let row = n + 1;
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            mesh.add_face(i, i + 1, i + row + 1);
            mesh.add_face(i, i + row + 1, i + row);
        }
    }
    mesh
}

// ============================================================================
// Topology helpers
// ============================================================================

/// Number of faces using each directed edge
#[allow(dead_code)]
pub fn directed_edge_counts(mesh: &TriSoup) -> HashMap<(usize, usize), usize> {
    let mut counts = HashMap::new();
    for &[a, b, c] in mesh.faces() {
        for edge in [(a, b), (b, c), (c, a)] {
            *counts.entry(edge).or_insert(0) += 1;
        }
    }
    counts
}

/// Assert every edge is used once in each direction (closed, consistently wound)
#[allow(dead_code)]
pub fn assert_closed_manifold(mesh: &TriSoup) {
    assert!(mesh.face_count() > 0, "mesh is empty");
    let counts = directed_edge_counts(mesh);
    for (&(a, b), &count) in &counts {
        assert_eq!(count, 1, "directed edge {a}->{b} used {count} times");
        assert_eq!(
            counts.get(&(b, a)),
            Some(&1),
            "edge {a}->{b} has no opposite half-edge"
        );
    }
}

/// Faces as position triples, rotated so the smallest key leads
///
/// Independent of vertex numbering and face order; keeps winding.
#[allow(dead_code)]
pub fn face_positions(mesh: &TriSoup) -> Vec<[[u32; 3]; 3]> {
    let key = |v: usize| mesh.vertex_position(v).to_array().map(f32::to_bits);
    let mut faces: Vec<[[u32; 3]; 3]> = mesh
        .faces()
        .iter()
        .map(|f| {
            let mut tri = f.map(key);
            let lead = (0..3).min_by_key(|&i| tri[i]).unwrap_or(0);
            tri.rotate_left(lead);
            tri
        })
        .collect();
    faces.sort_unstable();
    faces
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert two f32 values are close within tolerance
#[allow(dead_code)]
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}
