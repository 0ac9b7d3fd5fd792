//! Triangle soup mesh container
//!
//! [`TriSoup`] stores vertices and triangles in two flat arrays. Faces refer
//! to vertices by index and carry no adjacency, so triangles are independent
//! of each other. Topology needed by the cache optimizer is rebuilt
//! transiently from the face list.

use glam::Vec3;

use crate::bounds::Aabb;

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: Vec3,
    /// Surface normal (zero until [`TriSoup::compute_normals`] runs)
    pub normal: Vec3,
}

impl Vertex {
    /// Create a vertex with a zero normal
    pub fn new(position: Vec3) -> Self {
        Vertex {
            position,
            normal: Vec3::ZERO,
        }
    }
}

/// Three vertex indices
pub type Face = [usize; 3];

/// Triangle mesh with no topology information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriSoup {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) faces: Vec<Face>,
}

impl TriSoup {
    /// Create an empty soup
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty soup with reserved storage
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        TriSoup {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, position: Vec3) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(position));
        index
    }

    /// Append a face and return its index
    ///
    /// Indices are not validated here; faces pointing past the 16/32-bit
    /// index range are dropped at export.
    pub fn add_face(&mut self, v0: usize, v1: usize, v2: usize) -> usize {
        let index = self.faces.len();
        self.faces.push([v0, v1, v2]);
        index
    }

    /// Remove every vertex and face
    pub fn clear(&mut self) {
        self.faces.clear();
        self.vertices.clear();
    }

    /// Remove a face in O(1) by swapping the last face into its slot
    ///
    /// Returns the removed face, `None` if `index` is out of range.
    pub fn delete_face(&mut self, index: usize) -> Option<Face> {
        if index < self.faces.len() {
            Some(self.faces.swap_remove(index))
        } else {
            None
        }
    }

    /// Number of triangles
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True when the soup holds no faces
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Position of vertex `index`
    pub fn vertex_position(&self, index: usize) -> Vec3 {
        self.vertices[index].position
    }

    /// Normal of vertex `index`
    pub fn vertex_normal(&self, index: usize) -> Vec3 {
        self.vertices[index].normal
    }

    /// Vertex indices of face `index`
    pub fn face(&self, index: usize) -> Face {
        self.faces[index]
    }

    /// All vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Bounding box of the vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Append `other`'s vertices and faces, offsetting its face indices
    ///
    /// No vertex welding happens here. Normals of the appended vertices start
    /// at zero.
    pub fn merge(&mut self, other: &TriSoup) {
        let base = self.vertices.len();
        self.vertices.reserve(other.vertices.len());
        self.faces.reserve(other.faces.len());

        for v in &other.vertices {
            self.add_vertex(v.position);
        }
        for &[a, b, c] in &other.faces {
            self.add_face(a + base, b + base, c + base);
        }
    }

    /// Recompute smooth vertex normals
    ///
    /// Each face adds its unnormalized cross product `(v1 - v0) x (v2 - v0)`
    /// to its three vertices, so larger faces weigh more. Vertices without a
    /// usable accumulated normal keep a zero normal.
    pub fn compute_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = Vec3::ZERO;
        }

        for &[i0, i1, i2] in &self.faces {
            let p0 = self.vertices[i0].position;
            let p1 = self.vertices[i1].position;
            let p2 = self.vertices[i2].position;

            let n = (p1 - p0).cross(p2 - p0);

            self.vertices[i0].normal += n;
            self.vertices[i1].normal += n;
            self.vertices[i2].normal += n;
        }

        for v in &mut self.vertices {
            v.normal = v.normal.normalize_or_zero();
        }
    }
}
