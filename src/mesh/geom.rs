//! GPU geometry buffer emission
//!
//! [`TriSoup::create_geom`] flattens a soup into the layout the renderer
//! uploads: an interleaved position/normal vertex buffer (24-byte stride)
//! and a triangle-list index buffer using the narrowest index type that can
//! address every vertex.
//!
//! Buffer objects themselves belong to the renderer. It implements
//! [`GeomSink`] and receives the finished [`Geom`].

use bytemuck::{Pod, Zeroable};

use super::soup::TriSoup;

/// Interleaved vertex record (24 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GeomVertex {
    /// Position xyz
    pub position: [f32; 3],
    /// Normal xyz
    pub normal: [f32; 3],
}

/// Byte stride of [`GeomVertex`]
pub const VERTEX_STRIDE: u32 = std::mem::size_of::<GeomVertex>() as u32;

/// Vertex attribute meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    /// Object-space position
    Position,
    /// Vertex normal
    Normal,
}

/// One attribute binding inside the interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Bind slot meaning
    pub semantic: AttributeSemantic,
    /// Number of `f32` components
    pub components: u32,
    /// Byte offset inside the vertex record
    pub offset: u32,
}

/// Attribute layout of [`GeomVertex`]
pub const VERTEX_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        semantic: AttributeSemantic::Position,
        components: 3,
        offset: 0,
    },
    VertexAttribute {
        semantic: AttributeSemantic::Normal,
        components: 3,
        offset: 3 * std::mem::size_of::<f32>() as u32,
    },
];

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Every three indices form one triangle
    TriangleList,
}

/// Index buffer with a 16- or 32-bit element type
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    /// 16-bit indices
    U16(Vec<u16>),
    /// 32-bit indices
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Size of one index in bytes
    pub fn element_size(&self) -> usize {
        match self {
            IndexBuffer::U16(_) => 2,
            IndexBuffer::U32(_) => 4,
        }
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    /// True when no index was emitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index `i` widened to `u32`
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexBuffer::U16(v) => v.get(i).map(|&x| u32::from(x)),
            IndexBuffer::U32(v) => v.get(i).copied(),
        }
    }

    /// All indices widened to `u32`
    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            IndexBuffer::U16(v) => v.iter().map(|&x| u32::from(x)).collect(),
            IndexBuffer::U32(v) => v.clone(),
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Finalized vertex and index buffers plus their layout
#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    /// Interleaved vertices
    pub vertices: Vec<GeomVertex>,
    /// Triangle indices
    pub indices: IndexBuffer,
    /// Bytes per vertex
    pub stride: u32,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Attribute bindings inside a vertex
    pub attributes: Vec<VertexAttribute>,
}

impl Geom {
    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of emitted triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Renderer-side consumer of finished geometry
pub trait GeomSink {
    /// Handle the renderer returns for the uploaded buffers
    type Handle;

    /// Take ownership of the data in `geom` (typically by uploading it)
    fn create_geom(&mut self, geom: &Geom) -> Self::Handle;
}

trait IndexElement: Pod {
    const MAX: usize;
    fn from_index(index: usize) -> Self;
    fn wrap(indices: Vec<Self>) -> IndexBuffer;
}

impl IndexElement for u16 {
    const MAX: usize = u16::MAX as usize;
    fn from_index(index: usize) -> Self {
        index as u16
    }
    fn wrap(indices: Vec<Self>) -> IndexBuffer {
        IndexBuffer::U16(indices)
    }
}

impl IndexElement for u32 {
    const MAX: usize = u32::MAX as usize;
    fn from_index(index: usize) -> Self {
        index as u32
    }
    fn wrap(indices: Vec<Self>) -> IndexBuffer {
        IndexBuffer::U32(indices)
    }
}

fn build_geom<T: IndexElement>(soup: &TriSoup) -> Geom {
    let vertex_count = soup.vertices.len().min(T::MAX);
    let vertices: Vec<GeomVertex> = soup.vertices[..vertex_count]
        .iter()
        .map(|v| GeomVertex {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
        })
        .collect();

    let mut indices: Vec<T> = Vec::with_capacity(soup.faces.len() * 3);
    let mut dropped = 0usize;
    for face in &soup.faces {
        if face.iter().any(|&i| i > T::MAX) {
            dropped += 1;
            continue;
        }
        indices.extend(face.iter().map(|&i| T::from_index(i)));
    }

    if dropped > 0 {
        tracing::trace!(dropped, "faces outside index range skipped");
    }

    Geom {
        vertices,
        indices: T::wrap(indices),
        stride: VERTEX_STRIDE,
        topology: PrimitiveTopology::TriangleList,
        attributes: VERTEX_LAYOUT.to_vec(),
    }
}

impl TriSoup {
    /// Flatten into GPU-ready buffers
    ///
    /// Uses 16-bit indices while the vertex count fits in `u16`, 32-bit
    /// otherwise. Faces referencing an index the chosen type cannot
    /// represent are silently left out.
    pub fn create_geom(&self) -> Geom {
        let geom = if self.vertices.len() > u16::MAX as usize {
            build_geom::<u32>(self)
        } else {
            build_geom::<u16>(self)
        };

        tracing::debug!(
            vertices = geom.vertices.len(),
            triangles = geom.triangle_count(),
            index_bytes = geom.indices.element_size(),
            "geometry buffers built"
        );

        geom
    }

    /// Build the buffers and hand them to `sink`
    pub fn upload<S: GeomSink>(&self, sink: &mut S) -> S::Handle {
        let geom = self.create_geom();
        sink.create_geom(&geom)
    }
}
