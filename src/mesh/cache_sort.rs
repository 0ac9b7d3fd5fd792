//! Vertex cache optimization for GPU-friendly triangle ordering
//!
//! Implements Tom Forsyth's greedy algorithm: a simulated LRU vertex cache
//! scores every vertex by how recently it was used and how many undrawn
//! triangles still need it, and the next triangle drawn is the best scoring
//! one touching the cache. After the face order is known the soup is
//! rewritten in that order and vertices are renumbered by first use, so the
//! vertex buffer is read front to back as well.
//!
//! # References
//! - Tom Forsyth, "Linear-Speed Vertex Cache Optimisation" (2006)

use super::soup::{Face, TriSoup, Vertex};

const LAST_TRI_SCORE: f32 = 0.75;
const CACHE_DECAY_POWER: f32 = 1.5;
const VALENCE_BOOST_SCALE: f32 = 2.0;
const VALENCE_BOOST_POWER: f32 = -0.5;

/// Slots reserved on top of the LRU size for the vertices of one triangle
const FACE_SLOTS: usize = 3;

/// Largest simulated LRU; bigger requests are clamped to it
pub const MAX_LRU_SIZE: usize = 1 << 16;

struct SortVertex {
    score: f32,
    cache_pos: Option<usize>,
    /// Undrawn faces using this vertex; its length is the valency
    faces: Vec<usize>,
}

impl SortVertex {
    fn compute_score(&mut self, cache_size: usize) {
        let mut score = match self.cache_pos {
            Some(pos) if pos < FACE_SLOTS => LAST_TRI_SCORE,
            Some(pos) => {
                let t = (cache_size - 1 - pos) as f32 / (cache_size - FACE_SLOTS) as f32;
                t.powf(CACHE_DECAY_POWER)
            }
            None => 0.0,
        };

        let valency = self.faces.len();
        if valency > 0 {
            score += VALENCE_BOOST_SCALE * (valency as f32).powf(VALENCE_BOOST_POWER);
        }

        self.score = score;
    }
}

struct SortFace {
    indices: Face,
    drawn: bool,
}

struct State {
    verts: Vec<SortVertex>,
    faces: Vec<SortFace>,
}

impl State {
    fn new(soup: &TriSoup) -> Self {
        let mut verts: Vec<SortVertex> = (0..soup.vertices.len())
            .map(|_| SortVertex {
                score: 0.0,
                cache_pos: None,
                faces: Vec::new(),
            })
            .collect();

        let mut valency = vec![0usize; verts.len()];
        for face in &soup.faces {
            for &v in face {
                valency[v] += 1;
            }
        }
        for (vert, &count) in verts.iter_mut().zip(&valency) {
            vert.faces.reserve_exact(count);
        }

        let faces = soup
            .faces
            .iter()
            .enumerate()
            .map(|(i, &indices)| {
                for &v in &indices {
                    verts[v].faces.push(i);
                }
                SortFace {
                    indices,
                    drawn: false,
                }
            })
            .collect();

        State { verts, faces }
    }

    #[inline(always)]
    fn face_score(&self, face: usize) -> f32 {
        self.faces[face]
            .indices
            .iter()
            .map(|&v| self.verts[v].score)
            .sum()
    }

    /// Best undrawn face over the whole mesh; first found wins ties
    fn find_best_face_global(&mut self, cache_size: usize) -> Option<usize> {
        for v in &mut self.verts {
            v.compute_score(cache_size);
        }

        let mut best = None;
        let mut best_score = 0.0f32;
        for i in 0..self.faces.len() {
            if self.faces[i].drawn {
                continue;
            }
            let score = self.face_score(i);
            if score > best_score {
                best = Some(i);
                best_score = score;
            }
        }
        best
    }

    /// Drop `face` from the incident lists of its vertices
    fn remove_connections(&mut self, face: usize) {
        let indices = self.faces[face].indices;
        for v in indices {
            let incident = &mut self.verts[v].faces;
            if let Some(pos) = incident.iter().position(|&f| f == face) {
                incident.swap_remove(pos);
            }
        }
    }
}

/// Simulated LRU cache of vertex indices, most recent first
///
/// Holds `lru_size + 3` slots so one triangle can be added before the
/// oldest entries are evicted.
struct VertexLru {
    slots: Vec<Option<usize>>,
    scratch: Vec<Option<usize>>,
}

impl VertexLru {
    fn new(size: usize) -> Self {
        VertexLru {
            slots: vec![None; size],
            scratch: vec![None; size],
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots; entries are kept contiguous from slot 0
    fn cached(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map_while(|slot| *slot)
    }

    /// Move the face's vertices to the front, shifting the rest back
    fn add_face(&mut self, face: Face, verts: &mut [SortVertex]) {
        let size = self.slots.len();

        // Vertices already cached vacate their old slot
        for v in face {
            if let Some(pos) = verts[v].cache_pos.take() {
                self.slots[pos] = None;
            }
        }

        self.scratch.fill(None);
        let mut dest = 0;
        for (i, &v) in face.iter().enumerate() {
            if face[..i].contains(&v) {
                continue;
            }
            self.scratch[dest] = Some(v);
            verts[v].cache_pos = Some(dest);
            dest += 1;
        }

        let mut src = 0;
        while src < size && dest < size {
            if let Some(v) = self.slots[src] {
                self.scratch[dest] = Some(v);
                verts[v].cache_pos = Some(dest);
                dest += 1;
            }
            src += 1;
        }

        // Whatever did not fit has been pushed out
        for slot in &self.slots[src..] {
            if let Some(v) = *slot {
                verts[v].cache_pos = None;
            }
        }

        std::mem::swap(&mut self.slots, &mut self.scratch);
    }

    /// Forget every slot past `size`
    fn truncate(&mut self, size: usize, verts: &mut [SortVertex]) {
        for slot in self.slots.iter_mut().skip(size) {
            if let Some(v) = slot.take() {
                verts[v].cache_pos = None;
            }
        }
    }
}

impl TriSoup {
    /// Reorder faces and vertices for post-transform vertex cache reuse
    ///
    /// Faces are rewritten in the greedy draw order, vertices are renumbered
    /// in order of first use, and vertices no face references are dropped.
    /// The result is deterministic for a given soup and `lru_size`.
    pub fn cache_sort(&mut self, lru_size: usize) {
        let order = self.cache_sort_order(lru_size);
        self.remap_data(&order);
    }

    /// Greedy draw order of the current faces without modifying the soup
    ///
    /// `lru_size` is clamped to [`MAX_LRU_SIZE`].
    pub fn cache_sort_order(&self, lru_size: usize) -> Vec<usize> {
        let lru_size = lru_size.min(MAX_LRU_SIZE);
        let face_count = self.faces.len();
        let mut state = State::new(self);
        let mut lru = VertexLru::new(lru_size + FACE_SLOTS);
        let cache_size = lru.len();

        let mut order = Vec::with_capacity(face_count);
        let mut global_rescans = 0usize;

        let mut current = state.find_best_face_global(cache_size);
        while let Some(face) = current {
            order.push(face);
            state.faces[face].drawn = true;
            lru.add_face(state.faces[face].indices, &mut state.verts);
            state.remove_connections(face);

            for v in lru.cached() {
                state.verts[v].compute_score(cache_size);
            }

            let mut best = None;
            let mut best_score = 0.0f32;
            for v in lru.cached() {
                for &f in &state.verts[v].faces {
                    let score = state.face_score(f);
                    if score > best_score {
                        best = Some(f);
                        best_score = score;
                    }
                }
            }

            // The overflow slots only absorb this triangle's evictions and do
            // not take part in the next round of scoring.
            lru.truncate(lru_size, &mut state.verts);

            current = match best {
                Some(f) => Some(f),
                None => {
                    global_rescans += 1;
                    state.find_best_face_global(cache_size)
                }
            };
        }

        debug_assert_eq!(order.len(), face_count);
        tracing::debug!(
            faces = face_count,
            lru_size,
            global_rescans,
            "vertex cache order computed"
        );

        order
    }

    /// Rewrite faces in `face_order` and compact vertices by first use
    fn remap_data(&mut self, face_order: &[usize]) {
        debug_assert_eq!(face_order.len(), self.faces.len());

        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut new_vertices: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        let mut new_faces: Vec<Face> = Vec::with_capacity(face_order.len());

        for &f in face_order {
            let face = self.faces[f].map(|old| match remap[old] {
                Some(new) => new,
                None => {
                    let new = new_vertices.len();
                    new_vertices.push(self.vertices[old]);
                    remap[old] = Some(new);
                    new
                }
            });
            new_faces.push(face);
        }

        let dropped = self.vertices.len() - new_vertices.len();
        if dropped > 0 {
            tracing::trace!(dropped, "unreferenced vertices removed");
        }

        self.faces = new_faces;
        self.vertices = new_vertices;
    }

    /// Average cache miss ratio of the current face order
    ///
    /// Simulates an LRU cache of `cache_size` vertices and returns misses per
    /// triangle. 3.0 means no reuse at all; well ordered closed meshes land
    /// around 0.6 to 0.8.
    pub fn acmr(&self, cache_size: usize) -> f32 {
        if self.faces.is_empty() {
            return 0.0;
        }

        let mut cache: Vec<usize> = Vec::with_capacity(cache_size.min(self.vertices.len()) + 1);
        let mut misses = 0usize;

        for face in &self.faces {
            for &idx in face {
                match cache.iter().position(|&v| v == idx) {
                    Some(pos) => {
                        cache.remove(pos);
                    }
                    None => misses += 1,
                }
                cache.insert(0, idx);
                cache.truncate(cache_size);
            }
        }

        misses as f32 / self.faces.len() as f32
    }
}
