/// GPU-uploadable mesh vertex. Positions are Cartesian.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// Indexed triangle list for one chunk. Each emitted face owns three
/// vertices, so vertex count is always three times the face count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Append one triangle.
    pub(crate) fn push_triangle(&mut self, corners: [Vertex; 3]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Result of meshing one chunk. Hitting a size cap is reported here,
/// never as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshOutcome {
    pub mesh: Mesh,
    /// The mesh hit its vertex or index cap and later faces were dropped.
    pub truncated: bool,
    pub faces_emitted: usize,
    /// Faces hidden behind an opaque neighbor.
    pub faces_culled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }

    #[test]
    fn test_push_triangle_indices() {
        let v = Vertex::new([0.0; 3], [0.0, 0.0, 1.0], [1.0; 3]);
        let mut mesh = Mesh::new();
        mesh.push_triangle([v; 3]);
        mesh.push_triangle([v; 3]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_bytes().len(), 6 * 36);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }
}
