use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh produced by isosurface extraction.
///
/// Vertices, normals, and triangles live in flat buffers; triangles index
/// into the vertex/normal arrays, which always have equal length. An empty
/// mesh is a valid value and means the isolevel did not intersect the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// The scalar value this mesh approximates the level set of.
    pub isolevel: f64,
    /// Deduplicated vertex positions.
    pub vertices: Vec<Point3<f32>>,
    /// Per-vertex unit normals, parallel to `vertices`.
    pub normals: Vec<Vector3<f32>>,
    /// Vertex-index triples, one per triangle.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// An empty mesh at the given isolevel.
    pub fn empty(isolevel: f64) -> Self {
        Self {
            isolevel,
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Whether every triangle references a valid vertex and the normal
    /// buffer matches the vertex buffer.
    pub fn is_consistent(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.normals.len() == self.vertices.len()
            && self
                .triangles
                .iter()
                .all(|t| t.iter().all(|&i| i < n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_consistent() {
        let mesh = Mesh::empty(0.5);
        assert_eq!(mesh.isolevel, 0.5);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.is_empty());
        assert!(mesh.is_consistent());
    }

    #[test]
    fn out_of_range_triangle_index_is_inconsistent() {
        let mut mesh = Mesh::empty(0.0);
        mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mesh.normals.push(Vector3::new(0.0, 0.0, 1.0));
        mesh.triangles.push([0, 0, 1]);
        assert!(!mesh.is_consistent());
    }
}
