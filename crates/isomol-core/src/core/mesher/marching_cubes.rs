use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::core::models::grid::ScalarGrid;
use crate::core::models::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Canonical identity of a lattice edge: the axis it runs along plus the
/// lattice coordinates of its lower corner. Every cell touching the edge
/// derives the same key, which is what stitches neighboring cells together
/// without cracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    axis: u8,
    x: usize,
    y: usize,
    z: usize,
}

/// Extracts a triangle mesh approximating the level set `density = isolevel`.
///
/// Classification uses the strict comparison `value < isolevel`, so a
/// sample exactly at the isolevel is deterministically treated as being on
/// the high side. Cells whose corners all fall on one side contribute
/// nothing. A grid with fewer than two lattice points along any axis, or a
/// non-finite isolevel, yields an empty mesh rather than an error; the
/// same naturally happens when the isolevel lies outside the data range.
///
/// Vertices are deduplicated across cells sharing a lattice edge, so the
/// mesh is watertight wherever the surface is. Normals are the negated,
/// normalized field gradient interpolated along the crossed edge: they
/// point from higher density toward lower.
pub fn extract(grid: &ScalarGrid, isolevel: f64) -> Mesh {
    let mut mesh = Mesh::empty(isolevel);
    let [nx, ny, nz] = grid.counts();
    if nx < 2 || ny < 2 || nz < 2 || !isolevel.is_finite() {
        return mesh;
    }

    let mut edge_map: HashMap<EdgeKey, u32> = HashMap::new();

    for cz in 0..nz - 1 {
        for cy in 0..ny - 1 {
            for cx in 0..nx - 1 {
                let mut corner_values = [0.0f64; 8];
                let mut cube_index = 0usize;
                for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
                    let v = grid.value(cx + offset[0], cy + offset[1], cz + offset[2]);
                    corner_values[corner] = v;
                    if v < isolevel {
                        cube_index |= 1 << corner;
                    }
                }

                let edge_bits = EDGE_TABLE[cube_index];
                if edge_bits == 0 {
                    continue;
                }

                let mut edge_vertices = [u32::MAX; 12];
                for (edge, corners) in EDGE_CORNERS.iter().enumerate() {
                    if edge_bits & (1 << edge) == 0 {
                        continue;
                    }
                    let o0 = CORNER_OFFSETS[corners[0]];
                    let o1 = CORNER_OFFSETS[corners[1]];
                    let key = EdgeKey {
                        axis: (0..3).find(|&a| o0[a] != o1[a]).unwrap_or(0) as u8,
                        x: cx + o0[0].min(o1[0]),
                        y: cy + o0[1].min(o1[1]),
                        z: cz + o0[2].min(o1[2]),
                    };
                    let index = *edge_map.entry(key).or_insert_with(|| {
                        let (x0, y0, z0) = (cx + o0[0], cy + o0[1], cz + o0[2]);
                        let (x1, y1, z1) = (cx + o1[0], cy + o1[1], cz + o1[2]);
                        let v0 = corner_values[corners[0]];
                        let v1 = corner_values[corners[1]];
                        // One corner is strictly below and the other at or
                        // above the isolevel, so the denominator is nonzero.
                        let t = (isolevel - v0) / (v1 - v0);

                        let p0 = grid.position(x0, y0, z0);
                        let p1 = grid.position(x1, y1, z1);
                        let position = p0 + (p1 - p0) * t;

                        let g0 = grid.gradient(x0, y0, z0);
                        let g1 = grid.gradient(x1, y1, z1);
                        let mut normal = -(g0 + (g1 - g0) * t);
                        if normal.norm_squared() > 0.0 {
                            normal.normalize_mut();
                        }

                        let index = mesh.vertices.len() as u32;
                        mesh.vertices.push(Point3::new(
                            position.x as f32,
                            position.y as f32,
                            position.z as f32,
                        ));
                        mesh.normals.push(Vector3::new(
                            normal.x as f32,
                            normal.y as f32,
                            normal.z as f32,
                        ));
                        index
                    });
                    edge_vertices[edge] = index;
                }

                let row = &TRI_TABLE[cube_index];
                let mut t = 0;
                while row[t] >= 0 {
                    mesh.triangles.push([
                        edge_vertices[row[t] as usize],
                        edge_vertices[row[t + 1] as usize],
                        edge_vertices[row[t + 2] as usize],
                    ]);
                    t += 3;
                }
            }
        }
    }

    mesh
}
