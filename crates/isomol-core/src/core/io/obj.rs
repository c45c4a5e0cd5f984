use crate::core::models::mesh::Mesh;
use std::io::{self, Write};

/// Writes one or more named meshes as a Wavefront OBJ stream.
///
/// Each mesh becomes an `o` object with `v`/`vn` records and `f v//vn`
/// faces. OBJ indices are 1-based and global across objects, so later
/// objects offset their face indices by the vertices already written.
pub fn write_obj<'a, W, I>(writer: &mut W, objects: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a Mesh)>,
{
    let mut base = 1u32;
    for (name, mesh) in objects {
        writeln!(writer, "o {name}")?;
        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for n in &mesh.normals {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for t in &mesh.triangles {
            writeln!(
                writer,
                "f {0}//{0} {1}//{1} {2}//{2}",
                base + t[0],
                base + t[1],
                base + t[2]
            )?;
        }
        base += mesh.vertex_count() as u32;
    }
    Ok(())
}
