use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::ColmapPoint3d;

/// Write the sparse points as an ASCII PLY file with position and color.
///
/// Points are written in ascending id order so that the output does not
/// depend on the container they were collected in.
///
/// # Arguments
///
/// * `points` - The 3D points of a sparse model.
/// * `path` - The output PLY file.
pub fn write_points3d_ply<'a>(
    points: impl IntoIterator<Item = &'a ColmapPoint3d>,
    path: impl AsRef<Path>,
) -> Result<(), std::io::Error> {
    let mut points = points.into_iter().collect::<Vec<_>>();
    points.sort_by_key(|point| point.point3d_id);

    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(&points, &mut writer)?;
    writer.flush()
}

fn write_ply<W: Write>(points: &[&ColmapPoint3d], writer: &mut W) -> Result<(), std::io::Error> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", points.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property float {axis}")?;
    }
    for channel in ["red", "green", "blue"] {
        writeln!(writer, "property uchar {channel}")?;
    }
    writeln!(writer, "end_header")?;

    for point in points {
        let [x, y, z] = point.xyz;
        let [r, g, b] = point.rgb;
        writeln!(writer, "{x} {y} {z} {r} {g} {b}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u64, xyz: [f64; 3], rgb: [u8; 3]) -> ColmapPoint3d {
        ColmapPoint3d {
            point3d_id: id,
            xyz,
            rgb,
            error: 0.0,
            track: vec![],
        }
    }

    #[test]
    fn test_write_points3d_ply() -> Result<(), Box<dyn std::error::Error>> {
        let points = [
            point(9, [1.5, -2.0, 3.25], [1, 2, 3]),
            point(2, [0.0, 0.5, 10.0], [255, 0, 128]),
        ];

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("makeply.ply");
        write_points3d_ply(&points, &path)?;

        let contents = std::fs::read_to_string(&path)?;
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "ply");
        assert_eq!(lines[1], "format ascii 1.0");
        assert_eq!(lines[2], "element vertex 2");
        assert_eq!(lines[9], "end_header");
        assert_eq!(lines[10], "0 0.5 10 255 0 128");
        assert_eq!(lines[11], "1.5 -2 3.25 1 2 3");
        assert_eq!(lines.len(), 12);
        Ok(())
    }
}
