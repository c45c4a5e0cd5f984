use crate::core::models::grid::ScalarGrid;
use nalgebra::{Point3, Vector3};
use std::io::{self, BufRead};
use thiserror::Error;

/// Conversion factor from atomic-unit lengths (Bohr) to the length units
/// used everywhere else in the crate.
///
/// Volumetric input files carry their origin and axis steps in atomic
/// units; all in-memory geometry is kept in length units (Angstroms), so
/// every header coordinate is scaled by this constant on the way in.
pub const LENGTH_UNITS_PER_BOHR: f64 = 1.0 / 1.889_726_342;

#[derive(Debug, Error)]
pub enum CubeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unexpected end of file while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("Invalid {context} (value: '{value}')")]
    InvalidValue { context: &'static str, value: String },

    #[error("Channel index {requested} out of range ({available} channel(s) present)")]
    ChannelOutOfRange { requested: usize, available: usize },

    #[error("Read interrupted by cancellation")]
    Interrupted,
}

/// Everything the header of a volumetric density file declares, with
/// lengths already converted out of atomic units.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeHeader {
    /// The free-text description on the second line.
    pub description: String,
    /// Number of atom records in the coordinate block.
    pub atom_count: usize,
    /// World position of the first lattice point, in length units.
    pub origin: Point3<f64>,
    /// Lattice point counts per axis.
    pub counts: [usize; 3],
    /// Lattice step per axis (diagonal axis-vector components only), in
    /// length units.
    pub spacing: Vector3<f64>,
    /// Selectable data-channel identifiers. Empty when the file carries a
    /// single unnamed channel.
    pub channel_ids: Vec<i64>,
}

impl CubeHeader {
    /// Number of interleaved data channels in the sample block.
    pub fn channel_count(&self) -> usize {
        self.channel_ids.len().max(1)
    }

    /// Total number of lattice points per channel.
    pub fn point_count(&self) -> usize {
        self.counts[0] * self.counts[1] * self.counts[2]
    }
}

/// Whitespace-token reader over a buffered stream. The header's two
/// free-text lines are consumed raw; everything after is a flat token
/// sequence that may wrap lines arbitrarily.
struct TokenStream<R: BufRead> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> TokenStream<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    fn raw_line(&mut self, context: &'static str) -> Result<String, CubeError> {
        self.line.clear();
        self.pos = 0;
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(CubeError::UnexpectedEof { context });
        }
        let text = self.line.trim_end_matches(['\n', '\r']).to_string();
        self.line.clear();
        Ok(text)
    }

    fn next_span(&mut self) -> Result<Option<(usize, usize)>, io::Error> {
        loop {
            let bytes = self.line.as_bytes();
            let mut p = self.pos;
            while p < bytes.len() && bytes[p].is_ascii_whitespace() {
                p += 1;
            }
            if p < bytes.len() {
                let start = p;
                while p < bytes.len() && !bytes[p].is_ascii_whitespace() {
                    p += 1;
                }
                self.pos = p;
                return Ok(Some((start, p)));
            }
            self.line.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }

    fn token(&mut self, context: &'static str) -> Result<&str, CubeError> {
        match self.next_span()? {
            Some((start, end)) => Ok(&self.line[start..end]),
            None => Err(CubeError::UnexpectedEof { context }),
        }
    }

    fn parse_f64(&mut self, context: &'static str) -> Result<f64, CubeError> {
        let token = self.token(context)?;
        token.parse().map_err(|_| CubeError::InvalidValue {
            context,
            value: token.to_string(),
        })
    }

    fn parse_i64(&mut self, context: &'static str) -> Result<i64, CubeError> {
        let token = self.token(context)?;
        token.parse().map_err(|_| CubeError::InvalidValue {
            context,
            value: token.to_string(),
        })
    }
}

fn parse_header<R: BufRead>(tokens: &mut TokenStream<R>) -> Result<CubeHeader, CubeError> {
    // First line is ignored, second is the description.
    let _ = tokens.raw_line("title line")?;
    let description = tokens.raw_line("description line")?.trim().to_string();

    let atom_entry = tokens.parse_i64("atom count")?;
    let has_channel_list = atom_entry < 0;
    let atom_count = atom_entry.unsigned_abs() as usize;

    let origin = Point3::new(
        tokens.parse_f64("origin x")? * LENGTH_UNITS_PER_BOHR,
        tokens.parse_f64("origin y")? * LENGTH_UNITS_PER_BOHR,
        tokens.parse_f64("origin z")? * LENGTH_UNITS_PER_BOHR,
    );

    let mut counts = [0usize; 3];
    let mut spacing = Vector3::zeros();
    for axis in 0..3 {
        let n = tokens.parse_i64("axis point count")?;
        if n <= 0 {
            return Err(CubeError::InvalidValue {
                context: "axis point count",
                value: n.to_string(),
            });
        }
        counts[axis] = n as usize;

        let mut axis_vector = [0.0f64; 3];
        for component in &mut axis_vector {
            *component = tokens.parse_f64("axis vector component")?;
        }
        let step = axis_vector[axis] * LENGTH_UNITS_PER_BOHR;
        if step <= 0.0 {
            return Err(CubeError::InvalidValue {
                context: "axis spacing",
                value: axis_vector[axis].to_string(),
            });
        }
        spacing[axis] = step;
    }

    // Atom records carry species, charge, and coordinates; the density
    // engine does not consume them.
    for _ in 0..atom_count {
        for _ in 0..5 {
            let _ = tokens.token("atom record")?;
        }
    }

    let channel_ids = if has_channel_list {
        let m = tokens.parse_i64("channel count")?;
        if m <= 0 {
            return Err(CubeError::InvalidValue {
                context: "channel count",
                value: m.to_string(),
            });
        }
        let mut ids = Vec::with_capacity(m as usize);
        for _ in 0..m {
            ids.push(tokens.parse_i64("channel id")?);
        }
        ids
    } else {
        Vec::new()
    };

    Ok(CubeHeader {
        description,
        atom_count,
        origin,
        counts,
        spacing,
        channel_ids,
    })
}

/// Reads only the header of a volumetric density file, consuming the
/// stream up to the start of the sample block.
pub fn read_header(reader: impl BufRead) -> Result<CubeHeader, CubeError> {
    let mut tokens = TokenStream::new(reader);
    parse_header(&mut tokens)
}

/// Reads a full density grid, selecting one channel when several are
/// interleaved.
pub fn read_cube(reader: impl BufRead, channel: usize) -> Result<ScalarGrid, CubeError> {
    read_cube_with(reader, channel, |_| {}, || false)
}

/// Reads a full density grid with progress reporting and cooperative
/// cancellation.
///
/// `on_progress` is called with a 0-100 percentage roughly once per 1% of
/// points read. `should_stop` is polled on the same cadence; once it
/// returns `true` the partial buffer is discarded and the read fails with
/// [`CubeError::Interrupted`].
///
/// The file nests its samples with x varying slowest and z fastest; the
/// returned grid stores them in the crate's x-fastest layout, so callers
/// can address values with the standard `x + nx * (y + ny * z)` formula.
pub fn read_cube_with(
    reader: impl BufRead,
    channel: usize,
    mut on_progress: impl FnMut(u8),
    should_stop: impl Fn() -> bool,
) -> Result<ScalarGrid, CubeError> {
    let mut tokens = TokenStream::new(reader);
    let header = parse_header(&mut tokens)?;

    let channels = header.channel_count();
    if channel >= channels {
        return Err(CubeError::ChannelOutOfRange {
            requested: channel,
            available: channels,
        });
    }

    let [nx, ny, nz] = header.counts;
    let total = header.point_count();
    let mut values = vec![0.0f64; total];
    let stride = (total / 100).max(1);
    let mut points_read = 0usize;

    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let mut selected = 0.0;
                for ch in 0..channels {
                    let v = tokens.parse_f64("density sample")?;
                    if ch == channel {
                        selected = v;
                    }
                }
                values[x + nx * (y + ny * z)] = selected;

                points_read += 1;
                if points_read % stride == 0 {
                    if should_stop() {
                        return Err(CubeError::Interrupted);
                    }
                    on_progress(((points_read * 100) / total).min(100) as u8);
                }
            }
        }
    }

    Ok(ScalarGrid::new(
        header.origin,
        header.spacing,
        header.counts,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOHR_PER_LENGTH_UNIT: f64 = 1.889_726_342;

    /// 2x2x2 single-channel file with one (skipped) atom record. Sample
    /// values count 1..8 in file order: x slowest, z fastest.
    fn simple_cube() -> String {
        format!(
            "generated for tests\n\
             water density\n\
             1  {o}  0.0  0.0\n\
             2  {s}  0.0  0.0\n\
             2  0.0  {s}  0.0\n\
             2  0.0  0.0  {s}\n\
             8  0.0  0.1  0.2  0.3\n\
             1 2 3 4\n\
             5 6 7 8\n",
            o = BOHR_PER_LENGTH_UNIT,
            s = BOHR_PER_LENGTH_UNIT * 0.5,
        )
    }

    /// Two interleaved channels (ids 3 and 7) on a 2x2x2 grid. The
    /// negative atom count marks the trailing channel-id list. Channel 0
    /// holds value 10*k, channel 1 holds k, for k = 1..8.
    fn two_channel_cube() -> String {
        let mut text = String::from(
            "multi-channel test\n\
             orbital pair\n\
             -1  0.0  0.0  0.0\n\
             2  1.0  0.0  0.0\n\
             2  0.0  1.0  0.0\n\
             2  0.0  0.0  1.0\n\
             8  0.0  0.5  0.5  0.5\n\
             2  3 7\n",
        );
        for k in 1..=8 {
            text.push_str(&format!("{} {}\n", 10 * k, k));
        }
        text
    }

    #[test]
    fn header_converts_atomic_units_and_skips_atoms() {
        let header = read_header(simple_cube().as_bytes()).unwrap();
        assert_eq!(header.description, "water density");
        assert_eq!(header.atom_count, 1);
        assert_eq!(header.counts, [2, 2, 2]);
        assert_eq!(header.channel_ids, Vec::<i64>::new());
        assert_eq!(header.channel_count(), 1);
        assert!((header.origin.x - 1.0).abs() < 1e-12);
        assert!((header.origin.y).abs() < 1e-12);
        assert!((header.spacing.x - 0.5).abs() < 1e-12);
        assert!((header.spacing.y - 0.5).abs() < 1e-12);
        assert!((header.spacing.z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn data_block_is_remapped_from_z_fastest_to_x_fastest() {
        let grid = read_cube(simple_cube().as_bytes(), 0).unwrap();
        // File order: (x,y,z) = (0,0,0),(0,0,1),(0,1,0),(0,1,1),(1,0,0)...
        assert_eq!(grid.value(0, 0, 0), 1.0);
        assert_eq!(grid.value(0, 0, 1), 2.0);
        assert_eq!(grid.value(0, 1, 0), 3.0);
        assert_eq!(grid.value(0, 1, 1), 4.0);
        assert_eq!(grid.value(1, 0, 0), 5.0);
        assert_eq!(grid.value(1, 1, 1), 8.0);
    }

    #[test]
    fn channel_selection_skips_interleaved_samples() {
        let header = read_header(two_channel_cube().as_bytes()).unwrap();
        assert_eq!(header.channel_ids, vec![3, 7]);
        assert_eq!(header.channel_count(), 2);

        let first = read_cube(two_channel_cube().as_bytes(), 0).unwrap();
        assert_eq!(first.value(0, 0, 0), 10.0);
        assert_eq!(first.value(1, 1, 1), 80.0);

        let second = read_cube(two_channel_cube().as_bytes(), 1).unwrap();
        assert_eq!(second.value(0, 0, 0), 1.0);
        assert_eq!(second.value(1, 1, 1), 8.0);
    }

    #[test]
    fn out_of_range_channel_is_rejected() {
        let result = read_cube(two_channel_cube().as_bytes(), 2);
        assert!(matches!(
            result,
            Err(CubeError::ChannelOutOfRange {
                requested: 2,
                available: 2
            })
        ));
        let result = read_cube(simple_cube().as_bytes(), 1);
        assert!(matches!(result, Err(CubeError::ChannelOutOfRange { .. })));
    }

    #[test]
    fn truncated_data_block_reports_eof() {
        let mut text = simple_cube();
        // Drop the last data line.
        text.truncate(text.rfind("5 6 7 8").unwrap());
        let result = read_cube(text.as_bytes(), 0);
        assert!(matches!(
            result,
            Err(CubeError::UnexpectedEof {
                context: "density sample"
            })
        ));
    }

    #[test]
    fn malformed_numbers_are_parse_errors() {
        let text = simple_cube().replace("5 6 7 8", "5 six 7 8");
        let result = read_cube(text.as_bytes(), 0);
        assert!(matches!(
            result,
            Err(CubeError::InvalidValue {
                context: "density sample",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_axis_counts_are_rejected() {
        let text = "title\ndescription\n0  0.0 0.0 0.0\n0  1.0 0.0 0.0\n2  0.0 1.0 0.0\n2  0.0 0.0 1.0\n";
        let result = read_header(text.as_bytes());
        assert!(matches!(
            result,
            Err(CubeError::InvalidValue {
                context: "axis point count",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_axis_spacing_is_rejected() {
        let text = "title\ndescription\n0  0.0 0.0 0.0\n2  -1.0 0.0 0.0\n2  0.0 1.0 0.0\n2  0.0 0.0 1.0\n";
        let result = read_header(text.as_bytes());
        assert!(matches!(
            result,
            Err(CubeError::InvalidValue {
                context: "axis spacing",
                ..
            })
        ));
    }

    #[test]
    fn cancellation_discards_the_partial_read() {
        let result = read_cube_with(simple_cube().as_bytes(), 0, |_| {}, || true);
        assert!(matches!(result, Err(CubeError::Interrupted)));
    }

    #[test]
    fn progress_reaches_one_hundred_percent() {
        let mut last = 0u8;
        let grid =
            read_cube_with(simple_cube().as_bytes(), 0, |p| last = p, || false).unwrap();
        assert_eq!(last, 100);
        assert_eq!(grid.len(), 8);
    }
}
