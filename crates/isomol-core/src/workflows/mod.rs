//! # Workflows Module
//!
//! The highest-level, user-facing layer: complete operations that tie the
//! [`core`] and [`engine`] layers together so a caller gets a finished
//! result from a single entry point.
//!
//! - [`density_info`] - read just the header of a volumetric density file
//! - [`extract_isosurfaces`] - load a density file in the background and
//!   extract one surface per requested isolevel into a [`SurfaceSet`]
//! - [`perceive_bonds`] - read a structure file and derive its bond graph
//!
//! [`core`]: crate::core
//! [`engine`]: crate::engine
//! [`SurfaceSet`]: crate::engine::surfaces::SurfaceSet

use crate::core::io::cube::{self, CubeError, CubeHeader};
use crate::core::io::xyz::{self, XyzError};
use crate::core::models::structure::Structure;
use crate::engine::loader::{CancelToken, DensityLoadTask, LoadError};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::surfaces::SurfaceSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Cube(#[from] CubeError),

    #[error(transparent)]
    Xyz(#[from] XyzError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the header of a volumetric density file without loading its
/// sample block.
#[instrument(skip_all, name = "density_info")]
pub fn density_info(path: &Path) -> Result<CubeHeader, WorkflowError> {
    let file = File::open(path)?;
    let header = cube::read_header(BufReader::new(file))?;
    info!(
        points = header.point_count(),
        channels = header.channel_count(),
        "Read density header."
    );
    Ok(header)
}

/// Loads a density file on a background thread and extracts one surface
/// per requested isolevel.
///
/// Load progress is forwarded to `reporter` as [`Progress::Percent`]
/// events inside a "Loading density grid" stage; extraction follows in a
/// second stage with one message per surface. Raising `cancel` makes the
/// whole workflow fail with [`LoadError::Cancelled`] and nothing is
/// published. Isolevels that miss the data range simply produce empty
/// surfaces.
#[instrument(skip_all, name = "extract_isosurfaces")]
pub fn extract_isosurfaces(
    path: &Path,
    channel: usize,
    isolevels: &[f64],
    reporter: &ProgressReporter<'_>,
    cancel: CancelToken,
) -> Result<SurfaceSet, WorkflowError> {
    reporter.report(Progress::StageStart {
        name: "Loading density grid",
    });
    let task = DensityLoadTask::spawn_with(path, channel, cancel);
    let grid = task.wait_with(|percent| reporter.report(Progress::Percent(percent)))?;
    reporter.report(Progress::StageFinish);

    reporter.report(Progress::StageStart {
        name: "Extracting isosurfaces",
    });
    let mut surfaces = SurfaceSet::new();
    surfaces.set_grid_a(Some(grid));
    for &isolevel in isolevels {
        let id = surfaces.add_surface(isolevel);
        if let Some(surface) = surfaces.surface(id) {
            reporter.report(Progress::Message(format!(
                "{id}: isolevel {isolevel}, {} triangles",
                surface.triangle_count()
            )));
        }
    }
    reporter.report(Progress::StageFinish);

    info!(surfaces = surfaces.len(), "Isosurface extraction complete.");
    Ok(surfaces)
}

/// Reads a structure file and derives its bond graph.
///
/// The returned structure has its bond cache populated; an empty file is
/// an empty structure with no bonds, not an error.
#[instrument(skip_all, name = "perceive_bonds")]
pub fn perceive_bonds(path: &Path) -> Result<Structure, WorkflowError> {
    let file = File::open(path)?;
    let mut structure = xyz::read_xyz(BufReader::new(file))?;
    let bond_count = structure.bonds().len();
    info!(
        atoms = structure.len(),
        bonds = bond_count,
        "Bond perception complete."
    );
    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    fn ramp_cube_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "workflow test").unwrap();
        writeln!(file, "x ramp").unwrap();
        writeln!(file, "0  0.0 0.0 0.0").unwrap();
        writeln!(file, "4  1.0 0.0 0.0").unwrap();
        writeln!(file, "3  0.0 1.0 0.0").unwrap();
        writeln!(file, "3  0.0 0.0 1.0").unwrap();
        // x slowest, z fastest: value = x for each of the 4*3*3 points.
        for x in 0..4 {
            for _yz in 0..9 {
                writeln!(file, "{}", x as f64).unwrap();
            }
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn density_info_reads_the_header() {
        let file = ramp_cube_file();
        let header = density_info(file.path()).unwrap();
        assert_eq!(header.description, "x ramp");
        assert_eq!(header.counts, [4, 3, 3]);
        assert_eq!(header.channel_count(), 1);
    }

    #[test]
    fn extract_isosurfaces_builds_one_surface_per_level() {
        let file = ramp_cube_file();
        let events: Mutex<Vec<Progress>> = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        let surfaces = extract_isosurfaces(
            file.path(),
            0,
            &[0.5, 1.5, 99.0],
            &reporter,
            CancelToken::new(),
        )
        .unwrap();

        assert_eq!(surfaces.len(), 3);
        let meshes: Vec<_> = surfaces.surfaces().iter().collect();
        assert!(!meshes[0].mesh().is_empty());
        assert!(!meshes[1].mesh().is_empty());
        // The last level misses the data range entirely.
        assert!(meshes[2].mesh().is_empty());

        drop(reporter);
        let events = events.into_inner().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Progress::Percent(100))));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Progress::StageFinish))
                .count(),
            2
        );
    }

    #[test]
    fn cancelled_extraction_publishes_nothing() {
        let file = ramp_cube_file();
        let token = CancelToken::new();
        token.cancel();
        let result = extract_isosurfaces(
            file.path(),
            0,
            &[0.5],
            &ProgressReporter::new(),
            token,
        );
        assert!(matches!(
            result,
            Err(WorkflowError::Load(LoadError::Cancelled))
        ));
    }

    #[test]
    fn perceive_bonds_populates_the_bond_cache() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "3\nwater\nO 0.000 0.000 0.117\nH 0.000 0.757 -0.469\nH 0.000 -0.757 -0.469\n"
        )
        .unwrap();
        file.flush().unwrap();

        let structure = perceive_bonds(file.path()).unwrap();
        assert_eq!(structure.len(), 3);
        let bonds = structure.cached_bonds().unwrap();
        assert_eq!(bonds.len(), 2);
        assert!(bonds.contains(0, 1));
        assert!(bonds.contains(0, 2));
    }

    #[test]
    fn missing_files_surface_as_errors() {
        let missing = Path::new("/no/such/file.cube");
        assert!(density_info(missing).is_err());
        assert!(perceive_bonds(Path::new("/no/such/file.xyz")).is_err());
    }
}
