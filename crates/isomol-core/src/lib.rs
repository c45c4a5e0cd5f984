//! # isomol Core Library
//!
//! The geometry and topology engine behind a molecular viewer: marching-cubes
//! isosurface extraction from volumetric density grids, heuristic bond
//! perception over atom lists, and rigid-fragment transforms for
//! internal-coordinate edits.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer separation so each layer stays
//! testable in isolation:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ScalarGrid`,
//!   `Mesh`, `Structure`), the pure algorithms that operate on them
//!   (marching cubes, cell-bucketed bond detection, fragment traversal),
//!   and text I/O for volumetric and structure formats.
//!
//! - **[`engine`]: The Logic Core.** Stateful orchestration: `SurfaceSet`
//!   manages named, independently editable isosurfaces over shared density
//!   channels; `CoordinateEditor` applies bond/angle/torsion edits to the
//!   correct rigid fragment; `DensityLoader` streams grids in from disk on
//!   a background thread with progress events and cooperative cancellation.
//!
//! - **[`workflows`]: The Public API.** Entry points that tie `core` and
//!   `engine` together for callers that want a complete operation (extract
//!   isosurfaces from a density file, perceive bonds from a structure file)
//!   rather than the individual building blocks.

pub mod core;
pub mod engine;
pub mod workflows;
