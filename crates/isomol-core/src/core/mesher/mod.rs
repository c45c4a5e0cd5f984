//! # Isosurface Extraction Module
//!
//! Lookup-table-driven marching cubes over a [`ScalarGrid`], producing a
//! deduplicated, gradient-shaded triangle [`Mesh`].
//!
//! - [`tables`] - the fixed 256-entry edge-crossing and triangulation
//!   tables plus the cell corner/edge numbering they assume
//! - [`marching_cubes`] - the extractor walking every grid cell and
//!   stitching shared-edge vertices across cell boundaries
//!
//! [`ScalarGrid`]: crate::core::models::grid::ScalarGrid
//! [`Mesh`]: crate::core::models::mesh::Mesh

pub mod marching_cubes;
pub mod tables;

pub use marching_cubes::extract;
