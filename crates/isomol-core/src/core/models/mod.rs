//! # Core Models Module
//!
//! Data structures shared by every algorithm in the crate.
//!
//! ## Key Components
//!
//! - [`atom`] - chemical elements and positioned atoms
//! - [`structure`] - an editable atom list with a derived, lazily rebuilt
//!   bond cache
//! - [`grid`] - regular 3-D scalar density grids
//! - [`mesh`] - flat-buffer triangle meshes produced by isosurface
//!   extraction

pub mod atom;
pub mod grid;
pub mod mesh;
pub mod structure;
