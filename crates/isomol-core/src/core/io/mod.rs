//! # File I/O Module
//!
//! Text formats at the boundary of the engine.
//!
//! - [`cube`] - volumetric density input (Gaussian-cube-shaped text
//!   stream, with optional multi-channel data blocks)
//! - [`xyz`] - minimal structure input feeding [`Structure`]
//! - [`obj`] - Wavefront OBJ mesh output for extracted isosurfaces
//!
//! Parsers here are the one place in the crate that returns real errors:
//! malformed input is an I/O problem, not a data-shape condition the
//! geometry core is expected to absorb.
//!
//! [`Structure`]: crate::core::models::structure::Structure

pub mod cube;
pub mod obj;
pub mod xyz;
