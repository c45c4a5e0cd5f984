//! # Engine Module
//!
//! Stateful orchestration on top of the stateless [`core`] layer.
//!
//! ## Key Components
//!
//! - [`surfaces`] - owns named, independently editable isosurfaces over
//!   shared density channels and re-extracts them on demand
//! - [`editor`] - applies bond-length, valence-angle, and torsion edits to
//!   the rigid fragment the bond graph dictates
//! - [`loader`] - streams a density grid in from disk on a background
//!   thread with progress events and cooperative cancellation
//! - [`progress`] - the callback channel long-running operations use to
//!   report back to an interactive caller
//!
//! Everything here operates on exactly one owned grid or structure at a
//! time; there is no shared mutable state across instances and no internal
//! locking. The loader is the single concurrent component, and ownership
//! of its buffer transfers to the caller only at the one publish point
//! after completion.
//!
//! [`core`]: crate::core

pub mod editor;
pub mod loader;
pub mod progress;
pub mod surfaces;
