//! # Bond Topology Module
//!
//! Derives a bond graph from raw atom positions and answers the one
//! question an interactive editor keeps asking of that graph: which atoms
//! must move together when a single internal coordinate changes.
//!
//! - [`detect`] - cell-bucketed neighbor search producing the bonded pair
//!   list under the heuristic radius-sum rule
//! - [`fragment`] - explicit-stack traversal that collects the rigid
//!   fragment for an edit, with conservative ring fallback

pub mod detect;
pub mod fragment;
