//! Hypergraph connection router: best-first port expansion across planar
//! regions with chord-crossing detection and rip-up/reroute.

mod geometry;
mod graph;
mod lib_tracing;
mod solver;

#[cfg(feature = "python")]
mod python;

pub use geometry::{chords_interleave, segments_cross, Bounds, PerimeterOutline, Point};
pub use graph::{
    Assignment, Connection, ConnectionInput, GraphError, GraphInput, Port, PortIndex, PortInput,
    Region, RegionGraph, RegionIndex, RegionInput,
};
pub use lib_tracing::FlameTracer;
pub use solver::{
    chords_cross, count_crossings_with_other_nets, list_crossing_assignments, Candidate,
    CandidateId, FailureKind, HyperRouter, RipTarget, SolvedRoute, SolverOptions, UnitOfCost,
    Variant, VariantKind,
};
