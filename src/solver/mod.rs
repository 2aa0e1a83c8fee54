mod astar;
mod candidate;
mod crossings;
mod distance;
mod driver;
mod queue;
mod ripup;
mod snapshot;
mod types;
mod variant;

pub use candidate::{Candidate, CandidateId, RipTarget};
pub use crossings::{chords_cross, count_crossings_with_other_nets, list_crossing_assignments};
pub use driver::HyperRouter;
pub use types::{FailureKind, SolvedRoute, SolverOptions, UnitOfCost};
pub use variant::{Variant, VariantKind};
