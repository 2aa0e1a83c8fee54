use super::candidate::Candidate;

/// How one region-to-region hop is priced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnitOfCost {
    Hops,
    Distance,
}

/// Numeric knobs shared by both variants. Variant constructors supply their
/// own defaults; every field stays overridable by the caller.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SolverOptions {
    /// Multiplies the heuristic in `f = g + greedy_multiplier * h`.
    pub greedy_multiplier: f64,
    pub rip_cost: f64,
    pub crossing_penalty: f64,
    pub crossing_penalty_sq: f64,
    pub port_usage_penalty: f64,
    pub port_usage_penalty_sq: f64,
    pub base_max_iterations: u64,
    pub additional_max_iterations_per_connection: u64,
    pub additional_max_iterations_per_crossing: u64,
    pub ripping_enabled: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            greedy_multiplier: 1.0,
            rip_cost: 1000.0,
            crossing_penalty: 0.0,
            crossing_penalty_sq: 0.0,
            port_usage_penalty: 0.0,
            port_usage_penalty_sq: 0.0,
            base_max_iterations: 10_000,
            additional_max_iterations_per_connection: 1_000,
            additional_max_iterations_per_crossing: 100,
            ripping_enabled: true,
        }
    }
}

/// Why a solver transitioned to `failed`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FailureKind {
    BudgetExhausted,
    UnreachableGoal,
}

/// A committed route: the candidate chain from start to end in visit order.
#[derive(Clone, Debug)]
pub struct SolvedRoute {
    pub connection: usize,
    pub path: Vec<Candidate>,
    pub required_rip: bool,
}
