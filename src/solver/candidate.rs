use crate::graph::{PortIndex, RegionIndex};

pub type CandidateId = u32;

/// One assignment a rip-requiring candidate would remove, together with the
/// rip counters of its two ports observed at enqueue time. A later rip
/// through either port makes the candidate stale.
#[derive(Clone, Debug)]
pub struct RipTarget {
    pub region: RegionIndex,
    pub connection: usize,
    pub port1: PortIndex,
    pub port2: PortIndex,
    pub observed_rips: [u32; 2],
}

/// Search node: the port just reached and the region to traverse next.
///
/// The root candidate of a search has no parent and sits at the start
/// region's connection port; every child records the port and region it came
/// through so the commit walk can reconstruct per-region chords.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub port: Option<PortIndex>,
    pub next_region: RegionIndex,
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub hops: u32,
    pub parent: Option<CandidateId>,
    pub last_port: Option<PortIndex>,
    pub last_region: Option<RegionIndex>,
    pub rip_required: bool,
    pub rips: Vec<RipTarget>,
}

/// Per-connection candidate storage. Parents are indices into the same
/// vector, which keeps the lineage acyclic by construction (a parent always
/// precedes its children) and lets the whole tree be freed in one clear.
#[derive(Debug, Default)]
pub(crate) struct CandidateArena {
    nodes: Vec<Candidate>,
}

impl CandidateArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn push(&mut self, candidate: Candidate) -> CandidateId {
        let id = self.nodes.len() as CandidateId;
        self.nodes.push(candidate);
        id
    }

    pub fn get(&self, id: CandidateId) -> &Candidate {
        &self.nodes[id as usize]
    }

    /// The candidate chain from the search root to `goal`, in visit order.
    pub fn chain(&self, goal: CandidateId) -> Vec<Candidate> {
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(id) = cursor {
            let candidate = self.get(id);
            path.push(candidate.clone());
            cursor = candidate.parent;
        }
        path.reverse();
        path
    }
}
