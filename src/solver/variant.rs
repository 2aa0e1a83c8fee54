use crate::geometry::Point;
use crate::graph::{GraphError, PortIndex, Region, RegionGraph, RegionIndex};

use super::crossings::{self, other_net_assignments};
use super::distance::{DistanceMap, UNREACHABLE};
use super::types::{SolverOptions, UnitOfCost};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VariantKind {
    Jumper,
    Via,
}

/// The variant capability set: heuristic, penalties, exclusivity and rip
/// rules. Modeled as a tagged value rather than trait objects; the jumper and
/// via variants are two concrete constructors over the same knob set.
#[derive(Clone, Copy, Debug)]
pub struct Variant {
    pub kind: VariantKind,
    pub unit_of_cost: UnitOfCost,
    pub options: SolverOptions,
}

impl Variant {
    /// Jumper graphs: distance units, Euclidean heuristic, zero penalties,
    /// chord crossing as the conflict metric, rip-up enabled.
    pub fn jumper() -> Self {
        Self::jumper_with(SolverOptions {
            greedy_multiplier: 1.1,
            rip_cost: 1000.0,
            ..SolverOptions::default()
        })
    }

    pub fn jumper_with(options: SolverOptions) -> Self {
        Variant {
            kind: VariantKind::Jumper,
            unit_of_cost: UnitOfCost::Distance,
            options,
        }
    }

    /// Via graphs: hop units, BFS heuristic, priced crossings, and via-region
    /// exclusivity.
    pub fn via() -> Self {
        Self::via_with(SolverOptions {
            greedy_multiplier: 0.9,
            rip_cost: 50.0,
            crossing_penalty: 10.0,
            crossing_penalty_sq: 2.0,
            ..SolverOptions::default()
        })
    }

    pub fn via_with(options: SolverOptions) -> Self {
        Variant {
            kind: VariantKind::Via,
            unit_of_cost: UnitOfCost::Hops,
            options,
        }
    }

    /// Exclusive regions host at most one net: via regions always, and the
    /// jumper graph's through-jumper interiors.
    pub(crate) fn region_is_exclusive(&self, region: &Region) -> bool {
        match self.kind {
            VariantKind::Jumper => region.is_via_region || region.is_through_jumper,
            VariantKind::Via => region.is_via_region,
        }
    }

    /// Whether a conflict in this region forces rip-up rather than a priced
    /// coexistence. Jumper conflicts are always hard; via conflicts are hard
    /// only in exclusive regions.
    pub(crate) fn rip_on_conflict(&self, region: &Region) -> bool {
        match self.kind {
            VariantKind::Jumper => true,
            VariantKind::Via => self.region_is_exclusive(region),
        }
    }

    /// Admissible floor on the remaining cost from a port to the end region.
    pub fn estimate_cost_to_end(
        &self,
        graph: &RegionGraph,
        distances: Option<&DistanceMap>,
        port: PortIndex,
        end_center: Point,
    ) -> f64 {
        match self.unit_of_cost {
            UnitOfCost::Hops => match distances {
                Some(map) => {
                    let hops = map.port_hops[port.index()];
                    if hops == UNREACHABLE {
                        f64::INFINITY
                    } else {
                        f64::from(hops)
                    }
                }
                None => 0.0,
            },
            UnitOfCost::Distance => graph.port(port).position.distance_to(end_center),
        }
    }

    pub fn get_port_usage_penalty(&self, graph: &RegionGraph, port: PortIndex) -> f64 {
        if self.options.port_usage_penalty == 0.0 && self.options.port_usage_penalty_sq == 0.0 {
            return 0.0;
        }
        let usage = graph.port_usage(port) as f64;
        self.options.port_usage_penalty * usage + self.options.port_usage_penalty_sq * usage * usage
    }

    /// Conflicts between the prospective chord `(p1, p2)` and committed
    /// assignments: presence of any other net in exclusive regions, geometric
    /// chord crossings elsewhere.
    pub(crate) fn count_conflicts(
        &self,
        graph: &RegionGraph,
        region: RegionIndex,
        p1: PortIndex,
        p2: PortIndex,
        net: u32,
    ) -> Result<usize, GraphError> {
        if self.region_is_exclusive(graph.region(region)) {
            return Ok(other_net_assignments(graph, region, net).len());
        }
        crossings::count_crossings_with_other_nets(graph, region, p1, p2, net)
    }

    pub fn compute_region_cost_if_ports_used(
        &self,
        graph: &RegionGraph,
        region: RegionIndex,
        p1: PortIndex,
        p2: PortIndex,
        net: u32,
    ) -> Result<f64, GraphError> {
        let conflicts = self.count_conflicts(graph, region, p1, p2, net)? as f64;
        Ok(conflicts * self.options.crossing_penalty
            + conflicts * conflicts * self.options.crossing_penalty_sq
            + self.get_port_usage_penalty(graph, p2))
    }

    pub fn is_rip_required_for_port_usage(
        &self,
        graph: &RegionGraph,
        region: RegionIndex,
        p1: PortIndex,
        p2: PortIndex,
        net: u32,
    ) -> Result<bool, GraphError> {
        let conflicts = self.count_conflicts(graph, region, p1, p2, net)?;
        Ok(conflicts > 0 && self.rip_on_conflict(graph.region(region)))
    }

    /// Assignments that must be ripped before the chord `(p1, p2)` can be
    /// committed, as indices into the region's assignment list. Exclusive
    /// regions surrender every other-net assignment, not just geometric
    /// crossers.
    pub fn get_rips_required_for_port_usage(
        &self,
        graph: &RegionGraph,
        region: RegionIndex,
        p1: PortIndex,
        p2: PortIndex,
        net: u32,
    ) -> Result<Vec<usize>, GraphError> {
        if self.region_is_exclusive(graph.region(region)) {
            return Ok(other_net_assignments(graph, region, net));
        }
        match self.kind {
            VariantKind::Jumper => {
                let mut targets = crossings::list_crossing_assignments(graph, region, p1, p2)?;
                targets.retain(|&index| graph.region(region).assignments[index].net != net);
                Ok(targets)
            }
            VariantKind::Via => Ok(Vec::new()),
        }
    }
}
