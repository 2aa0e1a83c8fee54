use crate::geometry::Point;
use crate::graph::{GraphError, RegionGraph};

use super::candidate::{Candidate, CandidateArena, CandidateId, RipTarget};
use super::distance::DistanceMap;
use super::queue::CandidateQueue;
use super::types::UnitOfCost;
use super::variant::Variant;

/// Read-only surroundings of one connection's search.
pub(crate) struct SearchContext<'a> {
    pub graph: &'a RegionGraph,
    pub variant: &'a Variant,
    pub distances: Option<&'a DistanceMap>,
    pub end_center: Point,
    pub net: u32,
}

/// Expands one dequeued candidate: for every other port of the region being
/// traversed, price the chord, decide on rip-up, and enqueue a child.
///
/// The root candidate has no entry port to exclude, so it fans out over every
/// port of the start region, and its distance-mode steps are anchored at the
/// region center where the connection originates. Conflict pricing is skipped
/// for the root: endpoint regions never receive an assignment, so the exit
/// chord there is synthetic.
pub(crate) fn expand(
    ctx: &SearchContext<'_>,
    arena: &mut CandidateArena,
    queue: &mut CandidateQueue,
    current_id: CandidateId,
) -> Result<(), GraphError> {
    let (current_port, current_region, current_g, current_hops) = {
        let current = arena.get(current_id);
        (current.port, current.next_region, current.g, current.hops)
    };
    let is_root = arena.get(current_id).parent.is_none();
    let options = &ctx.variant.options;

    for position in 0..ctx.graph.region(current_region).ports.len() {
        let p_out = ctx.graph.region(current_region).ports[position];
        if !is_root && Some(p_out) == current_port {
            continue;
        }

        let (conflicts, rip_required, rips) = if is_root {
            (0, false, Vec::new())
        } else {
            let Some(entry) = current_port else {
                continue;
            };
            let conflicts =
                ctx.variant
                    .count_conflicts(ctx.graph, current_region, entry, p_out, ctx.net)?;
            if conflicts > 0 && ctx.variant.rip_on_conflict(ctx.graph.region(current_region)) {
                if !options.ripping_enabled {
                    continue;
                }
                let indices = ctx.variant.get_rips_required_for_port_usage(
                    ctx.graph,
                    current_region,
                    entry,
                    p_out,
                    ctx.net,
                )?;
                let rips = indices
                    .into_iter()
                    .map(|index| {
                        let assignment = ctx.graph.region(current_region).assignments[index];
                        RipTarget {
                            region: current_region,
                            connection: assignment.connection,
                            port1: assignment.port1,
                            port2: assignment.port2,
                            observed_rips: [
                                ctx.graph.port(assignment.port1).rip_count,
                                ctx.graph.port(assignment.port2).rip_count,
                            ],
                        }
                    })
                    .collect();
                (conflicts, true, rips)
            } else {
                (conflicts, false, Vec::new())
            }
        };

        let step_cost = match ctx.variant.unit_of_cost {
            UnitOfCost::Hops => 1.0,
            UnitOfCost::Distance => {
                let anchor = match current_port {
                    Some(port) if !is_root => ctx.graph.port(port).position,
                    _ => ctx.graph.region(current_region).center,
                };
                anchor.distance_to(ctx.graph.port(p_out).position)
            }
        };
        let conflicts_f = conflicts as f64;
        let region_cost = conflicts_f * options.crossing_penalty
            + conflicts_f * conflicts_f * options.crossing_penalty_sq
            + ctx.variant.get_port_usage_penalty(ctx.graph, p_out);

        let mut g = current_g + step_cost + region_cost;
        if rip_required {
            g += options.rip_cost;
        }
        let h = ctx
            .variant
            .estimate_cost_to_end(ctx.graph, ctx.distances, p_out, ctx.end_center);
        let f = g + options.greedy_multiplier * h;
        let hops = current_hops + 1;
        let next_region = ctx.graph.port(p_out).other_region(current_region);

        let child = Candidate {
            port: Some(p_out),
            next_region,
            g,
            h,
            f,
            hops,
            parent: Some(current_id),
            last_port: current_port,
            last_region: Some(current_region),
            rip_required,
            rips,
        };
        let id = arena.push(child);
        queue.enqueue(id, f, h, hops);
    }
    Ok(())
}

/// A candidate is stale when any assignment in its rip set has been ripped
/// since enqueue: the rip counter of either port moved past the recorded
/// value. Stale candidates are discarded instead of expanded.
pub(crate) fn is_stale(graph: &RegionGraph, candidate: &Candidate) -> bool {
    candidate.rips.iter().any(|target| {
        graph.port(target.port1).rip_count > target.observed_rips[0]
            || graph.port(target.port2).rip_count > target.observed_rips[1]
    })
}
