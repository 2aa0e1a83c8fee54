use crate::geometry::{chords_interleave, segments_cross};
use crate::graph::{GraphError, PortIndex, RegionGraph, RegionIndex};

/// Whether the chords `(a, b)` and `(c, d)` geometrically cross inside a
/// region: either the perimeter interleaving test or the Cartesian segment
/// test reports a crossing. The segment fallback covers chords whose
/// endpoints sit on a single polygon edge, where interleaving alone can
/// false-negative.
pub fn chords_cross(
    graph: &RegionGraph,
    region: RegionIndex,
    a: PortIndex,
    b: PortIndex,
    c: PortIndex,
    d: PortIndex,
) -> Result<bool, GraphError> {
    let total = graph.region(region).outline()?.total_length();
    let ta = graph.port_t(a, region)?;
    let tb = graph.port_t(b, region)?;
    let tc = graph.port_t(c, region)?;
    let td = graph.port_t(d, region)?;
    if chords_interleave(ta, tb, tc, td, total) {
        return Ok(true);
    }
    Ok(segments_cross(
        graph.port(a).position,
        graph.port(b).position,
        graph.port(c).position,
        graph.port(d).position,
    ))
}

/// Assignments in the region whose chord crosses `(p1, p2)`, as indices into
/// the region's assignment list, in insertion order.
pub fn list_crossing_assignments(
    graph: &RegionGraph,
    region: RegionIndex,
    p1: PortIndex,
    p2: PortIndex,
) -> Result<Vec<usize>, GraphError> {
    let mut crossing = Vec::new();
    for (index, assignment) in graph.region(region).assignments.iter().enumerate() {
        if chords_cross(graph, region, p1, p2, assignment.port1, assignment.port2)? {
            crossing.push(index);
        }
    }
    Ok(crossing)
}

/// Indices of assignments owned by a different net, in insertion order.
pub(crate) fn other_net_assignments(
    graph: &RegionGraph,
    region: RegionIndex,
    net: u32,
) -> Vec<usize> {
    graph
        .region(region)
        .assignments
        .iter()
        .enumerate()
        .filter(|(_, a)| a.net != net)
        .map(|(index, _)| index)
        .collect()
}

/// Count of existing assignments in the region that conflict with a new
/// chord `(p1, p2)` of the given net.
///
/// Via regions are exclusive rather than chord-ordered: every assignment from
/// any other net counts regardless of geometry. Ordinary regions count
/// different-net assignments whose chord geometrically crosses the new one.
pub fn count_crossings_with_other_nets(
    graph: &RegionGraph,
    region: RegionIndex,
    p1: PortIndex,
    p2: PortIndex,
    net: u32,
) -> Result<usize, GraphError> {
    if graph.region(region).is_via_region {
        return Ok(other_net_assignments(graph, region, net).len());
    }
    let mut count = 0;
    for assignment in &graph.region(region).assignments {
        if assignment.net == net {
            continue;
        }
        if chords_cross(graph, region, p1, p2, assignment.port1, assignment.port2)? {
            count += 1;
        }
    }
    Ok(count)
}
