use std::collections::VecDeque;

use crate::graph::{RegionGraph, RegionIndex};

pub(crate) const UNREACHABLE: u32 = u32::MAX;

/// Hop distances to one end region, over regions and ports.
///
/// Built once per distinct end region by an unweighted BFS over the region
/// graph (nodes are regions, edges are ports) and never invalidated. A port's
/// value is the minimum of its two regions' distances, which is the
/// admissible lower bound used by hop-based heuristics.
#[derive(Debug, Clone)]
pub(crate) struct DistanceMap {
    pub region_hops: Vec<u32>,
    pub port_hops: Vec<u32>,
}

pub(crate) fn distance_to_end_map(graph: &RegionGraph, end: RegionIndex) -> DistanceMap {
    let mut region_hops = vec![UNREACHABLE; graph.region_count()];
    region_hops[end.index()] = 0;
    let mut frontier = VecDeque::new();
    frontier.push_back(end);
    while let Some(region) = frontier.pop_front() {
        let hops = region_hops[region.index()];
        for &port in &graph.region(region).ports {
            let neighbor = graph.port(port).other_region(region);
            if region_hops[neighbor.index()] == UNREACHABLE {
                region_hops[neighbor.index()] = hops + 1;
                frontier.push_back(neighbor);
            }
        }
    }
    let mut port_hops = vec![UNREACHABLE; graph.port_count()];
    for port in graph.port_indices() {
        let [r1, r2] = graph.port(port).regions;
        port_hops[port.index()] = region_hops[r1.index()].min(region_hops[r2.index()]);
    }
    DistanceMap {
        region_hops,
        port_hops,
    }
}
