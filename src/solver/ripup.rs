use crate::graph::{PortIndex, RegionGraph, RegionIndex};

use super::candidate::Candidate;

/// Victim connections named by the rip sets along a solved path, in order of
/// first appearance, each at most once. Planning is separate from
/// application so a cascade cannot re-enter mid-commit.
pub(crate) fn plan_rips(path: &[Candidate]) -> Vec<usize> {
    let mut victims = Vec::new();
    for candidate in path {
        if !candidate.rip_required {
            continue;
        }
        for target in &candidate.rips {
            if !victims.contains(&target.connection) {
                victims.push(target.connection);
            }
        }
    }
    victims
}

/// Detaches every assignment of each victim connection. An assignment is a
/// unit in a chain; once one goes, the connection is unrouted and must be
/// re-solved, so the whole route comes out. Survivor order inside each
/// region's assignment list is preserved, and the rip counter on both ports
/// of every removed assignment is incremented.
///
/// Returns the number of removed assignments.
pub(crate) fn apply_rips(graph: &mut RegionGraph, victims: &[usize]) -> usize {
    let mut removed_total = 0;
    let regions: Vec<RegionIndex> = graph.region_indices().collect();
    for region in regions {
        let removed: Vec<(PortIndex, PortIndex)> = graph
            .region(region)
            .assignments
            .iter()
            .filter(|a| victims.contains(&a.connection))
            .map(|a| (a.port1, a.port2))
            .collect();
        if removed.is_empty() {
            continue;
        }
        graph
            .region_mut(region)
            .assignments
            .retain(|a| !victims.contains(&a.connection));
        for (port1, port2) in removed {
            graph.port_mut(port1).rip_count += 1;
            graph.port_mut(port2).rip_count += 1;
            removed_total += 1;
        }
    }
    removed_total
}
