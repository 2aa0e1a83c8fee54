use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::debug;

use crate::geometry::segments_cross;
use crate::graph::{
    Assignment, Connection, ConnectionInput, GraphError, GraphInput, RegionGraph, RegionIndex,
};

use super::astar::{expand, is_stale, SearchContext};
use super::candidate::{Candidate, CandidateArena, CandidateId};
use super::distance::{distance_to_end_map, DistanceMap, UNREACHABLE};
use super::queue::CandidateQueue;
use super::ripup::{apply_rips, plan_rips};
use super::snapshot::{build_routes, build_snapshot};
use super::types::{FailureKind, SolvedRoute, UnitOfCost};
use super::variant::Variant;

/// Multi-connection driver over the hypergraph solver core.
///
/// Connections are processed in input order; ripped connections re-enter the
/// queue at the tail. `step()` performs one candidate expansion and returns;
/// `solve()` loops until the solver is `solved` or `failed`.
pub struct HyperRouter {
    graph: RegionGraph,
    connections: Vec<Connection>,
    variant: Variant,
    max_iterations: u64,
    iterations: u64,
    solved: bool,
    failed: bool,
    failure: Option<FailureKind>,
    queue: CandidateQueue,
    arena: CandidateArena,
    unprocessed: VecDeque<usize>,
    queued: Vec<bool>,
    current: Option<usize>,
    current_end: Option<RegionIndex>,
    distance_maps: HashMap<RegionIndex, DistanceMap>,
    routes: Vec<Option<SolvedRoute>>,
}

impl HyperRouter {
    pub fn new(graph: RegionGraph, connections: Vec<Connection>, variant: Variant) -> Self {
        let input_crossings = count_input_crossings(&graph, &connections);
        let options = &variant.options;
        let max_iterations = options.base_max_iterations
            + options.additional_max_iterations_per_connection * connections.len() as u64
            + options.additional_max_iterations_per_crossing * input_crossings;
        let count = connections.len();
        HyperRouter {
            graph,
            connections,
            variant,
            max_iterations,
            iterations: 0,
            solved: false,
            failed: false,
            failure: None,
            queue: CandidateQueue::new(),
            arena: CandidateArena::new(),
            unprocessed: (0..count).collect(),
            queued: vec![true; count],
            current: None,
            current_end: None,
            distance_maps: HashMap::new(),
            routes: vec![None; count],
        }
    }

    /// Builds a router from the serialized ID-forms.
    pub fn from_inputs(
        graph: &GraphInput,
        connections: &[ConnectionInput],
        variant: Variant,
    ) -> Result<Self, GraphError> {
        let graph = RegionGraph::hydrate(graph)?;
        let connections = graph.resolve_connections(connections)?;
        Ok(Self::new(graph, connections, variant))
    }

    /// One expansion: pop the best candidate, commit if it reached the end
    /// region, otherwise enqueue its children. Connection setup (queue reset,
    /// heuristic map, root candidate) happens inside the step that begins a
    /// connection.
    pub fn step(&mut self) -> Result<(), GraphError> {
        if self.solved || self.failed {
            return Ok(());
        }
        while self.current.is_none() {
            let Some(next) = self.unprocessed.pop_front() else {
                if self.routes.iter().all(Option::is_some) {
                    self.solved = true;
                    debug!(iterations = self.iterations, "all connections routed");
                } else {
                    self.failed = true;
                    self.failure = Some(FailureKind::UnreachableGoal);
                }
                return Ok(());
            };
            self.queued[next] = false;
            if self.begin_connection(next)? {
                break;
            }
        }
        if self.failed {
            return Ok(());
        }
        if self.iterations >= self.max_iterations {
            self.failed = true;
            self.failure = Some(FailureKind::BudgetExhausted);
            debug!(iterations = self.iterations, "iteration budget exhausted");
            return Ok(());
        }
        let Some(candidate_id) = self.queue.dequeue() else {
            self.failed = true;
            self.failure = Some(FailureKind::UnreachableGoal);
            debug!("queue exhausted before reaching the end region");
            return Ok(());
        };
        self.iterations += 1;
        if is_stale(&self.graph, self.arena.get(candidate_id)) {
            return Ok(());
        }
        let Some(current_ix) = self.current else {
            return Ok(());
        };
        let Some(end) = self.current_end else {
            return Ok(());
        };
        if self.arena.get(candidate_id).next_region == end {
            self.commit(current_ix, candidate_id);
            self.current = None;
            self.current_end = None;
            return Ok(());
        }
        let net = self.connections[current_ix].net;
        let context = SearchContext {
            graph: &self.graph,
            variant: &self.variant,
            distances: self.distance_maps.get(&end),
            end_center: self.graph.region(end).center,
            net,
        };
        expand(&context, &mut self.arena, &mut self.queue, candidate_id)
    }

    /// Loops `step()` until terminal. The iteration budget bounds the loop.
    pub fn solve(&mut self) -> Result<(), GraphError> {
        while !self.solved && !self.failed {
            self.step()?;
        }
        Ok(())
    }

    /// Prepares the search for one connection. Returns false when the
    /// connection completed during setup (start equals end) and the driver
    /// should move on to the next one.
    fn begin_connection(&mut self, index: usize) -> Result<bool, GraphError> {
        let connection = &self.connections[index];
        if connection.start == connection.end {
            let port = self.graph.region(connection.start).ports.first().copied();
            let root = Candidate {
                port,
                next_region: connection.start,
                g: 0.0,
                h: 0.0,
                f: 0.0,
                hops: 0,
                parent: None,
                last_port: None,
                last_region: None,
                rip_required: false,
                rips: Vec::new(),
            };
            debug!(connection = %connection.id, "start region equals end region");
            self.routes[index] = Some(SolvedRoute {
                connection: index,
                path: vec![root],
                required_rip: false,
            });
            return Ok(false);
        }
        self.queue.clear();
        self.arena.clear();
        if self.variant.unit_of_cost == UnitOfCost::Hops {
            if !self.distance_maps.contains_key(&connection.end) {
                let map = distance_to_end_map(&self.graph, connection.end);
                self.distance_maps.insert(connection.end, map);
            }
            let map = &self.distance_maps[&connection.end];
            if map.region_hops[connection.start.index()] == UNREACHABLE {
                debug!(connection = %connection.id, "end region is unreachable from start");
                self.failed = true;
                self.failure = Some(FailureKind::UnreachableGoal);
                return Ok(true);
            }
        }
        let Some(&root_port) = self.graph.region(connection.start).ports.first() else {
            debug!(connection = %connection.id, "start region has no ports");
            self.failed = true;
            self.failure = Some(FailureKind::UnreachableGoal);
            return Ok(true);
        };
        let end_center = self.graph.region(connection.end).center;
        let h = self.variant.estimate_cost_to_end(
            &self.graph,
            self.distance_maps.get(&connection.end),
            root_port,
            end_center,
        );
        let f = self.variant.options.greedy_multiplier * h;
        let root = Candidate {
            port: Some(root_port),
            next_region: connection.start,
            g: 0.0,
            h,
            f,
            hops: 0,
            parent: None,
            last_port: None,
            last_region: None,
            rip_required: false,
            rips: Vec::new(),
        };
        debug!(connection = %connection.id, h, "starting search");
        let id = self.arena.push(root);
        self.queue.enqueue(id, f, h, 0);
        self.current = Some(index);
        self.current_end = Some(connection.end);
        Ok(true)
    }

    /// Commits a solved path: plan and apply rips once, then append the new
    /// assignments region by region from root to goal.
    fn commit(&mut self, connection_ix: usize, goal: CandidateId) {
        let path = self.arena.chain(goal);
        for pair in path.windows(2) {
            if pair[1].last_region != Some(pair[0].next_region) {
                panic!(
                    "route chain discontinuity while committing connection {}",
                    self.connections[connection_ix].id
                );
            }
        }
        let victims = plan_rips(&path);
        if !victims.is_empty() {
            let removed = apply_rips(&mut self.graph, &victims);
            debug!(
                connection = %self.connections[connection_ix].id,
                victims = victims.len(),
                removed,
                "ripped conflicting routes"
            );
            for victim in victims {
                self.routes[victim] = None;
                if !self.queued[victim] {
                    self.unprocessed.push_back(victim);
                    self.queued[victim] = true;
                }
            }
        }
        let net = self.connections[connection_ix].net;
        for (index, candidate) in path.iter().enumerate().skip(1) {
            if index == 1 {
                // The start region records no assignment.
                continue;
            }
            let (Some(region), Some(port1), Some(port2)) =
                (candidate.last_region, candidate.last_port, candidate.port)
            else {
                panic!(
                    "route candidate without ports while committing connection {}",
                    self.connections[connection_ix].id
                );
            };
            if port1 == port2 {
                continue;
            }
            self.graph.region_mut(region).assignments.push(Assignment {
                port1,
                port2,
                connection: connection_ix,
                net,
            });
        }
        let required_rip = path.iter().any(|candidate| candidate.rip_required);
        debug!(
            connection = %self.connections[connection_ix].id,
            path_len = path.len(),
            required_rip,
            "connection solved"
        );
        self.routes[connection_ix] = Some(SolvedRoute {
            connection: connection_ix,
            path,
            required_rip,
        });
    }

    pub fn solved(&self) -> bool {
        self.solved
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Committed routes in connection order.
    pub fn solved_routes(&self) -> Vec<&SolvedRoute> {
        self.routes.iter().flatten().collect()
    }

    pub fn route_for(&self, connection: usize) -> Option<&SolvedRoute> {
        self.routes.get(connection).and_then(Option::as_ref)
    }

    pub fn current_connection(&self) -> Option<&Connection> {
        self.current.map(|index| &self.connections[index])
    }

    pub fn current_end_region(&self) -> Option<RegionIndex> {
        self.current_end
    }

    /// Number of candidates waiting in the queue.
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// First `k` queued candidates in pop order, without removing them.
    pub fn peek_candidates(&self, k: usize) -> Vec<&Candidate> {
        self.queue
            .peek_many(k)
            .into_iter()
            .map(|id| self.arena.get(id))
            .collect()
    }

    /// Read-only JSON summary for embedding drivers.
    pub fn snapshot(&self, top_k: usize) -> serde_json::Value {
        build_snapshot(self, top_k)
    }

    /// The committed routes alone, as JSON.
    pub fn routes_snapshot(&self) -> serde_json::Value {
        build_routes(self)
    }
}

/// Connection pairs whose straight start-to-end segments intersect. Feeds the
/// crossing term of the iteration budget.
fn count_input_crossings(graph: &RegionGraph, connections: &[Connection]) -> u64 {
    let mut crossings = 0;
    for i in 0..connections.len() {
        for j in (i + 1)..connections.len() {
            let a = &connections[i];
            let b = &connections[j];
            if segments_cross(
                graph.region(a.start).center,
                graph.region(a.end).center,
                graph.region(b.start).center,
                graph.region(b.end).center,
            ) {
                crossings += 1;
            }
        }
    }
    crossings
}
