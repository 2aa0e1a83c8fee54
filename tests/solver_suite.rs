use hyperroute::{
    chords_cross, Bounds, ConnectionInput, FailureKind, GraphInput, HyperRouter, Point, PortInput,
    RegionInput, SolverOptions, Variant,
};

fn rect_region(id: &str, min_x: f64, min_y: f64) -> RegionInput {
    RegionInput {
        region_id: id.into(),
        bounds: Some(Bounds {
            min_x,
            min_y,
            max_x: min_x + 10.0,
            max_y: min_y + 10.0,
        }),
        ..Default::default()
    }
}

fn polygon_region(id: &str, points: &[(f64, f64)], center: (f64, f64)) -> RegionInput {
    RegionInput {
        region_id: id.into(),
        polygon: Some(points.iter().map(|&(x, y)| Point::new(x, y)).collect()),
        center: Some(Point::new(center.0, center.1)),
        ..Default::default()
    }
}

fn port(id: &str, region1: &str, region2: &str, x: f64, y: f64) -> PortInput {
    PortInput {
        port_id: id.into(),
        region1_id: region1.into(),
        region2_id: region2.into(),
        position: Point::new(x, y),
    }
}

fn connection(id: &str, net: Option<&str>, start: &str, end: &str) -> ConnectionInput {
    ConnectionInput {
        connection_id: id.into(),
        mutually_connected_network_id: net.map(Into::into),
        start_region_id: start.into(),
        end_region_id: end.into(),
    }
}

/// Properties 1, 2 and 6, plus chord non-crossing (property 3) when the
/// variant forbids committed crossings, and via exclusivity (property 4).
fn assert_invariants(router: &HyperRouter, forbid_crossings: bool) {
    let graph = router.graph();
    for region_ix in graph.region_indices() {
        let region = graph.region(region_ix);
        for assignment in &region.assignments {
            assert!(region.ports.contains(&assignment.port1));
            assert!(region.ports.contains(&assignment.port2));
            assert_ne!(assignment.port1, assignment.port2);
        }
        for (i, a) in region.assignments.iter().enumerate() {
            for b in region.assignments.iter().skip(i + 1) {
                if a.net == b.net {
                    continue;
                }
                assert!(
                    !region.is_via_region,
                    "via region {} hosts two nets",
                    region.id
                );
                if forbid_crossings {
                    assert!(
                        !chords_cross(graph, region_ix, a.port1, a.port2, b.port1, b.port2)
                            .unwrap(),
                        "crossing chords committed in region {}",
                        region.id
                    );
                }
            }
        }
    }
    for route in router.solved_routes() {
        let path = &route.path;
        let conn = &router.connections()[route.connection];
        assert_eq!(path[0].next_region, conn.start);
        assert_eq!(path[path.len() - 1].next_region, conn.end);
        for k in 2..path.len() {
            let candidate = &path[k];
            let region = candidate.last_region.unwrap();
            let p_in = candidate.last_port.unwrap();
            let p_out = candidate.port.unwrap();
            if p_in == p_out {
                continue;
            }
            let committed = graph.region(region).assignments.iter().any(|a| {
                a.connection == route.connection
                    && ((a.port1 == p_in && a.port2 == p_out)
                        || (a.port1 == p_out && a.port2 == p_in))
            });
            assert!(
                committed,
                "missing assignment for route {} in region {}",
                conn.id,
                graph.region(region).id
            );
        }
    }
    if router.solved() {
        assert_eq!(router.solved_routes().len(), router.connections().len());
    }
}

// Scenario A: empty graph, empty connections.
#[test]
fn empty_problem_is_solved_immediately() {
    let mut router =
        HyperRouter::from_inputs(&GraphInput::default(), &[], Variant::jumper()).unwrap();
    router.solve().unwrap();
    assert!(router.solved());
    assert!(!router.failed());
    assert!(router.solved_routes().is_empty());
    assert_eq!(router.iterations(), 0);
}

// Scenario B: two regions sharing one port. Endpoint regions record no
// assignment; the route is the two-candidate chain across the port.
#[test]
fn two_regions_one_port() {
    let graph = GraphInput {
        regions: vec![rect_region("a", 0.0, 0.0), rect_region("b", 10.0, 0.0)],
        ports: vec![port("p", "a", "b", 10.0, 5.0)],
    };
    let mut router = HyperRouter::from_inputs(
        &graph,
        &[connection("c", None, "a", "b")],
        Variant::jumper(),
    )
    .unwrap();
    router.solve().unwrap();

    assert!(router.solved());
    let route = router.route_for(0).unwrap();
    assert_eq!(route.path.len(), 2);
    let g = router.graph();
    let p = g.resolve_port("p").unwrap();
    let b = g.resolve_region("b").unwrap();
    assert_eq!(route.path[0].port, Some(p));
    assert_eq!(route.path[1].next_region, b);
    for region in g.region_indices() {
        assert!(g.region(region).assignments.is_empty());
    }
    assert_invariants(&router, true);
}

#[test]
fn start_equals_end_yields_single_candidate_route() {
    let graph = GraphInput {
        regions: vec![rect_region("a", 0.0, 0.0), rect_region("b", 10.0, 0.0)],
        ports: vec![port("p", "a", "b", 10.0, 5.0)],
    };
    let mut router = HyperRouter::from_inputs(
        &graph,
        &[connection("self", None, "a", "a")],
        Variant::jumper(),
    )
    .unwrap();
    router.solve().unwrap();
    assert!(router.solved());
    let route = router.route_for(0).unwrap();
    assert_eq!(route.path.len(), 1);
    let g = router.graph();
    for region in g.region_indices() {
        assert!(g.region(region).assignments.is_empty());
    }
}

// Scenario C: a picture-frame ring of four regions around a central square.
// The second connection must not cross the first one's chord through the
// center, so it detours through a perimeter region.
fn frame_graph() -> GraphInput {
    GraphInput {
        regions: vec![
            polygon_region(
                "a",
                &[(0.0, 0.0), (30.0, 0.0), (20.0, 10.0), (10.0, 10.0)],
                (15.0, 5.0),
            ),
            polygon_region(
                "b",
                &[(30.0, 0.0), (30.0, 30.0), (20.0, 20.0), (20.0, 10.0)],
                (25.0, 15.0),
            ),
            polygon_region(
                "c",
                &[(30.0, 30.0), (0.0, 30.0), (10.0, 20.0), (20.0, 20.0)],
                (15.0, 25.0),
            ),
            polygon_region(
                "d",
                &[(0.0, 30.0), (0.0, 0.0), (10.0, 10.0), (10.0, 20.0)],
                (5.0, 15.0),
            ),
            RegionInput {
                region_id: "x".into(),
                bounds: Some(Bounds {
                    min_x: 10.0,
                    min_y: 10.0,
                    max_x: 20.0,
                    max_y: 20.0,
                }),
                center: Some(Point::new(15.0, 15.0)),
                ..Default::default()
            },
        ],
        ports: vec![
            port("ab", "a", "b", 25.0, 5.0),
            port("bc", "b", "c", 25.0, 25.0),
            port("cd", "c", "d", 5.0, 25.0),
            port("da", "d", "a", 5.0, 5.0),
            port("ax", "a", "x", 15.0, 10.0),
            port("bx", "b", "x", 20.0, 15.0),
            port("cx", "c", "x", 15.0, 20.0),
            port("dx", "d", "x", 10.0, 15.0),
        ],
    }
}

#[test]
fn jumper_avoids_chord_crossing_in_center() {
    let mut router = HyperRouter::from_inputs(
        &frame_graph(),
        &[
            connection("a-to-c", None, "a", "c"),
            connection("b-to-d", None, "b", "d"),
        ],
        Variant::jumper(),
    )
    .unwrap();
    router.solve().unwrap();

    assert!(router.solved());
    assert!(router.iterations() <= 20);
    let g = router.graph();
    let x = g.resolve_region("x").unwrap();
    assert_eq!(g.region(x).assignments.len(), 2);

    // The first connection takes the straight path; the second detours
    // through a perimeter region.
    let mut lengths: Vec<usize> = router
        .solved_routes()
        .iter()
        .map(|route| route.path.len())
        .collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![3, 4]);
    assert_invariants(&router, true);
}

// Scenario D: a via region and a parallel ordinary region between the same
// endpoints. The second net is routed around the occupied via.
fn via_graph() -> GraphInput {
    GraphInput {
        regions: vec![
            rect_region("l", 0.0, 0.0),
            RegionInput {
                region_id: "v".into(),
                bounds: Some(Bounds {
                    min_x: 10.0,
                    min_y: 0.0,
                    max_x: 20.0,
                    max_y: 10.0,
                }),
                is_via_region: true,
                ..Default::default()
            },
            rect_region("r", 20.0, 0.0),
            RegionInput {
                region_id: "n".into(),
                bounds: Some(Bounds {
                    min_x: 0.0,
                    min_y: 10.0,
                    max_x: 30.0,
                    max_y: 20.0,
                }),
                ..Default::default()
            },
            rect_region("top", 10.0, -10.0),
            rect_region("bottom", 10.0, 10.0),
        ],
        ports: vec![
            port("l_v", "l", "v", 10.0, 5.0),
            port("v_r", "v", "r", 20.0, 5.0),
            port("v_top", "v", "top", 15.0, 0.0),
            port("v_bottom", "v", "bottom", 15.0, 10.0),
            port("l_n", "l", "n", 5.0, 10.0),
            port("n_r", "n", "r", 25.0, 10.0),
        ],
    }
}

#[test]
fn via_exclusivity_routes_second_net_around() {
    let mut router = HyperRouter::from_inputs(
        &via_graph(),
        &[
            connection("first", Some("net1"), "l", "r"),
            connection("second", Some("net2"), "l", "r"),
        ],
        Variant::via(),
    )
    .unwrap();
    router.solve().unwrap();

    assert!(router.solved());
    let g = router.graph();
    let v = g.resolve_region("v").unwrap();
    let n = g.resolve_region("n").unwrap();
    // The via region stays exclusive to the first net.
    assert_eq!(g.region(v).assignments.len(), 1);
    assert_eq!(g.region(v).assignments[0].connection, 0);
    assert_eq!(g.region(n).assignments.len(), 1);
    assert_eq!(g.region(n).assignments[0].connection, 1);

    let second = router.route_for(1).unwrap();
    assert!(!second.required_rip);
    let l_n = g.resolve_port("l_n").unwrap();
    assert_eq!(second.path[1].port, Some(l_n));
    assert_invariants(&router, false);
}

// Scenario E: the second connection's only path runs through an exclusive
// through-jumper region already occupied by the first, forcing a rip; the
// first connection then re-solves over the detour region.
fn ripup_graph() -> GraphInput {
    GraphInput {
        regions: vec![
            rect_region("s1", 0.0, 0.0),
            RegionInput {
                region_id: "j".into(),
                bounds: Some(Bounds {
                    min_x: 10.0,
                    min_y: 0.0,
                    max_x: 20.0,
                    max_y: 10.0,
                }),
                is_through_jumper: true,
                ..Default::default()
            },
            rect_region("t1", 20.0, 0.0),
            RegionInput {
                region_id: "m".into(),
                bounds: Some(Bounds {
                    min_x: 0.0,
                    min_y: 10.0,
                    max_x: 30.0,
                    max_y: 20.0,
                }),
                ..Default::default()
            },
            rect_region("s2", 10.0, -10.0),
            rect_region("t2", 10.0, 10.0),
        ],
        ports: vec![
            port("s1_j", "s1", "j", 10.0, 5.0),
            port("j_t1", "j", "t1", 20.0, 5.0),
            port("s1_m", "s1", "m", 5.0, 10.0),
            port("m_t1", "m", "t1", 25.0, 10.0),
            port("s2_j", "s2", "j", 15.0, 0.0),
            port("j_t2", "j", "t2", 15.0, 10.0),
        ],
    }
}

#[test]
fn ripup_reroutes_the_blocking_connection() {
    let options = SolverOptions {
        greedy_multiplier: 1.1,
        base_max_iterations: 50,
        additional_max_iterations_per_connection: 0,
        additional_max_iterations_per_crossing: 0,
        ..SolverOptions::default()
    };
    let mut router = HyperRouter::from_inputs(
        &ripup_graph(),
        &[
            connection("first", None, "s1", "t1"),
            connection("second", None, "s2", "t2"),
        ],
        Variant::jumper_with(options),
    )
    .unwrap();
    router.solve().unwrap();

    assert!(router.solved());
    assert!(router.iterations() <= router.max_iterations());

    let second = router.route_for(1).unwrap();
    assert!(second.required_rip);

    // The first connection was ripped out of the jumper and re-solved over
    // the detour region.
    let first = router.route_for(0).unwrap();
    assert!(!first.required_rip);
    let g = router.graph();
    let s1_m = g.resolve_port("s1_m").unwrap();
    assert_eq!(first.path[1].port, Some(s1_m));

    let j = g.resolve_region("j").unwrap();
    assert_eq!(g.region(j).assignments.len(), 1);
    assert_eq!(g.region(j).assignments[0].connection, 1);
    let s1_j = g.resolve_port("s1_j").unwrap();
    let j_t1 = g.resolve_port("j_t1").unwrap();
    assert_eq!(g.port(s1_j).rip_count, 1);
    assert_eq!(g.port(j_t1).rip_count, 1);
    assert_invariants(&router, true);
}

#[test]
fn blocked_exclusive_region_fails_without_ripping() {
    let options = SolverOptions {
        greedy_multiplier: 1.1,
        ripping_enabled: false,
        ..SolverOptions::default()
    };
    let mut router = HyperRouter::from_inputs(
        &ripup_graph(),
        &[
            connection("first", None, "s1", "t1"),
            connection("second", None, "s2", "t2"),
        ],
        Variant::jumper_with(options),
    )
    .unwrap();
    router.solve().unwrap();

    assert!(!router.solved());
    assert!(router.failed());
    assert_eq!(router.failure(), Some(FailureKind::UnreachableGoal));
    // The first connection still routed before the dead end.
    assert!(router.route_for(0).is_some());
    assert!(router.route_for(1).is_none());
}

// Scenario F: a dense 6x6 grid with 12 criss-crossing connections under a
// starvation budget. The solver fails cleanly without breaking invariants.
fn grid_graph(n: usize) -> GraphInput {
    let mut regions = Vec::new();
    let mut ports = Vec::new();
    for row in 0..n {
        for col in 0..n {
            regions.push(rect_region(
                &format!("r{row}_{col}"),
                col as f64 * 10.0,
                row as f64 * 10.0,
            ));
        }
    }
    for row in 0..n {
        for col in 0..n - 1 {
            ports.push(port(
                &format!("h{row}_{col}"),
                &format!("r{row}_{col}"),
                &format!("r{row}_{}", col + 1),
                (col + 1) as f64 * 10.0,
                row as f64 * 10.0 + 5.0,
            ));
        }
    }
    for row in 0..n - 1 {
        for col in 0..n {
            ports.push(port(
                &format!("v{row}_{col}"),
                &format!("r{row}_{col}"),
                &format!("r{}_{col}", row + 1),
                col as f64 * 10.0 + 5.0,
                (row + 1) as f64 * 10.0,
            ));
        }
    }
    GraphInput { regions, ports }
}

#[test]
fn budget_exhaustion_fails_cleanly() {
    let n = 6;
    let mut connections = Vec::new();
    for i in 0..n {
        connections.push(connection(
            &format!("row{i}"),
            None,
            &format!("r{i}_0"),
            &format!("r{i}_{}", n - 1),
        ));
        connections.push(connection(
            &format!("col{i}"),
            None,
            &format!("r0_{i}"),
            &format!("r{}_{i}", n - 1),
        ));
    }
    // Routing all twelve connections needs more expansions than this budget
    // allows even without any exploration overhead.
    let options = SolverOptions {
        greedy_multiplier: 1.1,
        base_max_iterations: 60,
        additional_max_iterations_per_connection: 0,
        additional_max_iterations_per_crossing: 0,
        ..SolverOptions::default()
    };
    let mut router =
        HyperRouter::from_inputs(&grid_graph(n), &connections, Variant::jumper_with(options))
            .unwrap();
    router.solve().unwrap();

    assert!(router.failed());
    assert!(!router.solved());
    assert_eq!(router.failure(), Some(FailureKind::BudgetExhausted));
    assert!(router.solved_routes().len() < connections.len());
    assert!(router.iterations() <= 60);
    assert_invariants(&router, true);
}

#[test]
fn iterations_are_monotone_across_steps() {
    let mut router = HyperRouter::from_inputs(
        &frame_graph(),
        &[
            connection("a-to-c", None, "a", "c"),
            connection("b-to-d", None, "b", "d"),
        ],
        Variant::jumper(),
    )
    .unwrap();
    let mut last = router.iterations();
    for _ in 0..50 {
        router.step().unwrap();
        let now = router.iterations();
        assert!(now >= last);
        last = now;
        if router.solved() || router.failed() {
            break;
        }
    }
    assert!(router.solved());
}

#[test]
fn snapshot_reports_flags_and_routes() {
    let mut router = HyperRouter::from_inputs(
        &frame_graph(),
        &[
            connection("a-to-c", None, "a", "c"),
            connection("b-to-d", None, "b", "d"),
        ],
        Variant::jumper(),
    )
    .unwrap();

    // Mid-search the queue peek exposes the pending candidates.
    router.step().unwrap();
    router.step().unwrap();
    let mid = router.snapshot(3);
    assert_eq!(mid["solved"], false);
    assert_eq!(mid["currentConnection"], "a-to-c");
    assert!(!mid["topCandidates"].as_array().unwrap().is_empty());

    router.solve().unwrap();
    let done = router.snapshot(3);
    assert_eq!(done["solved"], true);
    assert_eq!(done["routes"].as_array().unwrap().len(), 2);
}
