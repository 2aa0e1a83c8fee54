use serde_json::{json, Value};

use super::driver::HyperRouter;

/// Read-only introspection for embedding drivers: solver flags, the top of
/// the candidate queue, and the committed routes, as one JSON document.
pub(crate) fn build_snapshot(router: &HyperRouter, top_k: usize) -> Value {
    let graph = router.graph();
    let top_candidates: Vec<Value> = router
        .peek_candidates(top_k)
        .into_iter()
        .map(|candidate| {
            json!({
                "port": candidate.port.map(|p| graph.port(p).id.clone()),
                "nextRegion": graph.region(candidate.next_region).id.clone(),
                "g": candidate.g,
                "h": candidate.h,
                "f": candidate.f,
                "hops": candidate.hops,
                "ripRequired": candidate.rip_required,
            })
        })
        .collect();

    json!({
        "solved": router.solved(),
        "failed": router.failed(),
        "iterations": router.iterations(),
        "maxIterations": router.max_iterations(),
        "currentConnection": router.current_connection().map(|c| c.id.clone()),
        "queueSize": router.queue_size(),
        "currentEndRegion": router
            .current_end_region()
            .map(|r| graph.region(r).id.clone()),
        "topCandidates": top_candidates,
        "routes": build_routes(router),
    })
}

/// The committed routes alone, as one JSON array in connection order.
pub(crate) fn build_routes(router: &HyperRouter) -> Value {
    let graph = router.graph();
    let routes: Vec<Value> = router
        .solved_routes()
        .into_iter()
        .map(|route| {
            let ports: Vec<Value> = route
                .path
                .iter()
                .map(|candidate| json!(candidate.port.map(|p| graph.port(p).id.clone())))
                .collect();
            json!({
                "connection": router.connections()[route.connection].id.clone(),
                "requiredRip": route.required_rip,
                "ports": ports,
            })
        })
        .collect();
    Value::Array(routes)
}
