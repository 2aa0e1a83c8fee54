use hashbrown::HashMap;
use once_cell::unsync::OnceCell;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{polygon_centroid, Bounds, PerimeterOutline, Point};

pub type RegionIndex = NodeIndex;
pub type PortIndex = EdgeIndex;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("malformed graph: {0}")]
    MalformedGraph(String),
    #[error("missing region: {0}")]
    MissingRegion(String),
    #[error("invalid connection: {0}")]
    InvalidConnection(String),
}

/// A planar area bounded by a polygon or axis-aligned rectangle; the atomic
/// unit of routing traversal.
#[derive(Debug)]
pub struct Region {
    pub id: String,
    pub polygon: Option<Vec<Point>>,
    pub bounds: Option<Bounds>,
    pub center: Point,
    pub is_pad: bool,
    pub is_through_jumper: bool,
    pub is_via_region: bool,
    pub is_connection_region: bool,
    /// Incident ports in hydration order.
    pub ports: Vec<PortIndex>,
    /// Committed chords, insertion order preserved.
    pub assignments: Vec<Assignment>,
    outline: OnceCell<PerimeterOutline>,
}

impl Region {
    pub fn outline(&self) -> Result<&PerimeterOutline, GraphError> {
        if let Some(outline) = self.outline.get() {
            return Ok(outline);
        }
        let built = if let Some(polygon) = &self.polygon {
            if polygon.len() < 3 {
                return Err(GraphError::MalformedGraph(format!(
                    "region {} polygon has fewer than 3 points",
                    self.id
                )));
            }
            PerimeterOutline::from_polygon(polygon)
        } else if let Some(bounds) = self.bounds {
            PerimeterOutline::from_bounds(bounds)
        } else {
            return Err(GraphError::MalformedGraph(format!(
                "region {} has neither polygon nor bounds",
                self.id
            )));
        };
        Ok(self.outline.get_or_init(|| built))
    }
}

/// A point on the shared boundary of exactly two regions.
#[derive(Debug)]
pub struct Port {
    pub id: String,
    pub position: Point,
    pub regions: [RegionIndex; 2],
    /// Incremented every time an assignment through this port is ripped.
    pub rip_count: u32,
    t_cache: [OnceCell<f64>; 2],
}

impl Port {
    pub fn touches(&self, region: RegionIndex) -> bool {
        self.regions[0] == region || self.regions[1] == region
    }

    pub fn other_region(&self, region: RegionIndex) -> RegionIndex {
        if self.regions[0] == region {
            self.regions[1]
        } else {
            self.regions[0]
        }
    }
}

/// A committed chord in a region, owned by one connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub port1: PortIndex,
    pub port2: PortIndex,
    pub connection: usize,
    pub net: u32,
}

impl Assignment {
    pub fn uses_port(&self, port: PortIndex) -> bool {
        self.port1 == port || self.port2 == port
    }
}

#[derive(Clone, Debug)]
pub struct Connection {
    pub id: String,
    pub net: u32,
    pub start: RegionIndex,
    pub end: RegionIndex,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionInput {
    pub region_id: String,
    pub polygon: Option<Vec<Point>>,
    pub bounds: Option<Bounds>,
    pub center: Option<Point>,
    pub is_pad: bool,
    pub is_through_jumper: bool,
    pub is_via_region: bool,
    pub is_connection_region: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortInput {
    pub port_id: String,
    pub region1_id: String,
    pub region2_id: String,
    pub position: Point,
}

/// Serialized ID-form of a hypergraph: connections reference ports by ID and
/// ports reference regions by ID.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInput {
    pub regions: Vec<RegionInput>,
    pub ports: Vec<PortInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInput {
    pub connection_id: String,
    #[serde(default)]
    pub mutually_connected_network_id: Option<String>,
    pub start_region_id: String,
    pub end_region_id: String,
}

/// Pointer-linked hypergraph: regions are nodes, ports are edges of an
/// undirected petgraph graph, so region identity checks are integer
/// comparisons and each port knows its two regions through the edge
/// endpoints.
#[derive(Debug, Default)]
pub struct RegionGraph {
    graph: UnGraph<Region, Port>,
    regions_by_id: HashMap<String, RegionIndex>,
    ports_by_id: HashMap<String, PortIndex>,
}

impl RegionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from its serialized ID-form in two passes: all
    /// regions first, then every port with direct references to its two
    /// regions.
    pub fn hydrate(input: &GraphInput) -> Result<Self, GraphError> {
        let mut graph = RegionGraph::new();
        for region in &input.regions {
            graph.add_region(region)?;
        }
        for port in &input.ports {
            graph.add_port(port)?;
        }
        Ok(graph)
    }

    pub fn add_region(&mut self, input: &RegionInput) -> Result<RegionIndex, GraphError> {
        if self.regions_by_id.contains_key(&input.region_id) {
            return Err(GraphError::MalformedGraph(format!(
                "duplicate region id {}",
                input.region_id
            )));
        }
        let center = match input.center {
            Some(center) => center,
            None => match (&input.polygon, input.bounds) {
                (Some(polygon), _) if !polygon.is_empty() => polygon_centroid(polygon),
                (_, Some(bounds)) => bounds.center(),
                _ => Point::default(),
            },
        };
        let region = Region {
            id: input.region_id.clone(),
            polygon: input.polygon.clone(),
            bounds: input.bounds,
            center,
            is_pad: input.is_pad,
            is_through_jumper: input.is_through_jumper,
            is_via_region: input.is_via_region,
            is_connection_region: input.is_connection_region,
            ports: Vec::new(),
            assignments: Vec::new(),
            outline: OnceCell::new(),
        };
        let index = self.graph.add_node(region);
        self.regions_by_id.insert(input.region_id.clone(), index);
        Ok(index)
    }

    pub fn add_port(&mut self, input: &PortInput) -> Result<PortIndex, GraphError> {
        if self.ports_by_id.contains_key(&input.port_id) {
            return Err(GraphError::MalformedGraph(format!(
                "duplicate port id {}",
                input.port_id
            )));
        }
        let region1 = self.resolve_region(&input.region1_id).ok_or_else(|| {
            GraphError::MalformedGraph(format!(
                "port {} references unknown region {}",
                input.port_id, input.region1_id
            ))
        })?;
        let region2 = self.resolve_region(&input.region2_id).ok_or_else(|| {
            GraphError::MalformedGraph(format!(
                "port {} references unknown region {}",
                input.port_id, input.region2_id
            ))
        })?;
        if region1 == region2 {
            return Err(GraphError::MalformedGraph(format!(
                "port {} bridges region {} to itself",
                input.port_id, input.region1_id
            )));
        }
        let port = Port {
            id: input.port_id.clone(),
            position: input.position,
            regions: [region1, region2],
            rip_count: 0,
            t_cache: [OnceCell::new(), OnceCell::new()],
        };
        let index = self.graph.add_edge(region1, region2, port);
        self.graph[region1].ports.push(index);
        self.graph[region2].ports.push(index);
        self.ports_by_id.insert(input.port_id.clone(), index);
        Ok(index)
    }

    /// Resolves serialized connections against the hydrated graph, interning
    /// net IDs. Connections without a network ID form single-connection nets.
    pub fn resolve_connections(
        &self,
        inputs: &[ConnectionInput],
    ) -> Result<Vec<Connection>, GraphError> {
        let mut nets: HashMap<String, u32> = HashMap::new();
        let mut seen: HashMap<&str, ()> = HashMap::new();
        let mut connections = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.connection_id.is_empty() {
                return Err(GraphError::InvalidConnection("empty connection id".into()));
            }
            if seen.insert(input.connection_id.as_str(), ()).is_some() {
                return Err(GraphError::InvalidConnection(format!(
                    "duplicate connection id {}",
                    input.connection_id
                )));
            }
            let start = self
                .resolve_region(&input.start_region_id)
                .ok_or_else(|| GraphError::MissingRegion(input.start_region_id.clone()))?;
            let end = self
                .resolve_region(&input.end_region_id)
                .ok_or_else(|| GraphError::MissingRegion(input.end_region_id.clone()))?;
            let net_key = input
                .mutually_connected_network_id
                .clone()
                .unwrap_or_else(|| input.connection_id.clone());
            let next_net = nets.len() as u32;
            let net = *nets.entry(net_key).or_insert(next_net);
            connections.push(Connection {
                id: input.connection_id.clone(),
                net,
                start,
                end,
            });
        }
        Ok(connections)
    }

    pub fn resolve_region(&self, id: &str) -> Option<RegionIndex> {
        self.regions_by_id.get(id).copied()
    }

    pub fn resolve_port(&self, id: &str) -> Option<PortIndex> {
        self.ports_by_id.get(id).copied()
    }

    pub fn region(&self, index: RegionIndex) -> &Region {
        &self.graph[index]
    }

    pub(crate) fn region_mut(&mut self, index: RegionIndex) -> &mut Region {
        &mut self.graph[index]
    }

    pub fn port(&self, index: PortIndex) -> &Port {
        &self.graph[index]
    }

    pub(crate) fn port_mut(&mut self, index: PortIndex) -> &mut Port {
        &mut self.graph[index]
    }

    pub fn region_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn port_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn region_indices(&self) -> impl Iterator<Item = RegionIndex> {
        self.graph.node_indices()
    }

    pub fn port_indices(&self) -> impl Iterator<Item = PortIndex> {
        self.graph.edge_indices()
    }

    /// Perimeter coordinate of a port on one of its regions, cached per side.
    pub fn port_t(&self, port: PortIndex, region: RegionIndex) -> Result<f64, GraphError> {
        let p = self.port(port);
        let slot = if p.regions[0] == region {
            0
        } else if p.regions[1] == region {
            1
        } else {
            return Err(GraphError::MalformedGraph(format!(
                "port {} is not incident to region {}",
                p.id,
                self.region(region).id
            )));
        };
        if let Some(t) = p.t_cache[slot].get() {
            return Ok(*t);
        }
        let t = self.region(region).outline()?.project(p.position);
        Ok(*p.t_cache[slot].get_or_init(|| t))
    }

    /// Number of committed assignments using a port, over both of its regions.
    pub fn port_usage(&self, port: PortIndex) -> usize {
        let p = self.port(port);
        p.regions
            .iter()
            .map(|&region| {
                self.region(region)
                    .assignments
                    .iter()
                    .filter(|a| a.uses_port(port))
                    .count()
            })
            .sum()
    }

    /// Emits the serialized ID-form back out. Hydrating the result yields an
    /// equivalent graph.
    pub fn to_input(&self) -> GraphInput {
        let regions = self
            .graph
            .node_indices()
            .map(|index| {
                let region = &self.graph[index];
                RegionInput {
                    region_id: region.id.clone(),
                    polygon: region.polygon.clone(),
                    bounds: region.bounds,
                    center: Some(region.center),
                    is_pad: region.is_pad,
                    is_through_jumper: region.is_through_jumper,
                    is_via_region: region.is_via_region,
                    is_connection_region: region.is_connection_region,
                }
            })
            .collect();
        let ports = self
            .graph
            .edge_indices()
            .map(|index| {
                let port = &self.graph[index];
                PortInput {
                    port_id: port.id.clone(),
                    region1_id: self.graph[port.regions[0]].id.clone(),
                    region2_id: self.graph[port.regions[1]].id.clone(),
                    position: port.position,
                }
            })
            .collect();
        GraphInput { regions, ports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn two_region_input() -> GraphInput {
        GraphInput {
            regions: vec![rect_region("a", 0.0, 0.0), rect_region("b", 10.0, 0.0)],
            ports: vec![PortInput {
                port_id: "p".into(),
                region1_id: "a".into(),
                region2_id: "b".into(),
                position: Point::new(10.0, 5.0),
            }],
        }
    }

    #[test]
    fn hydrates_two_passes() {
        let graph = RegionGraph::hydrate(&two_region_input()).unwrap();
        assert_eq!(graph.region_count(), 2);
        assert_eq!(graph.port_count(), 1);
        let a = graph.resolve_region("a").unwrap();
        let b = graph.resolve_region("b").unwrap();
        let p = graph.resolve_port("p").unwrap();
        assert_eq!(graph.region(a).ports, vec![p]);
        assert_eq!(graph.region(b).ports, vec![p]);
        assert!(graph.port(p).touches(a));
        assert_eq!(graph.port(p).other_region(a), b);
    }

    #[test]
    fn port_with_unknown_region_is_malformed() {
        let mut input = two_region_input();
        input.ports[0].region2_id = "nope".into();
        let err = RegionGraph::hydrate(&input).unwrap_err();
        assert!(matches!(err, GraphError::MalformedGraph(_)));
    }

    #[test]
    fn self_bridging_port_is_malformed() {
        let mut input = two_region_input();
        input.ports[0].region2_id = "a".into();
        assert!(matches!(
            RegionGraph::hydrate(&input),
            Err(GraphError::MalformedGraph(_))
        ));
    }

    #[test]
    fn connection_with_unknown_region_is_missing() {
        let graph = RegionGraph::hydrate(&two_region_input()).unwrap();
        let err = graph
            .resolve_connections(&[ConnectionInput {
                connection_id: "c".into(),
                mutually_connected_network_id: None,
                start_region_id: "a".into(),
                end_region_id: "zzz".into(),
            }])
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingRegion(_)));
    }

    #[test]
    fn nets_are_interned() {
        let graph = RegionGraph::hydrate(&two_region_input()).unwrap();
        let connections = graph
            .resolve_connections(&[
                ConnectionInput {
                    connection_id: "c1".into(),
                    mutually_connected_network_id: Some("net".into()),
                    start_region_id: "a".into(),
                    end_region_id: "b".into(),
                },
                ConnectionInput {
                    connection_id: "c2".into(),
                    mutually_connected_network_id: Some("net".into()),
                    start_region_id: "b".into(),
                    end_region_id: "a".into(),
                },
                ConnectionInput {
                    connection_id: "c3".into(),
                    mutually_connected_network_id: None,
                    start_region_id: "a".into(),
                    end_region_id: "b".into(),
                },
            ])
            .unwrap();
        assert_eq!(connections[0].net, connections[1].net);
        assert_ne!(connections[0].net, connections[2].net);
    }

    #[test]
    fn hydration_round_trips() {
        let graph = RegionGraph::hydrate(&two_region_input()).unwrap();
        let rehydrated = RegionGraph::hydrate(&graph.to_input()).unwrap();
        assert_eq!(rehydrated.region_count(), graph.region_count());
        assert_eq!(rehydrated.port_count(), graph.port_count());
        for index in graph.region_indices() {
            let original = graph.region(index);
            let other = rehydrated.region(rehydrated.resolve_region(&original.id).unwrap());
            assert_eq!(original.ports.len(), other.ports.len());
            assert_eq!(original.center, other.center);
        }
    }

    #[test]
    fn perimeter_t_is_cached_and_stable() {
        let graph = RegionGraph::hydrate(&two_region_input()).unwrap();
        let a = graph.resolve_region("a").unwrap();
        let p = graph.resolve_port("p").unwrap();
        let first = graph.port_t(p, a).unwrap();
        let second = graph.port_t(p, a).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(first, 15.0);
    }

    #[test]
    fn outline_requires_geometry() {
        let input = GraphInput {
            regions: vec![RegionInput {
                region_id: "bare".into(),
                ..Default::default()
            }],
            ports: Vec::new(),
        };
        let graph = RegionGraph::hydrate(&input).unwrap();
        let bare = graph.resolve_region("bare").unwrap();
        assert!(matches!(
            graph.region(bare).outline(),
            Err(GraphError::MalformedGraph(_))
        ));
    }
}
