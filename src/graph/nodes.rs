use crate::graph::edges::Edge;

/// Dense node index; node ids are array indices everywhere, there is no
/// pointer chasing for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(pub u32);

impl StationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The single node representing a physical station.
    Station(StationId),
    /// A node on one route passing through a station.
    Route(RouteId),
    /// Collects all walking transfers leaving a station.
    Foot,
}

/// Reference to an edge owned by another node, used for the reverse
/// adjacency needed by arrive-by searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub node: NodeId,
    pub edge: u32,
}

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    /// Station node of the owning station; station nodes point to
    /// themselves.
    pub station: NodeId,
    pub kind: NodeKind,
    pub edges: Vec<Edge>,
    pub incoming: Vec<EdgeRef>,
}

impl Node {
    pub fn is_station_node(&self) -> bool {
        matches!(self.kind, NodeKind::Station(_))
    }

    pub fn is_route_node(&self) -> bool {
        matches!(self.kind, NodeKind::Route(_))
    }

    pub fn is_foot_node(&self) -> bool {
        matches!(self.kind, NodeKind::Foot)
    }
}
