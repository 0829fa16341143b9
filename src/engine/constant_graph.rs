use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::edges::Edge;
use crate::graph::nodes::NodeId;
use crate::graph::Graph;
use crate::request::SearchDir;

/// Distance of a node the per-criterion Dijkstra never reached.
pub const UNREACHABLE: u32 = u32::MAX;

pub const CRITERION_TRAVEL_TIME: usize = 0;
pub const CRITERION_TRANSFERS: usize = 1;
pub const CRITERION_PRICE: usize = 2;

/// Static projection of one graph edge: its minimum possible cost in each
/// criterion, independent of traversal time.
#[derive(Debug, Clone, Copy)]
pub struct SimpleEdge {
    pub to: u32,
    pub dist: [u32; 3],
}

impl SimpleEdge {
    pub fn from_edge(edge: &Edge, graph: &Graph, dir: SearchDir) -> Option<(u32, SimpleEdge)> {
        let min = edge.minimum_cost(graph.full_connections())?;
        let dist = [min.time, u32::from(min.transfer), u32::from(min.price)];
        // the lower-bound search runs towards the goal against the
        // direction of travel
        let (from, to) = match dir {
            SearchDir::Forward => (edge.to, edge.from),
            SearchDir::Backward => (edge.from, edge.to),
        };
        Some((from.0, SimpleEdge { to: to.0, dist }))
    }
}

/// Time-independent shadow of the routing graph, oriented so a single
/// Dijkstra from the goal yields a distance towards the goal for every
/// node.
#[derive(Debug)]
pub struct ConstantGraph {
    edges: Vec<Vec<SimpleEdge>>,
}

impl ConstantGraph {
    pub fn new(graph: &Graph, dir: SearchDir) -> Self {
        let mut edges = vec![Vec::new(); graph.nb_of_nodes()];
        for index in 0..graph.nb_of_nodes() {
            for edge in &graph.node(NodeId(index as u32)).edges {
                if let Some((from, simple)) = SimpleEdge::from_edge(edge, graph, dir) {
                    edges[from as usize].push(simple);
                }
            }
        }
        Self { edges }
    }

    fn outgoing(&self, node: u32) -> &[SimpleEdge] {
        &self.edges[node as usize]
    }

    fn nb_of_nodes(&self) -> usize {
        self.edges.len()
    }
}

/// Single-criterion Dijkstra over the constant graph; `C` selects the
/// criterion component of every edge.
#[derive(Debug)]
struct CriterionDijkstra<const C: usize> {
    dists: Vec<u32>,
}

impl<const C: usize> CriterionDijkstra<C> {
    fn unreachable(nb_of_nodes: usize) -> Self {
        Self {
            dists: vec![UNREACHABLE; nb_of_nodes],
        }
    }

    fn run(&mut self, graph: &ConstantGraph, goal: NodeId, additional: &HashMap<u32, Vec<SimpleEdge>>) {
        self.dists.iter_mut().for_each(|d| *d = UNREACHABLE);
        self.dists[goal.index()] = 0;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((0u32, goal.0)));
        while let Some(Reverse((dist, node))) = queue.pop() {
            if dist > self.dists[node as usize] {
                continue;
            }
            let extra = additional.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            for edge in graph.outgoing(node).iter().chain(extra) {
                // the hop adjacent to the goal is the first boarding of an
                // arrive-by journey; it never costs an interchange
                let weight = if C == CRITERION_TRANSFERS && node == goal.0 {
                    0
                } else {
                    edge.dist[C]
                };
                let next = dist.saturating_add(weight);
                if next < self.dists[edge.to as usize] {
                    self.dists[edge.to as usize] = next;
                    queue.push(Reverse((next, edge.to)));
                }
            }
        }
    }

    fn dist(&self, node: NodeId) -> u32 {
        self.dists[node.index()]
    }
}

/// Admissible per-criterion lower bounds from every node towards the goal.
///
/// The three Dijkstras are run separately so the caller can bail out after
/// the travel-time pass when the goal turns out to be unreachable.
#[derive(Debug)]
pub struct LowerBounds {
    graph: ConstantGraph,
    additional: HashMap<u32, Vec<SimpleEdge>>,
    goal: NodeId,
    travel_time: CriterionDijkstra<CRITERION_TRAVEL_TIME>,
    transfers: CriterionDijkstra<CRITERION_TRANSFERS>,
    price: CriterionDijkstra<CRITERION_PRICE>,
}

impl LowerBounds {
    pub fn new(
        graph: &Graph,
        dir: SearchDir,
        goal: NodeId,
        additional: HashMap<u32, Vec<SimpleEdge>>,
    ) -> Self {
        let constant = ConstantGraph::new(graph, dir);
        let n = constant.nb_of_nodes();
        Self {
            graph: constant,
            additional,
            goal,
            travel_time: CriterionDijkstra::unreachable(n),
            transfers: CriterionDijkstra::unreachable(n),
            price: CriterionDijkstra::unreachable(n),
        }
    }

    pub fn run_travel_time(&mut self) {
        self.travel_time.run(&self.graph, self.goal, &self.additional);
    }

    pub fn run_transfers(&mut self) {
        self.transfers.run(&self.graph, self.goal, &self.additional);
    }

    pub fn run_price(&mut self) {
        self.price.run(&self.graph, self.goal, &self.additional);
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn travel_time_to(&self, node: NodeId) -> u32 {
        self.travel_time.dist(node)
    }

    pub fn transfers_to(&self, node: NodeId) -> u32 {
        self.transfers.dist(node)
    }

    pub fn price_to(&self, node: NodeId) -> u32 {
        self.price.dist(node)
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.travel_time.dist(node) != UNREACHABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayBits;
    use crate::graph::connection::ServiceClass;
    use crate::graph::GraphBuilder;
    use chrono::NaiveDate;

    fn line_graph() -> (Graph, [crate::graph::nodes::StationId; 3]) {
        let mut builder = GraphBuilder::new(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(), 30);
        let a = builder.station("a", 5);
        let b = builder.station("b", 5);
        let c = builder.station("c", 5);
        let route = builder.route(&[a, b, c]);
        builder.trip(
            route,
            &[(600, 630), (640, 700)],
            &DayBits::from_days([0]),
            ServiceClass::Regional,
            300,
            1,
            "R1",
            &[],
        );
        (builder.build(), [a, b, c])
    }

    #[test]
    fn travel_time_bounds_decrease_towards_the_goal() {
        let (graph, [a, b, c]) = line_graph();
        let goal = graph.station_node(c);
        let mut lbs = LowerBounds::new(&graph, SearchDir::Forward, goal, HashMap::new());
        lbs.run_travel_time();

        assert_eq!(lbs.travel_time_to(goal), 0);
        let at_a = lbs.travel_time_to(graph.station_node(a));
        let at_b = lbs.travel_time_to(graph.station_node(b));
        assert!(at_a > at_b);
        // foot edges count as zero time in the bound, so only the pure
        // ride times of 30 and 60 minutes remain
        assert_eq!(at_b, 60);
        assert_eq!(at_a, 90);
    }

    #[test]
    fn transfer_bounds_count_boarding_edges() {
        let (graph, [a, _, c]) = line_graph();
        let goal = graph.station_node(c);
        let mut lbs = LowerBounds::new(&graph, SearchDir::Forward, goal, HashMap::new());
        lbs.run_transfers();
        assert_eq!(lbs.transfers_to(graph.station_node(a)), 1);
    }

    #[test]
    fn unreachable_nodes_stay_unreachable() {
        let mut builder = GraphBuilder::new(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(), 30);
        let a = builder.station("a", 5);
        let b = builder.station("b", 5);
        let graph = builder.build();
        let goal = graph.station_node(b);
        let mut lbs = LowerBounds::new(&graph, SearchDir::Forward, goal, HashMap::new());
        lbs.run_travel_time();
        assert!(!lbs.is_reachable(graph.station_node(a)));
        assert!(lbs.is_reachable(goal));
    }
}
