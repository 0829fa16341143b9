// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// www.navitia.io

use chrono::NaiveDate;

use crate::calendar::{Calendar, DayBits, DaysPatterns};
use crate::graph::connection::{
    AttributeId, FullConnection, FullConnectionId, LightConnection, ServiceClass,
};
use crate::graph::edges::{Edge, EdgeKind};
use crate::graph::nodes::{EdgeRef, Node, NodeId, NodeKind, RouteId, StationId};
use crate::graph::{Graph, Station};

struct RouteInfo {
    /// One route node per station the route calls at, in travel order.
    nodes: Vec<NodeId>,
}

/// Incremental construction of a [`Graph`].
///
/// Two virtual stations are created up front; they carry no schedule and
/// exist so multi-terminal queries have a node to attach their additional
/// edges to.
pub struct GraphBuilder {
    nodes: Vec<Node>,
    stations: Vec<Station>,
    routes: Vec<RouteInfo>,
    full_connections: Vec<FullConnection>,
    attributes: Vec<String>,
    days_patterns: DaysPatterns,
    calendar: Calendar,
    /// Foot node of each station, created on the first walking edge.
    foot_nodes: Vec<Option<NodeId>>,
}

impl GraphBuilder {
    pub fn new(first_date: NaiveDate, nb_of_days: u16) -> Self {
        let mut builder = Self {
            nodes: Vec::new(),
            stations: Vec::new(),
            routes: Vec::new(),
            full_connections: Vec::new(),
            attributes: Vec::new(),
            days_patterns: DaysPatterns::new(),
            calendar: Calendar::new(first_date, nb_of_days),
            foot_nodes: Vec::new(),
        };
        builder.station("virtual origin", 0);
        builder.station("virtual destination", 0);
        builder
    }

    fn push_node(&mut self, station: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            station: station.unwrap_or(id),
            kind,
            edges: Vec::new(),
            incoming: Vec::new(),
        });
        id
    }

    pub fn station(&mut self, name: &str, transfer_time: u16) -> StationId {
        let station_id = StationId(self.stations.len() as u32);
        let node = self.push_node(None, NodeKind::Station(station_id));
        self.stations.push(Station {
            name: name.to_string(),
            node,
            transfer_time,
        });
        self.foot_nodes.push(None);
        station_id
    }

    fn foot_node(&mut self, station: StationId) -> NodeId {
        if let Some(node) = self.foot_nodes[station.index()] {
            return node;
        }
        let station_node = self.stations[station.index()].node;
        let foot = self.push_node(Some(station_node), NodeKind::Foot);
        self.nodes[station_node.index()]
            .edges
            .push(Edge::foot(station_node, foot, 0, false));
        self.foot_nodes[station.index()] = Some(foot);
        foot
    }

    /// Walking edge between two stations.
    pub fn foot_edge(&mut self, from: StationId, to: StationId, minutes: u16) {
        let foot = self.foot_node(from);
        let to_node = self.stations[to.index()].node;
        self.nodes[foot.index()]
            .edges
            .push(Edge::foot(foot, to_node, minutes, false));
    }

    /// Walking edge only usable after arriving by train, e.g. to model
    /// staying seated through a short turnaround.
    pub fn after_train_foot_edge(&mut self, from: StationId, to: StationId, minutes: u16) {
        let foot = self.foot_node(from);
        let to_node = self.stations[to.index()].node;
        self.nodes[foot.index()]
            .edges
            .push(Edge::after_train_foot(foot, to_node, minutes, false));
    }

    /// Hotel edge at a station: wait until the next checkout time.
    pub fn hotel_edge(
        &mut self,
        station: StationId,
        checkout_time: u16,
        min_stay: u16,
        price: u16,
        slot: u8,
    ) {
        let node = self.stations[station.index()].node;
        self.nodes[node.index()]
            .edges
            .push(Edge::hotel(node, checkout_time, min_stay, price, slot));
    }

    /// A route calling at `stops` in order. Trips are added afterwards with
    /// [`GraphBuilder::trip`].
    ///
    /// Entering a route node from its station costs the station's transfer
    /// time and counts as an interchange; leaving towards the station is
    /// free. Start labels are seeded directly on route nodes, so the first
    /// boarding of a journey pays neither.
    pub fn route(&mut self, stops: &[StationId]) -> RouteId {
        let route_id = RouteId(self.routes.len() as u32);
        let mut route_nodes = Vec::with_capacity(stops.len());
        for station in stops {
            let station_node = self.stations[station.index()].node;
            let transfer_time = self.stations[station.index()].transfer_time;
            let route_node = self.push_node(Some(station_node), NodeKind::Route(route_id));
            self.nodes[station_node.index()]
                .edges
                .push(Edge::foot(station_node, route_node, transfer_time, true));
            self.nodes[route_node.index()]
                .edges
                .push(Edge::foot(route_node, station_node, 0, false));
            route_nodes.push(route_node);
        }
        for pair in route_nodes.windows(2) {
            self.nodes[pair[0].index()]
                .edges
                .push(Edge::route(pair[0], pair[1], Vec::new()));
        }
        self.routes.push(RouteInfo { nodes: route_nodes });
        route_id
    }

    pub fn attribute(&mut self, text: &str) -> AttributeId {
        let id = AttributeId(self.attributes.len() as u32);
        self.attributes.push(text.to_string());
        id
    }

    /// One trip over a route. `times` holds one `(departure, arrival)` pair
    /// per hop, in minutes after midnight of the operating day; arrivals
    /// past midnight exceed 1440. The price accrues once per hop ridden.
    #[allow(clippy::too_many_arguments)]
    pub fn trip(
        &mut self,
        route: RouteId,
        times: &[(u16, u16)],
        days: &DayBits,
        class: ServiceClass,
        price: u16,
        train_nr: u32,
        line: &str,
        attributes: &[AttributeId],
    ) {
        let route_nodes = &self.routes[route.0 as usize].nodes;
        debug_assert_eq!(times.len() + 1, route_nodes.len());
        let full = FullConnectionId(self.full_connections.len() as u32);
        self.full_connections.push(FullConnection {
            class,
            price,
            d_platform: 0,
            a_platform: 0,
            train_nr,
            line: line.to_string(),
            attributes: attributes.to_vec(),
        });
        let pattern = self.days_patterns.get_or_insert(*days);
        let route_nodes = self.routes[route.0 as usize].nodes.clone();
        for (hop, (d_time, a_time)) in times.iter().enumerate() {
            let node = route_nodes[hop];
            let next = route_nodes[hop + 1];
            let connections = self.nodes[node.index()].edges.iter_mut().find_map(|e| {
                if e.to != next {
                    return None;
                }
                match &mut e.kind {
                    EdgeKind::Route { connections } => Some(connections),
                    _ => None,
                }
            });
            if let Some(connections) = connections {
                connections.push(LightConnection {
                    d_time: *d_time,
                    a_time: *a_time,
                    days: pattern,
                    full,
                });
            }
        }
    }

    pub fn build(mut self) -> Graph {
        for node in &mut self.nodes {
            for edge in &mut node.edges {
                if let EdgeKind::Route { connections } = &mut edge.kind {
                    connections.sort_by_key(|c| c.d_time);
                }
            }
        }
        let refs: Vec<(NodeId, u32, NodeId)> = self
            .nodes
            .iter()
            .flat_map(|node| {
                node.edges
                    .iter()
                    .enumerate()
                    .map(move |(i, edge)| (node.id, i as u32, edge.to))
            })
            .collect();
        for (node, edge, to) in refs {
            self.nodes[to.index()].incoming.push(EdgeRef { node, edge });
        }
        Graph {
            nodes: self.nodes,
            stations: self.stations,
            full_connections: self.full_connections,
            attributes: self.attributes,
            days_patterns: self.days_patterns,
            calendar: self.calendar,
        }
    }
}
