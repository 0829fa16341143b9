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

//! The time-dependent routing graph.
//!
//! Stations are expanded into small clusters of nodes: one station node,
//! one route node per route calling at the station, and at most one foot
//! node collecting outgoing walks. Scheduled service lives on route-to-route
//! edges as arrays of day-stamped connections; everything else is a fixed
//! cost edge.

pub mod builder;
pub mod connection;
pub mod edges;
pub mod nodes;

pub use builder::GraphBuilder;
pub use connection::{
    AttributeId, FullConnection, FullConnectionId, LightConnection, ServiceClass,
};
pub use edges::{Edge, EdgeCost, EdgeKind, Ride};
pub use nodes::{EdgeRef, Node, NodeId, NodeKind, RouteId, StationId};

use crate::calendar::{Calendar, DaysPatterns};

/// Station used as the attachment point for multi-origin queries.
pub const VIRTUAL_ORIGIN_STATION: StationId = StationId(0);
/// Station used as the attachment point for multi-destination queries.
pub const VIRTUAL_DESTINATION_STATION: StationId = StationId(1);

#[derive(Debug)]
pub struct Station {
    pub name: String,
    /// The station node of this station.
    pub node: NodeId,
    /// Minutes needed to change trains here.
    pub transfer_time: u16,
}

#[derive(Debug)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) stations: Vec<Station>,
    pub(crate) full_connections: Vec<FullConnection>,
    pub(crate) attributes: Vec<String>,
    pub(crate) days_patterns: DaysPatterns,
    pub(crate) calendar: Calendar,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nb_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nb_of_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    /// The station node of a station.
    pub fn station_node(&self, id: StationId) -> NodeId {
        self.stations[id.index()].node
    }

    pub fn full_connection(&self, id: FullConnectionId) -> &FullConnection {
        &self.full_connections[id.index()]
    }

    pub fn full_connections(&self) -> &[FullConnection] {
        &self.full_connections
    }

    pub fn attribute(&self, id: AttributeId) -> &str {
        &self.attributes[id.index()]
    }

    pub fn days_patterns(&self) -> &DaysPatterns {
        &self.days_patterns
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn virtual_origin(&self) -> NodeId {
        self.station_node(VIRTUAL_ORIGIN_STATION)
    }

    pub fn virtual_destination(&self) -> NodeId {
        self.station_node(VIRTUAL_DESTINATION_STATION)
    }

    pub fn edge(&self, edge_ref: EdgeRef) -> &Edge {
        &self.nodes[edge_ref.node.index()].edges[edge_ref.edge as usize]
    }
}
