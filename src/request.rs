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
// https://groups.google.com/d/forum/navitia

use serde::Deserialize;

use crate::error::BadRequest;
use crate::graph::edges::Edge;
use crate::graph::nodes::StationId;
use crate::time::{Duration, Time};

/// Temporal orientation of a search.
///
/// A forward search departs inside the query window and minimizes arrival;
/// a backward search arrives inside the window and maximizes departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SearchDir {
    Forward,
    Backward,
}

/// One endpoint of a query.
///
/// `offset` is the duration needed to reach the station from the true
/// origin (or from the station to the true destination), `price` and
/// `slot` describe the external mode used for that approach.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    pub station: StationId,
    pub offset: Duration,
    pub price: u16,
    pub slot: u8,
}

impl Terminal {
    pub fn at(station: StationId) -> Self {
        Self {
            station,
            offset: 0,
            price: 0,
            slot: 0,
        }
    }

    pub fn with_offset(station: StationId, offset: Duration, price: u16, slot: u8) -> Self {
        Self {
            station,
            offset,
            price,
            slot,
        }
    }
}

/// A journey search request.
#[derive(Debug, Clone)]
pub struct Query {
    pub origins: Vec<Terminal>,
    pub destinations: Vec<Terminal>,
    /// First minute of the departure window (arrival window for backward
    /// searches), inclusive.
    pub interval_begin: Time,
    /// Last minute of the window, inclusive.
    pub interval_end: Time,
    pub dir: SearchDir,
    /// Per-query edges spliced into the graph, e.g. taxi or bike legs.
    pub additional_edges: Vec<Edge>,
}

impl Query {
    pub fn forward(origin: StationId, destination: StationId, begin: Time, end: Time) -> Self {
        Self {
            origins: vec![Terminal::at(origin)],
            destinations: vec![Terminal::at(destination)],
            interval_begin: begin,
            interval_end: end,
            dir: SearchDir::Forward,
            additional_edges: Vec::new(),
        }
    }

    pub fn backward(origin: StationId, destination: StationId, begin: Time, end: Time) -> Self {
        Self {
            dir: SearchDir::Backward,
            ..Self::forward(origin, destination, begin, end)
        }
    }

    pub fn validate(&self, nb_of_stations: usize) -> Result<(), BadRequest> {
        if self.origins.is_empty() {
            return Err(BadRequest::EmptyOrigins);
        }
        if self.destinations.is_empty() {
            return Err(BadRequest::EmptyDestinations);
        }
        if self.interval_begin > self.interval_end
            || !self.interval_begin.is_valid()
            || !self.interval_end.is_valid()
        {
            return Err(BadRequest::InvalidWindow {
                begin: self.interval_begin,
                end: self.interval_end,
            });
        }
        for terminal in self.origins.iter().chain(self.destinations.iter()) {
            if terminal.station.index() >= nb_of_stations {
                return Err(BadRequest::UnknownStation {
                    station: terminal.station,
                });
            }
        }
        Ok(())
    }
}
