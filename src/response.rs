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

//! Turning a winning label chain back into a journey.
//!
//! The label chain visits every node the search traversed; here it is
//! condensed to one stop per station visit, with ride transports merged
//! across through-running trips.

use std::collections::HashMap;

use crate::engine::arena::{LabelArena, LabelId};
use crate::engine::label::{Label, BUCKET_ADDITIONAL};
use crate::error::InternalError;
use crate::graph::connection::{AttributeId, ServiceClass};
use crate::graph::edges::Ride;
use crate::graph::nodes::StationId;
use crate::graph::Graph;
use crate::request::SearchDir;
use crate::time::{Duration, Time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub station: StationId,
    pub arrival: Option<Time>,
    pub departure: Option<Time>,
    /// Platform numbers; 0 means unknown.
    pub a_platform: u16,
    pub d_platform: u16,
    pub interchange: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Ride {
        /// Stop indices, inclusive on both ends.
        from: usize,
        to: usize,
        class: ServiceClass,
        train_nr: u32,
        line: String,
        duration: Duration,
    },
    Walk {
        from: usize,
        to: usize,
        duration: Duration,
        /// External-mode slot; 0 for plain walking.
        slot: u8,
        price: u16,
    },
}

/// One attribute valid over a consecutive range of stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRange {
    pub from: usize,
    pub to: usize,
    pub attribute: AttributeId,
}

#[derive(Debug, Clone)]
pub struct Journey {
    pub stops: Vec<Stop>,
    pub transports: Vec<Transport>,
    pub attributes: Vec<AttributeRange>,
    pub departure: Time,
    pub arrival: Time,
    pub duration: Duration,
    pub transfers: u32,
    pub price: u32,
    pub start_slot: u8,
    pub target_slot: u8,
}

/// A station visit: a maximal run of chain labels at the same station.
struct Visit {
    station: StationId,
    first: usize,
    last: usize,
}

pub fn journey_from_chain(
    graph: &Graph,
    arena: &LabelArena,
    terminal: LabelId,
    dir: SearchDir,
) -> Result<Journey, InternalError> {
    let chain = collect_chain(arena, terminal, dir);
    if chain.len() < 2 {
        return Err(InternalError::BrokenLabelChain);
    }
    let visits = group_visits(graph, &chain);
    if visits.len() < 2 {
        return Err(InternalError::BrokenLabelChain);
    }

    let mut stops = Vec::with_capacity(visits.len());
    let mut transports: Vec<Transport> = Vec::new();
    let mut ride_fulls: Vec<Vec<Ride>> = Vec::new();

    for (k, visit) in visits.iter().enumerate() {
        let mut stop = Stop {
            station: visit.station,
            arrival: None,
            departure: None,
            a_platform: 0,
            d_platform: 0,
            interchange: false,
        };

        if k > 0 {
            let prev = &visits[k - 1];
            if let Some(ride) = ride_between(graph, &chain, prev.last, visit.first, dir)? {
                let full = graph.full_connection(ride.full);
                stop.arrival = Some(ride.a_time);
                stop.a_platform = full.a_platform;
            } else {
                stop.arrival = Some(chain[visit.first].now);
            }
        }
        if k + 1 < visits.len() {
            let next = &visits[k + 1];
            if let Some(ride) = ride_between(graph, &chain, visit.last, next.first, dir)? {
                let full = graph.full_connection(ride.full);
                stop.departure = Some(ride.d_time);
                stop.d_platform = full.d_platform;
            } else {
                stop.departure = Some(chain[visit.last].now);
            }
            if k > 0 {
                let entered = chain[visit.first].transfers[0] != chain[visit.last].transfers[0];
                stop.interchange = entered;
            }
        }
        stops.push(stop);
    }

    for k in 0..visits.len() - 1 {
        let from_label = &chain[visits[k].last];
        let to_label = &chain[visits[k + 1].first];
        if let Some(ride) = ride_between(graph, &chain, visits[k].last, visits[k + 1].first, dir)? {
            let full = graph.full_connection(ride.full);
            let hop_duration = ride
                .a_time
                .duration_since(ride.d_time)
                .ok_or(InternalError::MissingConnection)?;
            let merge = match (transports.last_mut(), ride_fulls.last()) {
                (
                    Some(Transport::Ride { to, duration, .. }),
                    Some(previous),
                ) if *to == k && previous.last().is_some_and(|prev| {
                    graph
                        .full_connection(prev.full)
                        .same_trip(full)
                }) =>
                {
                    *to = k + 1;
                    *duration += hop_duration;
                    true
                }
                _ => false,
            };
            if merge {
                if let Some(rides) = ride_fulls.last_mut() {
                    rides.push(ride);
                }
            } else {
                transports.push(Transport::Ride {
                    from: k,
                    to: k + 1,
                    class: full.class,
                    train_nr: full.train_nr,
                    line: full.line.clone(),
                    duration: hop_duration,
                });
                ride_fulls.push(vec![ride]);
            }
        } else {
            let duration = to_label.now.ts().abs_diff(from_label.now.ts());
            let price = u16::try_from(
                u32::from(to_label.prices[BUCKET_ADDITIONAL])
                    .abs_diff(u32::from(from_label.prices[BUCKET_ADDITIONAL])),
            )
            .unwrap_or(u16::MAX);
            let slot = if to_label.target_slot != from_label.target_slot {
                match dir {
                    SearchDir::Forward => to_label.target_slot,
                    SearchDir::Backward => from_label.target_slot,
                }
            } else {
                0
            };
            transports.push(Transport::Walk {
                from: k,
                to: k + 1,
                duration,
                slot,
                price,
            });
        }
    }

    let attributes = attribute_ranges(graph, &transports, &ride_fulls);

    let terminal_label = &arena[terminal];
    let (departure, arrival) = match dir {
        SearchDir::Forward => (terminal_label.start, terminal_label.now),
        SearchDir::Backward => (terminal_label.now, terminal_label.start),
    };
    let transfers = stops.iter().filter(|s| s.interchange).count() as u32;

    Ok(Journey {
        stops,
        transports,
        attributes,
        departure,
        arrival,
        duration: terminal_label.travel_time[0],
        transfers,
        price: terminal_label.total_price[0],
        start_slot: terminal_label.start_slot,
        target_slot: terminal_label.target_slot,
    })
}

/// Labels from origin to destination. Forward chains are collected
/// destination-first and reversed; backward chains already read in travel
/// order because their terminal label sits at the origin.
fn collect_chain(arena: &LabelArena, terminal: LabelId, dir: SearchDir) -> Vec<Label> {
    let mut chain = Vec::new();
    let mut current = Some(terminal);
    while let Some(id) = current {
        let label = arena[id];
        current = label.pred;
        chain.push(label);
    }
    if dir == SearchDir::Forward {
        chain.reverse();
    }
    chain
}

fn group_visits(graph: &Graph, chain: &[Label]) -> Vec<Visit> {
    let mut visits: Vec<Visit> = Vec::new();
    for (i, label) in chain.iter().enumerate() {
        let station_node = graph.node(label.node).station;
        let station = match graph.node(station_node).kind {
            crate::graph::nodes::NodeKind::Station(s) => s,
            _ => continue,
        };
        // a label repeating its own node is an overnight stay; it opens a
        // new visit at the same station
        let same_node_stay = i > 0 && chain[i - 1].node == label.node;
        match visits.last_mut() {
            Some(visit) if visit.station == station && !same_node_stay => {
                visit.last = i;
            }
            _ => visits.push(Visit {
                station,
                first: i,
                last: i,
            }),
        }
    }
    visits
}

/// The ride covering the chain edge `i -> j`, if that edge was a
/// scheduled hop. Rides hang off the label the edge traversal created:
/// the later label for forward searches, the earlier one for backward.
fn ride_between(
    graph: &Graph,
    chain: &[Label],
    i: usize,
    j: usize,
    dir: SearchDir,
) -> Result<Option<Ride>, InternalError> {
    debug_assert_eq!(i + 1, j);
    let both_route_nodes =
        graph.node(chain[i].node).is_route_node() && graph.node(chain[j].node).is_route_node();
    if !both_route_nodes {
        return Ok(None);
    }
    let ride = match dir {
        SearchDir::Forward => chain[j].ride,
        SearchDir::Backward => chain[i].ride,
    };
    ride.map(Some).ok_or(InternalError::MissingConnection)
}

/// Per-attribute stop ranges, merged over consecutive hops of the same
/// transport.
fn attribute_ranges(
    graph: &Graph,
    transports: &[Transport],
    ride_fulls: &[Vec<Ride>],
) -> Vec<AttributeRange> {
    let mut ranges: HashMap<AttributeId, Vec<(usize, usize)>> = HashMap::new();
    let mut ride_index = 0;
    for transport in transports {
        let Transport::Ride { from, to, .. } = transport else {
            continue;
        };
        let rides = &ride_fulls[ride_index];
        ride_index += 1;
        for (hop, ride) in rides.iter().enumerate() {
            let full = graph.full_connection(ride.full);
            for attribute in &full.attributes {
                let hop_from = from + hop;
                let hop_to = (from + hop + 1).min(*to);
                let entry = ranges.entry(*attribute).or_default();
                match entry.last_mut() {
                    Some(last) if last.1 >= hop_from => {
                        last.1 = last.1.max(hop_to);
                    }
                    _ => entry.push((hop_from, hop_to)),
                }
            }
        }
    }
    let mut result: Vec<AttributeRange> = ranges
        .into_iter()
        .flat_map(|(attribute, spans)| {
            spans.into_iter().map(move |(from, to)| AttributeRange {
                from,
                to,
                attribute,
            })
        })
        .collect();
    result.sort_by_key(|r| (r.attribute.index(), r.from));
    result
}
