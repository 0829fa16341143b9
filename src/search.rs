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

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::config::SearchConfig;
use crate::engine::arena::LabelArena;
use crate::engine::constant_graph::{LowerBounds, SimpleEdge};
use crate::engine::pareto_dijkstra::ParetoDijkstra;
use crate::engine::start_labels::generate_start_labels;
use crate::engine::statistics::Statistics;
use crate::error::SearchError;
use crate::graph::edges::Edge;
use crate::graph::nodes::NodeId;
use crate::graph::Graph;
use crate::request::{Query, SearchDir, Terminal};
use crate::response::{journey_from_chain, Journey};

#[derive(Debug, Default)]
pub struct SearchResult {
    pub journeys: Vec<Journey>,
    pub stats: Statistics,
}

/// Runs queries against one graph, reusing the label arena between
/// searches.
pub struct Searcher<'g> {
    graph: &'g Graph,
    config: SearchConfig,
    arena: LabelArena,
}

impl<'g> Searcher<'g> {
    pub fn new(graph: &'g Graph, config: SearchConfig) -> Self {
        let arena = LabelArena::with_capacity(config.max_labels);
        Self {
            graph,
            config,
            arena,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn solve(&mut self, query: &Query) -> Result<SearchResult, SearchError> {
        query.validate(self.graph.nb_of_stations())?;
        self.arena.reset();

        let dir = query.dir;
        let (start_terminals, goal_terminals) = match dir {
            SearchDir::Forward => (&query.origins, &query.destinations),
            SearchDir::Backward => (&query.destinations, &query.origins),
        };

        let (goal, goal_edges) = self.resolve_goal(dir, goal_terminals);

        let mut additional_edges: HashMap<NodeId, Vec<Edge>> = HashMap::new();
        let mut lb_edges: HashMap<u32, Vec<SimpleEdge>> = HashMap::new();
        for edge in goal_edges.iter().chain(query.additional_edges.iter()) {
            additional_edges
                .entry(edge.source(dir))
                .or_default()
                .push(edge.clone());
            if let Some((from, simple)) = SimpleEdge::from_edge(edge, self.graph, dir) {
                lb_edges.entry(from).or_default().push(simple);
            }
        }

        let mut stats = Statistics::default();
        let mut lbs = LowerBounds::new(self.graph, dir, goal, lb_edges);

        let started = Instant::now();
        lbs.run_travel_time();
        stats.travel_time_lb_ms = started.elapsed().as_millis() as u64;

        let feasible = start_terminals
            .iter()
            .any(|t| lbs.is_reachable(self.graph.station_node(t.station)));
        if !feasible {
            debug!("goal unreachable from every start terminal");
            return Ok(SearchResult {
                journeys: Vec::new(),
                stats,
            });
        }

        let started = Instant::now();
        lbs.run_transfers();
        stats.transfers_lb_ms = started.elapsed().as_millis() as u64;

        let started = Instant::now();
        lbs.run_price();
        stats.price_lb_ms = started.elapsed().as_millis() as u64;

        let starts = generate_start_labels(
            self.graph,
            &mut self.arena,
            &lbs,
            &self.config,
            dir,
            start_terminals,
            query.interval_begin,
            query.interval_end,
        )?;
        if starts.is_empty() {
            debug!("no start labels inside the window");
            return Ok(SearchResult {
                journeys: Vec::new(),
                stats,
            });
        }

        let started = Instant::now();
        let mut pd = ParetoDijkstra::new(
            self.graph,
            &self.config,
            dir,
            goal,
            &mut self.arena,
            &lbs,
            &additional_edges,
            &starts,
        );
        let results = pd.search();
        let search_stats = pd.statistics().clone();
        drop(pd);

        stats = Statistics {
            travel_time_lb_ms: stats.travel_time_lb_ms,
            transfers_lb_ms: stats.transfers_lb_ms,
            price_lb_ms: stats.price_lb_ms,
            pareto_dijkstra_ms: started.elapsed().as_millis() as u64,
            ..search_stats
        };
        debug!(
            labels_created = stats.labels_created,
            labels_popped = stats.labels_popped,
            results = results.len(),
            max_label_quit = stats.max_label_quit,
            "search finished"
        );

        // same-station queries can produce zero-length chains; those are
        // not journeys, they are silently dropped
        let mut journeys = results
            .iter()
            .filter_map(
                |&id| match journey_from_chain(self.graph, &self.arena, id, dir) {
                    Ok(journey) => Some(Ok(journey)),
                    Err(crate::error::InternalError::BrokenLabelChain) => None,
                    Err(e) => Some(Err(e)),
                },
            )
            .collect::<Result<Vec<Journey>, _>>()?;
        journeys.sort_by_key(|j| (j.departure, j.arrival, j.transfers, j.price));

        Ok(SearchResult { journeys, stats })
    }

    /// Picks the goal node: the station node itself for a single plain
    /// terminal, a virtual terminal node plus one connecting edge per
    /// station otherwise.
    fn resolve_goal(&self, dir: SearchDir, terminals: &[Terminal]) -> (NodeId, Vec<Edge>) {
        if let [single] = terminals {
            if single.offset == 0 && single.price == 0 {
                return (self.graph.station_node(single.station), Vec::new());
            }
        }
        match dir {
            SearchDir::Forward => {
                let goal = self.graph.virtual_destination();
                let edges = terminals
                    .iter()
                    .map(|t| {
                        Edge::mumo(
                            self.graph.station_node(t.station),
                            goal,
                            t.offset.min(u32::from(u16::MAX)) as u16,
                            t.price,
                            t.slot,
                        )
                    })
                    .collect();
                (goal, edges)
            }
            SearchDir::Backward => {
                let goal = self.graph.virtual_origin();
                let edges = terminals
                    .iter()
                    .map(|t| {
                        Edge::mumo(
                            goal,
                            self.graph.station_node(t.station),
                            t.offset.min(u32::from(u16::MAX)) as u16,
                            t.price,
                            t.slot,
                        )
                    })
                    .collect();
                (goal, edges)
            }
        }
    }
}
