use crate::config::SearchConfig;
use crate::engine::arena::{LabelArena, LabelId};
use crate::engine::constant_graph::LowerBounds;
use crate::engine::label::Label;
use crate::error::BadRequest;
use crate::graph::nodes::NodeId;
use crate::graph::Graph;
use crate::request::{SearchDir, Terminal};
use crate::time::Time;

/// Refuse to enumerate absurdly wide windows instead of flooding the
/// arena before the search even starts.
const MAX_START_LABELS: usize = 10_000;

/// Seeds one label chain per connection departing (arriving, for backward
/// searches) inside the window, for every terminal.
///
/// Labels are seeded directly on route nodes, so boarding the first train
/// of a journey pays neither transfer time nor an interchange. Each seed
/// carries a chain back to its station node, which journey reconstruction
/// walks later.
#[allow(clippy::too_many_arguments)]
pub fn generate_start_labels(
    graph: &Graph,
    arena: &mut LabelArena,
    lbs: &LowerBounds,
    config: &SearchConfig,
    dir: SearchDir,
    terminals: &[Terminal],
    window_begin: Time,
    window_end: Time,
) -> Result<Vec<LabelId>, BadRequest> {
    let mut starts = Vec::new();
    for terminal in terminals {
        match dir {
            SearchDir::Forward => forward_starts(
                graph,
                arena,
                lbs,
                config,
                terminal,
                window_begin,
                window_end,
                &mut starts,
            )?,
            SearchDir::Backward => backward_starts(
                graph,
                arena,
                lbs,
                config,
                terminal,
                window_begin,
                window_end,
                &mut starts,
            )?,
        }
    }
    Ok(starts)
}

#[allow(clippy::too_many_arguments)]
fn forward_starts(
    graph: &Graph,
    arena: &mut LabelArena,
    lbs: &LowerBounds,
    config: &SearchConfig,
    terminal: &Terminal,
    window_begin: Time,
    window_end: Time,
    starts: &mut Vec<LabelId>,
) -> Result<(), BadRequest> {
    let station_node = graph.station_node(terminal.station);
    let route_nodes: Vec<NodeId> = graph
        .node(station_node)
        .edges
        .iter()
        .map(|e| e.to)
        .filter(|n| graph.node(*n).is_route_node())
        .collect();
    for route_node in route_nodes {
        for edge in graph.node(route_node).edges.iter().filter(|e| e.is_route()) {
            let mut t = window_begin + terminal.offset;
            loop {
                let Some(cost) = edge.cost_at(t, None, SearchDir::Forward, graph.days_patterns())
                else {
                    break;
                };
                let Some(ride) = cost.ride else { break };
                let dep = ride.d_time;
                if dep > window_end + terminal.offset {
                    break;
                }
                if let Some(start) = dep.checked_sub(terminal.offset) {
                    seed_chain(
                        arena, lbs, config, terminal, station_node, route_node, start, dep, starts,
                    );
                }
                if starts.len() > MAX_START_LABELS {
                    return Err(BadRequest::TooManyStartLabels {
                        begin: window_begin,
                        end: window_end,
                    });
                }
                t = dep + 1;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn backward_starts(
    graph: &Graph,
    arena: &mut LabelArena,
    lbs: &LowerBounds,
    config: &SearchConfig,
    terminal: &Terminal,
    window_begin: Time,
    window_end: Time,
    starts: &mut Vec<LabelId>,
) -> Result<(), BadRequest> {
    let station_node = graph.station_node(terminal.station);
    let route_nodes: Vec<NodeId> = graph
        .node(station_node)
        .incoming
        .iter()
        .map(|r| r.node)
        .filter(|n| graph.node(*n).is_route_node())
        .collect();
    for route_node in route_nodes {
        for edge_ref in &graph.node(route_node).incoming {
            let edge = graph.edge(*edge_ref);
            if !edge.is_route() {
                continue;
            }
            let Some(mut t) = window_end.checked_sub(terminal.offset) else {
                continue;
            };
            loop {
                let Some(cost) = edge.cost_at(t, None, SearchDir::Backward, graph.days_patterns())
                else {
                    break;
                };
                let Some(ride) = cost.ride else { break };
                let arr = ride.a_time;
                let start = arr + terminal.offset;
                if start < window_begin {
                    break;
                }
                seed_chain(
                    arena, lbs, config, terminal, station_node, route_node, start, arr, starts,
                );
                if starts.len() > MAX_START_LABELS {
                    return Err(BadRequest::TooManyStartLabels {
                        begin: window_begin,
                        end: window_end,
                    });
                }
                let Some(next) = arr.checked_sub(1) else {
                    break;
                };
                t = next;
            }
        }
    }
    Ok(())
}

/// Allocates the station-node / route-node chain for one seed. The
/// route-node label is the one handed to the search.
#[allow(clippy::too_many_arguments)]
fn seed_chain(
    arena: &mut LabelArena,
    lbs: &LowerBounds,
    config: &SearchConfig,
    terminal: &Terminal,
    station_node: NodeId,
    route_node: NodeId,
    start: Time,
    now: Time,
    starts: &mut Vec<LabelId>,
) {
    // build the seed label before allocating anything; an unreachable
    // route node aborts the whole chain
    let Some(mut route_label) = Label::new_start(
        None,
        route_node,
        start,
        now,
        terminal.price,
        terminal.slot,
        lbs,
        config,
    ) else {
        return;
    };
    let Some(station_label) = Label::new_start(
        None,
        station_node,
        start,
        now,
        terminal.price,
        terminal.slot,
        lbs,
        config,
    ) else {
        return;
    };
    let station_id = arena.alloc(station_label);
    route_label.pred = Some(station_id);
    starts.push(arena.alloc(route_label));
}
