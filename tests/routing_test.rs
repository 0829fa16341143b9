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

use anyhow::Error;
use chrono::NaiveDate;
use sleipnir::{
    BadRequest, DayBits, Edge, GraphBuilder, Query, SearchConfig, SearchError, Searcher,
    ServiceClass, StationId, Terminal, Time, Transport,
};

fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
}

/// One regional line a -> b, one trip departing 10:00, arriving 10:50.
fn single_line() -> (sleipnir::Graph, StationId, StationId) {
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(600, 650)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        500,
        101,
        "R1",
        &[],
    );
    (builder.build(), a, b)
}

#[test]
fn direct_connection() -> Result<(), Error> {
    init();
    let (graph, a, b) = single_line();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());

    let query = Query::forward(a, b, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 600));
    assert_eq!(journey.arrival, Time::new(0, 650));
    assert_eq!(journey.duration, 50);
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.price, 500);

    assert_eq!(journey.stops.len(), 2);
    assert_eq!(journey.stops[0].station, a);
    assert_eq!(journey.stops[0].departure, Some(Time::new(0, 600)));
    assert_eq!(journey.stops[1].station, b);
    assert_eq!(journey.stops[1].arrival, Some(Time::new(0, 650)));

    assert_eq!(journey.transports.len(), 1);
    match &journey.transports[0] {
        Transport::Ride {
            from,
            to,
            class,
            train_nr,
            line,
            duration,
        } => {
            assert_eq!((*from, *to), (0, 1));
            assert_eq!(*class, ServiceClass::Regional);
            assert_eq!(*train_nr, 101);
            assert_eq!(line, "R1");
            assert_eq!(*duration, 50);
        }
        other => panic!("expected a ride, got {other:?}"),
    }

    assert!(result.stats.labels_created > 0);
    assert!(result.stats.labels_popped > 0);
    assert!(!result.stats.max_label_quit);
    Ok(())
}

#[test]
fn pareto_set_keeps_incomparable_journeys_and_drops_dominated_ones() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let route = builder.route(&[a, b]);
    let days = DayBits::from_days([0]);
    // fast but expensive
    builder.trip(route, &[(600, 650)], &days, ServiceClass::Regional, 500, 1, "R1", &[]);
    // slow but cheap
    builder.trip(route, &[(605, 700)], &days, ServiceClass::Regional, 100, 2, "R1", &[]);
    // slower and more expensive than the first: dominated
    builder.trip(route, &[(620, 690)], &days, ServiceClass::Regional, 700, 3, "R1", &[]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, b, Time::new(0, 590), Time::new(0, 630));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 2);
    assert_eq!(result.journeys[0].departure, Time::new(0, 600));
    assert_eq!(result.journeys[0].arrival, Time::new(0, 650));
    assert_eq!(result.journeys[0].price, 500);
    assert_eq!(result.journeys[1].departure, Time::new(0, 605));
    assert_eq!(result.journeys[1].arrival, Time::new(0, 700));
    assert_eq!(result.journeys[1].price, 100);
    assert!(result
        .journeys
        .iter()
        .all(|j| j.departure != Time::new(0, 620)));
    Ok(())
}

#[test]
fn transfer_needs_the_station_transfer_time() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 10);
    let c = builder.station("c", 5);
    let r1 = builder.route(&[a, b]);
    let r2 = builder.route(&[b, c]);
    let bike = builder.attribute("bike transport");
    let days = DayBits::from_days([0]);
    builder.trip(r1, &[(600, 700)], &days, ServiceClass::Regional, 100, 1, "R1", &[]);
    // departs 8 minutes after the arrival: not enough for the 10 minute
    // interchange at b
    builder.trip(r2, &[(708, 750)], &days, ServiceClass::Regional, 100, 2, "R2", &[]);
    builder.trip(r2, &[(720, 760)], &days, ServiceClass::Regional, 100, 3, "R2", &[bike]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, c, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 600));
    assert_eq!(journey.arrival, Time::new(0, 760));
    assert_eq!(journey.transfers, 1);

    assert_eq!(journey.stops.len(), 3);
    assert_eq!(journey.stops[1].station, b);
    assert_eq!(journey.stops[1].arrival, Some(Time::new(0, 700)));
    assert_eq!(journey.stops[1].departure, Some(Time::new(0, 720)));
    assert!(journey.stops[1].interchange);

    assert_eq!(
        journey.attributes,
        vec![sleipnir::AttributeRange {
            from: 1,
            to: 2,
            attribute: bike,
        }]
    );
    Ok(())
}

#[test]
fn overlong_interchange_waits_are_cut() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 10);
    let c = builder.station("c", 5);
    let r1 = builder.route(&[a, b]);
    let r2 = builder.route(&[b, c]);
    let days = DayBits::from_days([0]);
    builder.trip(r1, &[(600, 700)], &days, ServiceClass::Regional, 100, 1, "R1", &[]);
    // 210 minutes of waiting at b, above the default cap of 200
    builder.trip(r2, &[(920, 960)], &days, ServiceClass::Regional, 100, 2, "R2", &[]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, c, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;
    assert!(result.journeys.is_empty());
    Ok(())
}

#[test]
fn walking_leg_to_the_destination() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let c = builder.station("c", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(600, 650)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    builder.foot_edge(b, c, 7);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, c, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.arrival, Time::new(0, 657));
    assert_eq!(journey.duration, 57);
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.stops.len(), 3);

    assert_eq!(journey.transports.len(), 2);
    match &journey.transports[1] {
        Transport::Walk {
            from,
            to,
            duration,
            slot,
            price,
        } => {
            assert_eq!((*from, *to), (1, 2));
            assert_eq!(*duration, 7);
            assert_eq!(*slot, 0);
            assert_eq!(*price, 0);
        }
        other => panic!("expected a walk, got {other:?}"),
    }
    Ok(())
}

#[test]
fn query_edge_walks_to_an_otherwise_unreachable_station() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let c = builder.station("c", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(600, 650)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let mut query = Query::forward(a, c, Time::new(0, 590), Time::new(0, 610));
    // a query-scoped external-mode leg bridges the last stretch to c
    query.additional_edges.push(Edge::mumo(
        graph.station_node(b),
        graph.station_node(c),
        12,
        250,
        4,
    ));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 600));
    assert_eq!(journey.arrival, Time::new(0, 662));
    assert_eq!(journey.price, 100 + 250);
    assert_eq!(journey.target_slot, 4);
    assert_eq!(journey.stops.len(), 3);

    assert_eq!(journey.transports.len(), 2);
    match &journey.transports[1] {
        Transport::Walk {
            from,
            to,
            duration,
            slot,
            price,
        } => {
            assert_eq!((*from, *to), (1, 2));
            assert_eq!(*duration, 12);
            assert_eq!(*slot, 4);
            assert_eq!(*price, 250);
        }
        other => panic!("expected a walk, got {other:?}"),
    }
    Ok(())
}

#[test]
fn overnight_interchange_spans_the_day_boundary() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let c = builder.station("c", 5);
    let r1 = builder.route(&[a, b]);
    let r2 = builder.route(&[b, c]);
    builder.trip(
        r1,
        &[(1400, 1450)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    builder.trip(
        r2,
        &[(490, 540)],
        &DayBits::from_days([1]),
        ServiceClass::Regional,
        100,
        2,
        "R2",
        &[],
    );
    // a hotel at b is offered, but waiting on the platform is cheaper in
    // every criterion, so it never makes it into a journey
    builder.hotel_edge(b, 480, 360, 5000, 3);
    let graph = builder.build();

    let config = SearchConfig {
        max_interchange_wait: 600,
        ..SearchConfig::default()
    };
    let mut searcher = Searcher::new(&graph, config);
    let query = Query::forward(a, c, Time::new(0, 1390), Time::new(0, 1410));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 1400));
    assert_eq!(journey.arrival, Time::new(1, 540));
    assert_eq!(journey.transfers, 1);
    assert_eq!(journey.price, 100 + 100);

    assert_eq!(journey.stops.len(), 3);
    assert_eq!(journey.stops[1].station, b);
    // Time is flattened, so minute 1450 of the first day and minute 10 of
    // the second are the same instant
    assert_eq!(journey.stops[1].arrival, Some(Time::new(1, 10)));
    assert_eq!(journey.stops[1].departure, Some(Time::new(1, 490)));
    assert!(journey.stops[1].interchange);
    Ok(())
}

#[test]
fn backward_search_maximizes_the_departure() -> Result<(), Error> {
    init();
    let (graph, a, b) = single_line();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());

    let query = Query::backward(a, b, Time::new(0, 640), Time::new(0, 660));
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 600));
    assert_eq!(journey.arrival, Time::new(0, 650));
    assert_eq!(journey.duration, 50);
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.price, 500);
    assert_eq!(journey.stops.first().map(|s| s.station), Some(a));
    assert_eq!(journey.stops.last().map(|s| s.station), Some(b));
    Ok(())
}

#[test]
fn origin_offset_shifts_the_departure() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(620, 670)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query {
        origins: vec![Terminal::with_offset(a, 15, 200, 2)],
        ..Query::forward(a, b, Time::new(0, 590), Time::new(0, 610))
    };
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.departure, Time::new(0, 605));
    assert_eq!(journey.arrival, Time::new(0, 670));
    assert_eq!(journey.duration, 65);
    assert_eq!(journey.price, 100 + 200);
    assert_eq!(journey.start_slot, 2);
    Ok(())
}

#[test]
fn multiple_destinations_share_one_search() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let c = builder.station("c", 5);
    let r1 = builder.route(&[a, b]);
    let r2 = builder.route(&[a, c]);
    let days = DayBits::from_days([0]);
    builder.trip(r1, &[(600, 650)], &days, ServiceClass::Regional, 100, 1, "R1", &[]);
    builder.trip(r2, &[(600, 640)], &days, ServiceClass::Regional, 500, 2, "R2", &[]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query {
        destinations: vec![Terminal::at(b), Terminal::at(c)],
        ..Query::forward(a, b, Time::new(0, 590), Time::new(0, 610))
    };
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 2);
    assert_eq!(result.journeys[0].arrival, Time::new(0, 640));
    assert_eq!(result.journeys[0].price, 500);
    assert_eq!(result.journeys[1].arrival, Time::new(0, 650));
    assert_eq!(result.journeys[1].price, 100);
    Ok(())
}

#[test]
fn multiple_origins_share_one_search() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let c = builder.station("c", 5);
    let r1 = builder.route(&[a, c]);
    let r2 = builder.route(&[b, c]);
    let days = DayBits::from_days([0]);
    // slow but cheap from a, fast but expensive from b
    builder.trip(r1, &[(600, 650)], &days, ServiceClass::Regional, 100, 1, "R1", &[]);
    builder.trip(r2, &[(605, 640)], &days, ServiceClass::Regional, 500, 2, "R2", &[]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query {
        origins: vec![Terminal::at(a), Terminal::at(b)],
        ..Query::forward(a, c, Time::new(0, 590), Time::new(0, 610))
    };
    let result = searcher.solve(&query)?;

    assert_eq!(result.journeys.len(), 2);
    assert_eq!(result.journeys[0].departure, Time::new(0, 600));
    assert_eq!(result.journeys[0].arrival, Time::new(0, 650));
    assert_eq!(result.journeys[0].price, 100);
    assert_eq!(result.journeys[0].stops.first().map(|s| s.station), Some(a));
    assert_eq!(result.journeys[1].departure, Time::new(0, 605));
    assert_eq!(result.journeys[1].arrival, Time::new(0, 640));
    assert_eq!(result.journeys[1].price, 500);
    assert_eq!(result.journeys[1].stops.first().map(|s| s.station), Some(b));
    Ok(())
}

#[test]
fn service_days_gate_the_trips() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(600, 650)],
        &DayBits::from_days([2]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    let graph = builder.build();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());

    let off_day = Query::forward(a, b, Time::new(0, 590), Time::new(0, 610));
    assert!(searcher.solve(&off_day)?.journeys.is_empty());

    let on_day = Query::forward(a, b, Time::new(2, 590), Time::new(2, 610));
    let result = searcher.solve(&on_day)?;
    assert_eq!(result.journeys.len(), 1);
    assert_eq!(result.journeys[0].departure, Time::new(2, 600));
    assert_eq!(result.journeys[0].arrival, Time::new(2, 650));
    Ok(())
}

#[test]
fn unreachable_destination_yields_an_empty_result() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let d = builder.station("d", 5);
    let route = builder.route(&[a, b]);
    builder.trip(
        route,
        &[(600, 650)],
        &DayBits::from_days([0]),
        ServiceClass::Regional,
        100,
        1,
        "R1",
        &[],
    );
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, d, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;
    assert!(result.journeys.is_empty());
    Ok(())
}

#[test]
fn label_cap_aborts_with_partial_results() -> Result<(), Error> {
    init();
    let (graph, a, b) = single_line();
    // a cap the two seed labels already exhaust
    let config = SearchConfig {
        max_labels: 2,
        ..SearchConfig::default()
    };
    let mut searcher = Searcher::new(&graph, config);
    let query = Query::forward(a, b, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;

    assert!(result.stats.max_label_quit);
    assert!(result.journeys.is_empty());
    Ok(())
}

#[test]
fn same_station_query_returns_no_journeys() -> Result<(), Error> {
    init();
    let (graph, a, _) = single_line();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, a, Time::new(0, 590), Time::new(0, 610));
    let result = searcher.solve(&query)?;
    assert!(result.journeys.is_empty());
    Ok(())
}

#[test]
fn inverted_window_is_rejected() {
    init();
    let (graph, a, b) = single_line();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, b, Time::new(0, 610), Time::new(0, 590));
    let err = searcher.solve(&query).unwrap_err();
    assert!(matches!(
        err,
        SearchError::BadRequest(BadRequest::InvalidWindow { .. })
    ));
}

#[test]
fn unknown_station_is_rejected() {
    init();
    let (graph, a, _) = single_line();
    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, StationId(999), Time::new(0, 590), Time::new(0, 610));
    let err = searcher.solve(&query).unwrap_err();
    assert!(matches!(
        err,
        SearchError::BadRequest(BadRequest::UnknownStation { .. })
    ));
}

#[test]
fn repeated_searches_return_identical_journeys() -> Result<(), Error> {
    init();
    let mut builder = GraphBuilder::new(first_date(), 30);
    let a = builder.station("a", 5);
    let b = builder.station("b", 5);
    let route = builder.route(&[a, b]);
    let days = DayBits::from_days([0]);
    builder.trip(route, &[(600, 650)], &days, ServiceClass::Regional, 500, 1, "R1", &[]);
    builder.trip(route, &[(605, 700)], &days, ServiceClass::Regional, 100, 2, "R1", &[]);
    let graph = builder.build();

    let mut searcher = Searcher::new(&graph, SearchConfig::default());
    let query = Query::forward(a, b, Time::new(0, 590), Time::new(0, 630));

    let fingerprint = |journeys: &[sleipnir::Journey]| {
        journeys
            .iter()
            .map(|j| (j.departure, j.arrival, j.transfers, j.price))
            .collect::<Vec<_>>()
    };
    let first = fingerprint(&searcher.solve(&query)?.journeys);
    let second = fingerprint(&searcher.solve(&query)?.journeys);
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    Ok(())
}
