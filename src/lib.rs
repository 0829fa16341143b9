//! Multi-criteria journey search for time-dependent public transport
//! networks.
//!
//! Journeys are Pareto-optimal over travel time, interchanges and a
//! wage-adjusted price. The search is a label-setting Dijkstra over a
//! time-expanded station/route graph, guided by per-criterion lower
//! bounds computed on a time-independent shadow of the graph.
//!
//! ```no_run
//! use sleipnir::{GraphBuilder, Query, SearchConfig, Searcher, Time};
//! # use sleipnir::DayBits;
//! # use sleipnir::ServiceClass;
//!
//! let mut builder = GraphBuilder::new(
//!     chrono::NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
//!     30,
//! );
//! let a = builder.station("a", 5);
//! let b = builder.station("b", 5);
//! let route = builder.route(&[a, b]);
//! builder.trip(
//!     route,
//!     &[(600, 650)],
//!     &DayBits::from_days([0]),
//!     ServiceClass::Regional,
//!     300,
//!     1,
//!     "R1",
//!     &[],
//! );
//! let graph = builder.build();
//!
//! let mut searcher = Searcher::new(&graph, SearchConfig::default());
//! let query = Query::forward(a, b, Time::new(0, 540), Time::new(0, 720));
//! let result = searcher.solve(&query).unwrap();
//! for journey in &result.journeys {
//!     println!("{} -> {}", journey.departure, journey.arrival);
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod request;
pub mod response;
pub mod search;
pub mod time;

pub use calendar::{Calendar, DayBits, DaysPattern, DaysPatterns};
pub use config::{SearchConfig, TieBreak};
pub use engine::Statistics;
pub use error::{BadRequest, InternalError, SearchError};
pub use graph::{
    AttributeId, Edge, FullConnection, Graph, GraphBuilder, RouteId, ServiceClass, StationId,
};
pub use request::{Query, SearchDir, Terminal};
pub use response::{AttributeRange, Journey, Stop, Transport};
pub use search::{SearchResult, Searcher};
pub use time::{Duration, Time, INVALID_TIME};
