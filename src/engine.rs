//! The search core: label arena, lower bounds, start-label generation and
//! the Pareto label-setting loop.

pub mod arena;
pub mod constant_graph;
pub mod label;
pub mod pareto_dijkstra;
pub mod start_labels;
pub mod statistics;

pub use arena::{LabelArena, LabelId};
pub use constant_graph::{LowerBounds, SimpleEdge, UNREACHABLE};
pub use label::Label;
pub use pareto_dijkstra::ParetoDijkstra;
pub use start_labels::generate_start_labels;
pub use statistics::Statistics;
