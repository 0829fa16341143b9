use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::engine::arena::{LabelArena, LabelId};
use crate::engine::constant_graph::LowerBounds;
use crate::engine::label::Label;
use crate::engine::statistics::Statistics;
use crate::graph::edges::Edge;
use crate::graph::nodes::NodeId;
use crate::graph::Graph;
use crate::request::SearchDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    key: (u32, u8, u32, u32),
    /// Part of the ordering so equal keys still pop deterministically.
    label: LabelId,
}

/// Multi-criteria label-setting search.
///
/// Pops the label with the smallest lower-bounded key, expands it over all
/// edges of its node, and keeps per-node Pareto sets of undominated
/// labels. Labels reaching the goal node become results immediately;
/// remaining queued labels that a result dominates are discarded when
/// popped.
pub struct ParetoDijkstra<'a> {
    graph: &'a Graph,
    config: &'a SearchConfig,
    dir: SearchDir,
    goal: NodeId,
    arena: &'a mut LabelArena,
    lower_bounds: &'a LowerBounds,
    additional_edges: &'a HashMap<NodeId, Vec<Edge>>,
    queue: BinaryHeap<Reverse<QueueEntry>>,
    /// Labels exactly as good as their parent skip the queue and are
    /// processed next, LIFO.
    equals: Vec<LabelId>,
    node_labels: Vec<Vec<LabelId>>,
    results: Vec<LabelId>,
    stats: Statistics,
}

impl<'a> ParetoDijkstra<'a> {
    pub fn new(
        graph: &'a Graph,
        config: &'a SearchConfig,
        dir: SearchDir,
        goal: NodeId,
        arena: &'a mut LabelArena,
        lower_bounds: &'a LowerBounds,
        additional_edges: &'a HashMap<NodeId, Vec<Edge>>,
        start_labels: &[LabelId],
    ) -> Self {
        let mut queue = BinaryHeap::new();
        let mut node_labels = vec![Vec::new(); graph.nb_of_nodes()];
        for &id in start_labels {
            let label = &arena[id];
            queue.push(Reverse(QueueEntry {
                key: label.ordering_key(config),
                label: id,
            }));
            node_labels[label.node.index()].push(id);
        }
        let stats = Statistics {
            start_label_count: start_labels.len() as u64,
            labels_created: arena.len() as u64,
            ..Statistics::default()
        };
        Self {
            graph,
            config,
            dir,
            goal,
            arena,
            lower_bounds,
            additional_edges,
            queue,
            equals: Vec::new(),
            node_labels,
            results: Vec::new(),
            stats,
        }
    }

    pub fn search(&mut self) -> Vec<LabelId> {
        let graph = self.graph;
        let additional_edges = self.additional_edges;
        while !self.queue.is_empty() || !self.equals.is_empty() {
            if self.arena.is_full()
                || (self.arena.len() > self.arena.capacity() / 2 && self.results.is_empty())
            {
                debug!(
                    labels = self.arena.len(),
                    results = self.results.len(),
                    "label cap reached, aborting with partial results"
                );
                self.stats.max_label_quit = true;
                break;
            }

            let label_id = if let Some(id) = self.equals.pop() {
                self.stats.labels_equals_popped += 1;
                id
            } else {
                self.stats.queue_max_size =
                    self.stats.queue_max_size.max(self.queue.len() as u64);
                let Some(Reverse(entry)) = self.queue.pop() else {
                    break;
                };
                self.stats.labels_popped += 1;
                self.stats.labels_popped_after_last_result += 1;
                entry.label
            };

            let label = self.arena[label_id];
            if label.dominated {
                self.stats.labels_dominated_by_later_labels += 1;
                continue;
            }
            if self.dominated_by_results(&label) {
                self.stats.labels_dominated_by_results += 1;
                continue;
            }

            // once inside the goal station, only the hop onto the goal
            // node itself is worth taking
            let at_goal_station =
                graph.node(label.node).station == graph.node(self.goal).station;

            if let Some(edges) = additional_edges.get(&label.node) {
                for edge in edges {
                    if at_goal_station && edge.dest(self.dir) != self.goal {
                        continue;
                    }
                    self.create_new_label(label_id, &label, edge);
                }
            }
            match self.dir {
                SearchDir::Forward => {
                    for edge in &graph.node(label.node).edges {
                        if at_goal_station && edge.dest(self.dir) != self.goal {
                            continue;
                        }
                        self.create_new_label(label_id, &label, edge);
                    }
                }
                SearchDir::Backward => {
                    for edge_ref in &graph.node(label.node).incoming {
                        let edge = graph.edge(*edge_ref);
                        if at_goal_station && edge.dest(self.dir) != self.goal {
                            continue;
                        }
                        self.create_new_label(label_id, &label, edge);
                    }
                }
            }
        }

        self.filter_results();
        self.results.clone()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn create_new_label(&mut self, parent_id: LabelId, parent: &Label, edge: &Edge) {
        let pred_node = parent.pred.map(|p| self.arena[p].node);
        let Some(new_label) = parent.expand(
            parent_id,
            pred_node,
            edge,
            self.graph,
            self.lower_bounds,
            self.config,
            self.dir,
        ) else {
            self.stats.labels_filtered += 1;
            return;
        };
        self.stats.labels_created += 1;

        if new_label.node == self.goal {
            let id = self.arena.alloc(new_label);
            if self.add_result(id) {
                trace!(results = self.results.len(), "result added");
                if self.stats.labels_popped_until_first_result.is_none() {
                    self.stats.labels_popped_until_first_result =
                        Some(self.stats.labels_popped);
                }
            }
            return;
        }

        if self.dominated_by_results(&new_label) {
            self.stats.labels_dominated_by_results += 1;
            return;
        }

        let key = new_label.ordering_key(self.config);
        let id = self.arena.alloc(new_label);
        if self.add_label_to_node(id, &new_label) {
            // a label exactly as good as its parent keeps the front;
            // everything else goes through the queue
            if key <= parent.ordering_key(self.config) {
                self.equals.push(id);
            } else {
                self.queue.push(Reverse(QueueEntry { key, label: id }));
            }
        } else {
            self.stats.labels_dominated_by_former_labels += 1;
        }
    }

    fn add_result(&mut self, new_id: LabelId) -> bool {
        let new_label = self.arena[new_id];
        let mut i = 0;
        while i < self.results.len() {
            let other = self.arena[self.results[i]];
            if new_label.dominates(&other, true, self.config, self.dir) {
                self.results.remove(i);
            } else if other.dominates(&new_label, true, self.config, self.dir) {
                return false;
            } else {
                i += 1;
            }
        }
        self.results.push(new_id);
        self.stats.labels_popped_after_last_result = 0;
        true
    }

    fn dominated_by_results(&self, label: &Label) -> bool {
        self.results
            .iter()
            .any(|&r| self.arena[r].dominates(label, true, self.config, self.dir))
    }

    /// Inserts the new label into its node's Pareto set, marking labels it
    /// dominates for lazy deletion. Returns false when an existing label
    /// dominates the new one.
    fn add_label_to_node(&mut self, new_id: LabelId, new_label: &Label) -> bool {
        let node_index = new_label.node.index();
        let existing = std::mem::take(&mut self.node_labels[node_index]);
        let mut kept = Vec::with_capacity(existing.len() + 1);
        let mut undominated = true;
        for other_id in existing {
            if !undominated {
                kept.push(other_id);
                continue;
            }
            let other = self.arena[other_id];
            if other.dominates(new_label, false, self.config, self.dir) {
                undominated = false;
                kept.push(other_id);
            } else if new_label.dominates(&other, false, self.config, self.dir) {
                self.arena[other_id].dominated = true;
            } else {
                kept.push(other_id);
            }
        }
        if undominated {
            // front insertion: later labels rarely dominate earlier ones,
            // so the likely dominator is checked first
            kept.insert(0, new_id);
        }
        self.node_labels[node_index] = kept;
        undominated
    }

    /// Post-search cleanup with the hard dominance relation; removals can
    /// enable further removals, hence the restart.
    fn filter_results(&mut self) {
        let mut restart = true;
        while restart {
            restart = false;
            for i in 0..self.results.len() {
                let keeper_id = self.results[i];
                let keeper = self.arena[keeper_id];
                let before = self.results.len();
                let arena = &*self.arena;
                let (config, dir) = (self.config, self.dir);
                self.results.retain(|&id| {
                    id == keeper_id || !keeper.dominates_hard(&arena[id], config, dir)
                });
                let removed = before - self.results.len();
                if removed > 0 {
                    self.stats.labels_filtered += removed as u64;
                    restart = true;
                    break;
                }
            }
        }
    }
}
