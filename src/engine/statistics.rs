/// Counters collected over one search.
///
/// Everything here is observational; nothing feeds back into the search
/// itself. The counters are cheap enough to maintain unconditionally.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub start_label_count: u64,
    pub labels_created: u64,
    pub labels_popped: u64,
    /// Labels routed through the equals fast path instead of the queue.
    pub labels_equals_popped: u64,
    pub labels_dominated_by_results: u64,
    pub labels_dominated_by_former_labels: u64,
    /// New labels that retroactively dominated older ones at their node.
    pub labels_dominated_by_later_labels: u64,
    pub labels_filtered: u64,
    pub labels_popped_until_first_result: Option<u64>,
    pub labels_popped_after_last_result: u64,
    pub queue_max_size: u64,
    /// Set when the label cap aborted the search with partial results.
    pub max_label_quit: bool,
    pub travel_time_lb_ms: u64,
    pub transfers_lb_ms: u64,
    pub price_lb_ms: u64,
    pub pareto_dijkstra_ms: u64,
}
