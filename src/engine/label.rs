use crate::config::{SearchConfig, TieBreak};
use crate::engine::arena::LabelId;
use crate::engine::constant_graph::{LowerBounds, UNREACHABLE};
use crate::graph::connection::ServiceClass;
use crate::graph::edges::{Edge, EdgeKind, Ride};
use crate::graph::nodes::NodeId;
use crate::graph::Graph;
use crate::request::SearchDir;
use crate::time::Time;

pub const BUCKET_LOCAL: usize = 0;
pub const BUCKET_REGIONAL: usize = 1;
pub const BUCKET_IC: usize = 2;
pub const BUCKET_ICE: usize = 3;
pub const BUCKET_ADDITIONAL: usize = 4;

/// Regional fares saturate here (day-ticket price).
pub const MAX_REGIONAL_FARE: u16 = 4200;
/// The sum of all train fares saturates here.
pub const MAX_TRAIN_FARE: u32 = 14000;

const ICE_FARE: u16 = 700;
const ICE_UPGRADE_FARE: u16 = 100;
const IC_FARE: u16 = 600;

fn fare_bucket(class: ServiceClass) -> usize {
    match class {
        ServiceClass::Ice => BUCKET_ICE,
        ServiceClass::Ic => BUCKET_IC,
        ServiceClass::RegionalExpress | ServiceClass::Regional | ServiceClass::SuburbanTrain => {
            BUCKET_REGIONAL
        }
        ServiceClass::NightTrain
        | ServiceClass::Subway
        | ServiceClass::Tram
        | ServiceClass::Bus
        | ServiceClass::Other => BUCKET_LOCAL,
    }
}

/// One partial journey, pinned to a node at a point in time.
///
/// Each criterion is kept twice: index 0 holds the cost accumulated so
/// far, index 1 adds the admissible lower bound towards the goal. Queue
/// ordering and result pruning work on the bounded values, final journeys
/// report the accumulated ones.
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub pred: Option<LabelId>,
    pub node: NodeId,
    /// Connection ridden into this label, kept across zero-cost alighting
    /// edges so after-train edges can see it.
    pub ride: Option<Ride>,
    /// Departure of the journey (arrival for backward searches).
    pub start: Time,
    /// Point in time this label stands at `node`.
    pub now: Time,
    /// Lazy-deletion mark; dominated labels stay queued but are skipped.
    pub dominated: bool,
    pub travel_time: [u32; 2],
    pub transfers: [u8; 2],
    pub total_price: [u32; 2],
    /// Fare buckets: local, regional, ic, ice, additional.
    pub prices: [u16; 5],
    pub start_slot: u8,
    pub target_slot: u8,
}

impl Label {
    /// A fresh label standing at `node`, `offset_price` cents and
    /// `now - start` minutes away from the true terminal. `None` when the
    /// node cannot reach the goal within the configured limits.
    #[allow(clippy::too_many_arguments)]
    pub fn new_start(
        pred: Option<LabelId>,
        node: NodeId,
        start: Time,
        now: Time,
        offset_price: u16,
        slot: u8,
        lbs: &LowerBounds,
        config: &SearchConfig,
    ) -> Option<Label> {
        let tt_lb = lbs.travel_time_to(node);
        let tr_lb = lbs.transfers_to(node);
        if tt_lb == UNREACHABLE || tr_lb == UNREACHABLE {
            return None;
        }
        let elapsed = now.ts().abs_diff(start.ts());
        if elapsed + tt_lb > config.max_travel_time {
            return None;
        }
        if tr_lb > u32::from(config.max_transfers) {
            return None;
        }
        let mut prices = [0u16; 5];
        prices[BUCKET_ADDITIONAL] = offset_price;
        let mut label = Label {
            pred,
            node,
            ride: None,
            start,
            now,
            dominated: false,
            travel_time: [elapsed, elapsed + tt_lb],
            transfers: [0, tr_lb as u8],
            total_price: [0, 0],
            prices,
            start_slot: slot,
            target_slot: 0,
        };
        label.recompute_prices(lbs);
        Some(label)
    }

    /// Expands this label over `edge`. `None` when the edge is unusable at
    /// `self.now` or the resulting label cannot beat the configured limits.
    #[allow(clippy::too_many_arguments)]
    pub fn expand(
        &self,
        self_id: LabelId,
        pred_node: Option<NodeId>,
        edge: &Edge,
        graph: &Graph,
        lbs: &LowerBounds,
        config: &SearchConfig,
        dir: SearchDir,
    ) -> Option<Label> {
        let dest = edge.dest(dir);
        // don't bounce straight back to where we came from
        if pred_node == Some(dest) {
            return None;
        }
        let tt_lb = lbs.travel_time_to(dest);
        let tr_lb = lbs.transfers_to(dest);
        if tt_lb == UNREACHABLE || tr_lb == UNREACHABLE {
            return None;
        }
        let mut cost = edge.cost_at(self.now, self.ride.as_ref(), dir, graph.days_patterns())?;
        // an arrive-by search walks the boarding edge of the very first
        // train last; boarding the first train costs nothing
        if dir == SearchDir::Backward && cost.transfer && dest == lbs.goal() {
            cost.time = 0;
            cost.transfer = false;
        }
        if let Some(ride) = &cost.ride {
            let wait = match dir {
                SearchDir::Forward => ride.d_time.duration_since(self.now)?,
                SearchDir::Backward => self.now.duration_since(ride.a_time)?,
            };
            if wait > config.max_interchange_wait {
                return None;
            }
        }
        let now = match dir {
            SearchDir::Forward => self.now + cost.time,
            SearchDir::Backward => self.now.checked_sub(cost.time)?,
        };
        let travel_time = self.travel_time[0] + cost.time;
        if travel_time + tt_lb > config.max_travel_time {
            return None;
        }
        let transfers = self.transfers[0].saturating_add(u8::from(cost.transfer));
        if u32::from(transfers) + tr_lb > u32::from(config.max_transfers) {
            return None;
        }

        // a ride is remembered across the zero-cost alighting edge so an
        // after-train edge right after it still sees the arriving train
        let keeps_ride = matches!(edge.kind, EdgeKind::Foot(_)) && cost.time == 0 && !cost.transfer;
        let mut label = Label {
            pred: Some(self_id),
            node: dest,
            ride: cost.ride.or(if keeps_ride { self.ride } else { None }),
            start: self.start,
            now,
            dominated: false,
            travel_time: [travel_time, travel_time + tt_lb],
            transfers: [transfers, (u32::from(transfers) + tr_lb) as u8],
            total_price: self.total_price,
            prices: self.prices,
            start_slot: self.start_slot,
            target_slot: self.target_slot,
        };
        if let Some(ride) = &cost.ride {
            let full = graph.full_connection(ride.full);
            label.add_fare(full.class, full.price);
        }
        if cost.price > 0 {
            label.prices[BUCKET_ADDITIONAL] =
                label.prices[BUCKET_ADDITIONAL].saturating_add(cost.price);
        }
        if edge.is_mumo() || matches!(edge.kind, EdgeKind::Hotel { .. }) {
            label.target_slot = cost.slot;
        }
        label.recompute_prices(lbs);
        Some(label)
    }

    /// Accumulates one ridden connection into the fare buckets.
    ///
    /// Long-distance classes pay a flat fare on first use; an IC fare is
    /// waived once an ICE fare was paid, an ICE after an IC only pays the
    /// upgrade.
    fn add_fare(&mut self, class: ServiceClass, price: u16) {
        match fare_bucket(class) {
            BUCKET_ICE => {
                let flat = if self.prices[BUCKET_ICE] == 0 {
                    if self.prices[BUCKET_IC] != 0 {
                        ICE_UPGRADE_FARE
                    } else {
                        ICE_FARE
                    }
                } else {
                    0
                };
                self.prices[BUCKET_ICE] =
                    self.prices[BUCKET_ICE].saturating_add(flat.saturating_add(price));
            }
            BUCKET_IC => {
                // the flat IC fare is waived once an ICE fare was paid,
                // but only for the first IC leg
                let flat = if self.prices[BUCKET_IC] == 0 && self.prices[BUCKET_ICE] != 0 {
                    0
                } else {
                    IC_FARE
                };
                self.prices[BUCKET_IC] =
                    self.prices[BUCKET_IC].saturating_add(flat.saturating_add(price));
            }
            BUCKET_REGIONAL => {
                self.prices[BUCKET_REGIONAL] = self.prices[BUCKET_REGIONAL]
                    .saturating_add(price)
                    .min(MAX_REGIONAL_FARE);
            }
            _ => {
                self.prices[BUCKET_LOCAL] = self.prices[BUCKET_LOCAL].saturating_add(price);
            }
        }
    }

    fn recompute_prices(&mut self, lbs: &LowerBounds) {
        let local = u32::from(self.prices[BUCKET_LOCAL]);
        let regional = u32::from(self.prices[BUCKET_REGIONAL]);
        let ic = u32::from(self.prices[BUCKET_IC]);
        let ice = u32::from(self.prices[BUCKET_ICE]);
        let additional = u32::from(self.prices[BUCKET_ADDITIONAL]);
        self.total_price[0] = (local + regional + ic + ice).min(MAX_TRAIN_FARE) + additional;
        let price_lb = match lbs.price_to(self.node) {
            UNREACHABLE => 0,
            lb => lb,
        };
        let bounded_regional = (regional + price_lb).min(u32::from(MAX_REGIONAL_FARE));
        self.total_price[1] = (local + bounded_regional + ic + ice).min(MAX_TRAIN_FARE) + additional;
    }

    /// Price criterion with travel time and interchanges priced in.
    pub fn price_with_wages(&self, lower_bounded: bool, config: &SearchConfig) -> u32 {
        let i = usize::from(lower_bounded);
        self.total_price[i]
            + self.travel_time[i] * config.minutely_wage
            + u32::from(self.transfers[i]) * config.transfer_wage
    }

    /// Pareto dominance between labels whose journeys overlap in time.
    ///
    /// A label only dominates another when it departs no earlier and
    /// arrives no later (flipped for backward searches); otherwise the two
    /// serve different parts of the window and both survive. Returns true
    /// for labels that are equal in every criterion.
    pub fn dominates(
        &self,
        other: &Label,
        lower_bounded: bool,
        config: &SearchConfig,
        dir: SearchDir,
    ) -> bool {
        let window_ok = match dir {
            SearchDir::Forward => self.start >= other.start && self.now <= other.now,
            SearchDir::Backward => self.start <= other.start && self.now >= other.now,
        };
        if !window_ok {
            return false;
        }
        let i = usize::from(lower_bounded);
        self.travel_time[i] <= other.travel_time[i]
            && self.transfers[i] <= other.transfers[i]
            && self.price_with_wages(lower_bounded, config) <= other.price_with_wages(lower_bounded, config)
    }

    /// Dominance without the time-window guard, used for the final result
    /// filter: no criterion worse, and either strictly better somewhere or
    /// starting no earlier (no later, backward).
    pub fn dominates_hard(&self, other: &Label, config: &SearchConfig, dir: SearchDir) -> bool {
        if self.travel_time[0] > other.travel_time[0]
            || self.transfers[0] > other.transfers[0]
            || self.price_with_wages(false, config) > other.price_with_wages(false, config)
        {
            return false;
        }
        let could_dominate = self.travel_time[0] < other.travel_time[0]
            || self.transfers[0] < other.transfers[0]
            || self.price_with_wages(false, config) < other.price_with_wages(false, config);
        let start_ok = match dir {
            SearchDir::Forward => self.start >= other.start,
            SearchDir::Backward => self.start <= other.start,
        };
        could_dominate || start_ok
    }

    /// Queue ordering key, best-first over the lower-bounded criteria. The
    /// final component breaks ties between otherwise equal labels.
    pub fn ordering_key(&self, config: &SearchConfig) -> (u32, u8, u32, u32) {
        let tie = match config.tie_break {
            TieBreak::PreferLaterDeparture => u32::MAX - self.start.ts(),
            TieBreak::PreferEarlierDeparture => self.start.ts(),
        };
        (
            self.travel_time[1],
            self.transfers[1],
            self.price_with_wages(true, config),
            tie,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_at(start: Time, now: Time) -> Label {
        let elapsed = now.ts().abs_diff(start.ts());
        Label {
            pred: None,
            node: NodeId(0),
            ride: None,
            start,
            now,
            dominated: false,
            travel_time: [elapsed, elapsed],
            transfers: [0, 0],
            total_price: [0, 0],
            prices: [0; 5],
            start_slot: 0,
            target_slot: 0,
        }
    }

    #[test]
    fn ice_fare_is_flat_plus_price_and_waives_the_ic_fare() {
        let mut label = label_at(Time::new(0, 0), Time::new(0, 0));
        label.add_fare(ServiceClass::Ice, 2500);
        assert_eq!(label.prices[BUCKET_ICE], ICE_FARE + 2500);
        // first IC after an ICE pays no flat fare
        label.add_fare(ServiceClass::Ic, 1500);
        assert_eq!(label.prices[BUCKET_IC], 1500);
        // further ICE legs only pay their price
        label.add_fare(ServiceClass::Ice, 2000);
        assert_eq!(label.prices[BUCKET_ICE], ICE_FARE + 2500 + 2000);
    }

    #[test]
    fn ic_before_ice_pays_the_upgrade() {
        let mut label = label_at(Time::new(0, 0), Time::new(0, 0));
        label.add_fare(ServiceClass::Ic, 1500);
        assert_eq!(label.prices[BUCKET_IC], IC_FARE + 1500);
        label.add_fare(ServiceClass::Ice, 2500);
        assert_eq!(label.prices[BUCKET_ICE], ICE_UPGRADE_FARE + 2500);
    }

    #[test]
    fn regional_fares_saturate() {
        let mut label = label_at(Time::new(0, 0), Time::new(0, 0));
        label.add_fare(ServiceClass::Regional, 4000);
        label.add_fare(ServiceClass::RegionalExpress, 4000);
        assert_eq!(label.prices[BUCKET_REGIONAL], MAX_REGIONAL_FARE);
    }

    #[test]
    fn dominance_respects_the_time_window() {
        let config = SearchConfig::default();
        // departs later, arrives earlier: dominates
        let better = label_at(Time::new(0, 620), Time::new(0, 700));
        let worse = label_at(Time::new(0, 600), Time::new(0, 710));
        assert!(better.dominates(&worse, false, &config, SearchDir::Forward));
        // the earlier departure never dominates the later one
        assert!(!worse.dominates(&better, false, &config, SearchDir::Forward));
    }

    #[test]
    fn equal_labels_dominate_each_other() {
        let config = SearchConfig::default();
        let a = label_at(Time::new(0, 600), Time::new(0, 700));
        let b = label_at(Time::new(0, 600), Time::new(0, 700));
        assert!(a.dominates(&b, false, &config, SearchDir::Forward));
        assert!(b.dominates(&a, false, &config, SearchDir::Forward));
    }

    #[test]
    fn backward_dominance_flips_the_window_guard() {
        let config = SearchConfig::default();
        // backward: start is the arrival, now the departure; arriving
        // earlier and leaving later is better
        let better = label_at(Time::new(0, 700), Time::new(0, 640));
        let worse = label_at(Time::new(0, 710), Time::new(0, 600));
        assert!(better.dominates(&worse, false, &config, SearchDir::Backward));
        assert!(!worse.dominates(&better, false, &config, SearchDir::Backward));
    }

    #[test]
    fn later_departure_wins_the_tie_break() {
        let config = SearchConfig::default();
        let early = label_at(Time::new(0, 600), Time::new(0, 700));
        let late = label_at(Time::new(0, 620), Time::new(0, 720));
        assert!(late.ordering_key(&config) < early.ordering_key(&config));
    }
}
