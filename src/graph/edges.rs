use crate::calendar::DaysPatterns;
use crate::graph::connection::{FullConnection, FullConnectionId, LightConnection};
use crate::graph::nodes::NodeId;
use crate::request::SearchDir;
use crate::time::{Duration, Time, MINUTES_PER_DAY};

/// How many days ahead (or back) a route edge lookup will scan for the
/// next operating connection before giving up.
const CONNECTION_LOOKAHEAD_DAYS: u16 = 7;

/// Fixed cost of a non-route edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedCost {
    pub time: u16,
    pub price: u16,
    pub transfer: bool,
    pub slot: u8,
}

/// A connection resolved to a concrete operating day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ride {
    pub d_time: Time,
    pub a_time: Time,
    pub full: FullConnectionId,
}

/// Cost of traversing one edge at a given time.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCost {
    pub time: Duration,
    pub price: u16,
    pub transfer: bool,
    pub slot: u8,
    pub ride: Option<Ride>,
}

impl EdgeCost {
    fn fixed(cost: &FixedCost) -> Self {
        Self {
            time: Duration::from(cost.time),
            price: cost.price,
            transfer: cost.transfer,
            slot: cost.slot,
            ride: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EdgeKind {
    /// Scheduled hop between two consecutive route nodes; the connection
    /// array is sorted by departure time.
    Route { connections: Vec<LightConnection> },
    Foot(FixedCost),
    /// Only traversable when the current label arrived by train.
    AfterTrainFoot(FixedCost),
    /// External-mode edge injected per query.
    Mumo(FixedCost),
    /// Mumo edge usable only inside a one-off validity interval.
    TimeDependentMumo {
        cost: FixedCost,
        interval_begin: Time,
        interval_end: Time,
    },
    /// Mumo edge with a daily validity period (minutes after midnight).
    PeriodicMumo {
        cost: FixedCost,
        period_begin: u16,
        period_end: u16,
    },
    /// Overnight stay: wait (at least `min_stay` minutes) until the next
    /// checkout time.
    Hotel {
        checkout_time: u16,
        min_stay: u16,
        price: u16,
        slot: u8,
    },
    Invalid,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn route(from: NodeId, to: NodeId, mut connections: Vec<LightConnection>) -> Self {
        connections.sort_by_key(|c| c.d_time);
        Self {
            from,
            to,
            kind: EdgeKind::Route { connections },
        }
    }

    pub fn foot(from: NodeId, to: NodeId, time: u16, transfer: bool) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::Foot(FixedCost {
                time,
                transfer,
                ..FixedCost::default()
            }),
        }
    }

    pub fn after_train_foot(from: NodeId, to: NodeId, time: u16, transfer: bool) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::AfterTrainFoot(FixedCost {
                time,
                transfer,
                ..FixedCost::default()
            }),
        }
    }

    pub fn mumo(from: NodeId, to: NodeId, time: u16, price: u16, slot: u8) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::Mumo(FixedCost {
                time,
                price,
                transfer: false,
                slot,
            }),
        }
    }

    pub fn time_dependent_mumo(
        from: NodeId,
        to: NodeId,
        time: u16,
        price: u16,
        slot: u8,
        interval_begin: Time,
        interval_end: Time,
    ) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::TimeDependentMumo {
                cost: FixedCost {
                    time,
                    price,
                    transfer: false,
                    slot,
                },
                interval_begin,
                interval_end,
            },
        }
    }

    pub fn periodic_mumo(
        from: NodeId,
        to: NodeId,
        time: u16,
        price: u16,
        slot: u8,
        period_begin: u16,
        period_end: u16,
    ) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::PeriodicMumo {
                cost: FixedCost {
                    time,
                    price,
                    transfer: false,
                    slot,
                },
                period_begin,
                period_end,
            },
        }
    }

    pub fn hotel(station_node: NodeId, checkout_time: u16, min_stay: u16, price: u16, slot: u8) -> Self {
        Self {
            from: station_node,
            to: station_node,
            kind: EdgeKind::Hotel {
                checkout_time,
                min_stay,
                price,
                slot,
            },
        }
    }

    pub fn is_route(&self) -> bool {
        matches!(self.kind, EdgeKind::Route { .. })
    }

    pub fn is_mumo(&self) -> bool {
        matches!(
            self.kind,
            EdgeKind::Mumo(_) | EdgeKind::TimeDependentMumo { .. } | EdgeKind::PeriodicMumo { .. }
        )
    }

    /// Node the edge is traversed from, given the search direction.
    pub fn source(&self, dir: SearchDir) -> NodeId {
        match dir {
            SearchDir::Forward => self.from,
            SearchDir::Backward => self.to,
        }
    }

    /// Node the edge is traversed to, given the search direction.
    pub fn dest(&self, dir: SearchDir) -> NodeId {
        match dir {
            SearchDir::Forward => self.to,
            SearchDir::Backward => self.from,
        }
    }

    /// Cost of traversing this edge when standing at its `dir`-source at
    /// time `t`. `None` when the edge offers no usable cost at `t`.
    pub fn cost_at(
        &self,
        t: Time,
        last_ride: Option<&Ride>,
        dir: SearchDir,
        patterns: &DaysPatterns,
    ) -> Option<EdgeCost> {
        match &self.kind {
            EdgeKind::Route { connections } => match dir {
                SearchDir::Forward => next_connection(connections, t, patterns),
                SearchDir::Backward => previous_connection(connections, t, patterns),
            },
            EdgeKind::Foot(cost) | EdgeKind::Mumo(cost) => Some(EdgeCost::fixed(cost)),
            EdgeKind::AfterTrainFoot(cost) => {
                last_ride?;
                Some(EdgeCost::fixed(cost))
            }
            EdgeKind::TimeDependentMumo {
                cost,
                interval_begin,
                interval_end,
            } => {
                if dir == SearchDir::Backward {
                    return None;
                }
                if t > *interval_end {
                    return None;
                }
                let wait = interval_begin.ts().saturating_sub(t.ts());
                let mut ec = EdgeCost::fixed(cost);
                ec.time += wait;
                Some(ec)
            }
            EdgeKind::PeriodicMumo {
                cost,
                period_begin,
                period_end,
            } => {
                if dir == SearchDir::Backward {
                    return None;
                }
                let wait = periodic_time_off(*period_begin, *period_end, t.mam());
                let mut ec = EdgeCost::fixed(cost);
                ec.time += wait;
                Some(ec)
            }
            EdgeKind::Hotel {
                checkout_time,
                min_stay,
                price,
                slot,
            } => {
                if dir == SearchDir::Backward {
                    return None;
                }
                let mam = t.mam();
                let offset = if mam < u32::from(*checkout_time) {
                    0
                } else {
                    MINUTES_PER_DAY
                };
                let stay = (u32::from(*checkout_time) + offset - mam).max(u32::from(*min_stay));
                Some(EdgeCost {
                    time: stay,
                    price: *price,
                    transfer: false,
                    slot: *slot,
                    ride: None,
                })
            }
            EdgeKind::Invalid => None,
        }
    }

    /// Minimum possible cost over all traversal times, used to build the
    /// lower-bound graph. `None` for invalid or empty edges.
    pub fn minimum_cost(&self, full_connections: &[FullConnection]) -> Option<EdgeCost> {
        match &self.kind {
            EdgeKind::Route { connections } => {
                let fastest = connections.iter().min_by_key(|c| c.travel_time())?;
                Some(EdgeCost {
                    time: fastest.travel_time(),
                    price: full_connections[fastest.full.index()].price,
                    transfer: false,
                    slot: 0,
                    ride: None,
                })
            }
            EdgeKind::Foot(cost) | EdgeKind::AfterTrainFoot(cost) => Some(EdgeCost {
                time: 0,
                price: 0,
                transfer: cost.transfer,
                slot: 0,
                ride: None,
            }),
            EdgeKind::Mumo(cost)
            | EdgeKind::TimeDependentMumo { cost, .. }
            | EdgeKind::PeriodicMumo { cost, .. } => Some(EdgeCost {
                time: 0,
                price: cost.price,
                transfer: false,
                slot: 0,
                ride: None,
            }),
            EdgeKind::Hotel { price, .. } => Some(EdgeCost {
                time: 0,
                price: *price,
                transfer: false,
                slot: 0,
                ride: None,
            }),
            EdgeKind::Invalid => None,
        }
    }
}

/// Earliest connection departing at or after `t`.
///
/// Scheduled times beyond 1440 belong to overnight trips, so the previous
/// operating day can still hold the earliest usable departure and is
/// scanned as well.
fn next_connection(
    connections: &[LightConnection],
    t: Time,
    patterns: &DaysPatterns,
) -> Option<EdgeCost> {
    if connections.is_empty() {
        return None;
    }
    let mut best: Option<Ride> = None;
    let first_day = t.day().saturating_sub(1);
    for day in first_day..=t.day() + CONNECTION_LOOKAHEAD_DAYS {
        let day_start = u32::from(day) * MINUTES_PER_DAY;
        if let Some(b) = &best {
            // departures on `day` cannot beat the best one anymore
            if day_start >= b.d_time.ts() {
                break;
            }
        }
        let min_d_time = t.ts().saturating_sub(day_start);
        let start = connections.partition_point(|c| u32::from(c.d_time) < min_d_time);
        let candidate = connections[start..]
            .iter()
            .find(|c| patterns.is_allowed(c.days, day));
        if let Some(c) = candidate {
            let dep = Time::new(day, u32::from(c.d_time));
            if best.as_ref().map_or(true, |b| dep < b.d_time) {
                best = Some(Ride {
                    d_time: dep,
                    a_time: Time::new(day, u32::from(c.a_time)),
                    full: c.full,
                });
            }
        }
    }
    best.map(|ride| EdgeCost {
        time: ride.a_time.ts() - t.ts(),
        price: 0,
        transfer: false,
        slot: 0,
        ride: Some(ride),
    })
}

/// Latest connection arriving at or before `t`.
fn previous_connection(
    connections: &[LightConnection],
    t: Time,
    patterns: &DaysPatterns,
) -> Option<EdgeCost> {
    if connections.is_empty() {
        return None;
    }
    let mut best: Option<Ride> = None;
    let last_day = t.day().saturating_sub(CONNECTION_LOOKAHEAD_DAYS);
    for day in (last_day..=t.day()).rev() {
        // connections are sorted by departure and do not overtake, so the
        // last usable one of a day has the latest arrival
        let candidate = connections.iter().rev().find(|c| {
            Time::new(day, u32::from(c.a_time)) <= t && patterns.is_allowed(c.days, day)
        });
        if let Some(c) = candidate {
            let arr = Time::new(day, u32::from(c.a_time));
            if best.as_ref().map_or(true, |b| arr > b.a_time) {
                best = Some(Ride {
                    d_time: Time::new(day, u32::from(c.d_time)),
                    a_time: arr,
                    full: c.full,
                });
            }
        }
        if let Some(b) = &best {
            // an earlier operating day would need an arrival more than two
            // days after its midnight to win; scheduled times end before
            // that
            if u32::from(day) * MINUTES_PER_DAY <= b.a_time.ts().saturating_sub(MINUTES_PER_DAY) {
                break;
            }
        }
    }
    best.map(|ride| EdgeCost {
        time: t.ts() - ride.d_time.ts(),
        price: 0,
        transfer: false,
        slot: 0,
        ride: Some(ride),
    })
}

/// Minutes to wait until a daily validity period `[begin, end]` (minutes
/// after midnight, possibly spanning midnight) next contains `mam`.
fn periodic_time_off(period_begin: u16, period_end: u16, mam: u32) -> u32 {
    let begin = u32::from(period_begin);
    let end = u32::from(period_end);
    if begin <= end {
        if mam < begin {
            return begin - mam;
        }
        if mam > end {
            return (MINUTES_PER_DAY - mam) + begin;
        }
    } else if mam > end && mam < begin {
        return begin - mam;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayBits;
    use crate::graph::connection::ServiceClass;

    fn patterns_with(days: &[u16]) -> (DaysPatterns, crate::calendar::DaysPattern) {
        let mut patterns = DaysPatterns::new();
        let pattern = patterns.get_or_insert(DayBits::from_days(days.iter().copied()));
        (patterns, pattern)
    }

    fn full_connections() -> Vec<FullConnection> {
        vec![FullConnection {
            class: ServiceClass::Regional,
            price: 300,
            d_platform: 1,
            a_platform: 2,
            train_nr: 4711,
            line: "R1".to_string(),
            attributes: Vec::new(),
        }]
    }

    fn route_edge(pattern: crate::calendar::DaysPattern) -> Edge {
        Edge::route(
            NodeId(0),
            NodeId(1),
            vec![
                LightConnection {
                    d_time: 600,
                    a_time: 650,
                    days: pattern,
                    full: FullConnectionId(0),
                },
                LightConnection {
                    d_time: 700,
                    a_time: 760,
                    days: pattern,
                    full: FullConnectionId(0),
                },
            ],
        )
    }

    #[test]
    fn forward_lookup_finds_next_departure() {
        let (patterns, pattern) = patterns_with(&[0]);
        let edge = route_edge(pattern);

        let ec = edge
            .cost_at(Time::new(0, 590), None, SearchDir::Forward, &patterns)
            .unwrap();
        assert_eq!(ec.time, 60);
        let ride = ec.ride.unwrap();
        assert_eq!(ride.d_time, Time::new(0, 600));
        assert_eq!(ride.a_time, Time::new(0, 650));

        let ec = edge
            .cost_at(Time::new(0, 601), None, SearchDir::Forward, &patterns)
            .unwrap();
        assert_eq!(ec.ride.unwrap().d_time, Time::new(0, 700));
    }

    #[test]
    fn forward_lookup_honors_the_day_bitmask() {
        let (patterns, pattern) = patterns_with(&[2]);
        let edge = route_edge(pattern);

        // day 0 has no service, the lookup rolls over to day 2
        let ec = edge
            .cost_at(Time::new(0, 590), None, SearchDir::Forward, &patterns)
            .unwrap();
        assert_eq!(ec.ride.unwrap().d_time, Time::new(2, 600));
    }

    #[test]
    fn backward_lookup_finds_previous_arrival() {
        let (patterns, pattern) = patterns_with(&[0, 1]);
        let edge = route_edge(pattern);

        let ec = edge
            .cost_at(Time::new(1, 655), None, SearchDir::Backward, &patterns)
            .unwrap();
        let ride = ec.ride.unwrap();
        assert_eq!(ride.a_time, Time::new(1, 650));
        assert_eq!(ec.time, Time::new(1, 655).ts() - Time::new(1, 600).ts());
    }

    #[test]
    fn after_train_edge_requires_an_inbound_connection() {
        let (patterns, _) = patterns_with(&[0]);
        let edge = Edge::after_train_foot(NodeId(0), NodeId(1), 5, true);
        assert!(edge
            .cost_at(Time::new(0, 0), None, SearchDir::Forward, &patterns)
            .is_none());
        let ride = Ride {
            d_time: Time::new(0, 0),
            a_time: Time::new(0, 10),
            full: FullConnectionId(0),
        };
        assert!(edge
            .cost_at(Time::new(0, 10), Some(&ride), SearchDir::Forward, &patterns)
            .is_some());
    }

    #[test]
    fn hotel_edge_waits_until_checkout() {
        let (patterns, _) = patterns_with(&[0]);
        let edge = Edge::hotel(NodeId(0), 480, 360, 5000, 1);

        // 23:00, checkout 08:00 next day: 540 minutes
        let ec = edge
            .cost_at(Time::new(0, 1380), None, SearchDir::Forward, &patterns)
            .unwrap();
        assert_eq!(ec.time, 540);
        assert_eq!(ec.price, 5000);

        // 07:00 same day, but minimum stay dominates
        let ec = edge
            .cost_at(Time::new(0, 420), None, SearchDir::Forward, &patterns)
            .unwrap();
        assert_eq!(ec.time, 360);
    }

    #[test]
    fn periodic_mumo_waits_for_its_period() {
        assert_eq!(periodic_time_off(600, 700, 550), 50);
        assert_eq!(periodic_time_off(600, 700, 650), 0);
        assert_eq!(periodic_time_off(600, 700, 800), 1240);
        // period over midnight
        assert_eq!(periodic_time_off(1380, 60, 30), 0);
        assert_eq!(periodic_time_off(1380, 60, 700), 680);
    }

    #[test]
    fn minimum_cost_takes_the_fastest_connection() {
        let (_, pattern) = patterns_with(&[0]);
        let edge = route_edge(pattern);
        let fulls = full_connections();
        let min = edge.minimum_cost(&fulls).unwrap();
        assert_eq!(min.time, 50);
        assert_eq!(min.price, 300);
    }
}
