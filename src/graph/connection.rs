use crate::calendar::DaysPattern;
use crate::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FullConnectionId(pub u32);

impl FullConnectionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId(pub u32);

impl AttributeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Service category of a trip, used to pick the fare bucket a leg's price
/// accumulates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceClass {
    Ice,
    Ic,
    NightTrain,
    RegionalExpress,
    Regional,
    SuburbanTrain,
    Subway,
    Tram,
    Bus,
    Other,
}

/// Trip data shared by all calendar-day instances of a scheduled
/// connection: fare class, price, platforms and the identity of the train.
#[derive(Debug, Clone)]
pub struct FullConnection {
    pub class: ServiceClass,
    pub price: u16,
    pub d_platform: u16,
    pub a_platform: u16,
    pub train_nr: u32,
    pub line: String,
    pub attributes: Vec<AttributeId>,
}

impl FullConnection {
    /// Whether two consecutive connections belong to the same logical trip
    /// and should be merged into a single transport leg.
    pub fn same_trip(&self, other: &FullConnection) -> bool {
        self.train_nr == other.train_nr && self.line == other.line && self.class == other.class
    }
}

/// One scheduled trip instance on a route edge.
///
/// Times are minutes after midnight of the operating day; `a_time` may
/// exceed 1440 for overnight hops. The connection exists on every day for
/// which its pattern bit is set.
#[derive(Debug, Clone, Copy)]
pub struct LightConnection {
    pub d_time: u16,
    pub a_time: u16,
    pub days: DaysPattern,
    pub full: FullConnectionId,
}

impl LightConnection {
    pub fn travel_time(&self) -> Duration {
        debug_assert!(self.a_time >= self.d_time);
        Duration::from(self.a_time - self.d_time)
    }
}
