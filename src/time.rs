use std::fmt::{Display, Formatter};

pub const MINUTES_PER_DAY: u32 = 1440;

/// Maximum number of days a schedule period may span.
pub const MAX_DAYS: u16 = 512;

/// Number of minutes, used for all edge costs and travel times.
pub type Duration = u32;

/// A point in time inside the schedule period, counted in minutes since
/// midnight of the first schedule day ("day 0").
///
/// All comparisons and arithmetic happen on the flattened
/// `day * 1440 + minute` integer, so crossing midnight simply adds whole
/// days. This is *not* a wall-clock type; converting to and from calendar
/// dates is the job of [`crate::calendar::Calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    minutes: u32,
}

/// Sentinel for "no valid time", greater than every valid `Time`.
pub const INVALID_TIME: Time = Time {
    minutes: MAX_DAYS as u32 * MINUTES_PER_DAY,
};

impl Time {
    pub fn new(day: u16, minute: u32) -> Self {
        Self {
            minutes: u32::from(day) * MINUTES_PER_DAY + minute,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    /// The flattened `day * 1440 + minute` value.
    pub fn ts(self) -> u32 {
        self.minutes
    }

    pub fn day(self) -> u16 {
        (self.minutes / MINUTES_PER_DAY) as u16
    }

    /// Minutes after midnight of `self.day()`.
    pub fn mam(self) -> u32 {
        self.minutes % MINUTES_PER_DAY
    }

    pub fn is_valid(self) -> bool {
        self.minutes < INVALID_TIME.minutes
    }

    pub fn checked_sub(self, minutes: Duration) -> Option<Time> {
        self.minutes.checked_sub(minutes).map(Time::from_minutes)
    }

    /// Minutes elapsed since `earlier`. `None` if `earlier` is later than
    /// `self`.
    pub fn duration_since(self, earlier: Time) -> Option<Duration> {
        self.minutes.checked_sub(earlier.minutes)
    }
}

impl std::ops::Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Time {
        Time {
            minutes: self.minutes + rhs,
        }
    }
}

impl std::ops::Sub<Duration> for Time {
    type Output = Time;

    fn sub(self, rhs: Duration) -> Time {
        Time {
            minutes: self.minutes - rhs,
        }
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.is_valid() {
            return write!(f, "INVALID");
        }
        write!(
            f,
            "{:03}.{:02}:{:02}",
            self.day(),
            self.mam() / 60,
            self.mam() % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_arithmetic_wraps_across_midnight() {
        let t = Time::new(0, 1430) + 20;
        assert_eq!(t.day(), 1);
        assert_eq!(t.mam(), 10);
        assert_eq!(t.ts(), 1450);
    }

    #[test]
    fn ordering_is_over_the_flattened_value() {
        assert!(Time::new(0, 1439) < Time::new(1, 0));
        assert!(Time::new(2, 0) > Time::new(1, 1439));
        assert!(Time::new(1, 600) < INVALID_TIME);
    }

    #[test]
    fn invalid_time_is_not_valid() {
        assert!(!INVALID_TIME.is_valid());
        assert!(Time::new(511, 1439).is_valid());
    }

    #[test]
    fn duration_since_is_checked() {
        let earlier = Time::new(0, 600);
        let later = Time::new(0, 650);
        assert_eq!(later.duration_since(earlier), Some(50));
        assert_eq!(earlier.duration_since(later), None);
    }
}
