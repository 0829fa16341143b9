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
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::time::MAX_DAYS;

const WORDS: usize = MAX_DAYS as usize / 64;

/// A fixed-width bit vector over the days of the schedule period.
///
/// Bit `d` is set when the owning connection operates on schedule day `d`.
/// The combination operators (and/or/shift/clear-low) are used while the
/// graph is built; at query time patterns are only ever read through
/// [`DaysPatterns::is_allowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DayBits {
    words: [u64; WORDS],
}

impl DayBits {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let mut bits = Self::empty();
        for day in days {
            bits.set(day);
        }
        bits
    }

    pub fn set(&mut self, day: u16) {
        debug_assert!(day < MAX_DAYS);
        self.words[day as usize / 64] |= 1u64 << (day % 64);
    }

    pub fn is_set(&self, day: u16) -> bool {
        if day >= MAX_DAYS {
            return false;
        }
        self.words[day as usize / 64] & (1u64 << (day % 64)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn and(&self, other: &DayBits) -> DayBits {
        let mut words = [0u64; WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = self.words[i] & other.words[i];
        }
        DayBits { words }
    }

    pub fn or(&self, other: &DayBits) -> DayBits {
        let mut words = [0u64; WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = self.words[i] | other.words[i];
        }
        DayBits { words }
    }

    /// Shifts every set day `amount` days towards the end of the period,
    /// dropping days shifted past it.
    pub fn shift(&self, amount: u16) -> DayBits {
        let mut shifted = DayBits::empty();
        for day in self.days() {
            let moved = day + amount;
            if moved < MAX_DAYS {
                shifted.set(moved);
            }
        }
        shifted
    }

    /// Clears the `n` lowest days (used to cut the head of the period off
    /// an operating pattern).
    pub fn clear_low(&self, n: u16) -> DayBits {
        let mut cleared = *self;
        for day in 0..n.min(MAX_DAYS) {
            cleared.words[day as usize / 64] &= !(1u64 << (day % 64));
        }
        cleared
    }

    /// The next set day at or after `day`, if any.
    pub fn next_set_day(&self, day: u16) -> Option<u16> {
        (day..MAX_DAYS).find(|d| self.is_set(*d))
    }

    pub fn days(&self) -> impl Iterator<Item = u16> + '_ {
        (0..MAX_DAYS).filter(move |d| self.is_set(*d))
    }
}

/// Handle to an interned [`DayBits`] inside a [`DaysPatterns`] store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaysPattern {
    idx: u32,
}

/// Interning store for day patterns.
///
/// Many connections share the same operating days, so connections carry a
/// small [`DaysPattern`] handle instead of the bits themselves.
#[derive(Debug, Default)]
pub struct DaysPatterns {
    patterns: Vec<DayBits>,
    indices: HashMap<DayBits, u32>,
}

impl DaysPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert(&mut self, bits: DayBits) -> DaysPattern {
        if let Some(idx) = self.indices.get(&bits) {
            return DaysPattern { idx: *idx };
        }
        let idx = self.patterns.len() as u32;
        self.patterns.push(bits);
        self.indices.insert(bits, idx);
        DaysPattern { idx }
    }

    pub fn bits(&self, pattern: DaysPattern) -> &DayBits {
        &self.patterns[pattern.idx as usize]
    }

    pub fn is_allowed(&self, pattern: DaysPattern, day: u16) -> bool {
        self.bits(pattern).is_set(day)
    }

    pub fn intersection(&mut self, a: DaysPattern, b: DaysPattern) -> DaysPattern {
        let bits = self.bits(a).and(self.bits(b));
        self.get_or_insert(bits)
    }

    pub fn union(&mut self, a: DaysPattern, b: DaysPattern) -> DaysPattern {
        let bits = self.bits(a).or(self.bits(b));
        self.get_or_insert(bits)
    }

    pub fn nb_of_patterns(&self) -> usize {
        self.patterns.len()
    }
}

/// Maps schedule day offsets to calendar dates and back.
#[derive(Debug, Clone)]
pub struct Calendar {
    first_date: NaiveDate,
    nb_of_days: u16,
}

impl Calendar {
    pub fn new(first_date: NaiveDate, nb_of_days: u16) -> Self {
        debug_assert!(nb_of_days <= MAX_DAYS);
        Self {
            first_date,
            nb_of_days,
        }
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    pub fn nb_of_days(&self) -> u16 {
        self.nb_of_days
    }

    pub fn date_to_offset(&self, date: NaiveDate) -> Option<u16> {
        let days = date.signed_duration_since(self.first_date).num_days();
        if days < 0 || days >= i64::from(self.nb_of_days) {
            None
        } else {
            Some(days as u16)
        }
    }

    pub fn offset_to_date(&self, offset: u16) -> Option<NaiveDate> {
        if offset >= self.nb_of_days {
            return None;
        }
        self.first_date
            .checked_add_days(chrono::Days::new(u64::from(offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query_days() {
        let bits = DayBits::from_days([0, 3, 511]);
        assert!(bits.is_set(0));
        assert!(!bits.is_set(1));
        assert!(bits.is_set(3));
        assert!(bits.is_set(511));
        assert!(!bits.is_set(512));
    }

    #[test]
    fn combination_operators() {
        let a = DayBits::from_days([1, 2, 3]);
        let b = DayBits::from_days([2, 3, 4]);
        assert_eq!(a.and(&b), DayBits::from_days([2, 3]));
        assert_eq!(a.or(&b), DayBits::from_days([1, 2, 3, 4]));
        assert_eq!(a.shift(2), DayBits::from_days([3, 4, 5]));
        assert_eq!(a.clear_low(3), DayBits::from_days([3]));
    }

    #[test]
    fn shift_drops_days_past_the_period() {
        let bits = DayBits::from_days([510, 511]);
        assert_eq!(bits.shift(1), DayBits::from_days([511]));
    }

    #[test]
    fn patterns_are_interned() {
        let mut patterns = DaysPatterns::new();
        let a = patterns.get_or_insert(DayBits::from_days([0, 1]));
        let b = patterns.get_or_insert(DayBits::from_days([0, 1]));
        let c = patterns.get_or_insert(DayBits::from_days([2]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(patterns.nb_of_patterns(), 2);
        assert!(patterns.is_allowed(a, 1));
        assert!(!patterns.is_allowed(c, 1));
    }

    #[test]
    fn calendar_date_conversions() {
        let first = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let calendar = Calendar::new(first, 30);
        assert_eq!(calendar.date_to_offset(first), Some(0));
        assert_eq!(
            calendar.date_to_offset(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()),
            Some(14)
        );
        assert_eq!(
            calendar.date_to_offset(NaiveDate::from_ymd_opt(2021, 2, 28).unwrap()),
            None
        );
        assert_eq!(
            calendar.offset_to_date(14),
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );
        assert_eq!(calendar.offset_to_date(30), None);
    }
}
