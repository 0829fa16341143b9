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

use serde::Deserialize;

use crate::time::{Duration, MINUTES_PER_DAY};

/// Which of two otherwise-equal labels is preferred, applied as the last
/// component of the queue ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TieBreak {
    /// Prefer journeys leaving later (shorter overall trip for the same
    /// arrival).
    PreferLaterDeparture,
    PreferEarlierDeparture,
}

/// Search parameters. All durations are in minutes, prices in cents.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Labels whose travel-time lower bound exceeds this are cut.
    #[serde(default = "default_max_travel_time")]
    pub max_travel_time: Duration,

    /// Labels whose transfers lower bound exceeds this are cut.
    #[serde(default = "default_max_transfers")]
    pub max_transfers: u8,

    /// Longest acceptable wait before boarding a connection mid-journey.
    #[serde(default = "default_max_interchange_wait")]
    pub max_interchange_wait: Duration,

    /// Cents one minute of travel time is worth when comparing prices.
    #[serde(default = "default_minutely_wage")]
    pub minutely_wage: u32,

    /// Cents one interchange is worth when comparing prices.
    #[serde(default)]
    pub transfer_wage: u32,

    /// Hard cap on allocated labels; the search aborts with partial
    /// results when it is reached.
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,

    #[serde(default = "default_tie_break")]
    pub tie_break: TieBreak,
}

fn default_max_travel_time() -> Duration {
    MINUTES_PER_DAY
}

fn default_max_transfers() -> u8 {
    6
}

fn default_max_interchange_wait() -> Duration {
    200
}

fn default_minutely_wage() -> u32 {
    8
}

fn default_max_labels() -> usize {
    1_000_000
}

fn default_tie_break() -> TieBreak {
    TieBreak::PreferLaterDeparture
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_travel_time: default_max_travel_time(),
            max_transfers: default_max_transfers(),
            max_interchange_wait: default_max_interchange_wait(),
            minutely_wage: default_minutely_wage(),
            transfer_wage: 0,
            max_labels: default_max_labels(),
            tie_break: default_tie_break(),
        }
    }
}
