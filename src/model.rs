// Shared data structures for rooms, reservations and filter queries
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::availability::ReservationError;

// Wall-clock format used for reservation times on the wire ("08:00")
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Block {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub block: String,
    pub capacity: u32,
    pub resources: Vec<Resource>,
    // Derived per instant by AvailabilityChecker::annotate, never read from storage
    #[serde(default)]
    pub available: bool,
}

impl Room {
    pub fn has_resource(&self, resource_id: &str) -> bool {
        self.resources.iter().any(|r| r.id == resource_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub room_id: String,
    pub room_name: String,
    pub block_name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub purpose: String,
    pub created_by: String,
}

impl Reservation {
    // Stored times are not revalidated; an inverted record simply covers nothing
    pub(crate) fn window(&self) -> TimeWindow {
        TimeWindow {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_minutes() as f64 / 60.0
    }
}

/// A same-day booking interval, half-open: `[start_time, end_time)`.
///
/// Fields are private and deserialization goes through [`TimeWindow::new`],
/// so every value in circulation satisfies `start_time < end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimeWindow")]
pub struct TimeWindow {
    date: NaiveDate,
    #[serde(with = "hhmm")]
    start_time: NaiveTime,
    #[serde(with = "hhmm")]
    end_time: NaiveTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeWindow {
    date: NaiveDate,
    #[serde(with = "hhmm")]
    start_time: NaiveTime,
    #[serde(with = "hhmm")]
    end_time: NaiveTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = ReservationError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.date, raw.start_time, raw.end_time)
    }
}

impl TimeWindow {
    pub fn new(
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ReservationError> {
        if start_time >= end_time {
            return Err(ReservationError::InvalidInterval {
                start: start_time.format(TIME_FORMAT).to_string(),
                end: end_time.format(TIME_FORMAT).to_string(),
            });
        }

        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    pub fn contains(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.date == date && self.start_time <= time && time < self.end_time
    }
}

// Raw form data as submitted by the booking UI, validated into a NewReservation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReservationRequest {
    pub room_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub room_id: String,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub purpose: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoomFilters {
    pub block: Option<String>,
    pub capacity: Option<u32>,
    pub resources: Option<Vec<String>>,
    pub query: Option<String>,
    pub available: Option<bool>,
}

impl RoomFilters {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    // Query parameters for a server-side room search, one pair per set field
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(block) = &self.block {
            pairs.push(("block", block.clone()));
        }
        if let Some(capacity) = self.capacity {
            pairs.push(("capacity", capacity.to_string()));
        }
        for resource in self.resources.iter().flatten() {
            pairs.push(("resources", resource.clone()));
        }
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            pairs.push(("query", query.clone()));
        }
        if let Some(available) = self.available {
            pairs.push(("available", available.to_string()));
        }

        pairs
    }
}

pub(crate) mod hhmm {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(de::Error::custom)
    }
}
