// Usage statistics derived from the reservation set
use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::{Reservation, TIME_FORMAT};

// Hourly slots offered by the booking form
pub const TIME_OPTIONS: [&str; 14] = [
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
    "18:00", "19:00", "20:00", "21:00",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatistic {
    pub room_id: String,
    pub room_name: String,
    pub usage_count: usize,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotStatistic {
    pub time_slot: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatistic {
    pub block_name: String,
    pub usage_count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistics {
    pub rooms: Vec<RoomStatistic>,
    pub time_slots: Vec<TimeSlotStatistic>,
    pub blocks: Vec<BlockStatistic>,
}

impl UsageStatistics {
    pub fn from_reservations(reservations: &[Reservation]) -> Self {
        Self {
            rooms: room_statistics(reservations),
            time_slots: time_slot_statistics(reservations),
            blocks: block_statistics(reservations),
        }
    }
}

// Most used rooms first, ties broken by name
pub fn room_statistics(reservations: &[Reservation]) -> Vec<RoomStatistic> {
    let mut by_room: HashMap<&str, RoomStatistic> = HashMap::new();

    for reservation in reservations {
        let entry = by_room
            .entry(reservation.room_id.as_str())
            .or_insert_with(|| RoomStatistic {
                room_id: reservation.room_id.clone(),
                room_name: reservation.room_name.clone(),
                usage_count: 0,
                total_hours: 0.0,
            });
        entry.usage_count += 1;
        entry.total_hours += reservation.duration_hours();
    }

    let mut stats: Vec<RoomStatistic> = by_room.into_values().collect();
    stats.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.room_name.cmp(&b.room_name))
            .then_with(|| a.room_id.cmp(&b.room_id))
    });
    stats
}

// One entry per distinct "HH:MM - HH:MM" slot, in chronological order
pub fn time_slot_statistics(reservations: &[Reservation]) -> Vec<TimeSlotStatistic> {
    let mut by_slot: BTreeMap<(NaiveTime, NaiveTime), usize> = BTreeMap::new();
    for reservation in reservations {
        *by_slot
            .entry((reservation.start_time, reservation.end_time))
            .or_insert(0) += 1;
    }

    by_slot
        .into_iter()
        .map(|((start, end), count)| TimeSlotStatistic {
            time_slot: format!("{} - {}", start.format(TIME_FORMAT), end.format(TIME_FORMAT)),
            count,
        })
        .collect()
}

pub fn block_statistics(reservations: &[Reservation]) -> Vec<BlockStatistic> {
    let total = reservations.len();
    let mut by_block: HashMap<&str, usize> = HashMap::new();
    for reservation in reservations {
        *by_block.entry(reservation.block_name.as_str()).or_insert(0) += 1;
    }

    let mut stats: Vec<BlockStatistic> = by_block
        .into_iter()
        .map(|(block_name, usage_count)| BlockStatistic {
            block_name: block_name.to_string(),
            usage_count,
            percentage: ((usage_count as f64 * 100.0) / total as f64).round() as u32,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.block_name.cmp(&b.block_name))
    });
    stats
}

pub fn group_by_date(reservations: &[Reservation]) -> BTreeMap<NaiveDate, Vec<Reservation>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Reservation>> = BTreeMap::new();
    for reservation in reservations {
        grouped
            .entry(reservation.date)
            .or_default()
            .push(reservation.clone());
    }
    for day in grouped.values_mut() {
        day.sort_by_key(|r| (r.start_time, r.end_time));
    }
    grouped
}

// End-time options strictly after `start`, mirroring half-open slot semantics
pub fn end_time_options(start: NaiveTime) -> Vec<NaiveTime> {
    TIME_OPTIONS
        .iter()
        .filter_map(|raw| NaiveTime::parse_from_str(raw, TIME_FORMAT).ok())
        .filter(|option| *option > start)
        .collect()
}
