// Availability checks: candidate-interval conflicts, display availability and
// fail-fast validation of booking requests
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::model::{
    NewReservation, Reservation, ReservationRequest, Room, TimeWindow, DATE_FORMAT, TIME_FORMAT,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("Invalid interval: {start} - {end}")]
    InvalidInterval { start: String, end: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Conflicts with reservation {reservation_id}")]
    Conflict { reservation_id: String },
}

pub struct AvailabilityChecker {}

impl Default for AvailabilityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityChecker {
    pub fn new() -> Self {
        Self {}
    }

    // Build a candidate window from raw parts, rejecting start >= end
    pub fn check_window(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<TimeWindow, ReservationError> {
        TimeWindow::new(date, start_time, end_time)
    }

    // First reservation of `room` that shares any instant with `candidate`
    pub fn find_conflict<'a>(
        &self,
        room: &Room,
        existing: &'a [Reservation],
        candidate: &TimeWindow,
    ) -> Option<&'a Reservation> {
        existing
            .iter()
            .filter(|r| r.room_id == room.id && r.date == candidate.date())
            .find(|r| r.window().overlaps(candidate))
    }

    /// Advisory pre-check for booking `candidate` in `room`.
    ///
    /// Intervals are half-open, so a booking ending at 12:00 and another
    /// starting at 12:00 do not conflict. The authoritative decision belongs
    /// to the store that persists the reservation.
    pub fn is_available(
        &self,
        room: &Room,
        existing: &[Reservation],
        candidate: &TimeWindow,
    ) -> Result<(), ReservationError> {
        match self.find_conflict(room, existing, candidate) {
            Some(conflict) => Err(ReservationError::Conflict {
                reservation_id: conflict.id.clone(),
            }),
            None => Ok(()),
        }
    }

    // Whether no reservation of `room` covers the instant `as_of`
    pub fn compute_display_availability(
        &self,
        room: &Room,
        all: &[Reservation],
        as_of: NaiveDateTime,
    ) -> bool {
        let (date, time) = (as_of.date(), as_of.time());
        !all
            .iter()
            .any(|r| r.room_id == room.id && r.window().contains(date, time))
    }

    // Copies of `rooms` with the `available` flag recomputed for `as_of`
    pub fn annotate(&self, rooms: &[Room], all: &[Reservation], as_of: NaiveDateTime) -> Vec<Room> {
        rooms
            .iter()
            .map(|room| Room {
                available: self.compute_display_availability(room, all, as_of),
                ..room.clone()
            })
            .collect()
    }

    /// Validate a submitted booking form against the inventory and the
    /// room's existing reservations.
    ///
    /// Checks run in a fixed order and the first failure is returned: missing
    /// fields, date, time interval, room lookup, then conflicts.
    pub fn validate_reservation_request(
        &self,
        request: &ReservationRequest,
        rooms: &[Room],
        existing: &[Reservation],
        created_by: &str,
        today: NaiveDate,
    ) -> Result<NewReservation, ReservationError> {
        let room_id = required("roomId", &request.room_id)?;
        let raw_date = required("date", &request.date)?;
        let raw_start = required("startTime", &request.start_time)?;
        let raw_end = required("endTime", &request.end_time)?;
        let purpose = required("purpose", &request.purpose)?;

        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| ReservationError::InvalidDate(raw_date.to_string()))?;
        if date < today {
            return Err(ReservationError::InvalidDate(raw_date.to_string()));
        }

        let invalid_interval = || ReservationError::InvalidInterval {
            start: raw_start.to_string(),
            end: raw_end.to_string(),
        };
        let start_time =
            NaiveTime::parse_from_str(raw_start, TIME_FORMAT).map_err(|_| invalid_interval())?;
        let end_time =
            NaiveTime::parse_from_str(raw_end, TIME_FORMAT).map_err(|_| invalid_interval())?;
        let window = self.check_window(date, start_time, end_time)?;

        let room = rooms
            .iter()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ReservationError::RoomNotFound(room_id.to_string()))?;

        self.is_available(room, existing, &window)?;

        Ok(NewReservation {
            room_id: room.id.clone(),
            window,
            purpose: purpose.to_string(),
            created_by: created_by.to_string(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ReservationError> {
    match value.trim() {
        "" => Err(ReservationError::MissingField(field)),
        trimmed => Ok(trimmed),
    }
}
