// Query interface used by the booking UI: composes a store with the pure core
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

use crate::availability::{AvailabilityChecker, ReservationError};
use crate::inventory::InventoryFilter;
use crate::model::{Block, Reservation, ReservationRequest, Resource, Room, RoomFilters, TimeWindow};
use crate::statistics::{group_by_date, UsageStatistics};
use crate::store::{ReservationStore, StoreError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ReservationError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { reservation_id } => {
                ServiceError::Validation(ReservationError::Conflict { reservation_id })
            }
            StoreError::Rejected(reason) => ServiceError::Validation(reason),
            other => ServiceError::Store(other),
        }
    }
}

pub struct RoomReservationService<S> {
    store: S,
    checker: AvailabilityChecker,
    filter: InventoryFilter,
}

impl<S: ReservationStore> RoomReservationService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            checker: AvailabilityChecker::new(),
            filter: InventoryFilter::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn blocks(&self) -> Result<Vec<Block>, ServiceError> {
        Ok(self.store.list_blocks().await?)
    }

    pub async fn resources(&self) -> Result<Vec<Resource>, ServiceError> {
        Ok(self.store.list_resources().await?)
    }

    /// Rooms matching `filters`, with `available` computed for `as_of`.
    pub async fn search_rooms(
        &self,
        filters: &RoomFilters,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Room>, ServiceError> {
        let (rooms, reservations) = futures::try_join!(
            self.store.list_rooms(filters),
            self.store.list_reservations(None)
        )?;

        let annotated = self.checker.annotate(&rooms, &reservations, as_of);
        let matching = self.filter.apply(&annotated, filters);
        debug!(
            fetched = rooms.len(),
            matching = matching.len(),
            "Searched rooms"
        );
        Ok(matching)
    }

    // Advisory pre-check; only the store's create decides
    pub async fn room_availability(
        &self,
        room_id: &str,
        window: &TimeWindow,
    ) -> Result<(), ServiceError> {
        let all_rooms = RoomFilters::default();
        let (rooms, reservations) = futures::try_join!(
            self.store.list_rooms(&all_rooms),
            self.store.list_reservations(Some(room_id))
        )?;

        let room = rooms
            .iter()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ReservationError::RoomNotFound(room_id.to_string()))?;
        Ok(self.checker.is_available(room, &reservations, window)?)
    }

    pub async fn reserve(
        &self,
        request: &ReservationRequest,
        created_by: &str,
        today: NaiveDate,
    ) -> Result<Reservation, ServiceError> {
        let room_id = request.room_id.trim();
        let all_rooms = RoomFilters::default();
        let (rooms, existing) = futures::try_join!(
            self.store.list_rooms(&all_rooms),
            self.store.list_reservations(Some(room_id))
        )?;

        let candidate = self.checker.validate_reservation_request(
            request,
            &rooms,
            &existing,
            created_by,
            today,
        )?;
        Ok(self.store.create_reservation(candidate).await?)
    }

    pub async fn cancel(&self, reservation_id: &str) -> Result<(), ServiceError> {
        Ok(self.store.delete_reservation(reservation_id).await?)
    }

    pub async fn reservations_by_date(
        &self,
        room_id: Option<&str>,
    ) -> Result<BTreeMap<NaiveDate, Vec<Reservation>>, ServiceError> {
        let reservations = self.store.list_reservations(room_id).await?;
        Ok(group_by_date(&reservations))
    }

    pub async fn statistics(&self) -> Result<UsageStatistics, ServiceError> {
        let reservations = self.store.list_reservations(None).await?;
        Ok(UsageStatistics::from_reservations(&reservations))
    }
}
