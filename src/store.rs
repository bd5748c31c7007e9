// Reservation store abstraction
// The core never performs I/O itself; rooms and reservations come from a store
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::availability::ReservationError;
use crate::model::{Block, NewReservation, Reservation, Resource, Room, RoomFilters};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Conflicts with reservation {reservation_id}")]
    Conflict { reservation_id: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(#[from] ReservationError),
}

impl StoreError {
    // Failures of the transport rather than answers from the store
    pub fn is_transport(&self) -> bool {
        match self {
            StoreError::Network(_) | StoreError::Timeout(_) | StoreError::Decode(_) => true,
            StoreError::ApiResponseError { status_code, .. } => *status_code >= 500,
            StoreError::Conflict { .. } | StoreError::NotFound(_) | StoreError::Rejected(_) => {
                false
            }
        }
    }
}

// Remote store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unievangelica.edu/rooms".to_string(),
            timeout_ms: 5000,
            user_agent: concat!("room_reserve_control/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Source of reference data and owner of the reservation set.
///
/// `create_reservation` is the authoritative conflict check: a store must
/// reject a reservation overlapping an existing one for the same room and
/// date with [`StoreError::Conflict`], whatever the caller pre-checked.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    async fn list_blocks(&self) -> Result<Vec<Block>, StoreError>;

    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError>;

    // Stores may pre-filter; callers re-apply filters on the result
    async fn list_rooms(&self, filters: &RoomFilters) -> Result<Vec<Room>, StoreError>;

    // All reservations, or only those of one room
    async fn list_reservations(&self, room_id: Option<&str>)
        -> Result<Vec<Reservation>, StoreError>;

    async fn create_reservation(&self, reservation: NewReservation)
        -> Result<Reservation, StoreError>;

    // Deleting an unknown id is not an error
    async fn delete_reservation(&self, id: &str) -> Result<(), StoreError>;
}
