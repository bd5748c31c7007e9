// Room reservation core: inventory filtering, availability and conflict checks

pub mod availability;
pub mod fallback;
pub mod http_store;
pub mod inventory;
pub mod memory_store;
pub mod model;
pub mod service;
pub mod statistics;
pub mod store;

// Re-export key types for convenience
pub use availability::{AvailabilityChecker, ReservationError};
pub use fallback::{FallbackConfig, FallbackStatsReport, FallbackStore};
pub use http_store::HttpStore;
pub use inventory::InventoryFilter;
pub use memory_store::{InMemoryConfig, InMemoryStore, Inventory};
pub use model::{
    Block, NewReservation, Reservation, ReservationRequest, Resource, Room, RoomFilters,
    TimeWindow,
};
pub use service::{RoomReservationService, ServiceError};
pub use statistics::{BlockStatistic, RoomStatistic, TimeSlotStatistic, UsageStatistics};
pub use store::{ReservationStore, StoreConfig, StoreError};
