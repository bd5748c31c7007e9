// In-memory reservation store, seedable from the bundled sample inventory
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::availability::{AvailabilityChecker, ReservationError};
use crate::inventory::InventoryFilter;
use crate::model::{Block, NewReservation, Reservation, Resource, Room, RoomFilters};
use crate::store::{ReservationStore, StoreError};

pub const SAMPLE_INVENTORY_PATH: &str = "samples/inventory.json";
pub const SAMPLE_INVENTORY: &str = include_str!("../samples/inventory.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InMemoryConfig {
    // Artificial delay per operation, to mimic a remote store
    pub latency_ms: u64,
    pub seed_sample_data: bool,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            seed_sample_data: true,
        }
    }
}

// Serialized inventory: rooms reference resources by id
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Inventory {
    pub blocks: Vec<Block>,
    pub resources: Vec<Resource>,
    pub rooms: Vec<RoomRecord>,
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: String,
    pub name: String,
    pub block: String,
    pub capacity: u32,
    pub resource_ids: Vec<String>,
}

impl Inventory {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Decode(e.to_string()))
    }

    pub fn sample() -> Result<Self, StoreError> {
        Self::from_json(SAMPLE_INVENTORY)
    }

    // Resolve resource references, dropping duplicates and rejecting unknown ids
    fn resolve_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.rooms
            .iter()
            .map(|record| {
                let mut resources: Vec<Resource> = Vec::new();
                for id in &record.resource_ids {
                    if resources.iter().any(|r| &r.id == id) {
                        continue;
                    }
                    let resource = self
                        .resources
                        .iter()
                        .find(|r| &r.id == id)
                        .ok_or_else(|| {
                            StoreError::Decode(format!(
                                "room {} references unknown resource {}",
                                record.id, id
                            ))
                        })?;
                    resources.push(resource.clone());
                }

                Ok(Room {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    block: record.block.clone(),
                    capacity: record.capacity,
                    resources,
                    available: false,
                })
            })
            .collect()
    }
}

pub struct InMemoryStore {
    config: InMemoryConfig,
    blocks: Vec<Block>,
    resources: Vec<Resource>,
    rooms: Vec<Room>,
    reservations: RwLock<Vec<Reservation>>,
    next_id: AtomicU64,
    checker: AvailabilityChecker,
    filter: InventoryFilter,
}

impl InMemoryStore {
    pub fn new(config: InMemoryConfig) -> Result<Self, StoreError> {
        let inventory = if config.seed_sample_data {
            Inventory::sample()?
        } else {
            Inventory::default()
        };
        Self::with_inventory(config, inventory)
    }

    pub fn with_inventory(config: InMemoryConfig, inventory: Inventory) -> Result<Self, StoreError> {
        let rooms = inventory.resolve_rooms()?;

        // Ids are never reused, even after a delete
        let next_id = inventory
            .reservations
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        debug!(
            rooms = rooms.len(),
            reservations = inventory.reservations.len(),
            "Seeded in-memory store"
        );

        Ok(Self {
            config,
            blocks: inventory.blocks,
            resources: inventory.resources,
            rooms,
            reservations: RwLock::new(inventory.reservations),
            next_id: AtomicU64::new(next_id),
            checker: AvailabilityChecker::new(),
            filter: InventoryFilter::new(),
        })
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.read().len()
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn list_blocks(&self) -> Result<Vec<Block>, StoreError> {
        self.simulate_latency().await;
        Ok(self.blocks.clone())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        self.simulate_latency().await;
        Ok(self.resources.clone())
    }

    async fn list_rooms(&self, filters: &RoomFilters) -> Result<Vec<Room>, StoreError> {
        self.simulate_latency().await;

        // Availability is not stored here, so that axis is left to the caller
        let filters = RoomFilters {
            available: None,
            ..filters.clone()
        };
        Ok(self.filter.apply(&self.rooms, &filters))
    }

    async fn list_reservations(
        &self,
        room_id: Option<&str>,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.simulate_latency().await;

        let reservations = self.reservations.read();
        Ok(reservations
            .iter()
            .filter(|r| room_id.map_or(true, |id| r.room_id == id))
            .cloned()
            .collect())
    }

    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        self.simulate_latency().await;

        let window = reservation.window;
        if reservation.purpose.trim().is_empty() {
            return Err(ReservationError::MissingField("purpose").into());
        }

        let room = self
            .rooms
            .iter()
            .find(|r| r.id == reservation.room_id)
            .ok_or_else(|| StoreError::NotFound(format!("room {}", reservation.room_id)))?;

        // Check and insert under one write lock so racing bookings cannot both land
        let mut reservations = self.reservations.write();
        if let Some(conflict) = self.checker.find_conflict(room, &reservations, &window) {
            debug!(
                room_id = %room.id,
                conflicting = %conflict.id,
                "Rejected overlapping reservation"
            );
            return Err(StoreError::Conflict {
                reservation_id: conflict.id.clone(),
            });
        }

        let created = Reservation {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            room_id: room.id.clone(),
            room_name: room.name.clone(),
            block_name: room.block.clone(),
            date: window.date(),
            start_time: window.start_time(),
            end_time: window.end_time(),
            purpose: reservation.purpose,
            created_by: reservation.created_by,
        };
        reservations.push(created.clone());

        info!(
            reservation_id = %created.id,
            room_id = %created.room_id,
            date = %created.date,
            "Created reservation"
        );
        Ok(created)
    }

    async fn delete_reservation(&self, id: &str) -> Result<(), StoreError> {
        self.simulate_latency().await;

        let mut reservations = self.reservations.write();
        let before = reservations.len();
        reservations.retain(|r| r.id != id);

        if reservations.len() < before {
            info!(reservation_id = %id, "Deleted reservation");
        } else {
            debug!(reservation_id = %id, "Delete of unknown reservation ignored");
        }
        Ok(())
    }
}
