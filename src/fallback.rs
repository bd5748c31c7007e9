// Store decorator: serve from a fallback store when the primary is unreachable
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::model::{Block, NewReservation, Reservation, Resource, Room, RoomFilters};
use crate::store::{ReservationStore, StoreError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    // Also fall back on answers such as Conflict or NotFound, not only on transport failures
    pub fallback_on_domain_errors: bool,
}

#[derive(Debug, Default)]
pub struct FallbackStats {
    pub primary_calls: AtomicUsize,
    pub primary_failures: AtomicUsize,
    pub fallback_served: AtomicUsize,
    pub fallback_failures: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FallbackStatsReport {
    pub primary_calls: usize,
    pub primary_failures: usize,
    pub fallback_served: usize,
    pub fallback_failures: usize,
}

/// Serves each call from `primary`, retrying it on `fallback` when the primary
/// fails.
///
/// Routing is decided per call. A caller that combines several calls, such as
/// listing rooms and then reservations, may get one answer from each store
/// during a partial outage. Room ids are not namespaced across stores, so
/// availability computed from such a mix is only as good as the weaker source.
/// Compare [`FallbackStore::stats`] before and after a sequence to detect it.
pub struct FallbackStore<P, F> {
    primary: P,
    fallback: F,
    config: FallbackConfig,
    stats: FallbackStats,
}

impl<P, F> FallbackStore<P, F>
where
    P: ReservationStore,
    F: ReservationStore,
{
    pub fn new(primary: P, fallback: F, config: FallbackConfig) -> Self {
        Self {
            primary,
            fallback,
            config,
            stats: FallbackStats::default(),
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn stats(&self) -> FallbackStatsReport {
        FallbackStatsReport {
            primary_calls: self.stats.primary_calls.load(Ordering::SeqCst),
            primary_failures: self.stats.primary_failures.load(Ordering::SeqCst),
            fallback_served: self.stats.fallback_served.load(Ordering::SeqCst),
            fallback_failures: self.stats.fallback_failures.load(Ordering::SeqCst),
        }
    }

    fn should_fall_back(&self, error: &StoreError) -> bool {
        error.is_transport() || self.config.fallback_on_domain_errors
    }

    async fn with_fallback<'a, T, PF, FF>(
        &'a self,
        operation: &'static str,
        primary: PF,
        fallback: impl FnOnce(&'a F) -> FF,
    ) -> Result<T, StoreError>
    where
        PF: Future<Output = Result<T, StoreError>>,
        FF: Future<Output = Result<T, StoreError>>,
    {
        self.stats.primary_calls.fetch_add(1, Ordering::SeqCst);

        let error = match primary.await {
            Ok(value) => return Ok(value),
            Err(error) if self.should_fall_back(&error) => error,
            Err(error) => return Err(error),
        };

        self.stats.primary_failures.fetch_add(1, Ordering::SeqCst);
        warn!(operation, %error, "Primary store failed, serving from fallback");

        match fallback(&self.fallback).await {
            Ok(value) => {
                self.stats.fallback_served.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            Err(fallback_error) => {
                self.stats.fallback_failures.fetch_add(1, Ordering::SeqCst);
                Err(fallback_error)
            }
        }
    }
}

#[async_trait]
impl<P, F> ReservationStore for FallbackStore<P, F>
where
    P: ReservationStore,
    F: ReservationStore,
{
    async fn list_blocks(&self) -> Result<Vec<Block>, StoreError> {
        self.with_fallback("list_blocks", self.primary.list_blocks(), |f| {
            f.list_blocks()
        })
        .await
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        self.with_fallback("list_resources", self.primary.list_resources(), |f| {
            f.list_resources()
        })
        .await
    }

    async fn list_rooms(&self, filters: &RoomFilters) -> Result<Vec<Room>, StoreError> {
        self.with_fallback("list_rooms", self.primary.list_rooms(filters), |f| {
            f.list_rooms(filters)
        })
        .await
    }

    async fn list_reservations(
        &self,
        room_id: Option<&str>,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.with_fallback(
            "list_reservations",
            self.primary.list_reservations(room_id),
            |f| f.list_reservations(room_id),
        )
        .await
    }

    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let retry = reservation.clone();
        self.with_fallback(
            "create_reservation",
            self.primary.create_reservation(reservation),
            |f| f.create_reservation(retry),
        )
        .await
    }

    async fn delete_reservation(&self, id: &str) -> Result<(), StoreError> {
        self.with_fallback("delete_reservation", self.primary.delete_reservation(id), |f| {
            f.delete_reservation(id)
        })
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::mock_store::{FlakyStore, StoreMode};
    use super::*;
    use crate::availability::fixtures::window;
    use crate::memory_store::{InMemoryConfig, InMemoryStore};

    fn remote_blocks() -> Vec<Block> {
        vec![Block {
            id: "r1".to_string(),
            name: "Bloco Remoto".to_string(),
        }]
    }

    fn decorated(mode: StoreMode, config: FallbackConfig) -> FallbackStore<FlakyStore, InMemoryStore> {
        FallbackStore::new(
            FlakyStore::new(mode, remote_blocks()),
            InMemoryStore::new(InMemoryConfig::default()).unwrap(),
            config,
        )
    }

    #[tokio::test]
    async fn test_healthy_primary_is_used() {
        let store = decorated(StoreMode::Normal, FallbackConfig::default());

        let blocks = store.list_blocks().await.unwrap();
        assert_eq!(blocks, remote_blocks());
        assert_eq!(
            store.stats(),
            FallbackStatsReport {
                primary_calls: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_outage_falls_back_to_sample_data() {
        let store = decorated(StoreMode::CompleteOutage, FallbackConfig::default());

        let blocks = store.list_blocks().await.unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].name, "Bloco A");

        let rooms = store.list_rooms(&RoomFilters::default()).await.unwrap();
        assert_eq!(rooms.len(), 8);

        let stats = store.stats();
        assert_eq!(stats.primary_failures, 2);
        assert_eq!(stats.fallback_served, 2);
    }

    #[tokio::test]
    async fn test_recovery_after_outage() {
        let store = decorated(StoreMode::ServerError, FallbackConfig::default());
        assert_eq!(store.list_blocks().await.unwrap().len(), 4);

        store.primary().set_mode(StoreMode::Normal);
        assert_eq!(store.list_blocks().await.unwrap(), remote_blocks());
        assert_eq!(store.stats().fallback_served, 1);
    }

    #[tokio::test]
    async fn test_each_call_is_routed_independently() {
        let store = decorated(StoreMode::Normal, FallbackConfig::default());

        let rooms = store.list_rooms(&RoomFilters::default()).await.unwrap();
        assert!(rooms.is_empty());
        let before = store.stats();

        store.primary().set_mode(StoreMode::CompleteOutage);
        let reservations = store.list_reservations(Some("1")).await.unwrap();

        // Rooms came from the primary, reservations from the sample data
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].room_name, "Sala 101");
        let after = store.stats();
        assert_eq!(before.fallback_served, 0);
        assert_eq!(after.fallback_served, 1);
        assert_eq!(after.primary_calls, 2);
    }

    #[tokio::test]
    async fn test_domain_errors_are_not_masked() {
        let store = decorated(StoreMode::Conflicting, FallbackConfig::default());

        let result = store
            .create_reservation(NewReservation {
                room_id: "1".to_string(),
                window: window("2030-03-04", "10:00", "12:00"),
                purpose: "Aula".to_string(),
                created_by: "Prof. Silva".to_string(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        assert_eq!(store.fallback().reservation_count(), 3);
        assert_eq!(store.stats().fallback_served, 0);
    }

    #[tokio::test]
    async fn test_domain_errors_fall_back_when_configured() {
        let store = decorated(
            StoreMode::Conflicting,
            FallbackConfig {
                fallback_on_domain_errors: true,
            },
        );

        let created = store
            .create_reservation(NewReservation {
                room_id: "1".to_string(),
                window: window("2030-03-04", "10:00", "12:00"),
                purpose: "Aula".to_string(),
                created_by: "Prof. Silva".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.room_name, "Sala 101");
        assert_eq!(store.fallback().reservation_count(), 4);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_reported() {
        let store = FallbackStore::new(
            FlakyStore::new(StoreMode::CompleteOutage, vec![]),
            FlakyStore::new(StoreMode::ServerError, vec![]),
            FallbackConfig::default(),
        );

        let error = store.delete_reservation("1").await.unwrap_err();
        assert!(matches!(
            error,
            StoreError::ApiResponseError { status_code: 500, .. }
        ));
        assert_eq!(store.stats().fallback_failures, 1);
        assert_eq!(store.fallback().calls.load(Ordering::SeqCst), 1);
    }
}
