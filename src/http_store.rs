// Reservation store backed by the remote REST API
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::model::{Block, NewReservation, Reservation, Resource, Room, RoomFilters};
use crate::store::{ReservationStore, StoreConfig, StoreError};

pub struct HttpStore {
    config: StoreConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictBody {
    reservation_id: String,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn transport_error(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Timeout(self.config.timeout_ms)
        } else if error.is_decode() {
            StoreError::Decode(error.to_string())
        } else {
            StoreError::Network(error.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::CONFLICT => {
                let message = response.text().await.unwrap_or_default();
                // A conflict that does not name the clashing reservation stays a raw API error
                match serde_json::from_str::<ConflictBody>(&message) {
                    Ok(body) if !body.reservation_id.trim().is_empty() => Err(StoreError::Conflict {
                        reservation_id: body.reservation_id,
                    }),
                    _ => Err(StoreError::ApiResponseError {
                        status_code: status.as_u16(),
                        message,
                    }),
                }
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(response.url().path().to_string())),
            _ => Err(StoreError::ApiResponseError {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, StoreError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.send(self.client.get(&url).query(query)).await?;
        response.json().await.map_err(|e| self.transport_error(e))
    }
}

#[async_trait]
impl ReservationStore for HttpStore {
    async fn list_blocks(&self) -> Result<Vec<Block>, StoreError> {
        self.get_json("blocks", &[]).await
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        self.get_json("resources", &[]).await
    }

    async fn list_rooms(&self, filters: &RoomFilters) -> Result<Vec<Room>, StoreError> {
        // The server's availability flag is not trusted; callers recompute it
        let filters = RoomFilters {
            available: None,
            ..filters.clone()
        };
        self.get_json("rooms", &filters.query_pairs()).await
    }

    async fn list_reservations(
        &self,
        room_id: Option<&str>,
    ) -> Result<Vec<Reservation>, StoreError> {
        let query: Vec<(&'static str, String)> = room_id
            .map(|id| vec![("roomId", id.to_string())])
            .unwrap_or_default();
        self.get_json("reservations", &query).await
    }

    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let url = self.url("reservations");
        debug!(%url, room_id = %reservation.room_id, "POST");

        let response = self
            .send(self.client.post(&url).json(&reservation))
            .await?;
        let created: Reservation = response.json().await.map_err(|e| self.transport_error(e))?;

        info!(reservation_id = %created.id, room_id = %created.room_id, "Created reservation");
        Ok(created)
    }

    async fn delete_reservation(&self, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("reservations/{}", id));
        debug!(%url, "DELETE");

        match self.send(self.client.delete(&url)).await {
            Ok(_) => {
                info!(reservation_id = %id, "Deleted reservation");
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                debug!(reservation_id = %id, "Reservation already absent on server");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
