//! HTTP client for the remote seat-booking API.
//!
//! The controller talks to the API through the `EventApi` trait so tests can
//! substitute an in-memory fake; `EventApiClient` is the reqwest-backed
//! implementation injected at wiring time.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::info;

use crate::config::ApiConfig;
use crate::models::{BookingRequest, BookingResponse, Seat};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {}", message.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

impl ApiError {
    /// Message fit for the notification sink: the server's own message when
    /// the payload carried one, otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Capability set of the remote booking service.
#[async_trait]
pub trait EventApi: Send + Sync {
    /// Destructive: clears all bookings and recreates the seats.
    async fn initialize(&self) -> Result<(), ApiError>;
    async fn get_all_seats(&self) -> Result<Vec<Seat>, ApiError>;
    async fn book_seats(&self, request: &BookingRequest) -> Result<BookingResponse, ApiError>;
}

/// Error payloads are JSON objects with an optional "message" field; the
/// rest (status, error, timestamp) is ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct EventApiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl EventApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Passes 2xx responses through; on anything else drains the body for a
    /// server-provided message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(ApiError::Status { status, message })
    }
}

#[async_trait]
impl EventApi for EventApiClient {
    async fn initialize(&self) -> Result<(), ApiError> {
        info!("Initializing event via {}/initialize", self.base_url);

        let response = self
            .http_client
            .post(format!("{}/initialize", self.base_url))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn get_all_seats(&self) -> Result<Vec<Seat>, ApiError> {
        let response = self
            .http_client
            .get(format!("{}/seats", self.base_url))
            .send()
            .await?;

        let seats = Self::check_status(response)
            .await?
            .json::<Vec<Seat>>()
            .await?;
        Ok(seats)
    }

    async fn book_seats(&self, request: &BookingRequest) -> Result<BookingResponse, ApiError> {
        info!(
            "Booking {} seats for user '{}'",
            request.seat_ids.len(),
            request.user_name
        );

        let response = self
            .http_client
            .post(format!("{}/book", self.base_url))
            .json(request)
            .send()
            .await?;

        let booking = Self::check_status(response)
            .await?
            .json::<BookingResponse>()
            .await?;
        Ok(booking)
    }
}
