use crate::api::types::{Booking, CreateBookingResponse};
use crate::utils::config::ServiceConfig;
use anyhow::{Context, Result};
use reqwest::header::COOKIE;

/// Thin client for the `/booking` CRUD endpoints.
///
/// Only `create` decodes the body; the other calls hand the raw response back
/// so the scenario can assert on status codes itself.
pub struct BookingClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl BookingClient {
    pub fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    /// Create a booking. Fails only on transport or decode errors; HTTP-level
    /// failures surface as a response with no booking id.
    pub async fn create(&self, booking: &Booking) -> Result<CreateBookingResponse> {
        let res = self
            .http
            .post(self.config.url("/booking"))
            .json(booking)
            .send()
            .await
            .context("create booking request failed")?;
        res.json()
            .await
            .context("create booking response was not valid JSON")
    }

    pub async fn get(&self, booking_id: i64) -> Result<reqwest::Response> {
        let res = self
            .http
            .get(self.config.url(&format!("/booking/{}", booking_id)))
            .send()
            .await
            .context("get booking request failed")?;
        Ok(res)
    }

    pub async fn update(
        &self,
        booking_id: i64,
        booking: &Booking,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .http
            .put(self.config.url(&format!("/booking/{}", booking_id)))
            .json(booking);
        if let Some(token) = token {
            req = req.header(COOKIE, format!("token={}", token));
        }
        let res = req.send().await.context("update booking request failed")?;
        Ok(res)
    }

    pub async fn delete(&self, booking_id: i64, token: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self
            .http
            .delete(self.config.url(&format!("/booking/{}", booking_id)));
        if let Some(token) = token {
            req = req.header(COOKIE, format!("token={}", token));
        }
        let res = req.send().await.context("delete booking request failed")?;
        Ok(res)
    }
}
