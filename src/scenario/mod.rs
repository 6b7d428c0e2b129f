//! Data-driven booking scenarios.
//!
//! Each fixture row drives one independent scenario: authenticate, create,
//! read-verify, update-verify, delete-verify. A step failure aborts the
//! remaining steps for that row only; other rows keep running. Token and
//! booking id are locals of one scenario run and never cross rows.

use crate::api::types::{AuthRequest, Booking, BookingDates};
use crate::api::{AuthClient, AuthError, BookingClient};
use crate::fixture::FixtureRow;
use crate::report::{RunObserver, TestOutcome};
use crate::utils::config::ServiceConfig;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// The constant the update step writes into `firstname`.
pub const UPDATED_FIRSTNAME: &str = "Updated";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("auth failed: {status} - {body}")]
    Auth { status: u16, body: String },

    #[error("create failed: {0}")]
    Create(String),

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<AuthError> for ScenarioError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected { status, body } => ScenarioError::Auth { status, body },
            AuthError::Transport(e) => ScenarioError::Transport(e.to_string()),
        }
    }
}

/// Build the booking payload from a fixture row, applying the coercion rules:
/// non-numeric `totalprice` becomes 0, `depositpaid` is true only for a
/// case-insensitive "true".
pub fn booking_from_row(row: &FixtureRow) -> Booking {
    Booking {
        firstname: row.get("firstname").to_string(),
        lastname: row.get("lastname").to_string(),
        totalprice: row.number("totalprice"),
        depositpaid: row.boolean("depositpaid"),
        bookingdates: BookingDates {
            checkin: row.get("checkin").to_string(),
            checkout: row.get("checkout").to_string(),
        },
        additionalneeds: row.get("additionalneeds").to_string(),
    }
}

/// One scenario instance bound to one fixture row.
pub struct BookingScenario {
    auth: AuthClient,
    booking: BookingClient,
    credentials: AuthRequest,
    row: FixtureRow,
}

impl BookingScenario {
    pub fn new(http: reqwest::Client, config: ServiceConfig, row: FixtureRow) -> Self {
        let credentials = AuthRequest {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        Self {
            auth: AuthClient::new(http.clone(), config.clone()),
            booking: BookingClient::new(http, config),
            credentials,
            row,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "booking flow for {} {}",
            self.row.get("firstname"),
            self.row.get("lastname")
        )
    }

    /// Run the full protocol and fold the result into a test outcome.
    pub async fn run(&self) -> TestOutcome {
        let title = self.title();
        let started = Instant::now();
        match self.execute().await {
            Ok(()) => TestOutcome::passed(&title, file!(), started.elapsed().as_millis() as u64),
            Err(e) => TestOutcome::failed(
                &title,
                file!(),
                e.to_string(),
                started.elapsed().as_millis() as u64,
            ),
        }
    }

    async fn execute(&self) -> Result<(), ScenarioError> {
        // Step 1: authenticate. The token lives only for this scenario.
        let token = self.auth.login(&self.credentials).await?;
        if token.is_empty() {
            return Err(ScenarioError::Auth {
                status: 200,
                body: "empty token".to_string(),
            });
        }

        // Step 2: create; the service must hand back an integer id.
        let payload = booking_from_row(&self.row);
        let created = self
            .booking
            .create(&payload)
            .await
            .map_err(|e| ScenarioError::Create(e.to_string()))?;
        let booking_id = created
            .booking_id()
            .ok_or_else(|| ScenarioError::Create("response lacks bookingid".to_string()))?;

        // Step 3: read back and verify names match the input row exactly.
        let fetched = self.read_booking(booking_id, 200).await?;
        self.expect_eq("firstname", &fetched.firstname, &payload.firstname)?;
        self.expect_eq("lastname", &fetched.lastname, &payload.lastname)?;

        // Step 4: update firstname only, then re-read and verify.
        let updated = Booking {
            firstname: UPDATED_FIRSTNAME.to_string(),
            ..payload.clone()
        };
        let res = self
            .booking
            .update(booking_id, &updated, Some(&token))
            .await
            .map_err(|e| ScenarioError::Transport(e.to_string()))?;
        self.expect_status("update", res.status().as_u16(), 200)?;
        let fetched = self.read_booking(booking_id, 200).await?;
        self.expect_eq("firstname", &fetched.firstname, UPDATED_FIRSTNAME)?;

        // Step 5: delete (service signals success with 201), then 404 on read.
        let res = self
            .booking
            .delete(booking_id, Some(&token))
            .await
            .map_err(|e| ScenarioError::Transport(e.to_string()))?;
        self.expect_status("delete", res.status().as_u16(), 201)?;
        let res = self
            .booking
            .get(booking_id)
            .await
            .map_err(|e| ScenarioError::Transport(e.to_string()))?;
        self.expect_status("get after delete", res.status().as_u16(), 404)?;

        Ok(())
    }

    async fn read_booking(&self, id: i64, want_status: u16) -> Result<Booking, ScenarioError> {
        let res = self
            .booking
            .get(id)
            .await
            .map_err(|e| ScenarioError::Transport(e.to_string()))?;
        self.expect_status("get", res.status().as_u16(), want_status)?;
        res.json()
            .await
            .map_err(|e| ScenarioError::Assertion(format!("booking body not decodable: {}", e)))
    }

    fn expect_status(&self, step: &str, got: u16, want: u16) -> Result<(), ScenarioError> {
        if got != want {
            return Err(ScenarioError::Assertion(format!(
                "{}: expected HTTP {}, got {}",
                step, want, got
            )));
        }
        Ok(())
    }

    fn expect_eq(&self, field: &str, got: &str, want: &str) -> Result<(), ScenarioError> {
        if got != want {
            return Err(ScenarioError::Assertion(format!(
                "{}: expected `{}`, got `{}`",
                field, want, got
            )));
        }
        Ok(())
    }
}

/// Run one scenario per fixture row with bounded concurrency, reporting each
/// terminal outcome to the observer as it lands.
pub async fn run_all(
    rows: Vec<FixtureRow>,
    config: ServiceConfig,
    concurrency: usize,
    observer: Arc<dyn RunObserver>,
) -> Vec<TestOutcome> {
    observer.begin();

    let http = reqwest::Client::new();
    let limiter = Arc::new(Semaphore::new(concurrency.max(1)));
    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:30}] {pos}/{len} scenarios")
            .unwrap(),
    );

    let mut tasks = JoinSet::new();
    for row in rows {
        let scenario = BookingScenario::new(http.clone(), config.clone(), row);
        let limiter = limiter.clone();
        tasks.spawn(async move {
            let _permit = limiter.acquire_owned().await.expect("semaphore closed");
            scenario.run().await
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(o) => o,
            Err(e) => {
                log::error!("scenario task panicked: {}", e);
                continue;
            }
        };
        match outcome.status {
            crate::report::TestStatus::Passed => progress.println(format!(
                "  {} {} ({}ms)",
                "✓".green(),
                outcome.title,
                outcome.duration_ms
            )),
            _ => progress.println(format!(
                "  {} {} — {}",
                "✗".red(),
                outcome.title,
                outcome.error_messages.first().map(String::as_str).unwrap_or("")
            )),
        }
        progress.inc(1);
        observer.on_outcome(&outcome);
        outcomes.push(outcome);
    }
    progress.finish_and_clear();
    outcomes
}
