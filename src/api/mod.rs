pub mod auth;
pub mod booking;
pub mod types;

pub use auth::{AuthClient, AuthError};
pub use booking::BookingClient;
