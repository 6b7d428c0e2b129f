use serde::{Deserialize, Serialize};

/// Credential payload for `POST /auth`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDates {
    pub checkin: String,
    pub checkout: String,
}

/// Booking record as the service accepts and returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: f64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default)]
    pub additionalneeds: String,
}

/// Response of `POST /booking`. The service answers with a flat `bookingid`,
/// but older deployments nest it under `booking`, so both are tolerated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingResponse {
    pub bookingid: Option<i64>,
    pub booking: Option<serde_json::Value>,
}

impl CreateBookingResponse {
    /// The assigned booking identifier, wherever the service put it.
    pub fn booking_id(&self) -> Option<i64> {
        self.bookingid.or_else(|| {
            self.booking
                .as_ref()
                .and_then(|b| b.get("bookingid"))
                .and_then(|v| v.as_i64())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_flat() {
        let res: CreateBookingResponse =
            serde_json::from_str(r#"{"bookingid": 42, "booking": {"firstname": "John"}}"#).unwrap();
        assert_eq!(res.booking_id(), Some(42));
    }

    #[test]
    fn test_booking_id_nested() {
        let res: CreateBookingResponse =
            serde_json::from_str(r#"{"booking": {"bookingid": 7}}"#).unwrap();
        assert_eq!(res.booking_id(), Some(7));
    }

    #[test]
    fn test_booking_id_absent() {
        let res: CreateBookingResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(res.booking_id(), None);
    }
}
