use serde::{Deserialize, Serialize};

/// Body for POST /book. Seat ids keep the user's selection order because
/// the server prices by cumulative booking position.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "seatIds")]
    pub seat_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookedSeatDetail {
    #[serde(rename = "seatId")]
    pub seat_id: i64,
    #[serde(rename = "seatNumber")]
    pub seat_number: i32,
    pub price: f64,
    #[serde(rename = "bookingOrder")]
    pub booking_order: i32,
}

/// Response from POST /book. `success: false` is an application-level
/// rejection, not a transport error.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "totalPrice", default)]
    pub total_price: f64,
    #[serde(default)]
    pub seats: Vec<BookedSeatDetail>,
    #[serde(rename = "bookingId", default)]
    pub booking_id: i64,
}
