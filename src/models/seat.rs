use serde::{Deserialize, Serialize};

/// Seat status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatStatus {
    Available,
    Booked,
    Reserved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    #[serde(rename = "seatNumber")]
    pub seat_number: i32,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }
}
