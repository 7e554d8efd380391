pub mod booking;
pub mod seat;

pub use booking::{BookedSeatDetail, BookingRequest, BookingResponse};
pub use seat::{Seat, SeatStatus};
