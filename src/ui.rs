//! Terminal rendering of the dashboard: occupancy stats, the seat grid and
//! the price summary. Pure formatting over a state snapshot, no session
//! logic.

use std::fmt::Write;

use crate::models::SeatStatus;
use crate::services::pricing::{
    TIER_ONE_LIMIT, TIER_ONE_PRICE, TIER_THREE_PRICE, TIER_TWO_LIMIT, TIER_TWO_PRICE,
};
use crate::services::session::SessionState;

const SEATS_PER_ROW: usize = 10;

pub fn render(state: &SessionState) -> String {
    let mut out = String::new();

    let stats = state.stats();
    let _ = writeln!(
        out,
        "Seats: {} total, {} available, {} booked ({}% occupancy)",
        stats.total, stats.available, stats.booked, stats.occupancy_pct
    );
    let _ = writeln!(out);

    for (i, seat) in state.seats.iter().enumerate() {
        let cell = if state.selection.contains(&seat.id) {
            format!("[{:>3}]", seat.seat_number)
        } else {
            match seat.status {
                SeatStatus::Available => format!(" {:>3} ", seat.seat_number),
                SeatStatus::Booked => "  X  ".to_string(),
                SeatStatus::Reserved => "  R  ".to_string(),
            }
        };
        let _ = write!(out, "{}", cell);
        if (i + 1) % SEATS_PER_ROW == 0 {
            let _ = writeln!(out);
        }
    }
    if !state.seats.is_empty() && state.seats.len() % SEATS_PER_ROW != 0 {
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "[n] selected   n available   X booked   R reserved");
    let _ = writeln!(
        out,
        "Pricing: bookings 1-{} ${}, {}-{} ${}, {}+ ${}",
        TIER_ONE_LIMIT,
        TIER_ONE_PRICE,
        TIER_ONE_LIMIT + 1,
        TIER_TWO_LIMIT,
        TIER_TWO_PRICE,
        TIER_TWO_LIMIT + 1,
        TIER_THREE_PRICE
    );
    let _ = writeln!(out);

    if !state.user_name.trim().is_empty() {
        let _ = writeln!(out, "Name: {}", state.user_name.trim());
    }
    render_summary(&mut out, state);

    out
}

fn render_summary(out: &mut String, state: &SessionState) {
    if state.selection.is_empty() {
        let _ = writeln!(out, "Select seats to view details and price.");
        return;
    }

    let quote = state.quote();
    for line in &quote.lines {
        let number = state
            .seats
            .iter()
            .find(|s| s.id == line.seat_id)
            .map(|s| s.seat_number)
            .unwrap_or(line.seat_id as i32);
        let _ = writeln!(
            out,
            "  Seat {:>3}  (booking #{:>3})  ${}",
            number, line.booking_order, line.price
        );
    }
    let _ = writeln!(out, "  Total: ${}", quote.total);
}
