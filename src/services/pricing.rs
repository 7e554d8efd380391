//! Tiered price preview.
//!
//! Seat prices depend on the cumulative booking position across the whole
//! event, not on the seat itself: positions 1-50 cost 50, 51-80 cost 75 and
//! everything above 80 costs 100. The preview walks the selection in the
//! order the user clicked, because a selection that straddles a tier
//! boundary prices each seat at its own crossing point.

pub const TIER_ONE_LIMIT: u32 = 50;
pub const TIER_TWO_LIMIT: u32 = 80;

pub const TIER_ONE_PRICE: u32 = 50;
pub const TIER_TWO_PRICE: u32 = 75;
pub const TIER_THREE_PRICE: u32 = 100;

/// Price of the seat occupying the given 1-based global booking position.
pub fn tier_price(position: u32) -> u32 {
    if position <= TIER_ONE_LIMIT {
        TIER_ONE_PRICE
    } else if position <= TIER_TWO_LIMIT {
        TIER_TWO_PRICE
    } else {
        TIER_THREE_PRICE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    pub seat_id: i64,
    /// 1-based position within the full booking sequence for the event.
    pub booking_order: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceQuote {
    pub lines: Vec<PriceLine>,
    pub total: u64,
}

/// Prices an ordered selection given the server-confirmed booked count.
/// Recomputed from scratch on every call; there is no incremental state to
/// drift.
pub fn quote(booked_count: u32, selection: &[i64]) -> PriceQuote {
    let mut lines = Vec::with_capacity(selection.len());
    let mut total = 0u64;
    let mut position = booked_count;

    for &seat_id in selection {
        position += 1;
        let price = tier_price(position);
        total += u64::from(price);
        lines.push(PriceLine {
            seat_id,
            booking_order: position,
            price,
        });
    }

    PriceQuote { lines, total }
}
