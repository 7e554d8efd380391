//! Booking session controller.
//!
//! Holds the cached seat list, the ordered selection and the user-name
//! field, and orchestrates fetch/poll, price preview, submission and reset
//! against the remote API. The seat list is server-owned: every successful
//! fetch replaces it wholesale (never a field-by-field merge) and any
//! selected seat the fresh list no longer shows as available is dropped
//! before it can reach a booking request.

use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::api_client::{ApiError, EventApi};
use crate::models::{BookingRequest, Seat, SeatStatus};
use crate::services::pricing::{self, PriceQuote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Ready,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// Toast-style notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);
}

/// Confirmation primitive guarding destructive actions.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyStats {
    pub total: usize,
    pub booked: usize,
    pub available: usize,
    pub occupancy_pct: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Cached copy of the server's seat list, sorted by id for stable grid
    /// positions.
    pub seats: Vec<Seat>,
    /// Selected seat ids in click order. Order feeds the tiered price
    /// preview, so it is never re-sorted.
    pub selection: Vec<i64>,
    pub user_name: String,
}

impl SessionState {
    /// Wholesale seat-list replacement. Returns the selected ids that were
    /// dropped because the fresh list no longer shows them as available.
    pub fn apply_seats(&mut self, mut seats: Vec<Seat>) -> Vec<i64> {
        seats.sort_by_key(|s| s.id);
        self.seats = seats;
        if self.phase == Phase::Loading {
            self.phase = Phase::Ready;
        }

        let dropped: Vec<i64> = self
            .selection
            .iter()
            .copied()
            .filter(|id| !self.seat_is_available(*id))
            .collect();
        if !dropped.is_empty() {
            self.selection.retain(|id| !dropped.contains(id));
        }
        dropped
    }

    fn seat_is_available(&self, seat_id: i64) -> bool {
        self.seats
            .iter()
            .any(|s| s.id == seat_id && s.is_available())
    }

    /// Click handler semantics: available and unselected appends, selected
    /// removes, booked/reserved is a no-op.
    pub fn toggle_seat(&mut self, seat_id: i64) -> Toggle {
        if let Some(pos) = self.selection.iter().position(|&id| id == seat_id) {
            self.selection.remove(pos);
            return Toggle::Removed;
        }
        if self.seat_is_available(seat_id) {
            self.selection.push(seat_id);
            return Toggle::Added;
        }
        Toggle::Ignored
    }

    /// Server-confirmed booked count; reserved seats do not advance the
    /// booking order.
    pub fn booked_count(&self) -> u32 {
        self.seats
            .iter()
            .filter(|s| s.status == SeatStatus::Booked)
            .count() as u32
    }

    pub fn quote(&self) -> PriceQuote {
        pricing::quote(self.booked_count(), &self.selection)
    }

    pub fn stats(&self) -> OccupancyStats {
        let total = self.seats.len();
        let booked = self.booked_count() as usize;
        let available = total - booked;
        let occupancy_pct = if total > 0 {
            ((booked as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        OccupancyStats {
            total,
            booked,
            available,
            occupancy_pct,
        }
    }
}

/// Async controller over the session state. Cheap to clone; clones share
/// the same state, API handle and notifier.
pub struct Dashboard<S, N> {
    api: Arc<S>,
    notifier: Arc<N>,
    state: Arc<Mutex<SessionState>>,
}

impl<S, N> Clone for Dashboard<S, N> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            notifier: self.notifier.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: EventApi, N: Notifier> Dashboard<S, N> {
    pub fn new(api: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            api,
            notifier,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    pub fn set_user_name(&self, name: &str) {
        self.state.lock().unwrap().user_name = name.to_string();
    }

    pub fn toggle_seat(&self, seat_id: i64) -> Toggle {
        let outcome = self.state.lock().unwrap().toggle_seat(seat_id);
        if outcome == Toggle::Ignored {
            warn!("Seat {} is not available, ignoring click", seat_id);
        }
        outcome
    }

    /// Fetches the seat list and replaces the cache on success. Used by the
    /// poll tick, the manual refresh action and the post-booking refresh;
    /// whichever fetch completes last wins.
    pub async fn refresh(&self) {
        match self.api.get_all_seats().await {
            Ok(seats) => {
                let dropped = self.state.lock().unwrap().apply_seats(seats);
                if !dropped.is_empty() {
                    warn!("Selected seats no longer available, dropped: {:?}", dropped);
                    self.notifier
                        .notify(Level::Info, "Some selected seats are no longer available");
                }
            }
            Err(err) => {
                error!("Seat fetch failed: {}", err);
                self.notifier.notify(Level::Error, "Failed to fetch seats");
            }
        }
    }

    /// Submits the current selection. Validation failures surface a message
    /// without touching the network; while a submission is outstanding
    /// further book actions are ignored.
    pub async fn book(&self) {
        let request = {
            let mut state = self.state.lock().unwrap();
            if state.phase == Phase::Submitting {
                warn!("Booking already in flight, ignoring book action");
                return;
            }
            if state.user_name.trim().is_empty() {
                self.notifier.notify(Level::Error, "Please enter your name");
                return;
            }
            if state.selection.is_empty() {
                self.notifier
                    .notify(Level::Error, "Please select at least one seat");
                return;
            }
            state.phase = Phase::Submitting;
            BookingRequest {
                user_name: state.user_name.trim().to_string(),
                seat_ids: state.selection.clone(),
            }
        };

        match self.api.book_seats(&request).await {
            Ok(response) if response.success => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.phase = Phase::Ready;
                    state.selection.clear();
                    state.user_name.clear();
                }
                info!(
                    "Booking {} confirmed, total price {}",
                    response.booking_id, response.total_price
                );
                self.notifier.notify(
                    Level::Success,
                    &format!("Booking confirmed! Total: ${}", response.total_price),
                );
                // Reflect the new booked state right away instead of waiting
                // for the next poll tick.
                self.refresh().await;
            }
            Ok(response) => {
                self.state.lock().unwrap().phase = Phase::Ready;
                let message = if response.message.is_empty() {
                    "Booking failed".to_string()
                } else {
                    response.message
                };
                warn!("Booking rejected: {}", message);
                self.notifier.notify(Level::Error, &message);
            }
            Err(err) => {
                self.state.lock().unwrap().phase = Phase::Ready;
                error!("Booking request failed: {}", err);
                self.notifier
                    .notify(Level::Error, &err.user_message("Failed to book seats"));
            }
        }
    }

    /// Destructive remote reset. Dispatches only after the confirmation
    /// primitive answers yes, then refetches so the cleared map shows up
    /// immediately.
    pub async fn reset(&self, confirm: &dyn ConfirmPrompt) {
        let accepted = confirm.confirm(
            "Are you sure you want to initialize the event? All current bookings will be cleared.",
        );
        if !accepted {
            info!("Event reset cancelled");
            return;
        }

        match self.api.initialize().await {
            Ok(()) => {
                self.notifier.notify(Level::Success, "Event reset successfully");
                self.refresh().await;
            }
            Err(err) => {
                error!("Event reset failed: {}", err);
                self.notifier
                    .notify(Level::Error, &err.user_message("Failed to reset event"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingResponse;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seat(id: i64, status: SeatStatus) -> Seat {
        Seat {
            id,
            seat_number: id as i32,
            status,
        }
    }

    fn available_seats(n: i64) -> Vec<Seat> {
        (1..=n).map(|id| seat(id, SeatStatus::Available)).collect()
    }

    #[derive(Default)]
    struct FakeApi {
        seats: Mutex<Vec<Seat>>,
        book_response: Mutex<Option<Result<BookingResponse, ApiError>>>,
        seat_fetches: AtomicUsize,
        book_calls: AtomicUsize,
        init_calls: AtomicUsize,
    }

    impl FakeApi {
        fn with_seats(seats: Vec<Seat>) -> Self {
            Self {
                seats: Mutex::new(seats),
                ..Default::default()
            }
        }

        fn set_book_response(&self, response: Result<BookingResponse, ApiError>) {
            *self.book_response.lock().unwrap() = Some(response);
        }
    }

    #[async_trait]
    impl EventApi for FakeApi {
        async fn initialize(&self) -> Result<(), ApiError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get_all_seats(&self) -> Result<Vec<Seat>, ApiError> {
            self.seat_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.seats.lock().unwrap().clone())
        }

        async fn book_seats(&self, _req: &BookingRequest) -> Result<BookingResponse, ApiError> {
            self.book_calls.fetch_add(1, Ordering::SeqCst);
            self.book_response
                .lock()
                .unwrap()
                .take()
                .expect("book response not configured")
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Level, String)>>);

    impl Notifier for Recorder {
        fn notify(&self, level: Level, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<(Level, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Answer(bool);

    impl ConfirmPrompt for Answer {
        fn confirm(&self, _prompt: &str) -> bool {
            self.0
        }
    }

    fn booking_response(success: bool, message: &str, total: f64) -> BookingResponse {
        BookingResponse {
            success,
            message: message.to_string(),
            total_price: total,
            seats: vec![],
            booking_id: 1,
        }
    }

    fn dashboard(api: FakeApi) -> (Dashboard<FakeApi, Recorder>, Arc<FakeApi>, Arc<Recorder>) {
        let api = Arc::new(api);
        let recorder = Arc::new(Recorder::default());
        let dash = Dashboard::new(api.clone(), recorder.clone());
        (dash, api, recorder)
    }

    #[test]
    fn toggle_twice_restores_exact_order() {
        let mut state = SessionState::default();
        state.apply_seats(available_seats(5));

        state.toggle_seat(3);
        state.toggle_seat(1);
        state.toggle_seat(4);
        assert_eq!(state.selection, vec![3, 1, 4]);

        assert_eq!(state.toggle_seat(9), Toggle::Ignored);

        state.toggle_seat(1);
        assert_eq!(state.selection, vec![3, 4]);
        // Re-adding goes to the end, not back to its old slot.
        state.toggle_seat(1);
        assert_eq!(state.selection, vec![3, 4, 1]);
    }

    #[test]
    fn toggle_ignores_booked_and_reserved_seats() {
        let mut state = SessionState::default();
        state.apply_seats(vec![
            seat(1, SeatStatus::Available),
            seat(2, SeatStatus::Booked),
            seat(3, SeatStatus::Reserved),
        ]);

        assert_eq!(state.toggle_seat(2), Toggle::Ignored);
        assert_eq!(state.toggle_seat(3), Toggle::Ignored);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn apply_seats_sorts_by_id_and_reaches_ready() {
        let mut state = SessionState::default();
        assert_eq!(state.phase, Phase::Loading);

        state.apply_seats(vec![
            seat(3, SeatStatus::Available),
            seat(1, SeatStatus::Booked),
            seat(2, SeatStatus::Available),
        ]);
        assert_eq!(state.phase, Phase::Ready);
        let ids: Vec<i64> = state.seats.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn reconciliation_drops_seats_booked_elsewhere() {
        let mut state = SessionState::default();
        state.apply_seats(available_seats(4));
        state.toggle_seat(2);
        state.toggle_seat(4);
        let before = state.quote().total;
        assert_eq!(before, 100);

        // A fresher poll shows seat 2 taken by another session.
        let dropped = state.apply_seats(vec![
            seat(1, SeatStatus::Available),
            seat(2, SeatStatus::Booked),
            seat(3, SeatStatus::Available),
            seat(4, SeatStatus::Available),
        ]);
        assert_eq!(dropped, vec![2]);
        assert_eq!(state.selection, vec![4]);
        assert_eq!(state.quote().total, 50);
    }

    #[test]
    fn quote_counts_only_booked_seats() {
        let mut state = SessionState::default();
        let mut seats = available_seats(100);
        for s in seats.iter_mut().take(49) {
            s.status = SeatStatus::Booked;
        }
        seats[49].status = SeatStatus::Reserved;
        state.apply_seats(seats);

        state.toggle_seat(60);
        state.toggle_seat(61);
        state.toggle_seat(62);
        let prices: Vec<u32> = state.quote().lines.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![50, 75, 75]);
    }

    #[test]
    fn stats_mirror_seat_list() {
        let mut state = SessionState::default();
        let mut seats = available_seats(100);
        for s in seats.iter_mut().take(33) {
            s.status = SeatStatus::Booked;
        }
        state.apply_seats(seats);

        let stats = state.stats();
        assert_eq!(stats.total, 100);
        assert_eq!(stats.booked, 33);
        assert_eq!(stats.available, 67);
        assert_eq!(stats.occupancy_pct, 33);
    }

    #[tokio::test]
    async fn book_with_empty_name_sends_nothing() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        dash.refresh().await;
        dash.toggle_seat(1);
        dash.set_user_name("   ");

        dash.book().await;

        assert_eq!(api.book_calls.load(Ordering::SeqCst), 0);
        assert_eq!(dash.snapshot().selection, vec![1]);
        let messages = recorder.messages();
        assert_eq!(messages.last().unwrap().0, Level::Error);
        assert_eq!(messages.last().unwrap().1, "Please enter your name");
    }

    #[tokio::test]
    async fn book_with_empty_selection_sends_nothing() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        dash.refresh().await;
        dash.set_user_name("Alice");

        dash.book().await;

        assert_eq!(api.book_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            recorder.messages().last().unwrap().1,
            "Please select at least one seat"
        );
    }

    #[tokio::test]
    async fn successful_booking_clears_inputs_and_refetches() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        api.set_book_response(Ok(booking_response(true, "Booking confirmed for Alice", 150.0)));

        dash.refresh().await;
        let fetches_before = api.seat_fetches.load(Ordering::SeqCst);
        dash.toggle_seat(1);
        dash.toggle_seat(2);
        dash.set_user_name("Alice");

        dash.book().await;

        let state = dash.snapshot();
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.selection.is_empty());
        assert!(state.user_name.is_empty());

        let (level, message) = recorder.messages().last().unwrap().clone();
        assert_eq!(level, Level::Success);
        assert!(message.contains("150"), "message was: {}", message);

        // Out-of-band refresh, not the poll tick.
        assert_eq!(api.seat_fetches.load(Ordering::SeqCst), fetches_before + 1);
    }

    #[tokio::test]
    async fn rejected_booking_preserves_inputs() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        api.set_book_response(Ok(booking_response(false, "Seat already booked", 0.0)));

        dash.refresh().await;
        dash.toggle_seat(2);
        dash.set_user_name("Bob");

        dash.book().await;

        let state = dash.snapshot();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.selection, vec![2]);
        assert_eq!(state.user_name, "Bob");
        assert_eq!(
            recorder.messages().last().unwrap(),
            &(Level::Error, "Seat already booked".to_string())
        );
    }

    #[tokio::test]
    async fn transport_failure_surfaces_server_message_when_present() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        api.set_book_response(Err(ApiError::Status {
            status: StatusCode::CONFLICT,
            message: Some("Seats already booked: 2".to_string()),
        }));

        dash.refresh().await;
        dash.toggle_seat(2);
        dash.set_user_name("Bob");

        dash.book().await;

        let state = dash.snapshot();
        assert_eq!(state.selection, vec![2]);
        assert_eq!(state.user_name, "Bob");
        assert_eq!(
            recorder.messages().last().unwrap().1,
            "Seats already booked: 2"
        );
    }

    #[tokio::test]
    async fn transport_failure_without_payload_uses_fallback() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        api.set_book_response(Err(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        }));

        dash.refresh().await;
        dash.toggle_seat(1);
        dash.set_user_name("Bob");

        dash.book().await;

        assert_eq!(recorder.messages().last().unwrap().1, "Failed to book seats");
    }

    #[tokio::test]
    async fn book_is_single_flight() {
        let (dash, api, _recorder) = dashboard(FakeApi::with_seats(available_seats(3)));
        dash.refresh().await;
        dash.toggle_seat(1);
        dash.set_user_name("Alice");

        // Simulate an outstanding submission.
        dash.state.lock().unwrap().phase = Phase::Submitting;
        dash.book().await;

        assert_eq!(api.book_calls.load(Ordering::SeqCst), 0);
        assert_eq!(dash.snapshot().phase, Phase::Submitting);
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let (dash, api, recorder) = dashboard(FakeApi::with_seats(available_seats(3)));

        dash.reset(&Answer(false)).await;
        assert_eq!(api.init_calls.load(Ordering::SeqCst), 0);

        dash.reset(&Answer(true)).await;
        assert_eq!(api.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.messages().last().unwrap().0, Level::Success);
        // Reset triggers a refetch.
        assert!(api.seat_fetches.load(Ordering::SeqCst) >= 1);
    }
}
