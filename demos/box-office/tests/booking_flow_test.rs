//! End-to-end booking flows through the store.
//!
//! Each test drives the app the way the terminal front end does: one action
//! at a time through `Store::send`, waiting on the effect handle before
//! reading state back.
//!
//! Run with: `cargo test --test booking_flow_test`

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use box_office::{
    AppAction, AppEnvironment, AppReducer, AppState, BookingAction, BookingState, Catalog,
    CheckoutAction, CheckoutEnvironment, CheckoutState, CheckoutStep, EventId, FixedSeed, FlowId, Money,
    Screen, SeatId, ShowTimeId, StepKind,
};
use box_office::checkout::FormField;
use marquee_core::environment::Clock;
use marquee_runtime::{Store, StoreError};
use marquee_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

fn create_store(seed: u64, payment_delay: Duration) -> AppStore {
    let env = AppEnvironment::new(
        Arc::new(FixedSeed(seed)),
        CheckoutEnvironment::new(Arc::new(test_clock()), payment_delay),
    );
    Store::new(AppState::new(Catalog::demo().unwrap()), AppReducer::new(), env)
}

async fn send(store: &AppStore, action: AppAction) {
    let mut handle = store.send(action).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
}

async fn booking_state(store: &AppStore) -> BookingState {
    store
        .state(|s| match &s.screen {
            Screen::Booking(booking) => booking.clone(),
            other => panic!("expected booking screen, got {}", other.name()),
        })
        .await
}

async fn checkout_state(store: &AppStore) -> CheckoutState {
    store
        .state(|s| match &s.screen {
            Screen::Checkout(checkout) => checkout.clone(),
            other => panic!("expected checkout screen, got {}", other.name()),
        })
        .await
}

/// Open event 1, pick the first showtime and `quantity` available seats
async fn select_seats(store: &AppStore, quantity: u8) -> Vec<SeatId> {
    send(store, AppAction::OpenEvent { event_id: EventId::new("1") }).await;
    for action in [
        BookingAction::SelectShowTime {
            showtime_id: ShowTimeId::new(0),
        },
        BookingAction::SetQuantity {
            quantity: u32::from(quantity),
        },
        BookingAction::ConfirmQuantity,
    ] {
        send(store, AppAction::Booking(action)).await;
    }

    let seats: Vec<SeatId> = booking_state(store)
        .await
        .seat_map
        .seats()
        .iter()
        .filter(|seat| seat.is_available())
        .take(usize::from(quantity))
        .map(|seat| seat.id)
        .collect();
    for seat_id in &seats {
        send(store, AppAction::Booking(BookingAction::ToggleSeat { seat_id: *seat_id })).await;
    }
    seats
}

async fn fill_form(store: &AppStore) {
    for (field, value) in [
        (FormField::FirstName, "Ada"),
        (FormField::LastName, "Lovelace"),
        (FormField::Email, "ada@example.com"),
        (FormField::Phone, "555-0100"),
        (FormField::CardNumber, "4242 4242 4242 4242"),
        (FormField::ExpiryDate, "1228"),
        (FormField::Cvv, "123"),
        (FormField::BillingZip, "10001"),
    ] {
        send(
            store,
            AppAction::Checkout(CheckoutAction::UpdateField {
                field,
                value: value.to_string(),
            }),
        )
        .await;
    }
}

#[tokio::test]
async fn test_full_booking_returns_to_browsing() {
    let store = create_store(7, Duration::from_millis(10));

    let seats = select_seats(&store, 2).await;
    assert_eq!(seats.len(), 2);

    let booking = booking_state(&store).await;
    assert!(booking.can_proceed());
    let subtotal = booking.total();

    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    let checkout = checkout_state(&store).await;
    assert_eq!(checkout.booking.seats.iter().map(|s| s.id).collect::<Vec<_>>(), seats);
    assert_eq!(checkout.summary.subtotal, subtotal);
    assert_eq!(checkout.summary.total, subtotal + subtotal.percent(10));

    fill_form(&store).await;
    assert!(checkout_state(&store).await.form.is_valid());

    // Handle covers the delayed settlement
    send(&store, AppAction::Checkout(CheckoutAction::Submit)).await;
    let checkout = checkout_state(&store).await;
    match &checkout.step {
        CheckoutStep::Confirmation {
            confirmed_at,
            sent_to,
        } => {
            assert_eq!(sent_to, "ada@example.com");
            assert_eq!(*confirmed_at, test_clock().now());
        },
        other => panic!("expected confirmation, got {other:?}"),
    }

    send(&store, AppAction::Checkout(CheckoutAction::Finish)).await;
    let (screen, last_error) = store.state(|s| (s.screen.clone(), s.last_error.clone())).await;
    assert_eq!(screen, Screen::Browsing);
    assert_eq!(last_error, None);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn test_front_row_orchestra_pair_costs_330_with_fees() {
    let store = create_store(7, Duration::from_millis(10));
    send(&store, AppAction::OpenEvent { event_id: EventId::new("1") }).await;

    let front_row: Vec<SeatId> = booking_state(&store)
        .await
        .seat_map
        .row(box_office::Section::Orchestra, box_office::Row::new(0).unwrap())
        .iter()
        .filter(|seat| seat.is_available())
        .take(2)
        .map(|seat| seat.id)
        .collect();
    assert_eq!(front_row.len(), 2);

    for action in [
        BookingAction::SelectShowTime {
            showtime_id: ShowTimeId::new(0),
        },
        BookingAction::SetQuantity { quantity: 2 },
        BookingAction::ConfirmQuantity,
        BookingAction::ToggleSeat { seat_id: front_row[0] },
        BookingAction::ToggleSeat { seat_id: front_row[1] },
        BookingAction::ProceedToCheckout,
    ] {
        send(&store, AppAction::Booking(action)).await;
    }

    // Row A carries no row discount
    let checkout = checkout_state(&store).await;
    assert_eq!(checkout.summary.subtotal, Money::from_dollars(300));
    assert_eq!(checkout.summary.service_fee, Money::from_dollars(30));
    assert_eq!(checkout.summary.total, Money::from_dollars(330));
    assert_eq!(checkout.submit_label(), "Complete Purchase - $330.00");
}

#[tokio::test]
async fn test_submit_waits_for_settlement_action() {
    let store = create_store(3, Duration::from_millis(20));
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;

    let settled = store
        .send_and_wait_for(
            AppAction::Checkout(CheckoutAction::Submit),
            |action| matches!(action, AppAction::Checkout(CheckoutAction::PaymentSettled { .. })),
            Duration::from_secs(2),
        )
        .await
        .unwrap();
    let flow = checkout_state(&store).await.flow;
    assert_eq!(settled, AppAction::Checkout(CheckoutAction::PaymentSettled { flow }));
}

#[tokio::test]
async fn test_processing_screen_shows_before_settlement() {
    let store = create_store(3, Duration::from_millis(200));
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;

    let mut handle = store.send(AppAction::Checkout(CheckoutAction::Submit)).await.unwrap();
    assert!(matches!(
        handle.wait_with_timeout(Duration::from_millis(10)).await,
        Err(StoreError::Timeout)
    ));
    assert_eq!(checkout_state(&store).await.step, CheckoutStep::Processing);

    handle.wait().await;
    assert!(checkout_state(&store).await.is_confirmed());
}

#[tokio::test]
async fn test_closing_checkout_drops_late_settlement() {
    let store = create_store(3, Duration::from_millis(50));
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;

    let mut payment = store.send(AppAction::Checkout(CheckoutAction::Submit)).await.unwrap();
    send(&store, AppAction::CloseCheckout).await;
    payment.wait().await;

    let (screen, last_error) = store.state(|s| (s.screen.clone(), s.last_error.clone())).await;
    assert_eq!(screen, Screen::Browsing);
    assert_eq!(last_error, None);
}

#[tokio::test]
async fn test_closed_booking_cannot_open_checkout_in_a_newer_flow() {
    let store = create_store(3, Duration::from_millis(10));
    select_seats(&store, 1).await;

    // Handoff is still queued when the flow is closed and another event opened
    let mut handoff = store
        .send(AppAction::Booking(BookingAction::ProceedToCheckout))
        .await
        .unwrap();
    store.send(AppAction::CloseBooking).await.unwrap();
    store
        .send(AppAction::OpenEvent { event_id: EventId::new("2") })
        .await
        .unwrap();
    handoff.wait().await;

    let booking = booking_state(&store).await;
    assert_eq!(booking.event.id, EventId::new("2"));
    assert_eq!(booking.step.kind(), StepKind::DateTime);
    assert_eq!(booking.flow, FlowId::new(2));
}

#[tokio::test]
async fn test_late_settlement_does_not_confirm_a_newer_checkout() {
    let store = create_store(3, Duration::from_millis(400));
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;
    let mut first_payment = store.send(AppAction::Checkout(CheckoutAction::Submit)).await.unwrap();
    send(&store, AppAction::CloseCheckout).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;
    let mut second_payment = store.send(AppAction::Checkout(CheckoutAction::Submit)).await.unwrap();

    first_payment.wait().await;
    let checkout = checkout_state(&store).await;
    assert_eq!(checkout.flow, FlowId::new(2));
    assert_eq!(checkout.step, CheckoutStep::Processing);

    second_payment.wait().await;
    assert!(checkout_state(&store).await.is_confirmed());
}

#[tokio::test]
async fn test_rejected_actions_leave_the_flow_in_place() {
    let store = create_store(11, Duration::from_millis(10));
    select_seats(&store, 2).await;

    // Third seat is over the limit
    let extra = booking_state(&store)
        .await
        .seat_map
        .seats()
        .iter()
        .filter(|seat| seat.is_available())
        .nth(2)
        .map(|seat| seat.id)
        .unwrap();
    send(&store, AppAction::Booking(BookingAction::ToggleSeat { seat_id: extra })).await;

    let booking = booking_state(&store).await;
    assert_eq!(booking.selected_count(), 2);
    assert_eq!(
        booking.last_error.map(|e| e.to_string()).as_deref(),
        Some("You can only select 2 seats (deselect one first)")
    );

    // Opening another event mid-flow is refused
    send(&store, AppAction::OpenEvent { event_id: EventId::new("2") }).await;
    let booking = booking_state(&store).await;
    assert_eq!(booking.event.id, EventId::new("1"));
    assert!(store.state(|s| s.last_error.is_some()).await);

    send(&store, AppAction::Booking(BookingAction::GoBack { to: StepKind::Quantity })).await;
    let booking = booking_state(&store).await;
    assert_eq!(booking.step.kind(), StepKind::Quantity);
    assert_eq!(booking.selected_count(), 0);
}

#[tokio::test]
async fn test_same_seed_opens_the_same_seat_map() {
    let first = create_store(42, Duration::from_millis(10));
    let second = create_store(42, Duration::from_millis(10));
    for store in [&first, &second] {
        send(store, AppAction::OpenEvent { event_id: EventId::new("4") }).await;
    }

    let a = booking_state(&first).await;
    let b = booking_state(&second).await;
    assert_eq!(a.seat_map, b.seat_map);
    assert_eq!(a.showtimes, b.showtimes);
}

#[tokio::test]
async fn test_shutdown_times_out_on_pending_payment() {
    let store = create_store(3, Duration::from_secs(30));
    select_seats(&store, 1).await;
    send(&store, AppAction::Booking(BookingAction::ProceedToCheckout)).await;
    fill_form(&store).await;

    let _payment = store.send(AppAction::Checkout(CheckoutAction::Submit)).await.unwrap();
    let result = store.shutdown(Duration::from_millis(50)).await;
    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));

    assert!(matches!(
        store.send(AppAction::ClearFilters).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
