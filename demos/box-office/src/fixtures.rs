//! Shared values for unit tests.

#![allow(clippy::unwrap_used)]

use crate::booking::{BookingAction, BookingReducer, BookingState};
use crate::seat_map::{self, SeatMap};
use crate::types::{BookingData, Category, Event, EventId, PriceRange, SeatId, ShowTimeId};
use marquee_core::reducer::Reducer;

pub fn sample_event() -> Event {
    Event {
        id: EventId::new("1"),
        title: "The Symphony of Dreams".to_string(),
        artist: "Metropolitan Orchestra".to_string(),
        category: Category::Concert,
        venue: "Carnegie Hall, New York".to_string(),
        image_url: "https://example.com/symphony.jpg".to_string(),
        dates: vec![
            "March 15, 2026".to_string(),
            "March 16, 2026".to_string(),
            "March 22, 2026".to_string(),
        ],
        price: PriceRange { min: 75, max: 150 },
        description: "Timeless masterpieces.".to_string(),
    }
}

pub fn seat(id: &str) -> SeatId {
    id.parse().unwrap()
}

/// Booking flow whose seat map has exactly `reserved` sold
pub fn booking_with_reserved(reserved: &[&str]) -> BookingState {
    let reserved: Vec<SeatId> = reserved.iter().map(|id| seat(id)).collect();
    let event = sample_event();
    let (showtimes, _) = seat_map::draw(&event, 0);
    BookingState::with_seat_map(event, showtimes, SeatMap::build(|id| reserved.contains(id)))
}

/// Booking flow already on the seats step
pub fn booking_at_seats(quantity: u8, reserved: &[&str]) -> BookingState {
    let mut state = booking_with_reserved(reserved);
    for action in [
        BookingAction::SelectShowTime {
            showtime_id: ShowTimeId::new(0),
        },
        BookingAction::SetQuantity {
            quantity: u32::from(quantity),
        },
        BookingAction::ConfirmQuantity,
    ] {
        let _ = BookingReducer.reduce(&mut state, action, &());
    }
    state
}

/// Two front-row orchestra seats, $300 before fees
pub fn sample_booking() -> BookingData {
    let event = sample_event();
    let (showtimes, _) = seat_map::draw(&event, 0);
    let map = SeatMap::all_available();
    let seats = ["Orchestra-A-1", "Orchestra-A-2"]
        .into_iter()
        .map(|id| *map.get(&seat(id)).unwrap())
        .collect();
    let showtime = showtimes.into_iter().next().unwrap();
    BookingData::new(event, showtime, seats)
}
