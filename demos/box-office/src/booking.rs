//! Booking step machine.
//!
//! A booking moves through three steps: pick a showtime, pick a ticket
//! quantity, then pick exactly that many seats. Each step carries the data the
//! earlier steps produced, so a seat selection cannot exist without a showtime
//! and a confirmed quantity.
//!
//! ```text
//! DateTime ──SelectShowTime──▶ Quantity { showtime } ──ConfirmQuantity──▶ Seats { showtime, selection }
//!    ▲                              ▲                                          │
//!    └──────────GoBack──────────────┴───────────────GoBack─────────────────────┘
//! ```
//!
//! Going back drops whatever the abandoned steps collected. The ticket quantity
//! lives outside the steps and survives back navigation.

use crate::error::BookingError;
use crate::seat_map::{self, SeatMap};
use crate::types::{
    BookingData, Event, FlowId, Money, Seat, SeatId, SeatStatus, ShowTime, ShowTimeId, TicketQuantity,
};
use marquee_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::fmt;
use tracing::{debug, info, warn};

// ============================================================================
// Steps
// ============================================================================

/// Which step the booking is on, without its data
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepKind {
    /// Choosing a showtime
    DateTime,
    /// Choosing how many tickets
    Quantity,
    /// Choosing seats
    Seats,
}

impl StepKind {
    /// Every step, in flow order
    pub const ALL: [Self; 3] = [Self::DateTime, Self::Quantity, Self::Seats];

    /// Heading shown in the progress bar
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::DateTime => "Select Date & Time",
            Self::Quantity => "Select Quantity",
            Self::Seats => "Choose Seats",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DateTime => "date & time",
            Self::Quantity => "quantity",
            Self::Seats => "seats",
        })
    }
}

/// Seats picked so far, plus the seat under the pointer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeatSelection {
    seats: Vec<SeatId>,
    hovered: Option<SeatId>,
}

impl SeatSelection {
    /// Selected seats, in the order they were picked
    #[must_use]
    pub fn seats(&self) -> &[SeatId] {
        &self.seats
    }

    /// Number of selected seats
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Whether `seat_id` is selected
    #[must_use]
    pub fn contains(&self, seat_id: &SeatId) -> bool {
        self.seats.contains(seat_id)
    }

    /// Seat under the pointer
    #[must_use]
    pub const fn hovered(&self) -> Option<SeatId> {
        self.hovered
    }

    /// Flip a seat in or out of the selection
    ///
    /// Returns whether the seat is selected afterwards. Adding beyond `limit`
    /// fails and leaves the selection untouched.
    fn toggle(&mut self, seat_id: SeatId, limit: TicketQuantity) -> Result<bool, BookingError> {
        if let Some(position) = self.seats.iter().position(|id| *id == seat_id) {
            self.seats.remove(position);
            return Ok(false);
        }
        if self.seats.len() >= limit.as_usize() {
            return Err(BookingError::SelectionLimitReached { quantity: limit });
        }
        self.seats.push(seat_id);
        Ok(true)
    }
}

/// Current step and the data it owns
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingStep {
    /// Choosing a showtime
    DateTime,
    /// Choosing how many tickets
    Quantity {
        /// Chosen performance
        showtime: ShowTime,
    },
    /// Choosing seats
    Seats {
        /// Chosen performance
        showtime: ShowTime,
        /// Seats picked so far
        selection: SeatSelection,
    },
}

impl BookingStep {
    /// The step without its data
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::DateTime => StepKind::DateTime,
            Self::Quantity { .. } => StepKind::Quantity,
            Self::Seats { .. } => StepKind::Seats,
        }
    }

    /// Chosen performance, once there is one
    #[must_use]
    pub const fn showtime(&self) -> Option<&ShowTime> {
        match self {
            Self::DateTime => None,
            Self::Quantity { showtime } | Self::Seats { showtime, .. } => Some(showtime),
        }
    }

    /// Seat selection, on the seats step
    #[must_use]
    pub const fn selection(&self) -> Option<&SeatSelection> {
        match self {
            Self::Seats { selection, .. } => Some(selection),
            _ => None,
        }
    }

    fn into_showtime(self) -> Option<ShowTime> {
        match self {
            Self::DateTime => None,
            Self::Quantity { showtime } | Self::Seats { showtime, .. } => Some(showtime),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// State of one booking flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingState {
    /// Event being booked
    pub event: Event,
    /// Performances on offer
    pub showtimes: Vec<ShowTime>,
    /// Seats for this flow
    pub seat_map: SeatMap,
    /// Tickets wanted
    pub quantity: TicketQuantity,
    /// Current step
    pub step: BookingStep,
    /// Most recent rejection, cleared by the next accepted action
    pub last_error: Option<BookingError>,
    /// Flow this booking belongs to
    pub flow: FlowId,
}

impl BookingState {
    /// Open a booking flow with showtimes and seats drawn from `seed`
    #[must_use]
    pub fn open(event: Event, seed: u64) -> Self {
        let (showtimes, seat_map) = seat_map::draw(&event, seed);
        Self::with_seat_map(event, showtimes, seat_map)
    }

    /// Open a booking flow over a given seat map
    #[must_use]
    pub fn with_seat_map(event: Event, showtimes: Vec<ShowTime>, seat_map: SeatMap) -> Self {
        Self {
            event,
            showtimes,
            seat_map,
            quantity: TicketQuantity::default(),
            step: BookingStep::DateTime,
            last_error: None,
            flow: FlowId::default(),
        }
    }

    /// Tag the booking with the flow that owns it
    #[must_use]
    pub fn with_flow(mut self, flow: FlowId) -> Self {
        self.flow = flow;
        self
    }

    /// Selected seats, in selection order
    #[must_use]
    pub fn selected_seats(&self) -> Vec<&Seat> {
        self.step
            .selection()
            .map(|selection| {
                selection
                    .seats()
                    .iter()
                    .filter_map(|id| self.seat_map.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of selected seats
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.step.selection().map_or(0, SeatSelection::len)
    }

    /// Sum of the selected seat prices
    #[must_use]
    pub fn total(&self) -> Money {
        self.selected_seats().into_iter().map(|seat| seat.price).sum()
    }

    /// Whether every ticket has a seat
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        self.step.kind() == StepKind::Seats && self.selected_count() == self.quantity.as_usize()
    }

    /// The completed booking, when on the seats step
    #[must_use]
    pub fn booking_data(&self) -> Option<BookingData> {
        let showtime = self.step.showtime()?.clone();
        self.step.selection()?;
        let seats = self.selected_seats().into_iter().copied().collect();
        Some(BookingData::new(self.event.clone(), showtime, seats))
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to the booking flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingAction {
    /// Pick a performance
    SelectShowTime {
        /// Chosen performance
        showtime_id: ShowTimeId,
    },
    /// One more ticket
    IncrementQuantity,
    /// One fewer ticket
    DecrementQuantity,
    /// Quick pick
    SetQuantity {
        /// Requested ticket count
        quantity: u32,
    },
    /// Move on to seat selection
    ConfirmQuantity,
    /// Select or deselect a seat
    ToggleSeat {
        /// Seat clicked
        seat_id: SeatId,
    },
    /// Pointer moved over a seat, or off the map
    HoverSeat {
        /// Seat under the pointer
        seat_id: Option<SeatId>,
    },
    /// Return to an earlier step
    GoBack {
        /// Step to return to
        to: StepKind,
    },
    /// Finish seat selection
    ProceedToCheckout,
    /// Feedback: the selection is complete and ready for checkout
    BookingCompleted {
        /// Flow the booking was made in
        flow: FlowId,
        /// The completed booking
        booking: BookingData,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking flow
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    fn reject(state: &mut BookingState, error: BookingError) {
        warn!(
            event_id = %state.event.id,
            step = %state.step.kind(),
            %error,
            "Booking action rejected"
        );
        state.last_error = Some(error);
    }

    fn wrong_step(state: &mut BookingState, action: &'static str) {
        let step = state.step.kind();
        Self::reject(state, BookingError::WrongStep { action, step });
    }

    fn change_quantity(state: &mut BookingState, quantity: TicketQuantity) {
        if state.step.kind() != StepKind::Quantity {
            Self::wrong_step(state, "change the ticket quantity");
            return;
        }
        state.quantity = quantity;
        state.last_error = None;
    }

    fn toggle_seat(state: &mut BookingState, seat_id: SeatId) {
        if state.step.kind() != StepKind::Seats {
            Self::wrong_step(state, "select seats");
            return;
        }

        let Some(seat) = state.seat_map.get(&seat_id) else {
            Self::reject(state, BookingError::UnknownSeat { seat_id });
            return;
        };
        if seat.status == SeatStatus::Reserved {
            debug!(seat = %seat_id, "Ignoring toggle on reserved seat");
            return;
        }

        let quantity = state.quantity;
        let outcome = match &mut state.step {
            BookingStep::Seats { selection, .. } => selection.toggle(seat_id, quantity),
            _ => return,
        };

        match outcome {
            Ok(selected) => {
                debug!(seat = %seat_id, selected, count = state.selected_count(), "Seat toggled");
                state.last_error = None;
            },
            Err(error) => Self::reject(state, error),
        }
    }

    fn go_back(state: &mut BookingState, target: StepKind) {
        let current = state.step.kind();
        if target >= current {
            Self::reject(state, BookingError::NotAnEarlierStep { current, target });
            return;
        }

        let abandoned = std::mem::replace(&mut state.step, BookingStep::DateTime);
        if let (StepKind::Quantity, Some(showtime)) = (target, abandoned.into_showtime()) {
            state.step = BookingStep::Quantity { showtime };
        }

        info!(event_id = %state.event.id, from = %current, to = %target, "Went back");
        state.last_error = None;
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::SelectShowTime { showtime_id } => {
                if state.step.kind() != StepKind::DateTime {
                    Self::wrong_step(state, "choose a showtime");
                    return SmallVec::new();
                }
                let Some(showtime) = state.showtimes.iter().find(|s| s.id == showtime_id).cloned()
                else {
                    Self::reject(state, BookingError::UnknownShowTime { showtime_id });
                    return SmallVec::new();
                };

                info!(
                    event_id = %state.event.id,
                    showtime = %showtime.id,
                    date = %showtime.date,
                    time = %showtime.time,
                    "Showtime selected"
                );
                state.step = BookingStep::Quantity { showtime };
                state.last_error = None;
            },

            BookingAction::IncrementQuantity => {
                let quantity = state.quantity.incremented();
                Self::change_quantity(state, quantity);
            },

            BookingAction::DecrementQuantity => {
                let quantity = state.quantity.decremented();
                Self::change_quantity(state, quantity);
            },

            BookingAction::SetQuantity { quantity } => match TicketQuantity::new(quantity) {
                Ok(quantity) => Self::change_quantity(state, quantity),
                Err(error) => Self::reject(state, error),
            },

            BookingAction::ConfirmQuantity => {
                match std::mem::replace(&mut state.step, BookingStep::DateTime) {
                    BookingStep::Quantity { showtime } => {
                        info!(
                            event_id = %state.event.id,
                            quantity = state.quantity.get(),
                            "Quantity confirmed"
                        );
                        state.step = BookingStep::Seats {
                            showtime,
                            selection: SeatSelection::default(),
                        };
                        state.last_error = None;
                    },
                    other => {
                        state.step = other;
                        Self::wrong_step(state, "confirm the quantity");
                    },
                }
            },

            BookingAction::ToggleSeat { seat_id } => Self::toggle_seat(state, seat_id),

            BookingAction::HoverSeat { seat_id } => match &mut state.step {
                BookingStep::Seats { selection, .. } => selection.hovered = seat_id,
                _ => debug!("Ignoring hover outside the seat step"),
            },

            BookingAction::GoBack { to } => Self::go_back(state, to),

            BookingAction::ProceedToCheckout => {
                if state.step.kind() != StepKind::Seats {
                    Self::wrong_step(state, "proceed to checkout");
                    return SmallVec::new();
                }
                let selected = state.selected_count();
                if selected != state.quantity.as_usize() {
                    let quantity = state.quantity;
                    Self::reject(state, BookingError::IncompleteSelection { selected, quantity });
                    return SmallVec::new();
                }
                let Some(booking) = state.booking_data() else {
                    return SmallVec::new();
                };

                info!(
                    event_id = %booking.event.id,
                    showtime = %booking.showtime.id,
                    seats = %booking.seat_list(),
                    total = %booking.total,
                    "Seat selection complete"
                );
                state.last_error = None;

                let flow = state.flow;
                return smallvec![async_effect! {
                    Some(BookingAction::BookingCompleted { flow, booking })
                }];
            },

            BookingAction::BookingCompleted { flow, booking } => {
                debug!(%flow, event_id = %booking.event.id, "Booking handed off to checkout");
            },
        }

        SmallVec::new()
    }
}
