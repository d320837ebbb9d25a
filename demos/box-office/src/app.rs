//! App shell: browse the catalog, book seats, check out.
//!
//! The shell owns which screen is showing and the lifetime of each sub-flow.
//! Booking and checkout actions are forwarded to their reducers, and the
//! effects those reducers return are lifted back into [`AppAction`] so their
//! completion signals come back here.

use crate::booking::{BookingAction, BookingReducer, BookingState};
use crate::catalog::{Catalog, EventQuery};
use crate::checkout::{CheckoutAction, CheckoutReducer, CheckoutState};
use crate::environment::AppEnvironment;
use crate::error::AppError;
use crate::types::{Category, Event, EventId, FlowId};
use marquee_core::{effect::Effect, reducer::Reducer, SmallVec};
use tracing::{debug, info, warn};

/// What is on screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Event list
    Browsing,
    /// Booking flow for one event
    Booking(BookingState),
    /// Checkout for a completed booking
    Checkout(CheckoutState),
}

impl Screen {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::Booking(_) => "booking",
            Self::Checkout(_) => "checkout",
        }
    }
}

/// Top-level state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    /// Bookable events
    pub catalog: Catalog,
    /// Browse filter
    pub query: EventQuery,
    /// Current screen
    pub screen: Screen,
    /// Most recent shell-level rejection
    pub last_error: Option<AppError>,
    /// Most recently opened flow
    pub last_flow: FlowId,
}

impl AppState {
    /// Start on the event list
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            query: EventQuery::default(),
            screen: Screen::Browsing,
            last_error: None,
            last_flow: FlowId::default(),
        }
    }

    /// Events passing the browse filter
    #[must_use]
    pub fn visible_events(&self) -> Vec<&Event> {
        self.catalog.search(&self.query)
    }

    /// Action that abandons whichever flow is showing
    #[must_use]
    pub fn close_action(&self) -> Option<AppAction> {
        match self.screen {
            Screen::Browsing => None,
            Screen::Booking(_) => Some(AppAction::CloseBooking),
            Screen::Checkout(_) => Some(AppAction::CloseCheckout),
        }
    }
}

/// Top-level actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Set the search text
    Search {
        /// New search text
        text: String,
    },
    /// Set the category filter
    FilterCategory {
        /// Category, or `None` for all
        category: Option<Category>,
    },
    /// Show every event again
    ClearFilters,
    /// Start booking an event
    OpenEvent {
        /// Event to book
        event_id: EventId,
    },
    /// Abandon the booking flow
    CloseBooking,
    /// Abandon checkout
    CloseCheckout,
    /// Forwarded to the booking flow
    Booking(BookingAction),
    /// Forwarded to checkout
    Checkout(CheckoutAction),
}

/// Reducer for the app shell
#[derive(Clone, Copy, Debug, Default)]
pub struct AppReducer {
    booking: BookingReducer,
    checkout: CheckoutReducer,
}

impl AppReducer {
    /// Create the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            booking: BookingReducer,
            checkout: CheckoutReducer,
        }
    }

    fn open_event(state: &mut AppState, event_id: EventId, env: &AppEnvironment) {
        if !matches!(state.screen, Screen::Browsing) {
            warn!(screen = state.screen.name(), %event_id, "Cannot open an event mid-flow");
            state.last_error = Some(AppError::FlowInProgress);
            return;
        }
        let Some(event) = state.catalog.get(&event_id).cloned() else {
            warn!(%event_id, "Unknown event");
            state.last_error = Some(AppError::UnknownEvent { event_id });
            return;
        };

        let seed = env.seeds.next_seed();
        let flow = state.last_flow.next();
        info!(%flow, %event_id, title = %event.title, seed, "Booking flow opened");
        state.last_flow = flow;
        state.screen = Screen::Booking(BookingState::open(event, seed).with_flow(flow));
        state.last_error = None;
    }

    fn close(state: &mut AppState, expected: &'static str) {
        if state.screen.name() == expected {
            info!(screen = expected, "Flow closed");
            state.screen = Screen::Browsing;
            state.last_error = None;
        } else {
            debug!(screen = state.screen.name(), expected, "Ignoring close for a screen not showing");
        }
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Search { text } => {
                debug!(%text, "Search updated");
                state.query.text = text;
                state.last_error = None;
            },

            AppAction::FilterCategory { category } => {
                debug!(?category, "Category filter updated");
                state.query.category = category;
                state.last_error = None;
            },

            AppAction::ClearFilters => {
                state.query = EventQuery::default();
                state.last_error = None;
            },

            AppAction::OpenEvent { event_id } => Self::open_event(state, event_id, env),

            AppAction::CloseBooking => Self::close(state, "booking"),

            AppAction::CloseCheckout => Self::close(state, "checkout"),

            AppAction::Booking(BookingAction::BookingCompleted { flow, booking }) => {
                if !matches!(&state.screen, Screen::Booking(open) if open.flow == flow) {
                    debug!(%flow, screen = state.screen.name(), "Ignoring completed booking from a closed flow");
                    return SmallVec::new();
                }
                info!(
                    %flow,
                    event_id = %booking.event.id,
                    seats = booking.seats.len(),
                    "Checkout opened"
                );
                state.screen = Screen::Checkout(CheckoutState::new(booking).with_flow(flow));
            },

            AppAction::Booking(action) => {
                let Screen::Booking(booking) = &mut state.screen else {
                    debug!(?action, "Ignoring booking action with no booking flow open");
                    return SmallVec::new();
                };
                return self
                    .booking
                    .reduce(booking, action, &())
                    .into_iter()
                    .map(|effect| effect.map(AppAction::Booking))
                    .collect();
            },

            AppAction::Checkout(CheckoutAction::CheckoutCompleted { flow }) => {
                if matches!(&state.screen, Screen::Checkout(open) if open.flow == flow) {
                    info!(%flow, "Booking complete");
                    state.screen = Screen::Browsing;
                    state.last_error = None;
                } else {
                    debug!(%flow, screen = state.screen.name(), "Ignoring checkout completion from a closed flow");
                }
            },

            AppAction::Checkout(action) => {
                let Screen::Checkout(checkout) = &mut state.screen else {
                    debug!(?action, "Ignoring checkout action with no checkout open");
                    return SmallVec::new();
                };
                return self
                    .checkout
                    .reduce(checkout, action, &env.checkout)
                    .into_iter()
                    .map(|effect| effect.map(AppAction::Checkout))
                    .collect();
            },
        }

        SmallVec::new()
    }
}
