//! Box Office - seat selection and booking on the Marquee architecture
//!
//! Browse a small catalog of events, pick a showtime and ticket quantity,
//! choose seats on a generated seat map and complete a mock checkout. All
//! state lives in memory for one user and one session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        AppReducer                        │
//! │  Browsing ──OpenEvent──▶ Booking ──BookingCompleted──▶ Checkout
//! │      ▲                                                  │
//! │      └──────────────── CheckoutCompleted ───────────────┘
//! └──────────────────────────────────────────────────────────┘
//!          │ forwards                      │ forwards
//!          ▼                               ▼
//!   ┌────────────────┐             ┌─────────────────┐
//!   │ BookingReducer │             │ CheckoutReducer │
//!   │ date → qty →   │             │ payment →       │
//!   │ seats          │             │ processing →    │
//!   └────────────────┘             │ confirmation    │
//!                                  └─────────────────┘
//! ```
//!
//! Child reducers signal completion with feedback actions
//! ([`booking::BookingAction::BookingCompleted`],
//! [`checkout::CheckoutAction::CheckoutCompleted`]) that the app shell
//! intercepts to switch screens.
//!
//! # Key Types
//!
//! - [`seat_map::SeatMap`]: 288 seats, reserved at random from a seed
//! - [`booking::BookingStep`]: the step machine, each step owning its data
//! - [`types::OrderSummary`]: subtotal, 10% service fee and total
//! - [`app::AppReducer`]: composes the flows behind one `Store`

pub mod app;
pub mod booking;
pub mod catalog;
pub mod checkout;
pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod seat_map;
pub mod types;
pub mod view;

#[cfg(test)]
mod fixtures;

pub use app::{AppAction, AppReducer, AppState, Screen};
pub use booking::{BookingAction, BookingReducer, BookingState, BookingStep, StepKind};
pub use catalog::{Catalog, EventQuery};
pub use checkout::{CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState, CheckoutStep};
pub use config::Config;
pub use environment::{AppEnvironment, EntropySeeds, FixedSeed, SeedSource, SequentialSeeds};
pub use error::{AppError, BookingError, CatalogError, CheckoutError, CommandError};
pub use seat_map::SeatMap;
pub use types::*;
