//! Error types for the box office.
//!
//! Rejected user input never panics: reducers store these values on state as
//! `last_error` so the front end can show them next to the screen they refer to.

use crate::booking::StepKind;
use crate::checkout::FormField;
use crate::types::{EventId, SeatId, ShowTimeId, TicketQuantity};
use std::path::PathBuf;
use thiserror::Error;

/// Why the booking flow rejected an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The selection already holds as many seats as tickets
    #[error("You can only select {} (deselect one first)", seat_count(.quantity))]
    SelectionLimitReached {
        /// Ticket quantity
        quantity: TicketQuantity,
    },

    /// Checkout was requested before every ticket had a seat
    #[error("Please select {}", seats_remaining(.selected, .quantity))]
    IncompleteSelection {
        /// Seats currently selected
        selected: usize,
        /// Ticket quantity
        quantity: TicketQuantity,
    },

    /// Quick pick outside the allowed range
    #[error("Ticket quantity must be between 1 and 8 (got {requested})")]
    QuantityOutOfRange {
        /// Requested quantity
        requested: u32,
    },

    /// The showtime is not one of this event's performances
    #[error("Unknown showtime: {showtime_id}")]
    UnknownShowTime {
        /// Requested showtime
        showtime_id: ShowTimeId,
    },

    /// The seat is not on the map
    #[error("Unknown seat: {seat_id}")]
    UnknownSeat {
        /// Requested seat
        seat_id: SeatId,
    },

    /// The action belongs to a different step
    #[error("Cannot {action} on the {step} step")]
    WrongStep {
        /// What was attempted
        action: &'static str,
        /// Current step
        step: StepKind,
    },

    /// Back navigation must target an earlier step
    #[error("Cannot go back to the {target} step from the {current} step")]
    NotAnEarlierStep {
        /// Current step
        current: StepKind,
        /// Requested step
        target: StepKind,
    },
}

fn seat_count(quantity: &TicketQuantity) -> String {
    match quantity.get() {
        1 => "1 seat".to_string(),
        n => format!("{n} seats"),
    }
}

fn seats_remaining(selected: &usize, quantity: &TicketQuantity) -> String {
    match quantity.as_usize().saturating_sub(*selected) {
        1 => "1 more seat".to_string(),
        n => format!("{n} more seats"),
    }
}

/// Why checkout rejected an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Submission with missing or malformed fields
    #[error("Please complete: {}", field_list(.fields))]
    InvalidForm {
        /// Fields that failed validation, in form order
        fields: Vec<FormField>,
    },

    /// Edits and resubmission are closed once payment is in flight
    #[error("Payment is already {state}")]
    PaymentInProgress {
        /// `processing` or `complete`
        state: &'static str,
    },

    /// Finish before the payment settled
    #[error("The booking is not confirmed yet")]
    NotConfirmed,
}

fn field_list(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why the app shell rejected an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No event with that id
    #[error("No event with id {event_id}")]
    UnknownEvent {
        /// Requested event
        event_id: EventId,
    },

    /// An event was opened while another flow is on screen
    #[error("Close the current booking before opening another event")]
    FlowInProgress,
}

/// Failure loading the event catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The document is not a list of events
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two events share an id
    #[error("Duplicate event id: {0}")]
    DuplicateId(EventId),

    /// An event without dates can never be booked
    #[error("Event {0} has no dates")]
    NoDates(EventId),
}

/// A seat id that does not address a seat in the layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid seat {0:?}: expected Section-Row-Number, e.g. Orchestra-A-1")]
pub struct SeatIdParseError(pub String);

/// A category name that is not in the catalog's vocabulary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category {0:?}: expected concert, musical, opera, theater or all")]
pub struct UnknownCategory(pub String);

/// A terminal command that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unrecognized command word
    #[error("Unknown command {0:?} (type `help` for a list)")]
    Unknown(String),

    /// Required argument missing
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// Argument present but malformed
    #[error("Invalid {what}: {value:?}")]
    InvalidArgument {
        /// Argument name
        what: &'static str,
        /// Raw value
        value: String,
    },

    /// Bad seat id
    #[error(transparent)]
    Seat(#[from] SeatIdParseError),

    /// Bad category
    #[error(transparent)]
    Category(#[from] UnknownCategory),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn selection_messages_pluralize() {
        let two = TicketQuantity::new(2).unwrap();
        let one = TicketQuantity::new(1).unwrap();

        assert_eq!(
            BookingError::SelectionLimitReached { quantity: two }.to_string(),
            "You can only select 2 seats (deselect one first)"
        );
        assert_eq!(
            BookingError::IncompleteSelection { selected: 0, quantity: one }.to_string(),
            "Please select 1 more seat"
        );
    }

    #[test]
    fn form_error_lists_field_labels() {
        let error = CheckoutError::InvalidForm {
            fields: vec![FormField::CardNumber, FormField::Cvv],
        };
        assert_eq!(error.to_string(), "Please complete: card number, CVV");
    }
}
