//! Plain-text rendering of each screen.

use crate::app::{AppState, Screen};
use crate::booking::{BookingState, BookingStep, SeatSelection, StepKind};
use crate::checkout::{CheckoutState, CheckoutStep, FormField};
use crate::seat_map::SeatMap;
use crate::types::{Row, SeatId, Section};
use std::fmt::{self, Display, Formatter};

const RULE: &str = "------------------------------------------------------------";

/// Whole screen for the current app state
pub struct AppView<'a>(pub &'a AppState);

impl Display for AppView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0;
        match &state.screen {
            Screen::Browsing => EventListView(state).fmt(f)?,
            Screen::Booking(booking) => BookingView(booking).fmt(f)?,
            Screen::Checkout(checkout) => CheckoutView(checkout).fmt(f)?,
        }
        if let Some(error) = &state.last_error {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}

/// Filtered event list
pub struct EventListView<'a>(pub &'a AppState);

impl Display for EventListView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let events = state.visible_events();

        writeln!(f, "ORDERLY - events")?;
        writeln!(f, "{RULE}")?;
        let category = state.query.category.map_or("all categories", |c| c.as_str());
        if state.query.text.is_empty() {
            writeln!(f, "Filter: {category}")?;
        } else {
            writeln!(f, "Search: {:?} in {category}", state.query.text)?;
        }
        let noun = if events.len() == 1 { "event" } else { "events" };
        writeln!(f, "{} {noun} found", events.len())?;
        writeln!(f)?;

        if events.is_empty() {
            writeln!(f, "No events found. Try adjusting your search or filters.")?;
        }
        for event in events {
            writeln!(f, "[{}] {} - {}", event.id, event.title, event.artist)?;
            writeln!(
                f,
                "    {} | {} | {} dates | {}",
                event.category,
                event.venue,
                event.dates.len(),
                event.price
            )?;
        }
        Ok(())
    }
}

/// Booking flow for one event
pub struct BookingView<'a>(pub &'a BookingState);

impl BookingView<'_> {
    fn progress(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let current = self.0.step.kind();
        let steps: Vec<String> = StepKind::ALL
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let marker = match step.cmp(&current) {
                    std::cmp::Ordering::Less => "x".to_string(),
                    std::cmp::Ordering::Equal => ">".to_string(),
                    std::cmp::Ordering::Greater => (index + 1).to_string(),
                };
                format!("[{marker}] {}", step.title())
            })
            .collect();
        writeln!(f, "{}", steps.join("  "))
    }
}

impl Display for BookingView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "{} - {}", state.event.title, state.event.venue)?;
        writeln!(f, "{RULE}")?;
        self.progress(f)?;
        writeln!(f)?;

        match &state.step {
            BookingStep::DateTime => {
                for (index, showtime) in state.showtimes.iter().enumerate() {
                    writeln!(
                        f,
                        "  {}. {} at {}  ({} seats available)",
                        index + 1,
                        showtime.date,
                        showtime.time,
                        showtime.available_seats
                    )?;
                }
                writeln!(f)?;
                writeln!(f, "Pick one with `showtime <n>`.")?;
            },
            BookingStep::Quantity { showtime } => {
                writeln!(f, "{} at {}", showtime.date, showtime.time)?;
                writeln!(f, "Tickets: {}   (`more`, `less`, `qty 1|2|4|6`)", state.quantity)?;
                writeln!(f, "Continue to seats with `continue`, or `back datetime`.")?;
            },
            BookingStep::Seats { showtime, selection } => {
                writeln!(f, "{} at {}", showtime.date, showtime.time)?;
                writeln!(f)?;
                SeatMapView {
                    map: &state.seat_map,
                    selection,
                }
                .fmt(f)?;
                writeln!(f)?;

                if let Some(seat) = selection.hovered().and_then(|id| state.seat_map.get(&id)) {
                    writeln!(
                        f,
                        "{} - Row {}, Seat {} - {}",
                        seat.section(),
                        seat.row(),
                        seat.number(),
                        seat.price
                    )?;
                }
                let seats: Vec<String> = selection.seats().iter().map(SeatId::to_string).collect();
                writeln!(
                    f,
                    "Selected {} / {}: {}",
                    selection.len(),
                    state.quantity,
                    if seats.is_empty() { "-".to_string() } else { seats.join(", ") }
                )?;
                writeln!(f, "Total: {}", state.total())?;
                if state.can_proceed() {
                    writeln!(f, "Ready: `checkout` to continue.")?;
                }
            },
        }

        if let Some(error) = &state.last_error {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}

/// Seat grid with legend
///
/// `o` available, `#` selected, `x` reserved, `*` under the pointer.
pub struct SeatMapView<'a> {
    /// Seats to draw
    pub map: &'a SeatMap,
    /// Selection overlay
    pub selection: &'a SeatSelection,
}

impl SeatMapView<'_> {
    fn glyph(&self, id: &SeatId, available: bool) -> char {
        if self.selection.hovered() == Some(*id) {
            '*'
        } else if self.selection.contains(id) {
            '#'
        } else if available {
            'o'
        } else {
            'x'
        }
    }
}

impl Display for SeatMapView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^42}", "STAGE")?;
        for section in Section::ALL {
            writeln!(f, "{section}")?;
            write!(f, "    ")?;
            for number in 1..=SeatId::SEATS_PER_ROW {
                write!(f, "{number:>3}")?;
            }
            writeln!(f)?;
            for row in Row::ALL {
                write!(f, "  {row} ")?;
                for seat in self.map.row(section, row) {
                    write!(f, "  {}", self.glyph(&seat.id, seat.is_available()))?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "Legend: o available  # selected  x reserved  * hover")
    }
}

/// Payment form, processing notice or confirmation
pub struct CheckoutView<'a>(pub &'a CheckoutState);

impl CheckoutView<'_> {
    fn summary(&self, f: &mut Formatter<'_>, total_label: &str) -> fmt::Result {
        let state = self.0;
        let booking = &state.booking;
        writeln!(f, "Event:       {}", booking.event.title)?;
        writeln!(f, "Date & Time: {} at {}", booking.showtime.date, booking.showtime.time)?;
        writeln!(f, "Venue:       {}", booking.event.venue)?;
        writeln!(f, "Seats:       {}", booking.seat_list())?;
        writeln!(f, "Subtotal:    {}", state.summary.subtotal)?;
        writeln!(f, "Service fee: {}", state.summary.service_fee)?;
        writeln!(f, "{total_label:<13}{}", state.summary.total)
    }
}

impl Display for CheckoutView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0;
        match &state.step {
            CheckoutStep::Payment => {
                writeln!(f, "Checkout - complete your booking")?;
                writeln!(f, "{RULE}")?;
                self.summary(f, "Total:")?;
                writeln!(f)?;
                for field in FormField::ALL {
                    let value = state.form.get(field);
                    let shown = if field == FormField::Cvv && !value.is_empty() {
                        "*".repeat(value.len())
                    } else {
                        value.to_string()
                    };
                    writeln!(f, "  {:<7} {:<18} {}", field.key(), field.label(), shown)?;
                }
                writeln!(f)?;
                writeln!(f, "Fill in with `set <field> <value>`, then `pay`: {}", state.submit_label())?;
            },
            CheckoutStep::Processing => {
                writeln!(f, "Processing payment of {}...", state.summary.total)?;
            },
            CheckoutStep::Confirmation {
                confirmed_at,
                sent_to,
            } => {
                writeln!(f, "Booking Confirmed!")?;
                writeln!(f, "Your tickets have been sent to {sent_to}")?;
                writeln!(f, "{RULE}")?;
                self.summary(f, "Total Paid:")?;
                writeln!(f, "Confirmed:   {}", confirmed_at.format("%Y-%m-%d %H:%M UTC"))?;
                writeln!(f)?;
                writeln!(f, "Note: this is a demo. No payment has been processed.")?;
                writeln!(f, "`done` to return to events.")?;
            },
        }

        if let Some(error) = &state.last_error {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}
