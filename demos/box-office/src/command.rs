//! Terminal command parsing.
//!
//! Each input line becomes a [`Command`]. Most commands map straight onto an
//! [`AppAction`]; parse errors never reach the store.

use crate::app::AppAction;
use crate::booking::{BookingAction, StepKind};
use crate::checkout::{CheckoutAction, FormField};
use crate::error::CommandError;
use crate::types::{Category, EventId, SeatId, ShowTimeId};

/// Command reference printed by `help`
pub const HELP: &str = "\
Browsing:
  list                      show all events
  search <text>             filter by title, artist or venue
  category <name|all>       concert, musical, opera, theater
  open <event-id>           start booking an event
Booking:
  showtime <n>              pick the n-th showtime
  more | less | qty <n>     change the ticket count (1-8)
  continue                  go on to seat selection
  seat <Section-Row-Number> select or deselect a seat, e.g. seat Orchestra-A-1
  hover <seat|none>         preview a seat
  back <datetime|quantity>  return to an earlier step
  checkout                  proceed once every ticket has a seat
Checkout:
  set <field> <value>       fields: first last email phone card expiry cvv zip
  pay                       submit payment
  done                      finish after confirmation
Anywhere:
  close                     abandon the current booking or checkout
  help                      this text
  quit                      exit";

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Redraw the current screen
    Show,
    /// Print [`HELP`]
    Help,
    /// Abandon whatever flow is showing
    Close,
    /// Exit
    Quit,
    /// Send an action to the store
    Dispatch(AppAction),
}

fn booking(action: BookingAction) -> Command {
    Command::Dispatch(AppAction::Booking(action))
}

fn checkout(action: CheckoutAction) -> Command {
    Command::Dispatch(AppAction::Checkout(action))
}

fn required<'a>(arg: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(arg)
    }
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        what,
        value: value.to_string(),
    }
}

fn parse_step(arg: &str) -> Result<StepKind, CommandError> {
    match arg.to_ascii_lowercase().as_str() {
        "datetime" | "date" | "time" | "showtime" => Ok(StepKind::DateTime),
        "quantity" | "qty" => Ok(StepKind::Quantity),
        "seats" | "seat" => Ok(StepKind::Seats),
        _ => Err(invalid("step", arg)),
    }
}

/// Parse one input line
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands and missing or malformed
/// arguments.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "close" | "cancel" => Command::Close,

        "list" => Command::Dispatch(AppAction::ClearFilters),
        "search" => Command::Dispatch(AppAction::Search {
            text: rest.to_string(),
        }),
        "category" => {
            let name = required(rest, "category <concert|musical|opera|theater|all>")?;
            let category = if name.eq_ignore_ascii_case("all") {
                None
            } else {
                Some(name.parse::<Category>()?)
            };
            Command::Dispatch(AppAction::FilterCategory { category })
        },
        "open" => Command::Dispatch(AppAction::OpenEvent {
            event_id: EventId::new(required(rest, "open <event-id>")?),
        }),

        "showtime" => {
            let arg = required(rest, "showtime <n>")?;
            let n: usize = arg.parse().map_err(|_| invalid("showtime number", arg))?;
            let index = n.checked_sub(1).ok_or_else(|| invalid("showtime number", arg))?;
            booking(BookingAction::SelectShowTime {
                showtime_id: ShowTimeId::new(index),
            })
        },
        "more" | "+" => booking(BookingAction::IncrementQuantity),
        "less" | "-" => booking(BookingAction::DecrementQuantity),
        "qty" | "quantity" => {
            let arg = required(rest, "qty <1-8>")?;
            let quantity: u32 = arg.parse().map_err(|_| invalid("quantity", arg))?;
            booking(BookingAction::SetQuantity { quantity })
        },
        "continue" | "next" => booking(BookingAction::ConfirmQuantity),
        "seat" => {
            let seat_id: SeatId = required(rest, "seat <Section-Row-Number>")?.parse()?;
            booking(BookingAction::ToggleSeat { seat_id })
        },
        "hover" => {
            let arg = required(rest, "hover <Section-Row-Number|none>")?;
            let seat_id = if arg.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(arg.parse::<SeatId>()?)
            };
            booking(BookingAction::HoverSeat { seat_id })
        },
        "back" => booking(BookingAction::GoBack {
            to: parse_step(required(rest, "back <datetime|quantity>")?)?,
        }),
        "checkout" => booking(BookingAction::ProceedToCheckout),

        "set" => {
            let usage = "set <first|last|email|phone|card|expiry|cvv|zip> <value>";
            let (key, value) = required(rest, usage)?
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage(usage))?;
            let field = FormField::from_key(key).ok_or_else(|| invalid("field", key))?;
            checkout(CheckoutAction::UpdateField {
                field,
                value: value.trim().to_string(),
            })
        },
        "pay" | "submit" => checkout(CheckoutAction::Submit),
        "done" | "finish" => checkout(CheckoutAction::Finish),

        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_redraws() {
        assert_eq!(parse("   ").unwrap(), Command::Show);
    }

    #[test]
    fn search_keeps_the_whole_phrase() {
        assert_eq!(
            parse("search  Madison Square ").unwrap(),
            Command::Dispatch(AppAction::Search {
                text: "Madison Square".to_string()
            })
        );
    }

    #[test]
    fn category_accepts_all_and_plurals() {
        assert_eq!(
            parse("category all").unwrap(),
            Command::Dispatch(AppAction::FilterCategory { category: None })
        );
        assert_eq!(
            parse("category Musicals").unwrap(),
            Command::Dispatch(AppAction::FilterCategory {
                category: Some(Category::Musical)
            })
        );
        assert!(matches!(parse("category ballet"), Err(CommandError::Category(_))));
    }

    #[test]
    fn showtimes_are_numbered_from_one() {
        assert_eq!(
            parse("showtime 2").unwrap(),
            booking(BookingAction::SelectShowTime {
                showtime_id: ShowTimeId::new(1)
            })
        );
        assert!(matches!(parse("showtime 0"), Err(CommandError::InvalidArgument { .. })));
        assert!(matches!(parse("showtime"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn quantity_range_is_left_to_the_reducer() {
        assert_eq!(
            parse("qty 9").unwrap(),
            booking(BookingAction::SetQuantity { quantity: 9 })
        );
        assert_eq!(
            parse("qty 300").unwrap(),
            booking(BookingAction::SetQuantity { quantity: 300 })
        );
        assert!(matches!(parse("qty lots"), Err(CommandError::InvalidArgument { .. })));
    }

    #[test]
    fn seat_commands_parse_seat_ids() {
        let seat_id: SeatId = "Orchestra-A-1".parse().unwrap();
        assert_eq!(parse("seat orchestra-a-1").unwrap(), booking(BookingAction::ToggleSeat { seat_id }));
        assert_eq!(
            parse("hover none").unwrap(),
            booking(BookingAction::HoverSeat { seat_id: None })
        );
        assert!(matches!(parse("seat Lobby-Z-99"), Err(CommandError::Seat(_))));
    }

    #[test]
    fn back_names_a_step() {
        assert_eq!(
            parse("back quantity").unwrap(),
            booking(BookingAction::GoBack { to: StepKind::Quantity })
        );
        assert!(matches!(parse("back lobby"), Err(CommandError::InvalidArgument { .. })));
    }

    #[test]
    fn set_takes_the_rest_of_the_line_as_value() {
        assert_eq!(
            parse("set card 4242 4242 4242 4242").unwrap(),
            checkout(CheckoutAction::UpdateField {
                field: FormField::CardNumber,
                value: "4242 4242 4242 4242".to_string(),
            })
        );
        assert!(matches!(parse("set card"), Err(CommandError::Usage(_))));
        assert!(matches!(parse("set shoe 9"), Err(CommandError::InvalidArgument { .. })));
    }

    #[test]
    fn unknown_words_are_reported() {
        assert_eq!(
            parse("dance").unwrap_err().to_string(),
            "Unknown command \"dance\" (type `help` for a list)"
        );
    }
}
