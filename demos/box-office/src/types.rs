//! Domain types for the box office.
//!
//! Value objects shared by the catalog, the seat map, the booking flow and
//! checkout. Prices are integer cents throughout; nothing here does floating
//! point arithmetic on money.

use crate::error::{BookingError, SeatIdParseError, UnknownCategory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ============================================================================
// Money
// ============================================================================

/// An amount of money in cents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero cents
    pub const ZERO: Self = Self(0);

    /// Create from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create from whole dollars
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// `percent`% of this amount, rounded half up to the nearest cent
    #[must_use]
    pub const fn percent(self, percent: u64) -> Self {
        Self((self.0.saturating_mul(percent) + 50) / 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Catalog entities
// ============================================================================

/// Catalog identifier of an event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an `EventId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of performance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Concerts
    Concert,
    /// Musicals
    Musical,
    /// Opera
    Opera,
    /// Theater
    Theater,
}

impl Category {
    /// Every category, in menu order
    pub const ALL: [Self; 4] = [Self::Concert, Self::Musical, Self::Opera, Self::Theater];

    /// Lowercase name used in the catalog and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concert => "concert",
            Self::Musical => "musical",
            Self::Opera => "opera",
            Self::Theater => "theater",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let singular = name.strip_suffix('s').unwrap_or(&name);
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == name || category.as_str() == singular)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Advertised ticket price band, in whole dollars
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Cheapest ticket
    pub min: u64,
    /// Most expensive ticket
    pub max: u64,
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} - ${}", self.min, self.max)
    }
}

/// A bookable event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Catalog identifier
    pub id: EventId,
    /// Title
    pub title: String,
    /// Performer
    pub artist: String,
    /// Category
    pub category: Category,
    /// Venue name and city
    pub venue: String,
    /// Poster image
    pub image_url: String,
    /// Performance dates, in order
    pub dates: Vec<String>,
    /// Advertised price band
    pub price: PriceRange,
    /// Blurb
    pub description: String,
}

// ============================================================================
// Flows
// ============================================================================

/// Identifier of one booking flow, from opening an event to finishing checkout
///
/// Feedback actions carry the id of the flow that scheduled them; once a flow
/// is closed its id is never reused, so late feedback cannot land in a newer
/// flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(u64);

impl FlowId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id after this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flow-{}", self.0)
    }
}

// ============================================================================
// Showtimes
// ============================================================================

/// Identifier of a showtime within one booking flow (`show-<index>`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShowTimeId(usize);

impl ShowTimeId {
    /// Showtime at position `index` in the event's date list
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the event's date list
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ShowTimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "show-{}", self.0)
    }
}

/// Curtain time of a performance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curtain {
    /// 7:00 PM
    Evening,
    /// 2:00 PM
    Matinee,
}

impl Curtain {
    /// Even date indices play in the evening, odd ones in the afternoon
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Evening
        } else {
            Self::Matinee
        }
    }
}

impl fmt::Display for Curtain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evening => f.write_str("7:00 PM"),
            Self::Matinee => f.write_str("2:00 PM"),
        }
    }
}

/// One performance of an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowTime {
    /// Identifier
    pub id: ShowTimeId,
    /// Date, as listed in the catalog
    pub date: String,
    /// Curtain time
    pub time: Curtain,
    /// Advertised availability; display only
    pub available_seats: u32,
}

// ============================================================================
// Seats
// ============================================================================

/// Seating section
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Ground floor, nearest the stage
    Orchestra,
    /// First balcony
    Mezzanine,
    /// Upper balcony
    Balcony,
}

impl Section {
    /// Every section, front to back
    pub const ALL: [Self; 3] = [Self::Orchestra, Self::Mezzanine, Self::Balcony];

    /// Price of a front-row seat in this section
    #[must_use]
    pub const fn base_price(self) -> Money {
        match self {
            Self::Orchestra => Money::from_dollars(150),
            Self::Mezzanine => Money::from_dollars(100),
            Self::Balcony => Money::from_dollars(75),
        }
    }

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orchestra => "Orchestra",
            Self::Mezzanine => "Mezzanine",
            Self::Balcony => "Balcony",
        }
    }

    /// Position front to back
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Orchestra => 0,
            Self::Mezzanine => 1,
            Self::Balcony => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row within a section, `A` (front) to `H` (back)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row(u8);

impl Row {
    /// Rows per section
    pub const COUNT: u8 = 8;

    /// Every row, front to back
    pub const ALL: [Self; 8] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    /// Row at `index` (0 = `A`)
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Row from its letter, case-insensitive
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        let letter = letter.to_ascii_uppercase();
        if letter.is_ascii_uppercase() {
            Self::new(letter as u8 - b'A')
        } else {
            None
        }
    }

    /// Distance from the front row
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Row letter
    #[must_use]
    pub const fn letter(self) -> char {
        (b'A' + self.0) as char
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Seat address, displayed as `Section-Row-Number` (e.g. `Orchestra-A-1`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatId {
    /// Section
    pub section: Section,
    /// Row
    pub row: Row,
    /// Seat number, starting at 1
    pub number: u8,
}

impl SeatId {
    /// Seats per row
    pub const SEATS_PER_ROW: u8 = 12;

    /// Create a seat id
    #[must_use]
    pub const fn new(section: Section, row: Row, number: u8) -> Self {
        Self {
            section,
            row,
            number,
        }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.section, self.row, self.number)
    }
}

impl FromStr for SeatId {
    type Err = SeatIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SeatIdParseError(s.to_string());

        let mut parts = s.trim().split('-');
        let (Some(section), Some(row), Some(number), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let section = Section::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(section))
            .ok_or_else(invalid)?;

        let mut letters = row.chars();
        let row = match (letters.next(), letters.next()) {
            (Some(letter), None) => Row::from_letter(letter).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };

        let number: u8 = number.parse().map_err(|_| invalid())?;
        if !(1..=Self::SEATS_PER_ROW).contains(&number) {
            return Err(invalid());
        }

        Ok(Self::new(section, row, number))
    }
}

/// Availability of a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeatStatus {
    /// Can be selected
    Available,
    /// Already sold
    Reserved,
}

/// A seat on the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seat {
    /// Address
    pub id: SeatId,
    /// Ticket price
    pub price: Money,
    /// Availability
    pub status: SeatStatus,
}

impl Seat {
    /// Create a seat priced by its section and row
    #[must_use]
    pub fn new(id: SeatId, status: SeatStatus) -> Self {
        let discount = Money::from_dollars(5 * u64::from(id.row.index()));
        let price = Money::from_cents(id.section.base_price().cents().saturating_sub(discount.cents()));
        Self { id, price, status }
    }

    /// Section
    #[must_use]
    pub const fn section(&self) -> Section {
        self.id.section
    }

    /// Row
    #[must_use]
    pub const fn row(&self) -> Row {
        self.id.row
    }

    /// Seat number
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.id.number
    }

    /// Whether the seat can be selected
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }
}

// ============================================================================
// Booking values
// ============================================================================

/// Number of tickets being booked, always in `[1, 8]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketQuantity(u8);

impl TicketQuantity {
    /// Smallest quantity
    pub const MIN: u8 = 1;

    /// Largest quantity
    pub const MAX: u8 = 8;

    /// One-tap quantities offered next to the stepper
    pub const QUICK_PICKS: [u8; 4] = [1, 2, 4, 6];

    /// Create a quantity
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::QuantityOutOfRange`] outside `[1, 8]`.
    pub fn new(quantity: u32) -> Result<Self, BookingError> {
        u8::try_from(quantity)
            .ok()
            .filter(|q| (Self::MIN..=Self::MAX).contains(q))
            .map(Self)
            .ok_or(BookingError::QuantityOutOfRange {
                requested: quantity,
            })
    }

    /// The quantity
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// As a seat count
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// One more, capped at [`Self::MAX`]
    #[must_use]
    pub const fn incremented(self) -> Self {
        if self.0 < Self::MAX { Self(self.0 + 1) } else { self }
    }

    /// One fewer, floored at [`Self::MIN`]
    #[must_use]
    pub const fn decremented(self) -> Self {
        if self.0 > Self::MIN { Self(self.0 - 1) } else { self }
    }
}

impl Default for TicketQuantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for TicketQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A completed seat selection, handed from the booking flow to checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingData {
    /// Event being booked
    pub event: Event,
    /// Chosen performance
    pub showtime: ShowTime,
    /// Chosen seats, in selection order
    pub seats: Vec<Seat>,
    /// Sum of the seat prices, before fees
    pub total: Money,
}

impl BookingData {
    /// Bundle a selection, computing its total
    #[must_use]
    pub fn new(event: Event, showtime: ShowTime, seats: Vec<Seat>) -> Self {
        let total = seats.iter().map(|seat| seat.price).sum();
        Self {
            event,
            showtime,
            seats,
            total,
        }
    }

    /// Comma-separated seat ids
    #[must_use]
    pub fn seat_list(&self) -> String {
        self.seats
            .iter()
            .map(|seat| seat.id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Price breakdown shown during checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderSummary {
    /// Seat prices
    pub subtotal: Money,
    /// Service fee
    pub service_fee: Money,
    /// Amount charged
    pub total: Money,
}

impl OrderSummary {
    /// Service fee as a percentage of the subtotal
    pub const SERVICE_FEE_PERCENT: u64 = 10;

    /// Breakdown for a subtotal
    #[must_use]
    pub fn from_subtotal(subtotal: Money) -> Self {
        let service_fee = subtotal.percent(Self::SERVICE_FEE_PERCENT);
        Self {
            subtotal,
            service_fee,
            total: subtotal + service_fee,
        }
    }

    /// Breakdown for a booking
    #[must_use]
    pub fn for_booking(booking: &BookingData) -> Self {
        Self::from_subtotal(booking.total)
    }
}
