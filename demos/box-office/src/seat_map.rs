//! Seat map generation.
//!
//! Every venue uses the same layout: three sections of eight rows with twelve
//! seats each, stored section-major, then by row, then by seat number. Which
//! seats are already sold is drawn from a seeded generator, so a seed fully
//! determines the map a booking flow shows.

use crate::types::{Curtain, Event, Row, Seat, SeatId, SeatStatus, Section, ShowTime, ShowTimeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance that any given seat is already sold
pub const RESERVED_PROBABILITY: f64 = 0.3;

const SEATS_PER_ROW: usize = SeatId::SEATS_PER_ROW as usize;
const SEATS_PER_SECTION: usize = Row::COUNT as usize * SEATS_PER_ROW;

/// The seats of one performance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatMap {
    seats: Vec<Seat>,
}

impl SeatMap {
    /// Seats in the layout
    pub const CAPACITY: usize = Section::ALL.len() * SEATS_PER_SECTION;

    /// Lay out every seat, asking `is_reserved` for each one in layout order
    pub fn build<F>(mut is_reserved: F) -> Self
    where
        F: FnMut(&SeatId) -> bool,
    {
        let seats = Section::ALL
            .into_iter()
            .flat_map(|section| {
                Row::ALL.into_iter().flat_map(move |row| {
                    (1..=SeatId::SEATS_PER_ROW).map(move |number| SeatId::new(section, row, number))
                })
            })
            .map(|id| {
                let status = if is_reserved(&id) {
                    SeatStatus::Reserved
                } else {
                    SeatStatus::Available
                };
                Seat::new(id, status)
            })
            .collect();

        Self { seats }
    }

    /// Seat map for a seed
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        Self::generate_with(&mut StdRng::seed_from_u64(seed))
    }

    /// Seat map drawn from an existing generator
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        Self::build(|_| rng.gen_bool(RESERVED_PROBABILITY))
    }

    /// Map with nothing sold
    #[must_use]
    pub fn all_available() -> Self {
        Self::build(|_| false)
    }

    fn position(id: &SeatId) -> Option<usize> {
        let seat = usize::from(id.number).checked_sub(1)?;
        if seat >= SEATS_PER_ROW {
            return None;
        }
        Some(id.section.index() * SEATS_PER_SECTION + usize::from(id.row.index()) * SEATS_PER_ROW + seat)
    }

    /// Look up a seat
    #[must_use]
    pub fn get(&self, id: &SeatId) -> Option<&Seat> {
        Self::position(id)
            .and_then(|position| self.seats.get(position))
            .filter(|seat| seat.id == *id)
    }

    /// All seats in layout order
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// One row of one section, seat 1 first
    #[must_use]
    pub fn row(&self, section: Section, row: Row) -> &[Seat] {
        let start = section.index() * SEATS_PER_SECTION + usize::from(row.index()) * SEATS_PER_ROW;
        self.seats.get(start..start + SEATS_PER_ROW).unwrap_or_default()
    }

    /// Seats that can still be selected
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_available()).count()
    }

    /// Ids of sold seats, in layout order
    #[must_use]
    pub fn reserved_ids(&self) -> Vec<SeatId> {
        self.seats
            .iter()
            .filter(|seat| !seat.is_available())
            .map(|seat| seat.id)
            .collect()
    }
}

/// One showtime per catalog date
pub fn showtimes<R: Rng>(event: &Event, rng: &mut R) -> Vec<ShowTime> {
    event
        .dates
        .iter()
        .enumerate()
        .map(|(index, date)| ShowTime {
            id: ShowTimeId::new(index),
            date: date.clone(),
            time: Curtain::for_index(index),
            available_seats: rng.gen_range(20..70),
        })
        .collect()
}

/// Showtimes and seat map for one booking flow
///
/// Showtimes are drawn first, then the seats, from a single generator.
#[must_use]
pub fn draw(event: &Event, seed: u64) -> (Vec<ShowTime>, SeatMap) {
    let mut rng = StdRng::seed_from_u64(seed);
    let showtimes = showtimes(event, &mut rng);
    let seat_map = SeatMap::generate_with(&mut rng);
    (showtimes, seat_map)
}
