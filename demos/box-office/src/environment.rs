//! Injected dependencies for the app shell.

use crate::checkout::CheckoutEnvironment;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies the seed for each booking flow's seat map
pub trait SeedSource: Send + Sync {
    /// Seed for the next flow
    fn next_seed(&self) -> u64;
}

/// Fresh entropy every time
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropySeeds;

impl SeedSource for EntropySeeds {
    fn next_seed(&self) -> u64 {
        rand::random()
    }
}

/// The same seed every time
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u64 {
        self.0
    }
}

/// `start`, `start + 1`, ... so a session replays exactly
#[derive(Debug)]
pub struct SequentialSeeds {
    next: AtomicU64,
}

impl SequentialSeeds {
    /// Start counting at `start`
    #[must_use]
    pub const fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl SeedSource for SequentialSeeds {
    fn next_seed(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Dependencies of [`AppReducer`](crate::app::AppReducer)
#[derive(Clone)]
pub struct AppEnvironment {
    /// Seeds for new booking flows
    pub seeds: Arc<dyn SeedSource>,
    /// Passed through to checkout
    pub checkout: CheckoutEnvironment,
}

impl AppEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(seeds: Arc<dyn SeedSource>, checkout: CheckoutEnvironment) -> Self {
        Self { seeds, checkout }
    }
}
