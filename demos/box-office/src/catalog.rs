//! Event catalog: the ordered list of bookable events, with search.

use crate::error::CatalogError;
use crate::types::{Category, Event, EventId};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const DEMO_CATALOG: &str = include_str!("../data/catalog.json");

/// Browse filter: free-text search plus an optional category
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Case-insensitive substring of title, artist or venue
    pub text: String,
    /// Only this category, or all when `None`
    pub category: Option<Category>,
}

impl EventQuery {
    /// Whether `event` passes the filter
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.text.trim().to_lowercase();
        let text_matches = needle.is_empty()
            || [&event.title, &event.artist, &event.venue]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        let category_matches = self.category.is_none_or(|category| category == event.category);
        text_matches && category_matches
    }
}

/// Events available for booking, in display order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    /// Build a catalog, checking ids are unique and every event has a date
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] or [`CatalogError::NoDates`].
    pub fn from_events(events: Vec<Event>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(&event.id) {
                return Err(CatalogError::DuplicateId(event.id.clone()));
            }
            if event.dates.is_empty() {
                return Err(CatalogError::NoDates(event.id.clone()));
            }
        }
        Ok(Self { events })
    }

    /// Parse a JSON array of events
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or a validation
    /// error from [`Catalog::from_events`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let events: Vec<Event> = serde_json::from_str(json)?;
        Self::from_events(events)
    }

    /// Read a catalog file
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or any error
    /// from [`Catalog::from_json`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        debug!(path = %path.display(), events = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// The six built-in demo events
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is corrupt.
    pub fn demo() -> Result<Self, CatalogError> {
        Self::from_json(DEMO_CATALOG)
    }

    /// All events
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up an event
    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == *id)
    }

    /// Events passing `query`, in catalog order
    #[must_use]
    pub fn search(&self, query: &EventQuery) -> Vec<&Event> {
        self.events.iter().filter(|event| query.matches(event)).collect()
    }
}
