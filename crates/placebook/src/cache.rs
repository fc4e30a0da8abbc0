//! In-memory, observable mirror of the place store.
//!
//! [`PlaceCache`] keeps the list of places the presentation layer renders,
//! plus the transient map-pick scratch value. Every change is published on a
//! `tokio::sync::watch` channel so views can re-render when it fires. The
//! cache owns nothing durable: it can be dropped and rebuilt from the store.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::place::{Coordinates, Place, PlaceId};
use crate::sync::SyncState;

/// Everything the cache holds, as seen by subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    /// Cached places, in display order.
    pub places: Vec<Place>,
    /// Coordinates handed back by a map pick, if one is in flight.
    pub picked_location: Option<Coordinates>,
}

/// Observable cache of places.
#[derive(Debug)]
pub struct PlaceCache {
    tx: watch::Sender<CacheSnapshot>,
}

impl Default for PlaceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CacheSnapshot::default());
        Self { tx }
    }

    /// Subscribe to cache changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.tx.subscribe()
    }

    /// A copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        self.tx.borrow().clone()
    }

    /// A copy of the cached places.
    #[must_use]
    pub fn places(&self) -> Vec<Place> {
        self.tx.borrow().places.clone()
    }

    /// Look up a cached place by id.
    #[must_use]
    pub fn get(&self, id: PlaceId) -> Option<Place> {
        self.tx.borrow().places.iter().find(|p| p.id() == id).cloned()
    }

    /// Number of cached places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.borrow().places.len()
    }

    /// Whether no places are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().places.is_empty()
    }

    /// Which synchronization state the cache is in.
    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.is_empty() {
            SyncState::Empty
        } else {
            SyncState::Populated
        }
    }

    /// Replace the whole list in one step.
    ///
    /// If the input repeats an id, only the first occurrence is kept.
    pub fn replace_all(&self, places: Vec<Place>) {
        let mut seen = HashSet::with_capacity(places.len());
        let mut unique = Vec::with_capacity(places.len());
        for place in places {
            if seen.insert(place.id()) {
                unique.push(place);
            } else {
                warn!("Dropping duplicate place id {} from cache refresh", place.id());
            }
        }

        debug!("Replacing cache contents with {} places", unique.len());
        self.tx.send_modify(|snapshot| snapshot.places = unique);
    }

    /// Add a newly stored place to the end of the list.
    ///
    /// Returns `false` (and leaves the cache untouched) if the id is already cached.
    pub fn append(&self, place: Place) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.places.iter().any(|p| p.id() == place.id()) {
                warn!("Place {} is already cached; not appending", place.id());
                return false;
            }
            snapshot.places.push(place);
            true
        })
    }

    /// Overwrite the cached place that has the same id, keeping its position.
    ///
    /// Returns `false` (and leaves the cache untouched) if no cached place has that id.
    pub fn replace(&self, place: Place) -> bool {
        self.tx.send_if_modified(|snapshot| {
            match snapshot.places.iter_mut().find(|p| p.id() == place.id()) {
                Some(existing) => {
                    *existing = place;
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the place with the given id. No-op if absent.
    ///
    /// Returns `true` if a place was removed.
    pub fn remove(&self, id: PlaceId) -> bool {
        self.tx.send_if_modified(|snapshot| {
            match snapshot.places.iter().position(|p| p.id() == id) {
                Some(index) => {
                    snapshot.places.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Current map-pick scratch value.
    #[must_use]
    pub fn picked_location(&self) -> Option<Coordinates> {
        self.tx.borrow().picked_location
    }

    /// Store the result of a map pick.
    pub fn set_picked_location(&self, coordinates: Coordinates) {
        debug!("Map pick set to {}", coordinates);
        self.tx
            .send_modify(|snapshot| snapshot.picked_location = Some(coordinates));
    }

    /// Reset the map-pick scratch value.
    pub fn clear_picked_location(&self) {
        self.tx
            .send_if_modified(|snapshot| snapshot.picked_location.take().is_some());
    }

    /// Start a map-pick round trip on behalf of a consuming view.
    ///
    /// The returned session clears the scratch value when it is dropped.
    #[must_use]
    pub fn begin_pick(&self) -> PickSession<'_> {
        PickSession { cache: self }
    }
}

/// A consuming view's hold on the map-pick scratch value.
///
/// Dropping the session clears the value, whether or not it was used.
#[derive(Debug)]
pub struct PickSession<'a> {
    cache: &'a PlaceCache,
}

impl PickSession<'_> {
    /// Take the picked coordinates, if a pick has completed.
    pub fn take(&mut self) -> Option<Coordinates> {
        let mut taken = None;
        self.cache.tx.send_if_modified(|snapshot| {
            taken = snapshot.picked_location.take();
            taken.is_some()
        });
        taken
    }
}

impl Drop for PickSession<'_> {
    fn drop(&mut self) {
        self.cache.clear_picked_location();
    }
}
