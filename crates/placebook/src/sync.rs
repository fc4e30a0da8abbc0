//! Keeping the place cache in step with the store.
//!
//! The listing view calls [`Synchronizer::activate`] every time it becomes
//! active. The rule is asymmetric:
//!
//! | cache state | store read | displayed list      | cache afterwards |
//! |-------------|------------|---------------------|------------------|
//! | `Empty`     | `R`        | `R`                 | `R`              |
//! | `Populated` | `R`        | cache before read   | `R`              |
//!
//! A `Populated` cache therefore wins for one activation even when a place
//! was removed through another path; the next activation shows the store's
//! contents. Creating a place adds it to the cache under its stored id; no
//! re-read is forced.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::PlaceCache;
use crate::error::Result;
use crate::form::PlaceDraft;
use crate::place::{Place, PlaceId};
use crate::storage::PlaceStore;

/// Whether the cache has anything in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No places cached.
    Empty,
    /// At least one place cached.
    Populated,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Populated => write!(f, "populated"),
        }
    }
}

/// What to do when the store fails a read or a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the error to the caller.
    #[default]
    Surface,
    /// Log the error and carry on as if nothing happened: a failed read is
    /// shown as an empty read, a failed write as "not saved".
    Swallow,
}

/// Result of a listing-view activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Cache state when the activation started.
    pub prior_state: SyncState,
    /// The list the view should render.
    pub displayed: Vec<Place>,
    /// What the store returned, or `None` if the read failed and was swallowed.
    pub fresh: Option<Vec<Place>>,
}

/// Result of a create attempt that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// The place was stored and cached.
    Saved(Place),
    /// The store rejected the write and the failure was swallowed.
    NotSaved,
}

impl CreateOutcome {
    /// The saved place, if any.
    #[must_use]
    pub fn place(&self) -> Option<&Place> {
        match self {
            Self::Saved(place) => Some(place),
            Self::NotSaved => None,
        }
    }
}

/// Applies the synchronization rules between a [`PlaceStore`] and a [`PlaceCache`].
#[derive(Debug, Default)]
pub struct Synchronizer {
    cache: PlaceCache,
    policy: FailurePolicy,
}

impl Synchronizer {
    /// Create a synchronizer with an empty cache.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            cache: PlaceCache::new(),
            policy,
        }
    }

    /// The cache this synchronizer maintains.
    #[must_use]
    pub fn cache(&self) -> &PlaceCache {
        &self.cache
    }

    /// The configured failure policy.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the listing-view activation rule.
    ///
    /// # Errors
    ///
    /// Returns the store error if the read fails under [`FailurePolicy::Surface`].
    pub fn activate(&self, store: &PlaceStore) -> Result<Activation> {
        let prior_state = self.cache.state();
        let cached = self.cache.places();

        let fresh = self.absorb("read places", store.list_all())?;

        let displayed = match (prior_state, &fresh) {
            (SyncState::Populated, _) => cached,
            (SyncState::Empty, Some(read)) => read.clone(),
            (SyncState::Empty, None) => Vec::new(),
        };

        // A failed read carries no data, so it never overwrites the cache.
        if let Some(read) = &fresh {
            self.cache.replace_all(read.clone());
        }

        debug!(
            "Activation from {} cache: displaying {} places",
            prior_state,
            displayed.len()
        );
        Ok(Activation {
            prior_state,
            displayed,
            fresh,
        })
    }

    /// Validate a draft, store it, and add the stored place to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the draft is
    /// incomplete (nothing is written and the cache is untouched), or the store
    /// error under [`FailurePolicy::Surface`].
    pub fn create(&self, store: &PlaceStore, draft: PlaceDraft) -> Result<CreateOutcome> {
        let input = draft.validate()?;

        let Some(id) = self.absorb("save place", store.insert(&input))? else {
            return Ok(CreateOutcome::NotSaved);
        };

        let place = input.into_place(id);
        // The store may reuse the id of a row deleted behind the cache's back.
        if !self.cache.append(place.clone()) {
            warn!("Store reused id {}; replacing the stale cached place", id);
            self.cache.replace(place.clone());
        }
        info!("Saved place {} ({})", place.id(), place.title);
        Ok(CreateOutcome::Saved(place))
    }

    /// Delete a place from the store and then from the cache.
    ///
    /// Returns `true` if the store had the place.
    ///
    /// # Errors
    ///
    /// Returns the store error under [`FailurePolicy::Surface`].
    pub fn remove(&self, store: &PlaceStore, id: PlaceId) -> Result<bool> {
        let Some(deleted) = self.absorb("delete place", store.delete(id))? else {
            return Ok(false);
        };
        self.cache.remove(id);
        Ok(deleted)
    }

    /// Apply the failure policy to a store result.
    fn absorb<T>(&self, operation: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.policy {
                FailurePolicy::Surface => Err(err),
                FailurePolicy::Swallow => {
                    error!("Failed to {}: {}", operation, err);
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidationError;
    use crate::place::{Coordinates, Location};
    use crate::Error;

    fn draft(title: &str) -> PlaceDraft {
        PlaceDraft::new()
            .title(title)
            .image_uri(format!("file:///{title}.jpg"))
            .location(Some(Location::new(
                Coordinates::new(37.78, -122.43),
                "123 Main St",
            )))
    }

    fn store() -> PlaceStore {
        crate::logging::init_test_logging();
        PlaceStore::open_in_memory().expect("failed to create test store")
    }

    fn titles(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_empty_cache_adopts_fresh_read() {
        let store = store();
        store.insert(&draft("A").validate().unwrap()).unwrap();
        store.insert(&draft("B").validate().unwrap()).unwrap();
        let sync = Synchronizer::default();

        let activation = sync.activate(&store).unwrap();

        assert_eq!(activation.prior_state, SyncState::Empty);
        assert_eq!(titles(&activation.displayed), vec!["A", "B"]);
        assert_eq!(activation.fresh.as_deref(), Some(activation.displayed.as_slice()));
        assert_eq!(sync.cache().places(), activation.displayed);
    }

    #[test]
    fn test_empty_cache_adopts_empty_read() {
        let store = store();
        let sync = Synchronizer::default();

        let activation = sync.activate(&store).unwrap();

        assert_eq!(activation.prior_state, SyncState::Empty);
        assert!(activation.displayed.is_empty());
        assert_eq!(activation.fresh, Some(Vec::new()));
        assert_eq!(sync.cache().state(), SyncState::Empty);
    }

    #[test]
    fn test_populated_cache_wins_over_fresh_read() {
        let store = store();
        let sync = Synchronizer::default();
        sync.create(&store, draft("A")).unwrap();
        let b = sync.create(&store, draft("B")).unwrap();
        let cached = sync.cache().places();

        // Removed behind the cache's back.
        assert!(store.delete(b.place().unwrap().id()).unwrap());

        let activation = sync.activate(&store).unwrap();
        assert_eq!(activation.prior_state, SyncState::Populated);
        assert_eq!(activation.displayed, cached);
        assert_eq!(titles(activation.fresh.as_ref().unwrap()), vec!["A"]);

        // The fresh read still refreshed the cache for the next activation.
        assert_eq!(titles(&sync.cache().places()), vec!["A"]);
        let next = sync.activate(&store).unwrap();
        assert_eq!(titles(&next.displayed), vec!["A"]);
    }

    #[test]
    fn test_create_stores_and_appends() {
        let store = store();
        let sync = Synchronizer::default();
        let mut rx = sync.cache().subscribe();

        let outcome = sync.create(&store, draft("Cafe")).unwrap();
        let place = outcome.place().unwrap().clone();

        assert_eq!(place.id().get(), 1);
        assert_eq!(sync.cache().places(), vec![place.clone()]);
        assert_eq!(store.list_all().unwrap(), vec![place]);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_create_after_out_of_band_delete_replaces_reused_id() {
        let store = store();
        let sync = Synchronizer::default();
        sync.create(&store, draft("A")).unwrap();
        let b = sync.create(&store, draft("B")).unwrap();
        let b_id = b.place().unwrap().id();

        // Deleting the newest row lets SQLite reuse its rowid.
        assert!(store.delete(b_id).unwrap());
        let c = sync.create(&store, draft("C")).unwrap();
        let c = c.place().unwrap();

        assert_eq!(c.id(), b_id);
        assert_eq!(sync.cache().get(c.id()).as_ref(), Some(c));
        assert_eq!(titles(&sync.cache().places()), vec!["A", "C"]);
        assert_eq!(sync.cache().places(), store.list_all().unwrap());
    }

    #[test]
    fn test_create_ids_are_distinct_in_cache() {
        let store = store();
        let sync = Synchronizer::default();

        for i in 0..10 {
            sync.create(&store, draft(&format!("P{i}"))).unwrap();
        }

        let mut ids: Vec<PlaceId> = sync.cache().places().iter().map(Place::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_validation_gate() {
        let store = store();
        let sync = Synchronizer::default();
        sync.create(&store, draft("Existing")).unwrap();
        let before = sync.cache().snapshot();
        let mut rx = sync.cache().subscribe();

        let attempts = [
            (draft("Cafe").title(""), ValidationError::MissingTitle),
            (draft("Cafe").image_uri(""), ValidationError::MissingImage),
            (draft("Cafe").location(None), ValidationError::MissingLocation),
        ];
        for (attempt, expected) in attempts {
            let err = sync.create(&store, attempt).unwrap_err();
            assert!(matches!(err, Error::Validation(ref e) if *e == expected));
        }

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(sync.cache().snapshot(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_validation_gate_applies_under_swallow() {
        let store = store();
        let sync = Synchronizer::new(FailurePolicy::Swallow);

        let err = sync.create(&store, draft("").image_uri("")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_surface_policy_returns_read_error() {
        let store = store();
        store.break_schema_for_test();
        let sync = Synchronizer::new(FailurePolicy::Surface);

        let err = sync.activate(&store).unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn test_swallow_policy_treats_failed_read_as_empty() {
        let store = store();
        let sync = Synchronizer::new(FailurePolicy::Swallow);
        sync.create(&store, draft("Cached")).unwrap();
        store.break_schema_for_test();

        let activation = sync.activate(&store).unwrap();

        assert_eq!(activation.fresh, None);
        assert_eq!(titles(&activation.displayed), vec!["Cached"]);
        assert_eq!(titles(&sync.cache().places()), vec!["Cached"]);
    }

    #[test]
    fn test_swallow_policy_failed_read_on_empty_cache_displays_nothing() {
        let store = store();
        store.break_schema_for_test();
        let sync = Synchronizer::new(FailurePolicy::Swallow);

        let activation = sync.activate(&store).unwrap();
        assert!(activation.displayed.is_empty());
        assert_eq!(sync.cache().state(), SyncState::Empty);
    }

    #[test]
    fn test_failed_write_surface_vs_swallow() {
        let store = store();
        store.break_schema_for_test();

        let surfaced = Synchronizer::new(FailurePolicy::Surface);
        assert!(surfaced.create(&store, draft("Lost")).unwrap_err().is_persistence());
        assert!(surfaced.cache().is_empty());

        let swallowed = Synchronizer::new(FailurePolicy::Swallow);
        assert_eq!(
            swallowed.create(&store, draft("Lost")).unwrap(),
            CreateOutcome::NotSaved
        );
        assert!(swallowed.cache().is_empty());
    }

    #[test]
    fn test_remove_deletes_from_store_and_cache() {
        let store = store();
        let sync = Synchronizer::default();
        let a = sync.create(&store, draft("A")).unwrap();
        sync.create(&store, draft("B")).unwrap();
        let id = a.place().unwrap().id();

        assert!(sync.remove(&store, id).unwrap());
        assert!(store.get(id).unwrap().is_none());
        assert!(sync.cache().get(id).is_none());
        assert_eq!(sync.cache().len(), 1);

        assert!(!sync.remove(&store, id).unwrap());
    }

    #[test]
    fn test_sync_state_display() {
        assert_eq!(SyncState::Empty.to_string(), "empty");
        assert_eq!(SyncState::Populated.to_string(), "populated");
    }

    #[test]
    fn test_failure_policy_serde() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Surface);
        let json = serde_json::to_string(&FailurePolicy::Swallow).unwrap();
        assert_eq!(json, "\"swallow\"");
        let parsed: FailurePolicy = serde_json::from_str("\"surface\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Surface);
    }
}
