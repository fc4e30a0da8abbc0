//! Application wiring.
//!
//! [`App`] owns the configuration, the place store, the synchronizer with its
//! cache, and the geocoder. It is built once at startup and every command
//! goes through it.
//!
//! Store initialization failure does not abort startup: it is logged, and
//! every operation that needs the store then fails with
//! [`Error::StoreUnavailable`].

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::PlaceDraft;
use crate::place::{Coordinates, Location, Place, PlaceId};
use crate::services::{self, Geocoder, GoogleGeocoder};
use crate::storage::PlaceStore;
use crate::sync::{Activation, CreateOutcome, FailurePolicy, SyncState, Synchronizer};

/// A snapshot of the application's state for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    /// Where the database lives (or would live).
    pub database_path: PathBuf,
    /// Whether the store opened successfully.
    pub store_available: bool,
    /// Number of stored places, if the store could be read.
    pub stored_places: Option<u64>,
    /// State of the in-memory cache.
    pub cache_state: SyncState,
    /// Configured failure policy.
    pub failure_policy: FailurePolicy,
    /// Whether reverse geocoding is configured.
    pub geocoding: bool,
}

/// The running application.
pub struct App {
    config: Config,
    store: Option<PlaceStore>,
    sync: Synchronizer,
    geocoder: Option<Box<dyn Geocoder>>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("sync", &self.sync)
            .field("geocoder", &self.geocoder.is_some())
            .finish()
    }
}

impl App {
    /// Start the application: open the store and set up geocoding.
    ///
    /// Never fails. A store that cannot be opened is logged and left out.
    #[must_use]
    pub fn start(config: Config) -> Self {
        let path = config.database_path();
        let store = match PlaceStore::open(&path) {
            Ok(store) => Some(store),
            Err(err) => {
                error!("Failed to initialize place store at {}: {}", path.display(), err);
                None
            }
        };

        let geocoder: Option<Box<dyn Geocoder>> = if config.has_api_key() {
            match GoogleGeocoder::new(&config.maps) {
                Ok(geocoder) => Some(Box::new(geocoder)),
                Err(err) => {
                    warn!("Geocoding disabled: {}", err);
                    None
                }
            }
        } else {
            debug!("No maps API key configured; geocoding disabled");
            None
        };

        let mut app = Self::with_store(config, store);
        app.geocoder = geocoder;
        app
    }

    /// Build an application around an already opened store (or none).
    #[must_use]
    pub fn with_store(config: Config, store: Option<PlaceStore>) -> Self {
        let sync = Synchronizer::new(config.sync.failure_policy);
        Self {
            config,
            store,
            sync,
            geocoder: None,
        }
    }

    /// Replace the geocoder.
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The synchronizer and, through it, the cache.
    #[must_use]
    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    /// The place store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the store failed to open at startup.
    pub fn store(&self) -> Result<&PlaceStore> {
        self.store.as_ref().ok_or(Error::StoreUnavailable)
    }

    /// Activate the listing view and return what it should display.
    ///
    /// # Errors
    ///
    /// Fails if the store is unavailable, or per the failure policy.
    pub fn list(&self) -> Result<Activation> {
        self.sync.activate(self.store()?)
    }

    /// Create a place from form input.
    ///
    /// `picked` plays the role of a map pick: it goes through the cache's
    /// scratch value, which is cleared again before this returns. Without an
    /// explicit `address` the picked coordinates are reverse geocoded; a
    /// failed lookup leaves the location unset and validation rejects it.
    ///
    /// # Errors
    ///
    /// Fails if the store is unavailable, the draft is invalid, or the write
    /// fails under [`FailurePolicy::Surface`].
    pub async fn add(
        &self,
        title: impl Into<String>,
        image_uri: impl Into<String>,
        picked: Option<Coordinates>,
        address: Option<String>,
    ) -> Result<CreateOutcome> {
        let store = self.store()?;
        let cache = self.sync.cache();

        let location = {
            let mut pick = cache.begin_pick();
            if let Some(coordinates) = picked {
                cache.set_picked_location(coordinates);
            }
            match (pick.take(), address) {
                (Some(coordinates), Some(address)) => Some(Location::new(coordinates, address)),
                (Some(coordinates), None) => self.resolve(coordinates).await,
                (None, _) => None,
            }
        };

        let draft = PlaceDraft::new()
            .title(title)
            .image_uri(image_uri)
            .location(location);
        self.sync.create(store, draft)
    }

    /// Look up a single stored place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaceNotFound`] if no place has this id.
    pub fn show(&self, id: PlaceId) -> Result<Place> {
        self.store()?
            .get(id)?
            .ok_or(Error::PlaceNotFound { id })
    }

    /// Static map preview URL for a place.
    #[must_use]
    pub fn preview_url(&self, place: &Place) -> String {
        services::static_map_url(place.location.coordinates(), &self.config.maps)
    }

    /// Remove a place from the store and the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaceNotFound`] if the store had no such place (or,
    /// under [`FailurePolicy::Swallow`], the delete failed and was logged),
    /// or the store error under [`FailurePolicy::Surface`].
    pub fn remove(&self, id: PlaceId) -> Result<()> {
        if !self.sync.remove(self.store()?, id)? {
            return Err(Error::PlaceNotFound { id });
        }
        Ok(())
    }

    /// Current application status.
    #[must_use]
    pub fn status(&self) -> Status {
        let stored_places = self.store.as_ref().and_then(|store| match store.count() {
            Ok(count) => Some(count),
            Err(err) => {
                warn!("Could not count stored places: {}", err);
                None
            }
        });

        Status {
            database_path: self
                .store
                .as_ref()
                .map_or_else(|| self.config.database_path(), |s| s.path().to_path_buf()),
            store_available: self.store.is_some(),
            stored_places,
            cache_state: self.sync.cache().state(),
            failure_policy: self.sync.policy(),
            geocoding: self.geocoder.is_some(),
        }
    }

    /// Close the store, if one is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails to close.
    pub fn close(self) -> Result<()> {
        match self.store {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }

    async fn resolve(&self, coordinates: Coordinates) -> Option<Location> {
        match &self.geocoder {
            Some(geocoder) => services::resolve_location(geocoder.as_ref(), coordinates).await,
            None => {
                warn!("No geocoder configured; cannot resolve address for {}", coordinates);
                None
            }
        }
    }
}
