//! `placebook` - persistence and state sync for a list of favorite places
//!
//! Places (a title, a photo, and a picked location with its address) are kept
//! in a local SQLite store and mirrored in an observable in-memory cache. The
//! [`sync`] module decides how the two are kept in step.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod place;
pub mod services;
pub mod storage;
pub mod sync;

pub use app::{App, Status};
pub use cache::{CacheSnapshot, PickSession, PlaceCache};
pub use config::Config;
pub use error::{Error, Result};
pub use form::{PlaceDraft, ValidationError};
pub use logging::init_logging;
pub use place::{Coordinates, Location, Place, PlaceId, PlaceInput};
pub use services::{Geocoder, GoogleGeocoder, ServiceError, StaticGeocoder};
pub use storage::PlaceStore;
pub use sync::{Activation, CreateOutcome, FailurePolicy, SyncState, Synchronizer};
