//! External map services.
//!
//! Reverse geocoding turns a coordinate pair into a human-readable address;
//! the static map preview is a URL the front end can show as a thumbnail.
//! Both talk to the Google Maps web APIs. Geocoding sits behind the
//! [`Geocoder`] trait so tests and offline use can swap in [`StaticGeocoder`].

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MapsConfig;
use crate::place::{Coordinates, Location};

/// Errors from external map services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No API key is configured.
    #[error("no maps API key configured (set maps.api_key or PLACEBOOK_MAPS__API_KEY)")]
    MissingApiKey,

    /// The HTTP request failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The API answered but reported an error.
    #[error("geocoding API returned {status}: {message}")]
    Api {
        /// API status string, e.g. `REQUEST_DENIED`.
        status: String,
        /// Error message from the API, if any.
        message: String,
    },

    /// The API found no address for the coordinates.
    #[error("no address found for these coordinates")]
    NoResults,

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reverse geocoding: coordinates in, formatted address out.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up the address for a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the lookup fails or finds nothing.
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, ServiceError>;
}

/// Geocoder backed by the Google Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Build a geocoder from the maps configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingApiKey`] if no key is configured, or an
    /// HTTP error if the client cannot be built.
    pub fn new(config: &MapsConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.geocode_endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, ServiceError> {
        debug!("Reverse geocoding {}", coordinates);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latlng", coordinates.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_geocode_response(&body)
    }
}

/// Geocoder that always answers with the same address.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    address: String,
}

impl StaticGeocoder {
    /// Create a geocoder that resolves every coordinate to `address`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<String, ServiceError> {
        Ok(self.address.clone())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// Extract the first formatted address from a Geocoding API response body.
///
/// # Errors
///
/// Returns [`ServiceError::Api`] for error statuses, [`ServiceError::NoResults`]
/// when nothing matched, and [`ServiceError::Decode`] for malformed JSON.
pub fn parse_geocode_response(body: &str) -> Result<String, ServiceError> {
    let response: GeocodeResponse = serde_json::from_str(body)?;

    match response.status.as_deref() {
        None | Some("OK" | "ZERO_RESULTS") => {}
        Some(status) => {
            return Err(ServiceError::Api {
                status: status.to_string(),
                message: response.error_message.unwrap_or_default(),
            });
        }
    }

    response
        .results
        .into_iter()
        .next()
        .map(|result| result.formatted_address)
        .ok_or(ServiceError::NoResults)
}

/// URL of a static map image centered on `coordinates` with a marker on it.
#[must_use]
pub fn static_map_url(coordinates: Coordinates, config: &MapsConfig) -> String {
    let Coordinates { lat, long } = coordinates;
    format!(
        "{endpoint}?center={lat},{long}&zoom={zoom}&size={width}x{height}&maptype={map_type}\
         &markers=color:red%7Clabel:S%7C{lat},{long}&key={key}",
        endpoint = config.static_map_endpoint,
        zoom = config.zoom,
        width = config.preview_width,
        height = config.preview_height,
        map_type = config.map_type,
        key = config.api_key.as_deref().unwrap_or_default(),
    )
}

/// Resolve picked coordinates into a full location.
///
/// A failed lookup is logged and yields `None`; the caller carries on
/// without a location instead of aborting.
pub async fn resolve_location(
    geocoder: &dyn Geocoder,
    coordinates: Coordinates,
) -> Option<Location> {
    match geocoder.reverse_geocode(coordinates).await {
        Ok(address) => Some(Location::new(coordinates, address)),
        Err(err) => {
            warn!("Could not resolve address for {}: {}", coordinates, err);
            None
        }
    }
}
