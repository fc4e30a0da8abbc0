//! Place form state and validation.
//!
//! A [`PlaceDraft`] collects what the user has entered so far. It only becomes
//! a [`PlaceInput`] once every field is present, which is the gate in front of
//! every store write.

use thiserror::Error;

use crate::place::{Coordinates, Location, PlaceInput};

/// Why a draft cannot be saved yet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The title is empty or only whitespace.
    #[error("a title is required")]
    MissingTitle,

    /// No image has been picked or captured.
    #[error("an image is required")]
    MissingImage,

    /// No location has been chosen.
    #[error("a location is required")]
    MissingLocation,

    /// A location was chosen but its address could not be resolved.
    #[error("the location has no address")]
    MissingAddress,

    /// Coordinates are out of range or not finite.
    #[error("invalid coordinates ({lat}, {long})")]
    InvalidCoordinates {
        /// Latitude that was supplied.
        lat: f64,
        /// Longitude that was supplied.
        long: f64,
    },
}

/// In-progress place form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDraft {
    title: String,
    image_uri: String,
    location: Option<Location>,
}

impl PlaceDraft {
    /// An empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the image handle returned by the camera or gallery.
    #[must_use]
    pub fn image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = image_uri.into();
        self
    }

    /// Set (or clear) the resolved location.
    #[must_use]
    pub fn location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Check the draft and turn it into a storable input.
    ///
    /// The title is trimmed; the image handle and address are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking title, image,
    /// location, address, then coordinate ranges.
    pub fn validate(self) -> Result<PlaceInput, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.image_uri.trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }
        let location = self.location.ok_or(ValidationError::MissingLocation)?;
        if location.address.trim().is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        let coordinates: Coordinates = location.coordinates();
        if !coordinates.is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                lat: coordinates.lat,
                long: coordinates.long,
            });
        }

        Ok(PlaceInput::new(title.to_string(), self.image_uri, location))
    }
}
