//! Core place types for placebook.
//!
//! A [`Place`] is a favorite location the user saved: a title, a photo handle,
//! and a [`Location`] (coordinates plus a reverse-geocoded address). Places
//! only exist once the store has assigned them a [`PlaceId`]; before that the
//! data travels as a [`PlaceInput`], which can only be produced by validating
//! a [`PlaceDraft`](crate::form::PlaceDraft).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a stored place, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlaceId(i64);

impl PlaceId {
    /// Wrap a rowid handed out by the store.
    pub(crate) fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlaceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A latitude/longitude pair, e.g. the result of a map pick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub long: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Whether both values are finite and inside the valid degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.long.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.long)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.long)
    }
}

/// Where a place is: coordinates plus a human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub long: f64,
    /// Address resolved from the coordinates.
    pub address: String,
}

impl Location {
    /// Create a location from coordinates and an address.
    #[must_use]
    pub fn new(coordinates: Coordinates, address: impl Into<String>) -> Self {
        Self {
            lat: coordinates.lat,
            long: coordinates.long,
            address: address.into(),
        }
    }

    /// The coordinate part of this location.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.long)
    }
}

/// A validated place that has not been stored yet.
///
/// Every field is present and non-empty; see
/// [`PlaceDraft::validate`](crate::form::PlaceDraft::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceInput {
    title: String,
    image_uri: String,
    location: Location,
}

impl PlaceInput {
    pub(crate) fn new(title: String, image_uri: String, location: Location) -> Self {
        Self {
            title,
            image_uri,
            location,
        }
    }

    /// The place title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Handle of the picked or captured image.
    #[must_use]
    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    /// The place location.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Attach the identity the store assigned to this input.
    pub(crate) fn into_place(self, id: PlaceId) -> Place {
        Place {
            id,
            title: self.title,
            image_uri: self.image_uri,
            location: self.location,
        }
    }
}

/// A stored favorite place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    id: PlaceId,
    /// User-supplied title.
    pub title: String,
    /// Handle/path of the place photo.
    pub image_uri: String,
    /// Coordinates and address.
    pub location: Location,
}

impl Place {
    /// Rebuild a place from a stored row.
    pub(crate) fn from_parts(
        id: PlaceId,
        title: String,
        image_uri: String,
        location: Location,
    ) -> Self {
        Self {
            id,
            title,
            image_uri,
            location,
        }
    }

    /// The store-assigned identity.
    #[must_use]
    pub fn id(&self) -> PlaceId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe_input() -> PlaceInput {
        PlaceInput::new(
            "Cafe".to_string(),
            "file:///a.jpg".to_string(),
            Location::new(Coordinates::new(37.78, -122.43), "123 Main St"),
        )
    }

    #[test]
    fn test_place_id_display_and_parse() {
        let id = PlaceId::from_raw(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(" 42 ".parse::<PlaceId>().unwrap(), id);
        assert!("forty-two".parse::<PlaceId>().is_err());
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(37.78, -122.43).is_valid());
        assert!(Coordinates::new(90.0, 180.0).is_valid());
        assert!(Coordinates::new(-90.0, -180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_coordinates_display() {
        assert_eq!(Coordinates::new(40.7128, -74.006).to_string(), "40.7128,-74.006");
    }

    #[test]
    fn test_location_coordinates() {
        let location = Location::new(Coordinates::new(1.5, 2.5), "Somewhere");
        assert_eq!(location.coordinates(), Coordinates::new(1.5, 2.5));
        assert_eq!(location.address, "Somewhere");
    }

    #[test]
    fn test_into_place_keeps_fields() {
        let place = cafe_input().into_place(PlaceId::from_raw(1));

        assert_eq!(place.id(), PlaceId::from_raw(1));
        assert_eq!(place.title, "Cafe");
        assert_eq!(place.image_uri, "file:///a.jpg");
        assert_eq!(place.location.address, "123 Main St");
    }

    #[test]
    fn test_place_serialization_shape() {
        let place = cafe_input().into_place(PlaceId::from_raw(1));
        let json = serde_json::to_value(&place).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Cafe");
        assert_eq!(json["imageUri"], "file:///a.jpg");
        assert_eq!(json["location"]["lat"], 37.78);
        assert_eq!(json["location"]["long"], -122.43);
        assert_eq!(json["location"]["address"], "123 Main St");
    }
}
