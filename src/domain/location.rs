use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Rectangular search area accepted by the location service.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl BoundingBox {
    /// Builds a square box extending `degrees` in every direction from
    /// `center`, clamped to valid latitude and longitude ranges.
    pub fn around(center: Coordinates, degrees: f64) -> Self {
        let degrees = degrees.abs();
        Self {
            top: (center.latitude + degrees).min(90.0),
            bottom: (center.latitude - degrees).max(-90.0),
            left: (center.longitude - degrees).max(-180.0),
            right: (center.longitude + degrees).min(180.0),
        }
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.bottom..=self.top).contains(&point.latitude)
            && (self.left..=self.right).contains(&point.longitude)
    }
}

/// Location record returned by the location search endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub zip_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
}
