//! Device position acquisition and conversion into nearby zip codes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;

use crate::domain::location::{BoundingBox, Coordinates};
use crate::dto::api::LocationSearchQuery;
use crate::models::config::GeolocationConfig;
use crate::repository::LocationReader;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("position request timed out")]
    Timeout,
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("no zip codes found near the current position")]
    NoNearbyLocations,
    #[error("location service error: {0}")]
    Service(String),
}

impl GeolocationError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access denied. Please enable location permissions."
            }
            GeolocationError::PositionUnavailable => "Location information is unavailable.",
            GeolocationError::Timeout => "Location request timed out. Please try again.",
            GeolocationError::Unsupported => "Geolocation is not supported on this device.",
            GeolocationError::NoNearbyLocations => "No nearby locations found.",
            GeolocationError::Service(_) => "Failed to find nearby locations. Please try again.",
        }
    }
}

/// Options of a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

/// Source of the device position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// Reports a preconfigured position, or `Unsupported` when none is set.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}

/// Wraps a geolocator and reuses its last fix while younger than the
/// requested maximum age.
pub struct CachedGeolocator<G> {
    inner: G,
    last_fix: Mutex<Option<(Coordinates, Instant)>>,
}

impl<G: Geolocator> CachedGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            last_fix: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<G: Geolocator> Geolocator for CachedGeolocator<G> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        let cached = *self.last_fix.lock();
        if let Some((position, taken_at)) = cached {
            if taken_at.elapsed() <= options.maximum_age {
                return Ok(position);
            }
        }

        let position = self.inner.current_position(options).await?;
        *self.last_fix.lock() = Some((position, Instant::now()));
        Ok(position)
    }
}

/// Tuning of the nearby lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySettings {
    pub position: PositionOptions,
    pub box_degrees: f64,
    pub max_zip_codes: usize,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            position: PositionOptions::default(),
            box_degrees: 0.5,
            max_zip_codes: 100,
        }
    }
}

impl From<&GeolocationConfig> for NearbySettings {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            position: PositionOptions {
                timeout: Duration::from_secs(config.timeout_secs),
                maximum_age: Duration::from_secs(config.maximum_age_secs),
            },
            box_degrees: config.box_degrees,
            max_zip_codes: config.max_zip_codes,
        }
    }
}

/// Turns the device position into the zip codes of the surrounding area.
pub struct NearbyResolver<R: ?Sized, G: ?Sized> {
    repo: Arc<R>,
    geolocator: Arc<G>,
    settings: NearbySettings,
}

impl<R, G> NearbyResolver<R, G>
where
    R: LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    pub fn new(repo: Arc<R>, geolocator: Arc<G>, settings: NearbySettings) -> Self {
        Self {
            repo,
            geolocator,
            settings,
        }
    }

    /// Resolves zip codes around the current position.
    ///
    /// Returns an empty list when the service knows no locations in the box;
    /// the caller decides whether that counts as a failure.
    pub async fn resolve(&self) -> Result<Vec<String>, GeolocationError> {
        let options = self.settings.position;
        let position = tokio::time::timeout(
            options.timeout,
            self.geolocator.current_position(&options),
        )
        .await
        .map_err(|_| GeolocationError::Timeout)??;

        log::debug!(
            "Resolving zip codes around {:.4},{:.4}",
            position.latitude,
            position.longitude
        );

        let query = LocationSearchQuery {
            geo_bounding_box: BoundingBox::around(position, self.settings.box_degrees),
            size: self.settings.max_zip_codes,
        };
        let locations = self.repo.search_locations(&query).await.map_err(|err| {
            log::error!("Location search failed: {err}");
            GeolocationError::Service(err.to_string())
        })?;

        let mut zip_codes: Vec<String> = Vec::with_capacity(locations.len());
        for location in locations {
            if zip_codes.len() == self.settings.max_zip_codes {
                break;
            }
            if !zip_codes.contains(&location.zip_code) {
                zip_codes.push(location.zip_code);
            }
        }

        log::info!("Found {} nearby zip codes", zip_codes.len());
        Ok(zip_codes)
    }
}
