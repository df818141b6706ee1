//! Centre + radius to bounding box conversion.

use hazard_map_database_models::BoundingBox;
use hazard_map_hazard_models::{
    LATITUDE_RANGE, LONGITUDE_RANGE, is_valid_latitude, is_valid_longitude,
};

use crate::GeoError;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Search radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Computes the bounding box around `(center_lat, center_lng)` covering
/// `radius_km` in every direction.
///
/// Latitude bounds are clamped to `[-90, 90]`. When the longitude delta
/// reaches 180 degrees or more (at or near the poles, where
/// `cos(center_lat)` approaches zero) the box spans every longitude.
///
/// The inputs are expected to be valid; see [`SearchArea::new`] for the
/// checked entry point.
#[must_use]
pub fn bounding_box(center_lat: f64, center_lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let lng_delta = radius_km / (KM_PER_DEGREE * center_lat.to_radians().cos());

    let lat_min = (center_lat - lat_delta).max(*LATITUDE_RANGE.start());
    let lat_max = (center_lat + lat_delta).min(*LATITUDE_RANGE.end());

    if !lng_delta.is_finite() || lng_delta <= 0.0 || lng_delta >= 180.0 {
        log::debug!(
            "Longitude span unbounded at latitude {center_lat}, searching all longitudes"
        );
        return BoundingBox::new(
            lat_min,
            lat_max,
            *LONGITUDE_RANGE.start(),
            *LONGITUDE_RANGE.end(),
        );
    }

    BoundingBox::new(
        lat_min,
        lat_max,
        center_lng - lng_delta,
        center_lng + lng_delta,
    )
}

/// A validated radius search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    /// Centre latitude.
    pub center_lat: f64,
    /// Centre longitude.
    pub center_lng: f64,
    /// Radius in kilometres.
    pub radius_km: f64,
}

impl SearchArea {
    /// Validates a search centre and radius.
    ///
    /// `radius_km` defaults to [`DEFAULT_RADIUS_KM`].
    ///
    /// # Errors
    ///
    /// * [`GeoError::MissingCoordinates`] if either centre coordinate is
    ///   absent
    /// * [`GeoError::InvalidCoordinates`] if the centre is out of range
    /// * [`GeoError::InvalidRadius`] if the radius is not positive and finite
    pub fn new(
        center_lat: Option<f64>,
        center_lng: Option<f64>,
        radius_km: Option<f64>,
    ) -> Result<Self, GeoError> {
        let (Some(center_lat), Some(center_lng)) = (center_lat, center_lng) else {
            return Err(GeoError::MissingCoordinates);
        };

        if !is_valid_latitude(center_lat) || !is_valid_longitude(center_lng) {
            return Err(GeoError::InvalidCoordinates {
                message: format!("({center_lat}, {center_lng}) is outside the valid range"),
            });
        }

        let radius_km = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeoError::InvalidRadius {
                message: format!("{radius_km} km must be a positive number"),
            });
        }

        Ok(Self {
            center_lat,
            center_lng,
            radius_km,
        })
    }

    /// Parses query-string values into a [`SearchArea`].
    ///
    /// Absent or blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if a value is not numeric or fails the checks in
    /// [`SearchArea::new`].
    pub fn parse(
        lat: Option<&str>,
        lng: Option<&str>,
        radius: Option<&str>,
    ) -> Result<Self, GeoError> {
        let lat = parse_number(lat).map_err(|raw| GeoError::InvalidCoordinates {
            message: format!("latitude '{raw}' is not a number"),
        })?;
        let lng = parse_number(lng).map_err(|raw| GeoError::InvalidCoordinates {
            message: format!("longitude '{raw}' is not a number"),
        })?;
        let radius = parse_number(radius).map_err(|raw| GeoError::InvalidRadius {
            message: format!("'{raw}' is not a number"),
        })?;

        Self::new(lat, lng, radius)
    }

    /// Returns the bounding box for this search.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        bounding_box(self.center_lat, self.center_lng, self.radius_km)
    }
}

/// Parses an optional query value. Blank strings are treated as absent;
/// a value that does not parse is returned as the error.
fn parse_number(value: Option<&str>) -> Result<Option<f64>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| raw.to_string()),
    }
}
