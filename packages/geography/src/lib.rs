#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flat-earth bounding-box calculation for radius searches.
//!
//! Converts a centre point and a radius in kilometres into the rectangular
//! latitude/longitude range used to pre-filter hazards in the store. The
//! approximation treats one degree of latitude as a constant 111 km and
//! scales longitude by the cosine of the centre latitude. It is not a
//! great-circle distance and over-selects near the box corners.

pub mod bbox;

use thiserror::Error;

/// Errors that can occur while resolving a search area.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// The centre latitude or longitude was not supplied.
    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    /// The centre point is not a valid WGS84 coordinate.
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of what went wrong.
        message: String,
    },

    /// The radius is not a positive, finite number of kilometres.
    #[error("Invalid radius: {message}")]
    InvalidRadius {
        /// Description of what went wrong.
        message: String,
    },
}
