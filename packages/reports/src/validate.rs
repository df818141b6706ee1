//! Report validation.
//!
//! Gates a [`CandidateReport`] before it reaches the store: required fields,
//! the hazard type enumeration, coordinate bounds, and the attribution
//! default.

use hazard_map_database_models::NewHazard;
use hazard_map_hazard_models::{
    ANONYMOUS_REPORTER, CandidateReport, CoordinateInput, HazardType, MAX_REPORTER_LENGTH,
    is_valid_latitude, is_valid_longitude,
};

use crate::ReportError;

/// Fields a report must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["type", "latitude", "longitude"];

/// Validates and normalizes a candidate report.
///
/// Checks run in order: missing fields, hazard type, coordinates,
/// attribution length. `reported_by` defaults to
/// [`ANONYMOUS_REPORTER`] when absent or blank.
///
/// # Errors
///
/// * [`ReportError::MissingField`] if `type`, `latitude`, or `longitude` is
///   absent or blank
/// * [`ReportError::InvalidType`] if `type` is not a known hazard type
/// * [`ReportError::InvalidCoordinates`] if a coordinate is non-numeric or
///   out of range
/// * [`ReportError::InvalidReporter`] if `reported_by` is too long
pub fn validate_report(candidate: &CandidateReport) -> Result<NewHazard, ReportError> {
    let hazard_type = candidate
        .hazard_type
        .as_deref()
        .filter(|t| !t.trim().is_empty());
    let latitude = candidate.latitude.as_ref().filter(|c| !c.is_blank());
    let longitude = candidate.longitude.as_ref().filter(|c| !c.is_blank());

    let (Some(hazard_type), Some(latitude), Some(longitude)) = (hazard_type, latitude, longitude)
    else {
        let missing = REQUIRED_FIELDS
            .into_iter()
            .zip([hazard_type.is_none(), latitude.is_none(), longitude.is_none()])
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
        return Err(ReportError::MissingField { missing });
    };

    let hazard_type = hazard_type
        .parse::<HazardType>()
        .map_err(|_| ReportError::InvalidType {
            value: hazard_type.to_string(),
            valid_types: HazardType::valid_names(),
        })?;

    let latitude = coordinate(latitude, "latitude")?;
    let longitude = coordinate(longitude, "longitude")?;

    if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
        return Err(ReportError::InvalidCoordinates {
            message: format!("({latitude}, {longitude}) is outside the valid range"),
        });
    }

    let reported_by = match candidate.reported_by.as_deref() {
        None => ANONYMOUS_REPORTER.to_string(),
        Some(name) if name.trim().is_empty() => ANONYMOUS_REPORTER.to_string(),
        Some(name) if name.chars().count() > MAX_REPORTER_LENGTH => {
            return Err(ReportError::InvalidReporter {
                max: MAX_REPORTER_LENGTH,
            });
        }
        Some(name) => name.to_string(),
    };

    Ok(NewHazard {
        hazard_type,
        latitude,
        longitude,
        reported_by,
    })
}

fn coordinate(input: &CoordinateInput, field: &str) -> Result<f64, ReportError> {
    input.to_f64().ok_or_else(|| ReportError::InvalidCoordinates {
        message: format!("{field} is not a number"),
    })
}
