//! Validation of raw position readings.
//!
//! Only missing, non-finite and out-of-range coordinates are rejected. There
//! is no plausibility filtering (speed or jump detection): any range-valid
//! reading is accepted as-is.

use std::fmt;

use crate::models::{PositionSample, RawPosition};

/// Why a raw reading was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingCoordinate,
    NonFinite,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::MissingCoordinate => "missing coordinate",
            Rejection::NonFinite => "non-finite coordinate",
            Rejection::LatitudeOutOfRange => "latitude out of range",
            Rejection::LongitudeOutOfRange => "longitude out of range",
        };
        f.write_str(reason)
    }
}

pub fn accept(raw: &RawPosition) -> Result<PositionSample, Rejection> {
    let (Some(latitude), Some(longitude)) = (raw.latitude, raw.longitude) else {
        return Err(Rejection::MissingCoordinate);
    };

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(Rejection::NonFinite);
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Rejection::LatitudeOutOfRange);
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Rejection::LongitudeOutOfRange);
    }

    Ok(PositionSample {
        latitude,
        longitude,
        captured_at_millis: raw.captured_at_millis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_reading() {
        let raw = RawPosition::new(-23.5505, -46.6333, 1_700_000_000_000);
        let sample = accept(&raw).unwrap();
        assert_eq!(sample.latitude, -23.5505);
        assert_eq!(sample.longitude, -46.6333);
        assert_eq!(sample.captured_at_millis, 1_700_000_000_000);
    }

    #[test]
    fn test_accepts_range_boundaries() {
        assert!(accept(&RawPosition::new(90.0, 180.0, 0)).is_ok());
        assert!(accept(&RawPosition::new(-90.0, -180.0, 0)).is_ok());
    }

    #[test]
    fn test_rejects_missing() {
        let raw = RawPosition {
            latitude: None,
            longitude: Some(1.0),
            captured_at_millis: 0,
        };
        assert_eq!(accept(&raw), Err(Rejection::MissingCoordinate));
        assert_eq!(
            accept(&RawPosition::default()),
            Err(Rejection::MissingCoordinate)
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            accept(&RawPosition::new(f64::NAN, 0.0, 0)),
            Err(Rejection::NonFinite)
        );
        assert_eq!(
            accept(&RawPosition::new(0.0, f64::INFINITY, 0)),
            Err(Rejection::NonFinite)
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            accept(&RawPosition::new(200.0, 0.0, 0)),
            Err(Rejection::LatitudeOutOfRange)
        );
        assert_eq!(
            accept(&RawPosition::new(-90.0001, 0.0, 0)),
            Err(Rejection::LatitudeOutOfRange)
        );
        assert_eq!(
            accept(&RawPosition::new(0.0, 180.5, 0)),
            Err(Rejection::LongitudeOutOfRange)
        );
    }

    #[test]
    fn test_does_not_filter_jumps() {
        // A teleport across the globe is range-valid and must pass.
        assert!(accept(&RawPosition::new(0.0, 0.0, 0)).is_ok());
        assert!(accept(&RawPosition::new(60.0, 170.0, 1)).is_ok());
    }
}
