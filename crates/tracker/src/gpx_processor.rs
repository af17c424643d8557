use std::{io::BufReader, path::Path};

use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint, read};
use time::OffsetDateTime;

use crate::{
    errors::GpxError,
    models::{Coordinate, PositionSample},
};

/// A point read from a GPX track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub coordinate: Coordinate,
    pub time: Option<OffsetDateTime>,
}

pub struct GpxProcessor;

impl GpxProcessor {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<TrackPoint>, GpxError> {
        let file = std::fs::File::open(path)?;
        let gpx: Gpx = read(BufReader::new(file))?;
        Self::extract_points(&gpx)
    }

    pub fn read_bytes(content: &[u8]) -> Result<Vec<TrackPoint>, GpxError> {
        let gpx: Gpx = read(content)?;
        Self::extract_points(&gpx)
    }

    /// All points of all tracks and segments, flattened in file order.
    fn extract_points(gpx: &Gpx) -> Result<Vec<TrackPoint>, GpxError> {
        let points: Vec<TrackPoint> = gpx
            .tracks
            .iter()
            .flat_map(|track| &track.segments)
            .flat_map(|segment| &segment.points)
            .map(|waypoint| {
                let point = waypoint.point();
                TrackPoint {
                    coordinate: Coordinate::new(point.y(), point.x()),
                    time: waypoint.time.map(OffsetDateTime::from),
                }
            })
            .collect();

        if points.is_empty() {
            return Err(GpxError::NoPoints);
        }

        Ok(points)
    }

    /// Serializes a route as a single-segment GPX 1.1 track.
    pub fn write_route(route: &[PositionSample], name: &str) -> Result<Vec<u8>, GpxError> {
        let mut segment = TrackSegment::new();
        for sample in route {
            let mut waypoint = Waypoint::new(sample.coordinate().into());
            waypoint.time = OffsetDateTime::from_unix_timestamp_nanos(
                i128::from(sample.captured_at_millis) * 1_000_000,
            )
            .ok()
            .map(gpx::Time::from);
            segment.points.push(waypoint);
        }

        let mut track = Track::new();
        track.name = Some(name.to_string());
        track.segments.push(segment);

        let gpx = Gpx {
            version: GpxVersion::Gpx11,
            creator: Some("walk-tracker".to_string()),
            tracks: vec![track],
            ..Default::default()
        };

        let mut out = Vec::new();
        gpx::write(&gpx, &mut out).map_err(|e| GpxError::Write(e.to_string()))?;
        Ok(out)
    }
}
