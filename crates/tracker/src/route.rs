//! Incremental route and distance accumulation.

use geo::LineString;

use crate::{geodesy, models::PositionSample};

/// Owns the ordered samples of one session and the running distance over
/// them.
///
/// The route is append-only between resets, and `distance_km` always equals
/// the sum of [`geodesy::distance_km`] over consecutive samples, summed in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct RouteAccumulator {
    samples: Vec<PositionSample>,
    distance_km: f64,
}

impl RouteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.distance_km = 0.0;
    }

    /// Appends a sample, extending the running distance by the leg from the
    /// previous last sample. The first sample after a reset adds nothing.
    pub fn add(&mut self, sample: PositionSample) {
        self.distance_km += self
            .samples
            .last()
            .map_or(0.0, |prev| geodesy::distance_km(prev.coordinate(), sample.coordinate()));
        self.samples.push(sample);
    }

    pub fn current_distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn current_route(&self) -> &[PositionSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distance recomputed from scratch over the whole route.
    pub fn recomputed_distance_km(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| geodesy::distance_km(w[0].coordinate(), w[1].coordinate()))
            .fold(0.0, |acc, leg| acc + leg)
    }

    /// The route as a line string with x = longitude, y = latitude.
    pub fn line_string(&self) -> LineString<f64> {
        self.samples
            .iter()
            .map(|s| (s.longitude, s.latitude))
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn sample(latitude: f64, longitude: f64, captured_at_millis: i64) -> PositionSample {
        PositionSample {
            latitude,
            longitude,
            captured_at_millis,
        }
    }

    #[test]
    fn test_first_sample_adds_no_distance() {
        let mut route = RouteAccumulator::new();
        route.add(sample(12.0, 34.0, 0));
        assert_eq!(route.current_distance_km(), 0.0);
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn test_first_sample_after_reset_adds_no_distance() {
        let mut route = RouteAccumulator::new();
        route.add(sample(0.0, 0.0, 0));
        route.add(sample(0.0, 1.0, 1000));
        assert!(route.current_distance_km() > 100.0);

        route.reset();
        assert!(route.is_empty());
        assert_eq!(route.current_distance_km(), 0.0);

        route.add(sample(45.0, 45.0, 2000));
        assert_eq!(route.current_distance_km(), 0.0);
    }

    #[test]
    fn test_running_distance_matches_recomputation() {
        let mut route = RouteAccumulator::new();
        let points = [
            (40.0150, -105.2705),
            (40.0160, -105.2695),
            (40.0175, -105.2690),
            (40.0175, -105.2690),
            (40.0190, -105.2702),
            (40.0210, -105.2720),
            (39.9000, -105.1000),
        ];

        for (i, (lat, lon)) in points.into_iter().enumerate() {
            route.add(sample(lat, lon, i as i64 * 1000));
            assert_eq!(route.current_distance_km(), route.recomputed_distance_km());
        }
    }

    #[test]
    fn test_distance_is_monotonic() {
        let mut route = RouteAccumulator::new();
        let mut last = 0.0;
        for i in 0..50 {
            let lat = (i as f64 * 0.37).sin() * 0.01;
            let lon = (i as f64 * 0.11).cos() * 0.01;
            route.add(sample(lat, lon, i));
            assert!(route.current_distance_km() >= last);
            last = route.current_distance_km();
        }
    }

    #[test]
    fn test_route_preserves_insertion_order() {
        let mut route = RouteAccumulator::new();
        route.add(sample(1.0, 1.0, 30));
        route.add(sample(2.0, 2.0, 10));
        route.add(sample(3.0, 3.0, 20));

        let order: Vec<i64> = route
            .current_route()
            .iter()
            .map(|s| s.captured_at_millis)
            .collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[test]
    fn test_line_string_axis_order() {
        let mut route = RouteAccumulator::new();
        route.add(sample(10.0, 20.0, 0));
        route.add(sample(11.0, 21.0, 1));

        let line = route.line_string();
        let first = line.0[0];
        assert_eq!((first.x, first.y), (20.0, 10.0));
        assert_eq!(line.0.len(), 2);

        let p: geo::Point<f64> = Coordinate::new(10.0, 20.0).into();
        assert_eq!((p.x(), p.y()), (first.x, first.y));
    }
}
