use geo::GeodesicDistance;
use geo_types::Point;

use crate::types::track::TrackPoint;

/// Geodesic distance in metres between two track points on the WGS84
/// ellipsoid (Karney's inverse solution).
pub fn geodesic_distance(from: &TrackPoint, to: &TrackPoint) -> f64 {
    Point::from(from).geodesic_distance(&Point::from(to))
}

impl From<&TrackPoint> for Point<f64> {
    fn from(point: &TrackPoint) -> Self {
        Point::new(point.lon, point.lat)
    }
}
