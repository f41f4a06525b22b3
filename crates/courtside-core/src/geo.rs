//! Region → spatial predicate, plus the in-process geometry the in-memory
//! store needs to evaluate it.
//!
//! Bounding boxes are plain lon/lat rectangles. Antimeridian wraparound is
//! not handled: corners are normalized to min/max the way `ST_MakeEnvelope`
//! does, so a box meant to cross the 180th meridian covers the opposite
//! span of longitudes instead.

use crate::locations::{BoundingBox, GeoPoint, Region};
use crate::search::Predicate;

pub const METERS_PER_MILE: f64 = 1609.344;

/// Mean earth radius (IUGG), the sphere PostGIS geography distances are
/// closest to.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

#[must_use]
pub fn region_predicate(region: &Region) -> Predicate {
    match region {
        Region::BoundingBox(bbox) => Predicate::WithinEnvelope(*bbox),
        Region::CenterPoint(cp) => Predicate::WithinDistance {
            center: cp.center,
            meters: miles_to_meters(cp.radius_miles),
        },
    }
}

/// Strictly inside the envelope, matching `ST_Within` for points.
#[must_use]
pub fn within_envelope(bbox: &BoundingBox, point: GeoPoint) -> bool {
    let (sw, ne) = (bbox.south_west, bbox.north_east);
    let (min_lon, max_lon) = (sw.longitude.min(ne.longitude), sw.longitude.max(ne.longitude));
    let (min_lat, max_lat) = (sw.latitude.min(ne.latitude), sw.latitude.max(ne.latitude));
    point.longitude > min_lon
        && point.longitude < max_lon
        && point.latitude > min_lat
        && point.latitude < max_lat
}

/// Great-circle distance in meters.
#[must_use]
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::CenterPoint;

    /// Point `miles` due north of `origin`.
    fn north_of(origin: GeoPoint, miles: f64) -> GeoPoint {
        let delta = (miles_to_meters(miles) / EARTH_RADIUS_METERS).to_degrees();
        GeoPoint::new(origin.latitude + delta, origin.longitude)
    }

    #[test]
    fn center_point_converts_miles_to_meters() {
        let region = Region::CenterPoint(CenterPoint {
            center: GeoPoint::new(40.0, -75.0),
            radius_miles: 5.0,
        });
        match region_predicate(&region) {
            Predicate::WithinDistance { meters, .. } => {
                assert!((meters - 8046.72).abs() < 1e-6);
            }
            other => panic!("unexpected predicate {other:?}"),
        }
    }

    #[test]
    fn radius_includes_4_9_and_excludes_5_1_miles() {
        let center = GeoPoint::new(40.0, -75.0);
        let region = Region::CenterPoint(CenterPoint {
            center,
            radius_miles: 5.0,
        });
        let predicate = region_predicate(&region);
        let Predicate::WithinDistance { meters, .. } = predicate else {
            panic!("expected distance predicate");
        };
        assert!(haversine_meters(center, north_of(center, 4.9)) <= meters);
        assert!(haversine_meters(center, north_of(center, 5.1)) > meters);
    }

    #[test]
    fn haversine_known_distance() {
        // Philadelphia City Hall to the Empire State Building, ~130 km.
        let phl = GeoPoint::new(39.9526, -75.1652);
        let esb = GeoPoint::new(40.7484, -73.9857);
        let d = haversine_meters(phl, esb);
        assert!((120_000.0..140_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn envelope_is_axis_aligned() {
        let bbox = BoundingBox {
            north_east: GeoPoint::new(41.0, -73.0),
            south_west: GeoPoint::new(40.0, -74.0),
        };
        assert!(within_envelope(&bbox, GeoPoint::new(40.5, -73.5)));
        assert!(!within_envelope(&bbox, GeoPoint::new(41.5, -73.5)));
        assert!(!within_envelope(&bbox, GeoPoint::new(40.5, -72.5)));
    }

    #[test]
    fn antimeridian_box_is_not_wrapped() {
        let bbox = BoundingBox {
            north_east: GeoPoint::new(10.0, -170.0),
            south_west: GeoPoint::new(-10.0, 170.0),
        };
        assert!(!within_envelope(&bbox, GeoPoint::new(0.0, 179.0)));
        assert!(!within_envelope(&bbox, GeoPoint::new(0.0, -179.0)));
        assert!(within_envelope(&bbox, GeoPoint::new(0.0, 0.0)));
    }
}
