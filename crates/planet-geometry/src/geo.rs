//! Geographic coordinate helpers.
//!
//! Cartesian space is Y-up: latitude is measured from the XZ plane toward
//! +Y, longitude from +X toward +Z. Angular formulas (haversine distance,
//! bearing, destination) follow the usual great-circle navigation math.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::angle;

/// A point given by longitude, latitude (radians) and distance from center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    pub lon: f32,
    pub lat: f32,
    pub height: f32,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lon: f32, lat: f32, height: f32) -> Self {
        Self { lon, lat, height }
    }

    /// Build from longitude/latitude in degrees.
    #[must_use]
    pub fn from_degrees(lon: f32, lat: f32, height: f32) -> Self {
        Self::new(lon.to_radians(), lat.to_radians(), height)
    }

    /// Point reflected through `center`, component-wise.
    #[must_use]
    pub fn mirrored_around(self, center: Self) -> Self {
        Self {
            lon: 2.0 * center.lon - self.lon,
            lat: 2.0 * center.lat - self.lat,
            height: 2.0 * center.height - self.height,
        }
    }

    /// Cartesian position of this point.
    #[must_use]
    pub fn to_cartesian(self) -> Vec3 {
        geo_to_cartesian(self.lon, self.lat, self.height)
    }
}

/// Convert geographic coordinates to a cartesian position.
#[must_use]
pub fn geo_to_cartesian(lon: f32, lat: f32, radius: f32) -> Vec3 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Vec3::new(
        cos_lat * radius * cos_lon,
        sin_lat * radius,
        cos_lat * radius * sin_lon,
    )
}

/// Convert a cartesian position to geographic coordinates.
///
/// Longitude is in `(-π, π]`; `height` is the distance from the origin.
#[must_use]
pub fn cartesian_to_geo(v: Vec3) -> GeoPoint {
    GeoPoint {
        lon: v.z.atan2(v.x),
        lat: v.y.atan2(v.x.hypot(v.z)),
        height: v.length(),
    }
}

/// Angular great-circle distance between two points (haversine).
#[must_use]
pub fn distance(from: GeoPoint, to: GeoPoint) -> f32 {
    let half_lat = ((to.lat - from.lat) / 2.0).sin();
    let half_lon = ((to.lon - from.lon) / 2.0).sin();
    let a = (half_lat * half_lat + half_lon * half_lon * from.lat.cos() * to.lat.cos())
        .clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from `from` to `to`, in `[0, 2π)`.
#[must_use]
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f32 {
    let lon_delta = to.lon - from.lon;
    let y = lon_delta.sin() * to.lat.cos();
    let x = from.lat.cos() * to.lat.sin() - from.lat.sin() * to.lat.cos() * lon_delta.cos();
    angle::normalize(y.atan2(x))
}

/// Point reached by travelling `length` along a great circle of `radius`
/// starting at `start` with the given initial `bearing`.
///
/// The returned longitude is normalized to `[-π, π)`; `height` is `radius`.
#[must_use]
pub fn destination(start: GeoPoint, length: f32, bearing: f32, radius: f32) -> GeoPoint {
    let dist = length / radius;
    let (sin_lat, cos_lat) = start.lat.sin_cos();
    let (sin_dist, cos_dist) = dist.sin_cos();
    let (sin_bear, cos_bear) = bearing.sin_cos();

    let lat = (sin_lat * cos_dist + cos_lat * sin_dist * cos_bear)
        .clamp(-1.0, 1.0)
        .asin();
    let lon = start.lon + (sin_bear * sin_dist * cos_lat).atan2(cos_dist - sin_lat * lat.sin());

    GeoPoint {
        lon: (lon + 3.0 * PI).rem_euclid(TAU) - PI,
        lat,
        height: radius,
    }
}

/// Bearing of the move from cartesian `from` to cartesian `to`.
#[must_use]
pub fn bearing_between_points(from: Vec3, to: Vec3) -> f32 {
    bearing(cartesian_to_geo(from), cartesian_to_geo(to))
}

/// Project geographic coordinates onto a polar disc centred on a pole.
///
/// The disc is centred on the north pole when `target_north` is set and on
/// the south pole otherwise. Points in the target hemisphere land at radius
/// `[0, 1]`, points in the opposite hemisphere at `[1, 2]`, so a spline laid
/// over the disc never has to cross the longitude seam.
///
/// # Panics
///
/// Panics if `lon` is outside `[0, 2π]` or `lat` outside `[-π/2, π/2]`.
#[must_use]
pub fn geo_to_spheric(lon: f32, lat: f32, target_north: bool) -> Vec2 {
    assert!(
        (0.0..=TAU).contains(&lon),
        "failed to convert geo to spheric, wrong longitude: lon={lon:.2}"
    );
    assert!(
        (-FRAC_PI_2..=FRAC_PI_2).contains(&lat),
        "failed to convert geo to spheric, wrong latitude: lat={lat:.2}"
    );

    let is_north = lat >= 0.0;
    let lat = lat.abs();
    let radius = if is_north == target_north {
        1.0 - lat.sin()
    } else {
        1.0 + lat.sin()
    };

    let (sin_lon, cos_lon) = lon.sin_cos();
    Vec2::new(cos_lon, sin_lon) * radius
}

/// Inverse of [`geo_to_spheric`]. Returns `(lon, lat)` with `lon` in `(-π, π]`.
#[must_use]
pub fn spheric_to_geo(coord: Vec2, target_north: bool) -> (f32, f32) {
    let mut radius = (1.0 - coord.length()).clamp(-1.0, 1.0);
    if !target_north {
        radius = -radius;
    }
    let dir = coord.normalize_or_zero();
    (dir.y.atan2(dir.x), radius.asin())
}
