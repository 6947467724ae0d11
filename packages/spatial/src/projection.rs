//! Transverse Mercator forward and inverse projection.
//!
//! Series expansions from Snyder, *Map Projections: A Working Manual*
//! (USGS PP 1395), pp. 61-64. Accurate to well below a millimeter within a
//! UTM zone.

use geo::Coord;

use crate::crs::{Crs, Ellipsoid, Hemisphere};

/// UTM central scale factor.
const K0: f64 = 0.9996;

/// UTM false easting in meters.
const FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing for southern-hemisphere zones in meters.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transforms a single coordinate from one frame to another.
///
/// Projected-to-projected transforms go through geographic coordinates.
#[must_use]
pub fn transform(coord: Coord<f64>, from: Crs, to: Crs) -> Coord<f64> {
    if from == to {
        return coord;
    }
    let lon_lat = to_geographic(coord, from);
    from_geographic(lon_lat, to)
}

fn to_geographic(coord: Coord<f64>, from: Crs) -> Coord<f64> {
    match from {
        Crs::Geographic => coord,
        Crs::Utm {
            zone,
            hemisphere,
            datum,
        } => inverse(coord, zone, hemisphere, datum.ellipsoid()),
    }
}

fn from_geographic(lon_lat: Coord<f64>, to: Crs) -> Coord<f64> {
    match to {
        Crs::Geographic => lon_lat,
        Crs::Utm {
            zone,
            hemisphere,
            datum,
        } => forward(lon_lat, zone, hemisphere, datum.ellipsoid()),
    }
}

/// Longitude of the central meridian of a UTM zone, in radians.
fn central_meridian(zone: u8) -> f64 {
    (f64::from(zone) * 6.0 - 183.0).to_radians()
}

const fn false_northing(hemisphere: Hemisphere) -> f64 {
    match hemisphere {
        Hemisphere::North => 0.0,
        Hemisphere::South => FALSE_NORTHING_SOUTH,
    }
}

/// Meridian arc length from the equator to latitude `phi`.
fn meridian_arc(phi: f64, a: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

#[allow(clippy::many_single_char_names, clippy::suboptimal_flops)]
fn forward(lon_lat: Coord<f64>, zone: u8, hemisphere: Hemisphere, ellipsoid: Ellipsoid) -> Coord<f64> {
    let a = ellipsoid.semi_major_m;
    let e2 = ellipsoid.eccentricity_sq();
    let ep2 = e2 / (1.0 - e2);

    let phi = lon_lat.y.to_radians();
    let lam = lon_lat.x.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let big_a = (lam - central_meridian(zone)) * cos_phi;
    let m = meridian_arc(phi, a, e2);

    let a2 = big_a * big_a;
    let a3 = a2 * big_a;
    let a4 = a3 * big_a;
    let a5 = a4 * big_a;
    let a6 = a5 * big_a;

    let x = K0
        * n
        * (big_a
            + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);
    let y = K0
        * (m + n
            * tan_phi
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

    Coord {
        x: x + FALSE_EASTING,
        y: y + false_northing(hemisphere),
    }
}

#[allow(clippy::many_single_char_names, clippy::suboptimal_flops)]
fn inverse(coord: Coord<f64>, zone: u8, hemisphere: Hemisphere, ellipsoid: Ellipsoid) -> Coord<f64> {
    let a = ellipsoid.semi_major_m;
    let e2 = ellipsoid.eccentricity_sq();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let m = (coord.y - false_northing(hemisphere)) / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
    let n1 = a / denom.sqrt();
    let r1 = a * (1.0 - e2) / denom.powf(1.5);
    let d = (coord.x - FALSE_EASTING) / (n1 * K0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);
    let lam = central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

    Coord {
        x: lam.to_degrees(),
        y: phi.to_degrees(),
    }
}
