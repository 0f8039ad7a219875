//! Surface distance formulas
//!
//! Two ways of measuring the distance between two points on Earth's
//! surface: a spherical great-circle formula (fast, approximate) and an
//! ellipsoidal geodesic via Vincenty's inverse method (slower, accurate
//! to millimeters on the WGS84 ellipsoid). Callers pick per their
//! accuracy-vs-speed needs.

use crate::errors::{PatchError, PatchResult};
use super::point::Point;

/// IUGG mean Earth radius in meters, used by the spherical formula
const EARTH_MEAN_RADIUS: f64 = 6_371_009.0;

/// WGS84 semi-major axis in meters
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters
const WGS84_B: f64 = 6_356_752.314245;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Iteration cap for Vincenty's inverse method
const VINCENTY_MAX_ITERATIONS: usize = 200;
/// Convergence threshold for the longitude difference, radians
const VINCENTY_CONVERGENCE: f64 = 1e-12;

/// Selects the distance formula used for physical pixel sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMethod {
    /// Ellipsoidal distance on WGS84 (Vincenty inverse)
    Geodesic,
    /// Spherical distance on the mean-radius sphere (haversine)
    GreatCircle,
}

impl DistanceMethod {
    /// Parse a method name ("geodesic", "great-circle" or "gc")
    pub fn parse(name: &str) -> PatchResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "geodesic" => Ok(DistanceMethod::Geodesic),
            "great-circle" | "great_circle" | "gc" => Ok(DistanceMethod::GreatCircle),
            other => Err(PatchError::GenericError(format!(
                "Unknown distance method: {}",
                other
            ))),
        }
    }

    /// Name used in logs and CLI help
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMethod::Geodesic => "geodesic",
            DistanceMethod::GreatCircle => "great-circle",
        }
    }
}

/// Distance between two points with the chosen formula, in meters
///
/// Points carry (x=longitude, y=latitude) in degrees.
pub fn surface_distance(method: DistanceMethod, a: &Point, b: &Point) -> f64 {
    match method {
        DistanceMethod::Geodesic => geodesic(a, b),
        DistanceMethod::GreatCircle => great_circle(a, b),
    }
}

/// Great-circle (haversine) distance in meters
///
/// Treats the Earth as a sphere of mean radius; error stays below ~0.5%
/// which is adequate for pixel-size estimates.
pub fn great_circle(a: &Point, b: &Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_MEAN_RADIUS * c
}

/// Ellipsoidal geodesic distance in meters (Vincenty inverse method)
///
/// Iterates on the auxiliary sphere until the longitude difference
/// converges. Nearly antipodal point pairs can fail to converge; the
/// spherical result is returned in that case rather than an error, since
/// map sheet edges are far from antipodal.
pub fn geodesic(a: &Point, b: &Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let lon_diff = (b.x - a.x).to_radians();

    if (lat1 - lat2).abs() < f64::EPSILON && lon_diff.abs() < f64::EPSILON {
        return 0.0;
    }

    // Reduced latitudes on the auxiliary sphere
    let u1 = ((1.0 - WGS84_F) * lat1.tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = lon_diff;
    let mut iterations = 0;

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma == 0.0 {
            // Coincident points
            return 0.0;
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial line: cos^2(alpha) = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = lon_diff
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < VINCENTY_CONVERGENCE {
            break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
        }

        iterations += 1;
        if iterations >= VINCENTY_MAX_ITERATIONS {
            return great_circle(a, b);
        }
    };

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a_coef =
        1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b_coef = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let delta_sigma = b_coef
        * sin_sigma
        * (cos_2sigma_m
            + b_coef / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b_coef / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    WGS84_B * a_coef * (sigma - delta_sigma)
}
