// src/evaluation/route.rs — Route distance over an ordered list of points
//
// Geodesic legs use Vincenty's inverse formula on the WGS-84 ellipsoid.
// Near-antipodal pairs where the iteration does not converge fall back to
// the spherical haversine distance.

use haversine::{distance, Location as HaversineLocation, Units};

use crate::core::types::{GeoPoint, RouteMetrics};
use crate::util::round2;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Ellipsoidal distance in kilometers, `None` when Vincenty fails to converge.
pub fn vincenty_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    let f = WGS84_F;
    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - prev).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let a = 1.0
                + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            let meters = WGS84_B * a * (sigma - delta_sigma);
            return Some(meters / 1000.0);
        }
    }
    None
}

/// Distance in kilometers between two points.
pub fn leg_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    vincenty_km(from.lat, from.lon, to.lat, to.lon).unwrap_or_else(|| {
        tracing::debug!(
            from = %from.name,
            to = %to.name,
            "vincenty did not converge, using haversine"
        );
        distance(
            HaversineLocation {
                latitude: from.lat,
                longitude: from.lon,
            },
            HaversineLocation {
                latitude: to.lat,
                longitude: to.lon,
            },
            Units::Kilometers,
        )
    })
}

/// Sum of consecutive legs in kilometers, rounded to 2 decimals. 0 for fewer than 2 points.
pub fn total_distance_km(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let total: f64 = points.windows(2).map(|w| leg_km(&w[0], &w[1])).sum();
    round2(total)
}

/// Distance plus km-per-place efficiency. `places_identified` of 0 counts as 1.
pub fn route_metrics(points: &[GeoPoint], places_identified: usize) -> RouteMetrics {
    let total_km = total_distance_km(points);
    RouteMetrics {
        total_km,
        point_count: points.len(),
        efficiency: round2(total_km / places_identified.max(1) as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manhattan() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new("Central Park", 40.785, -73.968),
            GeoPoint::new("The Met", 40.7794, -73.9632),
            GeoPoint::new("Empire State Building", 40.7484, -73.9857),
        ]
    }

    // ─── Vincenty ───────────────────────────────────────────────

    #[test]
    fn test_vincenty_reference_geodesic() {
        // Flinders Peak to Buninyong, the classic Vincenty worked example: 54 972.271 m
        let d = vincenty_km(-37.951_033_42, 144.424_867_89, -37.652_821_14, 143.926_495_54)
            .unwrap();
        assert!((d - 54.972_271).abs() < 1e-5, "got {d}");
    }

    #[test]
    fn test_vincenty_london_paris() {
        let d = vincenty_km(51.5074, -0.1278, 48.8566, 2.3522).unwrap();
        assert!((343.5..344.5).contains(&d), "got {d}");
    }

    #[test]
    fn test_vincenty_same_point_is_zero() {
        assert_eq!(vincenty_km(40.0, -73.0, 40.0, -73.0), Some(0.0));
    }

    #[test]
    fn test_near_antipodal_still_gives_a_distance() {
        let a = GeoPoint::new("a", 0.0, 0.0);
        let b = GeoPoint::new("b", 0.5, 179.7);
        let d = leg_km(&a, &b);
        assert!(d.is_finite());
        assert!(d > 19_000.0 && d < 20_100.0, "got {d}");
    }

    // ─── Totals ─────────────────────────────────────────────────

    #[test]
    fn test_fewer_than_two_points_is_zero() {
        assert_eq!(total_distance_km(&[]), 0.0);
        assert_eq!(total_distance_km(&manhattan()[..1]), 0.0);
    }

    #[test]
    fn test_manhattan_route() {
        let points = manhattan();
        assert_eq!(total_distance_km(&points), 4.67);

        let metrics = route_metrics(&points, 3);
        assert_eq!(metrics.total_km, 4.67);
        assert_eq!(metrics.point_count, 3);
        assert_eq!(metrics.efficiency, 1.56);
    }

    #[test]
    fn test_distance_never_decreases_as_points_are_appended() {
        let points = manhattan();
        let mut last = 0.0;
        for n in 0..=points.len() {
            let d = total_distance_km(&points[..n]);
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_efficiency_divisor_floor_is_one() {
        let points = manhattan();
        let metrics = route_metrics(&points, 0);
        assert_eq!(metrics.efficiency, metrics.total_km);
    }

    #[test]
    fn test_route_follows_given_order() {
        // Known limitation: order is taken as-is, a zig-zag is not reordered.
        let mut points = manhattan();
        points.swap(0, 1);
        assert!(total_distance_km(&points) > total_distance_km(&manhattan()));
    }
}
