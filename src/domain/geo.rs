use crate::domain::model::{CampusLocation, Coordinate};

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (haversine).
///
/// Total, deterministic and symmetric. Inputs are taken at face value;
/// range checks belong to the roster loader, not here.
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Nearest campus to `position` with its distance, or `None` when the
/// slice is empty. Ties keep the earlier entry, so directory order is
/// the tie-break.
pub fn find_nearest(
    position: Coordinate,
    campuses: &[CampusLocation],
) -> Option<(CampusLocation, f64)> {
    let mut best: Option<(CampusLocation, f64)> = None;

    for campus in campuses {
        let distance = distance_meters(position, campus.coordinate());
        match &best {
            Some((_, best_distance)) if distance >= *best_distance => {}
            _ => best = Some((campus.clone(), distance)),
        }
    }

    best
}

/// Whether `position` falls inside the campus radius. The boundary
/// counts as inside.
pub fn is_within_range(position: Coordinate, campus: &CampusLocation) -> bool {
    distance_meters(position, campus.coordinate()) <= campus.radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus(id: &str, latitude: f64, longitude: f64, radius_meters: f64) -> CampusLocation {
        CampusLocation {
            id: id.to_string(),
            name: format!("{} Campus", id),
            latitude,
            longitude,
            radius_meters,
            network_id: None,
            active: true,
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let here = Coordinate::new(13.7563, 100.5018);
        assert_eq!(distance_meters(here, here), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(13.7563, 100.5018);
        let b = Coordinate::new(13.7469, 100.5349);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        // One degree of arc on the mean-radius sphere is ~111.195 km.
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn test_small_offset_is_tens_of_meters() {
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0005, 0.0));
        assert!((d - 55.6).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_tiny_perturbation_moves_distance_smoothly() {
        let a = Coordinate::new(13.7563, 100.5018);
        let b = Coordinate::new(13.7469, 100.5349);

        let base = distance_meters(a, b);
        let nudged = distance_meters(Coordinate::new(13.7563 + 1e-6, 100.5018), b);

        // A ~0.1m nudge of one endpoint cannot swing the result by a meter.
        assert!((base - nudged).abs() < 1.0);
    }

    #[test]
    fn test_find_nearest_empty_directory() {
        assert!(find_nearest(Coordinate::new(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_find_nearest_picks_closest() {
        let campuses = vec![campus("a", 0.0, 0.0, 100.0), campus("b", 0.0, 1.0, 100.0)];

        // 0.4 degrees east: ~44.5km to a, ~66.7km to b.
        let (nearest, distance) = find_nearest(Coordinate::new(0.0, 0.4), &campuses).unwrap();
        assert_eq!(nearest.id, "a");
        assert!((distance - 44_478.0).abs() < 50.0, "got {distance}");
    }

    #[test]
    fn test_find_nearest_tie_keeps_first() {
        // Equidistant east and west of the origin.
        let campuses = vec![campus("west", 0.0, -1.0, 100.0), campus("east", 0.0, 1.0, 100.0)];

        let (nearest, _) = find_nearest(Coordinate::new(0.0, 0.0), &campuses).unwrap();
        assert_eq!(nearest.id, "west");
    }

    #[test]
    fn test_within_range_close_by() {
        let c = campus("main", 0.0, 0.0, 100.0);
        // ~55.6m north of center.
        assert!(is_within_range(Coordinate::new(0.0005, 0.0), &c));
    }

    #[test]
    fn test_out_of_range_about_a_kilometer() {
        let c = campus("main", 0.0, 0.0, 100.0);
        // ~1112m north of center.
        assert!(!is_within_range(Coordinate::new(0.01, 0.0), &c));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = Coordinate::new(0.0, 0.0);
        let position = Coordinate::new(0.0005, 0.0);
        let exact = distance_meters(position, center);

        let c = campus("main", 0.0, 0.0, exact);
        assert!(is_within_range(position, &c));
    }

    #[test]
    fn test_zero_radius_only_matches_center() {
        let c = campus("main", 0.0, 0.0, 0.0);
        assert!(is_within_range(Coordinate::new(0.0, 0.0), &c));
        assert!(!is_within_range(Coordinate::new(0.000001, 0.0), &c));
    }
}
