use crate::perturbation::{direct_iterations, direct_iterations_big, ReferenceOrbit};
use deepzoom_core::{BigDecimal, BigVec2, Vec2};

fn point(re: &str, im: &str) -> BigVec2 {
    BigVec2::new(
        BigDecimal::from_string(re, 64).unwrap(),
        BigDecimal::from_string(im, 64).unwrap(),
    )
}

#[test]
fn reference_orbit_in_set_never_escapes() {
    let orbit = ReferenceOrbit::compute(&point("-0.5", "0"), 1000, 64);

    assert!(orbit.escaped_at.is_none());
    assert_eq!(orbit.orbit.len(), 1000);
    assert_eq!(orbit.depth(), 1000);
    assert!(orbit.reached_cap());
}

#[test]
fn reference_orbit_escaping_point() {
    // 0.5: 0.5, 0.75, 1.0625, 1.6289, 3.1533
    let orbit = ReferenceOrbit::compute(&point("0.5", "0"), 1000, 64);

    assert_eq!(orbit.escaped_at, Some(5));
    assert_eq!(orbit.orbit.len(), 6);
    assert!(orbit.orbit[5].norm_sq() >= 4.0);
    assert!(orbit.orbit[4].norm_sq() < 4.0);
}

#[test]
fn reference_orbit_starts_at_zero_then_c() {
    let orbit = ReferenceOrbit::compute(&point("-0.75", "0.1"), 100, 64);

    assert_eq!(orbit.orbit[0], Vec2::ZERO);
    assert_eq!(orbit.orbit[1], Vec2::new(-0.75, 0.1));
    assert_eq!(orbit.c_f64, Vec2::new(-0.75, 0.1));
}

#[test]
fn escape_distance_is_signed() {
    let orbit = ReferenceOrbit::compute(&point("0.5", "0"), 100, 64);

    // |X_0| = 0 gives (2 - 0)² = 4
    assert_eq!(orbit.distance[0], 4.0);
    assert!(orbit.distance[4] > 0.0);
    // escaped value lies outside the circle
    assert!(orbit.distance[5] < 0.0);
}

#[test]
fn reference_orbit_matches_direct_iteration() {
    for (re, im) in [("0.3", "0.5"), ("-1.8", "0.02"), ("0.26", "0"), ("-0.1", "0.9")] {
        let c = point(re, im);
        let orbit = ReferenceOrbit::compute(&c, 500, 64);
        let direct = direct_iterations(c.to_vec2(), 500);
        assert_eq!(orbit.escaped_at.unwrap_or(0), direct, "c = {} + {}i", re, im);
        assert_eq!(direct_iterations_big(&c, 500), direct);
    }
}

#[test]
fn direct_iteration_returns_zero_inside() {
    assert_eq!(direct_iterations(Vec2::ZERO, 5000), 0);
    assert_eq!(direct_iterations(Vec2::new(-1.0, 0.0), 5000), 0);
    assert_eq!(direct_iterations(Vec2::new(-2.1, 0.0), 5000), 1);
}
