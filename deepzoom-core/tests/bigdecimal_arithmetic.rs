use deepzoom_core::BigDecimal;

fn dec(value: &str, digits: usize) -> BigDecimal {
    BigDecimal::from_string(value, digits).unwrap()
}

// ============================================================================
// Addition and subtraction
// ============================================================================

#[test]
fn add_small_values_exactly() {
    let result = dec("1.5", 40).add(&dec("2.5", 40));
    assert_eq!(result.precision_digits(), 40);
    assert_eq!(result.to_f64(), 4.0);
}

#[test]
fn add_far_below_f64_range() {
    let result = dec("1e-2000", 60).add(&dec("3.5e-2000", 60));
    assert_eq!(result, dec("4.5e-2000", 60));
}

#[test]
fn sub_keeps_tiny_difference_of_close_values() {
    // 1 - (1 - 1e-280) needs more than 280 digits
    let one = BigDecimal::one(320);
    let close = one.sub(&dec("1e-280", 320));
    assert_eq!(one.sub(&close), dec("1e-280", 320));
}

#[test]
fn result_precision_is_the_larger_operand() {
    let result = dec("1", 20).add(&dec("2", 90));
    assert_eq!(result.precision_digits(), 90);
}

// ============================================================================
// Multiplication, division and powers
// ============================================================================

#[test]
fn decimal_zoom_factors_stay_exact() {
    let width = dec("3.0", 40);
    let zoomed = width.mul(&dec("0.2", 40));
    assert_eq!(zoomed, dec("0.6", 40));
    assert_eq!(zoomed.mul(&dec("5", 40)), width);
}

#[test]
fn repeated_zoom_reaches_extreme_depth() {
    let mut width = dec("3", 400);
    let factor = dec("0.2", 400);
    for _ in 0..400 {
        width = width.mul(&factor);
    }
    // 3 * 0.2^400 = 3 * 2^400 * 1e-400
    let log10 = width.log10_approx();
    let expected = 3f64.log10() + 400.0 * 2f64.log10() - 400.0;
    assert!((log10 - expected).abs() < 1e-9, "{} vs {}", log10, expected);
}

#[test]
fn division_rounds_to_context() {
    let third = BigDecimal::one(30).div(&dec("3", 30));
    assert!((third.to_f64() - 1.0 / 3.0).abs() < 1e-16);
    assert_eq!(third.precision_digits(), 30);
}

#[test]
fn integer_powers() {
    assert_eq!(dec("1.1", 40).powi(2), dec("1.21", 40));
    assert_eq!(dec("2", 40).powi(10), dec("1024", 40));
    assert_eq!(dec("4", 40).powi(-1), dec("0.25", 40));
    assert_eq!(dec("7", 40).powi(0), BigDecimal::one(40));
}

#[test]
fn square_root() {
    let root = dec("2", 50).sqrt();
    assert!((root.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-15);
    assert!((dec("1e-300", 50).sqrt().log10_approx() + 150.0).abs() < 1e-12);
    assert!(dec("-4", 50).sqrt().is_zero());
}

// ============================================================================
// Sign, ordering and decimal point moves
// ============================================================================

#[test]
fn neg_and_abs() {
    let value = dec("-2.5e-100", 40);
    assert_eq!(value.abs(), dec("2.5e-100", 40));
    assert_eq!(value.neg(), dec("2.5e-100", 40));
    assert_eq!(value.neg().neg(), value);
}

#[test]
fn ordering_works_at_extreme_scales() {
    assert!(dec("1e-300", 40) < dec("2e-300", 40));
    assert!(dec("-1e-300", 40) < dec("1e-400", 40));
    assert!(dec("1e300", 40) > dec("9.99e299", 40));
}

#[test]
fn moving_the_decimal_point_is_exact() {
    let value = dec("1.5", 40);
    assert_eq!(value.move_point_left(300), dec("1.5e-300", 40));
    assert_eq!(value.move_point_right(7), dec("15000000", 40));
    assert_eq!(value.move_point_left(300).move_point_right(300), value);
}
