use deepzoom_core::BigDecimal;

#[test]
fn f64_goes_through_shortest_decimal() {
    assert_eq!(
        BigDecimal::with_precision(0.2, 40),
        BigDecimal::from_string("0.2", 40).unwrap()
    );
    assert_eq!(BigDecimal::with_precision(-0.75, 40).to_f64(), -0.75);
}

#[test]
fn non_finite_f64_becomes_zero() {
    assert!(BigDecimal::with_precision(f64::NAN, 40).is_zero());
    assert!(BigDecimal::with_precision(f64::INFINITY, 40).is_zero());
}

#[test]
fn to_f64_saturates_outside_range() {
    let tiny = BigDecimal::from_string("1e-400", 40).unwrap();
    let huge = BigDecimal::from_string("1e400", 40).unwrap();
    assert_eq!(tiny.to_f64(), 0.0);
    assert!(huge.to_f64().is_infinite());
}

#[test]
fn log10_far_outside_f64_range() {
    let tiny = BigDecimal::from_string("2.5e-1234", 40).unwrap();
    assert!((tiny.log10_approx() - (2.5f64.log10() - 1234.0)).abs() < 1e-9);
    assert_eq!(BigDecimal::zero(40).log10_approx(), f64::NEG_INFINITY);
}

#[test]
fn parse_rejects_garbage() {
    assert!(BigDecimal::from_string("abc", 40).is_err());
    assert!(BigDecimal::from_string(" 1.25 ", 40).is_ok());
}

#[test]
fn plain_string_round_trips() {
    for text in ["-0.743643887037158704752191506114774", "1e-290", "3", "0.000125"] {
        let value = BigDecimal::from_string(text, 60).unwrap();
        let again = BigDecimal::from_string(&value.to_plain_string(), 60).unwrap();
        assert_eq!(again, value, "{}", text);
    }
}

#[test]
fn serde_round_trip_keeps_precision() {
    let value = BigDecimal::from_string("-1.000000000000000000000000000001", 80).unwrap();
    let json = serde_json::to_string(&value).unwrap();
    let restored: BigDecimal = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, value);
    assert_eq!(restored.precision_digits(), 80);
}

#[test]
fn rounding_to_fewer_digits() {
    let value = BigDecimal::from_string("1.23456789", 40).unwrap();
    let rounded = value.with_precision_digits(3);
    assert_eq!(rounded.precision_digits(), 3);
    assert_eq!(rounded, BigDecimal::from_string("1.23", 40).unwrap());
}
