use super::*;

#[test]
fn test_to_decimal_precision() {
    let a = 0.1_f64;
    let b = 0.2_f64;
    assert_ne!(a + b, 0.3);

    let sum_dec = to_decimal(a) + to_decimal(b);
    assert_eq!(to_f64(sum_dec), 0.3);
}

#[test]
fn test_non_finite_is_zero() {
    assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
}

#[test]
fn test_express_breakdown() {
    let amount = calculate_breakdown([(100.0, 2)], Some("express"));
    assert_eq!(
        amount,
        AmountBreakdown {
            subtotal: 200.0,
            tax: 40.0,
            shipping: 17.5,
            total: 257.5,
        }
    );
}

#[test]
fn test_standard_and_unknown_shipping() {
    assert_eq!(calculate_breakdown([(10.0, 1)], Some("standard")).shipping, 10.0);
    assert_eq!(calculate_breakdown([(10.0, 1)], Some("drone")).shipping, 10.0);
    assert_eq!(calculate_breakdown([(10.0, 1)], None).shipping, 10.0);
}

#[test]
fn test_tax_rounds_half_up() {
    // Subtotal rounds first (0.125 -> 0.13), then tax 0.026 -> 0.03
    let amount = calculate_breakdown([(0.125, 1)], None);
    assert_eq!(amount.subtotal, 0.13);
    assert_eq!(amount.tax, 0.03);
    assert_eq!(amount.total, 10.16);
}

#[test]
fn test_multi_line_accumulation() {
    // 3 x 19.99 + 2 x 0.35 = 60.67
    let amount = calculate_breakdown([(19.99, 3), (0.35, 2)], None);
    assert_eq!(amount.subtotal, 60.67);
    assert_eq!(amount.tax, 12.13);
    assert_eq!(amount.total, 82.8);
}

#[test]
fn test_deterministic() {
    let lines = [(12.34, 7), (0.99, 13)];
    let first = calculate_breakdown(lines, Some("express"));
    for _ in 0..10 {
        assert_eq!(calculate_breakdown(lines, Some("express")), first);
    }
}
