use super::*;

#[test]
fn lerp_and_ease_hit_endpoints_exactly() {
    for (a, b) in [(0.0, 1.0), (-960.0, 960.0), (3.7, -12.25)] {
        assert_eq!(lerp(0.0, a, b), a);
        assert_eq!(lerp(1.0, a, b), b);
        assert_eq!(ease(0.0, a, b), a);
        assert_eq!(ease(1.0, a, b), b);
    }
}

#[test]
fn ease_is_monotonic_and_symmetric() {
    let mut prev = ease(0.0, 0.0, 1.0);
    for i in 1..=100 {
        let v = ease(f64::from(i) / 100.0, 0.0, 1.0);
        assert!(v >= prev);
        prev = v;
    }
    assert!((ease(0.5, 0.0, 1.0) - 0.5).abs() < 1e-12);
}

#[test]
fn inv_lerp_inverts_lerp() {
    let t = inv_lerp(lerp(0.25, -4.0, 8.0), -4.0, 8.0);
    assert!((t - 0.25).abs() < 1e-12);
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn unit_to_u8_clamps() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(2.0), 255);
    assert_eq!(unit_to_u8(f64::NAN), 0);
    assert_eq!(unit_to_u8(0.5), 128);
}
