use super::*;

#[test]
fn premul_keeps_opaque_and_clears_transparent() {
    assert_eq!(premul_rgba8(200, 100, 50, 255), [200, 100, 50, 255]);
    assert_eq!(premul_rgba8(200, 100, 50, 0), [0, 0, 0, 0]);
}

#[test]
fn unpremul_is_close_to_inverse() {
    let p = premul_rgba8(200, 100, 50, 128);
    let s = unpremul_rgba8(p);
    for (a, b) in s.iter().zip([200u8, 100, 50, 128]) {
        assert!((i16::from(*a) - i16::from(b)).abs() <= 2);
    }
}

#[test]
fn finite_or_replaces_nan() {
    assert_eq!(finite_or(f64::NAN, 1.0), 1.0);
    assert_eq!(finite_or(2.5, 1.0), 2.5);
}
