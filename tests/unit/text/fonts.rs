use super::*;

#[test]
fn empty_book_uses_fallback_metrics() {
    let mut book = FontBook::empty();
    assert!(!book.has_faces());
    assert!(book.resolve(&FontSpec::sans()).is_none());
    assert!(book.shape("abc", &FontSpec::sans(), 20.0).is_none());
    let w = book.advance_width("abcd", &FontSpec::sans(), 20.0);
    assert!((w - 4.0 * 20.0 * 0.55).abs() < 1e-9);
}

#[test]
fn readiness_reports_missing_faces() {
    let mut book = FontBook::empty();
    let err = book
        .ensure_loaded(&[FontSpec::named(GRADE_FONT_FAMILY, 400)])
        .unwrap_err();
    assert!(matches!(err, OvermarkError::FontUnavailable(_)));
    assert!(err.to_string().contains(GRADE_FONT_FAMILY));
}

#[test]
fn css_family_lists_fallbacks() {
    assert_eq!(FontSpec::sans_bold().css_family(), "sans-serif");
    assert_eq!(
        FontSpec::named("Indie Flower", 400).css_family(),
        "'Indie Flower', cursive, sans-serif"
    );
}

#[test]
fn system_fonts_measure_positive_widths_when_present() {
    let mut book = FontBook::with_font_dirs(true, std::iter::empty());
    if !book.has_faces() {
        return;
    }
    let narrow = book.advance_width("i", &FontSpec::sans(), 32.0);
    let wide = book.advance_width("iiii", &FontSpec::sans(), 32.0);
    assert!(narrow > 0.0);
    assert!(wide > narrow);
}
