use super::*;
use crate::text::fonts::FontSpec;

fn line_scene() -> Scene {
    let mut scene = Scene::new(200, 100).with_clear(Rgba8::WHITE);
    let mut path = BezPath::new();
    path.move_to(Point::new(10.0, 50.0));
    path.line_to(Point::new(190.0, 50.0));
    scene.push(DrawCmd::Stroke {
        path,
        width: 8.0,
        cap: LineCap::Round,
        color: Rgba8::rgb(0, 0, 255),
    });
    scene
}

#[test]
fn pixel_svg_keeps_surface_units() {
    let svg = VectorBackend::new(SvgCoordinates::Pixels).to_svg(&line_scene(), &mut FontBook::empty());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"viewBox="0 0 200 100""#));
    assert!(svg.contains(r#"stroke-width="8""#));
    assert!(svg.contains(r#"stroke-linecap="round""#));
    assert!(!svg.contains("vector-effect"));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn normalized_svg_uses_percent_box_and_fixed_strokes() {
    let svg =
        VectorBackend::new(SvgCoordinates::Normalized).to_svg(&line_scene(), &mut FontBook::empty());
    assert!(svg.contains(r#"viewBox="0 0 100 100""#));
    assert!(svg.contains(r#"preserveAspectRatio="none""#));
    assert!(svg.contains(r#"vector-effect="non-scaling-stroke""#));
    assert!(svg.contains(r#"stroke-width="8""#));
    assert!(svg.contains("M5 50 L95 50"));
}

#[test]
fn normalized_text_is_corrected_for_aspect() {
    let mut scene = Scene::new(200, 100);
    scene.push(DrawCmd::Text(TextRun {
        origin: Point::new(100.0, 50.0),
        text: "a<b & c".to_owned(),
        font: FontSpec::sans(),
        size_px: 20.0,
        color: Rgba8::BLACK,
    }));
    let svg = VectorBackend::new(SvgCoordinates::Normalized).to_svg(&scene, &mut FontBook::empty());
    assert!(svg.contains("translate(50 50) scale(0.5 1)"));
    assert!(svg.contains(r#"font-size="20""#));
    assert!(svg.contains("a&lt;b &amp; c"));
}

#[test]
fn rasterized_svg_matches_scene() {
    let scene = line_scene();
    let out = VectorBackend::new(SvgCoordinates::Pixels)
        .render_scene(&scene, &mut FontBook::empty())
        .unwrap();
    assert_eq!((out.width, out.height), (200, 100));
    out.check_len().unwrap();
    assert_eq!(out.pixel(100, 50), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(100, 10), Some([255, 255, 255, 255]));
}

#[test]
fn numbers_are_compact() {
    assert_eq!(num(2.0), "2");
    assert_eq!(num(0.35), "0.35");
    assert_eq!(num(-0.00001), "0");
    assert_eq!(num(f64::NAN), "0");
}
