use super::*;
use crate::foundation::core::{PageRect, RenderContext};
use crate::geometry::space::ViewMode;

fn red() -> CssColor {
    CssColor::parse("#dc2626").unwrap()
}

fn full_page() -> SurfaceMapping {
    SurfaceMapping::new(
        PageRect::new(10.0, 10.0, 30.0, 20.0),
        ViewMode::FullPage,
        &RenderContext::new(1000.0, 1000.0),
    )
    .unwrap()
}

fn cropped() -> SurfaceMapping {
    SurfaceMapping::new(
        PageRect::new(10.0, 10.0, 30.0, 20.0),
        ViewMode::Cropped,
        &RenderContext::new(600.0, 400.0),
    )
    .unwrap()
}

#[test]
fn pen_outside_region_is_rejected_in_full_page() {
    let m = full_page();
    assert!(PenGesture::begin(&m, Point::new(50.0, 50.0), red(), 2.0, Role::First).is_none());

    let mut pen = PenGesture::begin(&m, Point::new(250.0, 200.0), red(), 2.0, Role::First).unwrap();
    assert!(!pen.extend(&m, Point::new(900.0, 900.0)));
    assert!(pen.extend(&m, Point::new(310.0, 200.0)));
    let pts = pen.points().to_vec();
    assert_eq!(pts.len(), 2);
    assert!((pts[0].x - 50.0).abs() < 1e-9 && (pts[0].y - 50.0).abs() < 1e-9);
    assert!((pts[1].x - 70.0).abs() < 1e-9);
}

#[test]
fn single_point_pen_never_reaches_the_log() {
    let m = cropped();
    let pen = PenGesture::begin(&m, Point::new(60.0, 40.0), red(), 2.0, Role::First).unwrap();
    let mut log = AnnotationLog::new();
    assert!(log.append(pen.finish()).is_none());
    assert!(log.is_empty());
}

#[test]
fn underline_keeps_start_height_and_normalizes_direction() {
    let m = cropped();
    let g = UnderlineGesture::begin(
        &m,
        Point::new(300.0, 200.0),
        red(),
        2.0,
        UnderlineStyle::Wavy,
        Role::Second,
    )
    .unwrap();
    let Some(Annotation::Underline(u)) = g.finish(&m, Point::new(60.0, 260.0)) else {
        panic!("expected underline");
    };
    assert!((u.x - 10.0).abs() < 1e-9);
    assert!((u.width - 40.0).abs() < 1e-9);
    assert!((u.y - 50.0).abs() < 1e-9);
    assert_eq!(u.role, Role::Second);
}

#[test]
fn short_underline_is_discarded_on_append() {
    let m = cropped();
    let g = UnderlineGesture::begin(
        &m,
        Point::new(300.0, 200.0),
        red(),
        2.0,
        UnderlineStyle::Solid,
        Role::First,
    )
    .unwrap();
    let ann = g.finish(&m, Point::new(306.0, 200.0)).unwrap();
    let mut log = AnnotationLog::new();
    assert!(log.append(ann).is_none());
}

#[test]
fn submitted_text_is_relative_and_trimmed() {
    let ann = submit_text("  gut  ", Point::new(20.0, 30.0), 40.0, 400.0, red(), Role::First).unwrap();
    let Annotation::Text(t) = ann else {
        panic!("expected text");
    };
    assert_eq!(t.text, "gut");
    assert_eq!(t.font_size_rel, Some(10.0));
    assert_eq!(t.font_size, Some(40.0));
    assert_eq!(t.anchor, TextAnchor::Baseline);
    assert!(submit_text("   ", Point::ORIGIN, 40.0, 400.0, red(), Role::First).is_none());
}

#[test]
fn marks_copy_symbol_and_color() {
    let mark = CorrectionMark {
        symbol: "Gr".to_owned(),
        name: "Grammatik".to_owned(),
        color: red(),
    };
    let Annotation::Mark(m) = place_mark(&mark, Point::new(5.0, 6.0), Role::Second) else {
        panic!("expected mark");
    };
    assert_eq!(m.symbol, "Gr");
    assert_eq!(m.color, red());
    assert_eq!((m.x, m.y, m.role), (5.0, 6.0, Role::Second));
}

#[test]
fn eraser_prefers_latest_and_respects_role() {
    let mark = CorrectionMark {
        symbol: "O".to_owned(),
        name: String::new(),
        color: red(),
    };
    let mut log = AnnotationLog::new();
    let older = log.append(place_mark(&mark, Point::new(50.0, 50.0), Role::First)).unwrap();
    let newer = log.append(place_mark(&mark, Point::new(52.0, 50.0), Role::First)).unwrap();
    let other = log.append(place_mark(&mark, Point::new(51.0, 50.0), Role::Second)).unwrap();

    assert_eq!(hit_test(&log, Role::First, Point::new(51.0, 51.0)), Some(newer));
    assert_eq!(hit_test(&log, Role::Second, Point::new(51.0, 51.0)), Some(other));
    assert_eq!(hit_test(&log, Role::First, Point::new(46.0, 50.0)), Some(older));
    assert_eq!(hit_test(&log, Role::First, Point::new(90.0, 90.0)), None);
}

#[test]
fn eraser_hits_underline_span_and_pen_points() {
    let mut log = AnnotationLog::new();
    let line = log
        .append(Annotation::Underline(Underline {
            color: red(),
            line_width: 2.0,
            style: UnderlineStyle::Solid,
            x: 10.0,
            y: 80.0,
            width: 50.0,
            role: Role::First,
        }))
        .unwrap();
    let pen = log
        .append(Annotation::Pen(PenStroke {
            color: red(),
            line_width: 2.0,
            points: vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0)],
            role: Role::First,
        }))
        .unwrap();

    assert_eq!(hit_test(&log, Role::First, Point::new(40.0, 82.0)), Some(line));
    assert_eq!(hit_test(&log, Role::First, Point::new(65.0, 80.0)), None);
    assert_eq!(hit_test(&log, Role::First, Point::new(21.0, 12.0)), Some(pen));
    assert_eq!(hit_test(&log, Role::First, Point::new(15.0, 10.0)), None);
}
