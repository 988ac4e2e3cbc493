use super::*;

fn region() -> PageRect {
    PageRect::new(10.0, 10.0, 30.0, 20.0)
}

#[test]
fn full_page_display_of_local_point() {
    let p = to_display(Point::new(50.0, 50.0), region(), ViewMode::FullPage);
    assert!((p.x - 25.0).abs() < 1e-9);
    assert!((p.y - 20.0).abs() < 1e-9);
}

#[test]
fn cropped_display_is_identity() {
    let p = Point::new(12.5, 99.0);
    assert_eq!(to_display(p, region(), ViewMode::Cropped), p);
}

#[test]
fn round_trip_holds_over_a_grid() {
    let regions = [
        region(),
        PageRect::new(0.0, 0.0, 100.0, 100.0),
        PageRect::new(63.3, 7.1, 0.9, 91.2),
        PageRect::new(1.0, 80.0, 98.5, 3.25),
    ];
    for r in regions {
        for i in 0..=10 {
            for j in 0..=10 {
                let local = Point::new(f64::from(i) * 10.0, f64::from(j) * 10.0);
                let page = to_display(local, r, ViewMode::FullPage);
                let back = to_local(page, r).expect("inside region");
                assert!((back.x - local.x).abs() < 1e-6, "{r:?} {local:?} {back:?}");
                assert!((back.y - local.y).abs() < 1e-6, "{r:?} {local:?} {back:?}");
            }
        }
    }
}

#[test]
fn to_local_rejects_outside_and_degenerate() {
    assert!(to_local(Point::new(5.0, 15.0), region()).is_none());
    assert!(to_local(Point::new(41.0, 15.0), region()).is_none());
    assert!(to_local(Point::new(0.0, 0.0), PageRect::new(0.0, 0.0, 0.0, 0.0)).is_none());
}

#[test]
fn aspect_factor_never_produces_non_finite() {
    assert_eq!(aspect_correction_factor(0.0, 0.0), 1.0);
    assert_eq!(aspect_correction_factor(800.0, 0.0), 1.0);
    assert_eq!(aspect_correction_factor(f64::NAN, 10.0), 1.0);
    assert_eq!(aspect_correction_factor(f64::INFINITY, 10.0), 1.0);
    assert!((aspect_correction_factor(800.0, 400.0) - 0.5).abs() < 1e-12);
}

#[test]
fn surface_mapping_full_page() {
    let ctx = RenderContext::new(1000.0, 2000.0);
    let m = SurfaceMapping::new(region(), ViewMode::FullPage, &ctx).unwrap();
    let px = m.local_to_px(Point::new(50.0, 50.0));
    assert!((px.x - 250.0).abs() < 1e-9);
    assert!((px.y - 400.0).abs() < 1e-9);
    assert!((m.region_height_px() - 400.0).abs() < 1e-9);
    let back = m.px_to_local(px).unwrap();
    assert!((back.x - 50.0).abs() < 1e-9);
    assert!(m.px_to_local(Point::new(5.0, 5.0)).is_none());
}

#[test]
fn surface_mapping_cropped_uses_whole_surface() {
    let ctx = RenderContext::new(600.0, 400.0);
    let m = SurfaceMapping::new(region(), ViewMode::Cropped, &ctx).unwrap();
    assert_eq!(m.local_to_px(Point::new(50.0, 25.0)), Point::new(300.0, 100.0));
    assert_eq!(m.region_height_px(), 400.0);
    assert_eq!(m.local_dx_to_px(10.0), 60.0);
}

#[test]
fn surface_mapping_rejects_degenerate_input() {
    let ctx = RenderContext::new(600.0, 400.0);
    let err = SurfaceMapping::new(PageRect::new(0.0, 0.0, 10.0, 0.0), ViewMode::FullPage, &ctx)
        .unwrap_err();
    assert!(matches!(err, OvermarkError::Geometry(_)));
    assert!(SurfaceMapping::new(region(), ViewMode::Cropped, &RenderContext::new(0.0, 1.0)).is_err());
}
