use super::*;
use crate::foundation::core::{CssColor, PageRect};
use crate::model::annotation::Mark;

fn project() -> Project {
    let mut p = Project::new(
        2,
        vec![
            TaskRegion::new("t1", 1, PageRect::new(10.0, 10.0, 30.0, 20.0), 4.0),
            TaskRegion::new("t2", 2, PageRect::new(0.0, 50.0, 100.0, 50.0), 6.0),
        ],
    );
    p.students.push(StudentRecord::new("s1", 1));
    p
}

fn mark(x: f64, role: Role) -> Annotation {
    Annotation::Mark(Mark {
        color: CssColor::parse("#ef4444").unwrap(),
        symbol: "Gr".to_owned(),
        x,
        y: 50.0,
        role,
    })
}

fn session(viewer: Role) -> GradingSession {
    let mut s = GradingSession::new(project(), viewer).unwrap();
    s.set_render_context(RenderContext::new(600.0, 400.0));
    s
}

#[test]
fn appended_annotations_take_the_viewer_role() {
    let mut s = session(Role::Second);
    s.append(mark(10.0, Role::First)).unwrap().unwrap();
    let log = s.current_student().unwrap().log("t1").unwrap();
    assert_eq!(log.annotations().next().unwrap().role(), Role::Second);
}

#[test]
fn undo_only_touches_the_viewer_layer() {
    let mut s = session(Role::First);
    s.append(mark(10.0, Role::First)).unwrap();
    s.current_student_mut()
        .unwrap()
        .log_mut("t1")
        .append(mark(20.0, Role::Second));
    s.append(mark(30.0, Role::First)).unwrap();

    let undone = s.undo().unwrap().unwrap();
    assert_eq!(undone, mark(30.0, Role::First));
    let roles: Vec<Role> = s
        .current_student()
        .unwrap()
        .log("t1")
        .unwrap()
        .annotations()
        .map(Annotation::role)
        .collect();
    assert_eq!(roles, vec![Role::First, Role::Second]);
}

#[test]
fn solution_editing_is_first_grader_only_and_isolated() {
    let mut second = session(Role::Second);
    assert!(second.set_editing_solution(true).is_err());

    let mut s = session(Role::First);
    s.set_editing_solution(true).unwrap();
    s.append(mark(10.0, Role::First)).unwrap().unwrap();
    assert!(s.current_student().unwrap().log("t1").is_none());
    assert!(s.project().model_solutions.has_content("t1"));

    assert!(s.undo().unwrap().is_some());
    assert!(!s.project().model_solutions.has_content("t1"));
}

#[test]
fn eraser_removes_hit_annotation() {
    let mut s = session(Role::First);
    s.append(mark(40.0, Role::First)).unwrap();
    assert!(s.erase_at(Point::new(90.0, 90.0)).unwrap().is_none());
    assert!(s.erase_at(Point::new(41.0, 51.0)).unwrap().is_some());
    assert!(s.current_student().unwrap().log("t1").unwrap().is_empty());

    s.append(mark(50.0, Role::First)).unwrap();
    assert!(s.erase_at_px(Point::new(300.0, 200.0)).unwrap().is_some());
}

#[test]
fn other_role_toggle_needs_content_and_permission() {
    let mut s = session(Role::Second);
    s.current_student_mut()
        .unwrap()
        .log_mut("t1")
        .append(mark(10.0, Role::First));
    assert!(!s.can_toggle_other_role());

    let mut p = project();
    p.allow_second_view_first = true;
    p.students[0].log_mut("t1").append(mark(10.0, Role::First));
    let s = GradingSession::new(p, Role::Second).unwrap();
    assert!(s.can_toggle_other_role());

    let first = session(Role::First);
    assert!(!first.can_toggle_other_role());
}

#[test]
fn points_are_clamped_and_clear_pending() {
    let mut s = session(Role::First);
    s.skip().unwrap();
    assert!(s.current_student().unwrap().is_pending("t1"));
    assert_eq!(s.set_points(9.0).unwrap(), 4.0);
    assert!(!s.current_student().unwrap().is_pending("t1"));
}

#[test]
fn scene_needs_a_surface() {
    let s = GradingSession::new(project(), Role::First).unwrap();
    let err = s.build_scene(&mut FontBook::empty()).unwrap_err();
    assert!(matches!(err, OvermarkError::Geometry(_)));
}

#[test]
fn scene_draws_annotations_and_badge() {
    let mut s = session(Role::First);
    s.append(mark(50.0, Role::First)).unwrap();
    s.set_points(2.0).unwrap();
    let scene = s.build_scene(&mut FontBook::empty()).unwrap();
    assert_eq!((scene.width, scene.height), (600, 400));
    let texts: Vec<&str> = scene.text_runs().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Gr", "2/4"]);
}

#[test]
fn full_page_view_outlines_the_region() {
    let mut s = session(Role::First);
    s.set_view_mode(ViewMode::FullPage);
    s.set_render_context(RenderContext::new(1000.0, 1000.0));
    let scene = s.build_scene(&mut FontBook::empty()).unwrap();
    let outlined = scene.cmds.iter().any(|c| {
        matches!(c, DrawCmd::StrokeRect { rect, .. } if (rect.x0 - 100.0).abs() < 1e-9 && (rect.y1 - 300.0).abs() < 1e-9)
    });
    assert!(outlined);
}

#[test]
fn cropped_view_crops_the_page_image() {
    let mut s = session(Role::First);
    s.set_page_image(Arc::new(PageImage::new_filled(100, 200, [255, 255, 255, 255])));
    let scene = s.build_scene(&mut FontBook::empty()).unwrap();
    let bg = scene.background.unwrap();
    assert_eq!((bg.width, bg.height), (30, 40));
}

#[test]
fn svg_render_and_snapshot() {
    let mut s = session(Role::First);
    s.append(mark(50.0, Role::First)).unwrap();
    let snap = s.snapshot();
    s.append(mark(60.0, Role::First)).unwrap();
    assert_eq!(snap.students[0].log("t1").unwrap().len(), 1);

    let svg = s
        .render_svg(&mut FontBook::empty(), SvgCoordinates::Normalized)
        .unwrap();
    assert!(svg.contains(r#"viewBox="0 0 100 100""#));
    assert_eq!(svg.matches("<text").count(), 2);
}

#[test]
fn selecting_unknown_things_fails() {
    let mut s = session(Role::First);
    assert!(s.select_task("nope").is_err());
    assert!(s.select_student(3).is_err());
    s.select_task("t2").unwrap();
    assert_eq!(s.current_task().unwrap().id, "t2");
}

#[test]
fn solution_role_cannot_open_a_session() {
    assert!(GradingSession::new(project(), Role::Solution).is_err());
}

#[test]
fn loaded_model_solution_marks_can_be_erased_while_editing() {
    let mut p = project();
    p.model_solutions = serde_json::from_str(
        r##"{"t1": [{"type": "mark", "x": 50, "y": 50, "symbol": "R", "color": "#16a34a"}]}"##,
    )
    .unwrap();
    let mut s = GradingSession::new(p, Role::First).unwrap();
    s.set_editing_solution(true).unwrap();

    let erased = s.erase_at(Point::new(50.0, 50.0)).unwrap();
    assert_eq!(erased.map(|a| a.role()), Some(Role::Solution));
    assert!(!s.project().model_solutions.has_content("t1"));
}
