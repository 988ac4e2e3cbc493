use super::*;
use crate::foundation::core::{CssColor, PageRect};
use crate::model::annotation::Mark;
use crate::model::region::TaskRegion;

fn mark(symbol: &str, role: Role) -> Annotation {
    Annotation::Mark(Mark {
        color: CssColor::parse("#ef4444").unwrap(),
        symbol: symbol.into(),
        x: 1.0,
        y: 1.0,
        role,
    })
}

fn all_toggles() -> [LayerToggles; 4] {
    [
        LayerToggles::default(),
        LayerToggles {
            show_other_role: true,
            show_solution: false,
        },
        LayerToggles {
            show_other_role: false,
            show_solution: true,
        },
        LayerToggles {
            show_other_role: true,
            show_solution: true,
        },
    ]
}

#[test]
fn editing_solution_isolates_the_solution_layer() {
    let req = LayerRequest::new(Role::First).with_editing_solution(true);
    let content = LayerContent {
        other_role: true,
        solution: false,
    };
    assert_eq!(visible_layers(&req, &content).as_slice(), &[Role::Solution]);
    assert!(!can_toggle_other_role(&req, &content));
}

#[test]
fn own_role_is_always_present() {
    for viewer in [Role::First, Role::Second] {
        for toggles in all_toggles() {
            let req = LayerRequest::new(viewer).with_toggles(toggles);
            let layers = visible_layers(&req, &LayerContent::default());
            assert!(layers.contains(&viewer));
        }
    }
}

#[test]
fn empty_opposing_role_is_never_shown() {
    let student = StudentRecord::new("s", 1);
    let content = LayerContent::for_task(Some(&student), &ModelSolutionSet::new(), "t1", Role::First);
    assert!(!content.other_role);
    for toggles in all_toggles() {
        for allow in [false, true] {
            for viewer in [Role::First, Role::Second] {
                let req = LayerRequest::new(viewer)
                    .with_toggles(toggles)
                    .with_allow_second_view_first(allow);
                let layers = visible_layers(&req, &content);
                assert!(!layers.contains(&viewer.opposing().unwrap()));
            }
        }
    }
}

#[test]
fn grade_entry_alone_counts_as_content() {
    let task = TaskRegion::new("t1", 1, PageRect::FULL, 4.0);
    let mut student = StudentRecord::new("s", 1);
    student.set_points(&task, Role::Second, 2.0).unwrap();
    let content = LayerContent::for_task(Some(&student), &ModelSolutionSet::new(), "t1", Role::First);
    assert!(content.other_role);
}

#[test]
fn second_viewer_needs_permission() {
    let content = LayerContent {
        other_role: true,
        solution: false,
    };
    let toggles = LayerToggles {
        show_other_role: true,
        show_solution: false,
    };
    let denied = LayerRequest::new(Role::Second).with_toggles(toggles);
    assert_eq!(visible_layers(&denied, &content).as_slice(), &[Role::Second]);
    let allowed = denied.with_allow_second_view_first(true);
    assert_eq!(
        visible_layers(&allowed, &content).as_slice(),
        &[Role::Second, Role::First]
    );
    let first = LayerRequest::new(Role::First).with_toggles(toggles);
    assert!(visible_layers(&first, &content).contains(&Role::Second));
}

#[test]
fn solution_is_painted_first_with_underlay_paint() {
    let mut student_log = AnnotationLog::new();
    student_log.append(mark("a", Role::First));
    student_log.append(mark("b", Role::Second));
    student_log.append(mark("c", Role::First));
    let mut solution_log = AnnotationLog::new();
    solution_log.append(mark("s", Role::Solution));

    let req = LayerRequest::new(Role::First).with_toggles(LayerToggles {
        show_other_role: false,
        show_solution: true,
    });
    let content = LayerContent {
        other_role: true,
        solution: true,
    };
    let layers = visible_layers(&req, &content);
    assert_eq!(layers.as_slice(), &[Role::Solution, Role::First]);

    let list = composite(&layers, Some(&student_log), Some(&solution_log), false, 0.35);
    let symbols: Vec<&str> = list
        .iter()
        .map(|l| match l.annotation {
            Annotation::Mark(m) => m.symbol.as_str(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(symbols, vec!["s", "a", "c"]);
    assert_eq!(list[0].paint, LayerPaint::underlay(0.35));
    assert_eq!(list[1].paint, LayerPaint::Stored);
}

#[test]
fn editing_solution_paints_stored_colors() {
    let mut solution_log = AnnotationLog::new();
    solution_log.append(mark("s", Role::Solution));
    let list = composite(&[Role::Solution], None, Some(&solution_log), true, 0.35);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].paint, LayerPaint::Stored);
}

#[test]
fn task_paint_list_hides_other_role_until_toggled() {
    let mut student = StudentRecord::new("s1", 1);
    student.log_mut("t1").append(mark("a", Role::First));
    student.log_mut("t1").append(mark("b", Role::Second));
    let mut solutions = ModelSolutionSet::new();
    solutions.append("t1", mark("s", Role::First), Role::First).unwrap();

    let plain = LayerRequest::new(Role::First);
    let list = task_paint_list(&plain, Some(&student), &solutions, "t1", 0.35);
    assert_eq!(list.len(), 1);

    let all = plain.with_toggles(LayerToggles {
        show_other_role: true,
        show_solution: true,
    });
    let list = task_paint_list(&all, Some(&student), &solutions, "t1", 0.35);
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].annotation.role(), Role::Solution);

    let editing = all.with_editing_solution(true);
    let list = task_paint_list(&editing, Some(&student), &solutions, "t1", 0.35);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].paint, LayerPaint::Stored);
}
