use super::*;
use crate::foundation::core::PageRect;

fn json() -> &'static str {
    r##"{
        "title": "Klassenarbeit 3",
        "pagesPerStudent": 2,
        "tasks": [
            {"id": "t1", "name": "1a", "page": 1, "region": {"x": 10, "y": 10, "width": 30, "height": 20}, "maxPoints": 6},
            {"id": "t2", "page": 2, "region": {"x": 5, "y": 50, "width": 90, "height": 40}, "maxPoints": 4}
        ],
        "students": [
            {"id": "s_0", "name": "", "pageStart": 1, "grades": {"t1": {"points": 5}}, "annotations": {
                "t1": [{"type": "mark", "x": 50, "y": 50, "symbol": "Gr", "color": "#ef4444"}]
            }, "pending": ["t2"]}
        ],
        "scoreFields": {"totalField": null, "gradeField": {"x": 70, "y": 2, "width": 20, "height": 6}},
        "taskPointPositions": {"t1": {"x": 41, "y": 12}},
        "modelSolutions": {"t1": [{"type": "text", "x": 5, "y": 5, "text": "Lösung", "color": "#000", "fontSizeRel": 8}]},
        "allowSecondViewFirst": true
    }"##
}

#[test]
fn loads_original_shape() {
    let p = Project::from_json(json()).unwrap();
    assert_eq!(p.tasks.len(), 2);
    assert_eq!(p.max_points(), 10.0);
    assert_eq!(p.grade_table, GradeTable::sek_i());
    assert_eq!(p.correction_marks.len(), 6);
    assert!(p.score_fields.total_field.is_none());
    assert!(p.score_fields.grade_field.is_some());
    assert!(p.model_solutions.has_content("t1"));
    assert!(p.students[0].is_pending("t2"));
    assert_eq!(p.tasks_on_page(2).count(), 1);
}

#[test]
fn json_round_trip_is_lossless() {
    let p = Project::from_json(json()).unwrap();
    let text = p.to_json_pretty().unwrap();
    let back = Project::from_json(&text).unwrap();
    assert_eq!(back, p);
}

#[test]
fn validation_rejects_bad_layouts() {
    let mut p = Project::new(2, vec![TaskRegion::new("t", 3, PageRect::FULL, 1.0)]);
    assert!(p.validate().is_err());
    p.tasks[0].page = 2;
    assert!(p.validate().is_ok());
    p.tasks.push(TaskRegion::new("t", 1, PageRect::FULL, 1.0));
    assert!(p.validate().is_err());
    assert!(Project::new(0, Vec::new()).validate().is_err());
}

#[test]
fn students_are_laid_out_by_page() {
    let p = Project::new(2, Vec::new()).with_students_for_pages(7);
    let starts: Vec<u32> = p.students.iter().map(|s| s.page_start).collect();
    assert_eq!(starts, vec![1, 3, 5, 7]);
}
