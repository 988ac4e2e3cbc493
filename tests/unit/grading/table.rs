use super::*;

#[test]
fn sek_i_thresholds() {
    let t = GradeTable::sek_i();
    assert_eq!(t.grade_for(46.0, 50.0), "1");
    assert_eq!(t.grade_for(40.5, 50.0), "2");
    assert_eq!(t.grade_for(25.0, 50.0), "4");
    assert_eq!(t.grade_for(0.0, 50.0), "6");
    assert_eq!(t.grade_for(10.0, 0.0), "-");
    assert!(!t.is_points_scale());
    assert_eq!(t.display_grade(40.5, 50.0), "2");
}

#[test]
fn sek_ii_uses_points_display() {
    let t = GradeTable::sek_ii();
    assert!(t.is_points_scale());
    assert_eq!(t.display_grade(48.0, 50.0), "15 P.");
    assert_eq!(t.display_grade(30.0, 50.0), "08 P.");
    assert_eq!(t.display_grade(5.0, 50.0), "00");
    assert_eq!(t.format_grade("-"), "-");
}

#[test]
fn rows_are_sorted_and_numbers_accepted() {
    let t: GradeTable = serde_json::from_str(
        r#"[{"minPercent": 0, "grade": 6}, {"minPercent": 50, "grade": "4"}, {"minPercent": 90, "grade": 1}]"#,
    )
    .unwrap();
    assert_eq!(t.rows()[0].grade, "1");
    assert_eq!(t.grade_for(60.0, 100.0), "4");
}

#[test]
fn below_every_threshold_uses_last_row() {
    let t = GradeTable::new(vec![GradeRow::new(50.0, "pass"), GradeRow::new(20.0, "weak")]);
    assert_eq!(t.grade_for(1.0, 100.0), "weak");
    assert_eq!(GradeTable::new(Vec::new()).grade_for(1.0, 10.0), "-");
}

#[test]
fn points_format_in_half_steps() {
    assert_eq!(format_points(8.0), "8");
    assert_eq!(format_points(8.26), "8.5");
    assert_eq!(format_points(8.2), "8");
    assert_eq!(format_points(f64::NAN), "—");
}

#[test]
fn default_marks_parse() {
    let marks = default_correction_marks();
    assert_eq!(marks.len(), 6);
    assert_eq!(marks[3].symbol, "Conj");
}
