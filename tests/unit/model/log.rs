use super::*;
use crate::foundation::core::{CssColor, Point};
use crate::model::annotation::{Mark, PenStroke};

fn mark(symbol: &str, role: Role) -> Annotation {
    Annotation::Mark(Mark {
        color: CssColor::parse("#ef4444").unwrap(),
        symbol: symbol.into(),
        x: 10.0,
        y: 10.0,
        role,
    })
}

fn pen(n: usize) -> Annotation {
    Annotation::Pen(PenStroke {
        color: CssColor::parse("#111").unwrap(),
        line_width: 2.0,
        points: (0..n).map(|i| Point::new(i as f64, i as f64)).collect(),
        role: Role::First,
    })
}

#[test]
fn single_point_pen_is_a_no_op() {
    let mut log = AnnotationLog::new();
    assert!(log.append(pen(1)).is_none());
    assert_eq!(log.len(), 0);
    assert!(log.append(pen(2)).is_some());
    assert_eq!(log.len(), 1);
}

#[test]
fn undo_last_of_role_leaves_other_roles_in_order() {
    let mut log = AnnotationLog::new();
    log.append(mark("a", Role::First));
    log.append(mark("b", Role::Second));
    log.append(mark("c", Role::First));

    let last = log.last_of_role(Role::First).unwrap();
    assert!(log.remove(last).is_some());

    let symbols: Vec<(String, Role)> = log
        .annotations()
        .map(|a| match a {
            Annotation::Mark(m) => (m.symbol.clone(), m.role),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(
        symbols,
        vec![("a".to_string(), Role::First), ("b".to_string(), Role::Second)]
    );
}

#[test]
fn identical_values_are_removed_by_identity() {
    let mut log = AnnotationLog::new();
    let first = log.append(pen(3)).unwrap();
    let second = log.append(pen(3)).unwrap();
    assert_ne!(first, second);

    log.remove(second);
    assert_eq!(log.len(), 1);
    assert!(log.get(first).is_some());
    assert!(log.get(second).is_none());
    assert!(log.remove(second).is_none());
}

#[test]
fn filter_preserves_relative_order() {
    let mut log = AnnotationLog::new();
    log.append(mark("1", Role::Second));
    log.append(mark("2", Role::First));
    log.append(mark("3", Role::Solution));
    log.append(mark("4", Role::Second));

    let picked: Vec<&str> = log
        .filter_by_role(&[Role::Second, Role::Solution])
        .map(|(_, a)| match a {
            Annotation::Mark(m) => m.symbol.as_str(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(picked, vec!["1", "3", "4"]);
}

#[test]
fn clear_role_and_undo_empty() {
    let mut log = AnnotationLog::new();
    log.append(mark("a", Role::Second));
    log.append(mark("b", Role::First));
    assert_eq!(log.clear_role(Role::Second), 1);
    assert!(!log.has_role(Role::Second));
    assert!(log.undo_last_of_role(Role::Second).is_none());
}

#[test]
fn serializes_as_plain_sequence() {
    let mut log = AnnotationLog::new();
    log.append(mark("Gr", Role::Second));
    let v = serde_json::to_value(&log).unwrap();
    assert!(v.is_array());
    assert_eq!(v[0]["type"], "mark");
    let back: AnnotationLog = serde_json::from_value(v).unwrap();
    assert_eq!(back, log);
}
