use super::*;
use crate::export::sink::InMemorySink;
use crate::export::source::BlankPages;
use crate::foundation::core::{CssColor, PageRect, Point, Size};
use crate::model::annotation::{Annotation, PenStroke};
use crate::model::region::TaskRegion;
use crate::model::student::StudentRecord;

fn pen(role: Role) -> Annotation {
    Annotation::Pen(PenStroke {
        color: CssColor::parse("#ff0000").unwrap(),
        line_width: 2.0,
        points: vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        role,
    })
}

fn project(starts: &[u32]) -> Project {
    let mut p = Project::new(
        2,
        vec![TaskRegion::new("t2", 2, PageRect::new(10.0, 10.0, 80.0, 80.0), 5.0)],
    );
    for (i, start) in starts.iter().enumerate() {
        let mut s = StudentRecord::new(format!("s{i}"), *start);
        s.log_mut("t2").append(pen(Role::First));
        s.grades.entry("t2".to_owned()).or_default().points = Some(3.0);
        p.students.push(s);
    }
    p
}

fn pages(count: u32) -> BlankPages {
    BlankPages::new(count).with_size(Size::new(100.0, 100.0))
}

fn run(
    project: &Project,
    opts: ExportOptions,
    page_count: u32,
) -> (OvermarkResult<ExportReport>, InMemorySink, Vec<f64>, ExportState) {
    let mut job = ExportJob::new(project, opts);
    let mut sink = InMemorySink::new();
    let mut seen = Vec::new();
    let out = job.run(
        &mut pages(page_count),
        &mut FontBook::empty(),
        &mut sink,
        &mut |p| seen.push(p),
    );
    (out, sink, seen, job.state())
}

#[test]
fn task_page_is_built_from_the_absolute_page() {
    let (out, sink, _, state) = run(&project(&[5]), ExportOptions::default(), 6);
    let report = out.unwrap();
    assert_eq!(state, ExportState::Finished);
    assert_eq!(report.pages_written, 2);
    assert!(report.skipped.is_empty());

    let doc = &sink.documents()[0];
    assert!(doc.complete);
    let (meta, image) = &doc.pages[1];
    assert_eq!(meta.source_page, 6);
    assert_eq!(meta.page_in_student, 2);
    assert_eq!((image.width, image.height), (200, 200));
    assert_eq!(image.pixel(100, 100), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel(100, 150), Some([255, 255, 255, 255]));
}

#[test]
fn missing_pages_are_skipped_and_the_job_completes() {
    let (out, sink, _, state) = run(&project(&[1, 5, 3]), ExportOptions::default(), 5);
    let report = out.unwrap();
    assert_eq!(state, ExportState::Finished);
    assert_eq!(report.pages_written, 5);
    assert_eq!(
        report.skipped,
        vec![SkippedPage {
            student_index: Some(1),
            source_page: 6,
            reason: report.skipped[0].reason.clone(),
        }]
    );
    let order: Vec<u32> = sink.documents()[0]
        .pages
        .iter()
        .map(|(m, _)| m.source_page)
        .collect();
    assert_eq!(order, vec![1, 2, 5, 3, 4]);
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let (_, _, seen, _) = run(&project(&[1, 3]), ExportOptions::default(), 4);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().copied(), Some(100.0));
}

#[test]
fn cancellation_aborts_the_sink() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let opts = ExportOptions::default().with_cancel(cancel);
    let (out, sink, _, state) = run(&project(&[1]), opts, 2);
    assert!(matches!(out, Err(OvermarkError::Cancelled)));
    assert_eq!(state, ExportState::Cancelled);
    assert!(sink.was_aborted());
    assert!(!sink.documents()[0].complete);
}

#[test]
fn individual_mode_appends_solution_pages_per_student() {
    let mut p = project(&[1, 3]);
    p.students[0].name = "Anna".to_owned();
    p.model_solutions.append("t2", pen(Role::First), Role::First).unwrap();
    let opts = ExportOptions::default()
        .with_mode(ExportMode::Individual)
        .with_solution_pages(true);
    let (out, sink, _, _) = run(&p, opts, 4);
    assert_eq!(out.unwrap().documents, 2);

    let docs = sink.documents();
    assert_eq!(docs[0].name, "Anna");
    assert_eq!(docs[1].name, "student_2");
    assert_eq!(docs[0].pages.len(), 4);
    let (meta, image) = &docs[0].pages[3];
    assert_eq!(meta.student_index, None);
    assert_eq!(meta.source_page, 2);
    let [r, g, b, a] = image.pixel(100, 100).unwrap();
    assert_eq!(a, 255);
    assert!(r < 255 && b > r && g >= r, "underlay grey expected, got {r},{g},{b}");
}

#[test]
fn second_viewer_exports_only_their_layer() {
    let p = project(&[1]);
    let (out, sink, _, _) = run(&p, ExportOptions::for_viewer(Role::Second), 2);
    out.unwrap();
    let (_, image) = &sink.documents()[0].pages[1];
    assert_eq!(image.pixel(100, 100), Some([255, 255, 255, 255]));
}

#[test]
fn job_reads_a_snapshot() {
    let mut p = project(&[1]);
    let mut job = ExportJob::new(&p, ExportOptions::default());
    p.students.clear();
    let mut sink = InMemorySink::new();
    let report = job
        .run(&mut pages(2), &mut FontBook::empty(), &mut sink, &mut |_| {})
        .unwrap();
    assert_eq!(report.pages_written, 2);
}

#[test]
fn vector_backend_exports_the_same_stroke() {
    let opts = ExportOptions::default().with_backend(BackendKind::Vector);
    let (out, sink, _, _) = run(&project(&[1]), opts, 2);
    out.unwrap();
    let (_, image) = &sink.documents()[0].pages[1];
    assert_eq!(image.pixel(100, 100), Some([255, 0, 0, 255]));
}

#[test]
fn page_start_near_u32_max_is_skipped_not_overflowed() {
    let (out, sink, _, state) = run(&project(&[1, u32::MAX]), ExportOptions::default(), 4);
    let report = out.unwrap();
    assert_eq!(state, ExportState::Finished);
    assert_eq!(report.pages_written, 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().all(|s| s.student_index == Some(1)));
    assert_eq!(sink.documents()[0].pages.len(), 2);
}
