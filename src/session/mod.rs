//! Headless live view: the interactive pipeline for one grader.

pub mod grading_session;
