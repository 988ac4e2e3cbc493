//! Pointer gestures that produce annotations, and the eraser hit-test.

pub mod gesture;
