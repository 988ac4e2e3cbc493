pub mod annotation;
pub mod log;
pub mod project;
pub mod region;
pub mod solution;
pub mod student;
