//! Multi-page export: page collaborators in, document sinks out.

pub mod paginator;
pub mod sink;
pub mod source;
