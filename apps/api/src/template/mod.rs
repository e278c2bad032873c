// Template engine: schema, extraction, merge, scoring, fallback generation.
// Nothing in this module performs I/O; persistence lives in `store`, generation in `workflow`.

pub mod completeness;
pub mod extract;
pub mod fallback;
pub mod fields;
pub mod merge;
pub mod models;
pub mod rules;
