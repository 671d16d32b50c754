//! Use cases (application services)

pub mod dispatch;
pub mod submit_comparison;
