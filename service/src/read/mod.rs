//! Read entities definitions.

pub mod announcement;
pub mod demand;
pub mod user;
