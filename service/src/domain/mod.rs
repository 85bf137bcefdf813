//! Domain definitions.

pub mod announcement;
pub mod demand;
pub mod user;

pub use self::{announcement::Announcement, demand::Demand, user::User};
