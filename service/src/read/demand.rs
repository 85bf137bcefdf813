//! [`Demand`] read model definitions.
//!
//! [`Demand`]: crate::domain::Demand

#[cfg(doc)]
use crate::domain::{Announcement, Demand};
use crate::domain::{announcement, demand};

/// Selector of the [`Demand`]s placed on a set of [`Announcement`]s, oldest
/// first.
#[derive(Clone, Debug)]
pub struct Selector {
    /// IDs of the [`Announcement`]s the [`Demand`]s are placed on.
    pub announcement_ids: Vec<announcement::Id>,

    /// [`demand::Status`] to filter the [`Demand`]s by, if any.
    pub status: Option<demand::Status>,
}
