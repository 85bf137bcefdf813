//! [`Announcement`] read model definitions.

#[cfg(doc)]
use crate::domain::announcement::Status;
use crate::domain::{announcement, user, Announcement, Demand};

/// [`Announcement`] along with a projection `D` of its driver.
#[derive(Clone, Debug)]
pub struct WithDriver<D> {
    /// The [`Announcement`] itself.
    pub announcement: Announcement,

    /// Projection of the driver owning the [`Announcement`].
    pub driver: D,
}

/// Selector of an [`Announcement`] owned by a specific driver.
///
/// Matches nothing if the [`Announcement`] exists, but is owned by another
/// driver.
#[derive(Clone, Copy, Debug)]
pub struct OwnedBy {
    /// ID of the [`Announcement`] to select.
    pub announcement_id: announcement::Id,

    /// ID of the driver expected to own the [`Announcement`].
    pub driver_id: user::Id,
}

/// Selector of the [`Announcement`]s of a driver, newest first.
#[derive(Clone, Copy, Debug)]
pub struct Selector {
    /// ID of the driver owning the [`Announcement`]s.
    pub driver_id: user::Id,

    /// [`Status`] to filter the [`Announcement`]s by, if any.
    pub status: Option<announcement::Status>,
}

/// Completed [`Announcement`] along with its delivered [`Demand`]s.
#[derive(Clone, Debug)]
pub struct Completed {
    /// The completed [`Announcement`].
    pub announcement: Announcement,

    /// [`Demand`]s delivered within the [`Announcement`].
    pub demands: Vec<Demand>,
}
