//! [`Demand`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Announcement;
use crate::domain::{announcement, user};

/// Request of a shipper to transport cargo within an [`Announcement`].
#[derive(Clone, Debug)]
pub struct Demand {
    /// ID of this [`Demand`].
    pub id: Id,

    /// ID of the [`Announcement`] this [`Demand`] is placed on.
    pub announcement_id: announcement::Id,

    /// ID of the shipper who placed this [`Demand`].
    pub shipper_id: user::Id,

    /// [`Status`] of this [`Demand`].
    pub status: Status,

    /// [`DateTime`] when this [`Demand`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Demand`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Demand`]."]
    enum Status {
        #[doc = "[`Demand`] awaits a decision of the driver."]
        Pending = 1,

        #[doc = "[`Demand`] was accepted by the driver."]
        Accepted = 2,

        #[doc = "[`Demand`] was rejected by the driver."]
        Rejected = 3,

        #[doc = "[`Demand`] was called off."]
        Cancelled = 4,

        #[doc = "Cargo of the [`Demand`] was delivered."]
        Delivered = 5,
    }
}

/// Bulk transition of all the [`Demand`]s placed on an [`Announcement`]
/// from one [`Status`] to another.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    /// ID of the [`Announcement`] whose [`Demand`]s are transitioned.
    pub announcement_id: announcement::Id,

    /// [`Status`] the [`Demand`]s are transitioned from.
    pub from: Status,

    /// [`Status`] the [`Demand`]s are transitioned to.
    pub to: Status,
}

/// [`DateTime`] when a [`Demand`] was created.
pub type CreationDateTime = DateTimeOf<(Demand, unit::Creation)>;
