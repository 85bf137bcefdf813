//! [`Demand`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::api;

/// Request of a shipper to transport cargo within an `Announcement`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Demand {
    /// Unique identifier of this `Demand`.
    pub id: Id,

    /// Unique identifier of the `Announcement` this `Demand` is placed on.
    pub announcement_id: api::announcement::Id,

    /// Unique identifier of the shipper who placed this `Demand`.
    pub shipper_id: api::user::Id,

    /// Status of this `Demand`.
    pub status: Status,

    /// `DateTime` when this `Demand` was created.
    pub created_at: DateTime,
}

impl From<domain::Demand> for Demand {
    fn from(demand: domain::Demand) -> Self {
        let domain::Demand {
            id,
            announcement_id,
            shipper_id,
            status,
            created_at,
        } = demand;
        Self {
            id: id.into(),
            announcement_id: announcement_id.into(),
            shipper_id: shipper_id.into(),
            status: status.into(),
            created_at: created_at.coerce(),
        }
    }
}

/// Unique identifier of a `Demand`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::demand::Id)]
#[into(domain::demand::Id)]
#[graphql(name = "DemandId", transparent)]
pub struct Id(Uuid);

/// Status of a `Demand`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "DemandStatus")]
pub enum Status {
    /// `Demand` awaits a decision of the driver.
    Pending,

    /// `Demand` was accepted by the driver.
    Accepted,

    /// `Demand` was rejected by the driver.
    Rejected,

    /// `Demand` was called off.
    Cancelled,

    /// Cargo of the `Demand` was delivered.
    Delivered,
}

impl From<domain::demand::Status> for Status {
    fn from(status: domain::demand::Status) -> Self {
        use domain::demand::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Accepted => Self::Accepted,
            S::Rejected => Self::Rejected,
            S::Cancelled => Self::Cancelled,
            S::Delivered => Self::Delivered,
        }
    }
}
