//! [`Announcement`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{GraphQLEnum, GraphQLInputObject, GraphQLObject, GraphQLScalar};
use service::{command, domain, read};
use uuid::Uuid;

use crate::api;

/// Transport capacity offered by a driver.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Announcement {
    /// Unique identifier of this `Announcement`.
    pub id: Id,

    /// Unique identifier of the driver owning this `Announcement`.
    pub driver_id: api::user::Id,

    /// Location the trip starts from.
    pub start_point: String,

    /// Ordered locations the trip passes through.
    pub waypoints: Vec<String>,

    /// Location the trip ends at.
    pub destination: String,

    /// Maximum `Dimensions` of a package, if limited.
    pub max_dimensions: Option<Dimensions>,

    /// Categories of cargo accepted for transportation.
    pub package_types: Vec<String>,

    /// Weight capacity still available.
    pub available_capacity: f64,

    /// `DateTime` when the trip starts.
    pub start_date: DateTime,

    /// `DateTime` when the trip was completed, if it was.
    pub end_date: Option<DateTime>,

    /// Status of this `Announcement`.
    pub status: Status,

    /// `DateTime` when this `Announcement` was created.
    pub created_at: DateTime,
}

impl From<domain::Announcement> for Announcement {
    fn from(announcement: domain::Announcement) -> Self {
        let domain::Announcement {
            id,
            driver_id,
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
            end_date,
            status,
            created_at,
        } = announcement;
        Self {
            id: id.into(),
            driver_id: driver_id.into(),
            start_point: start_point.to_string(),
            waypoints: waypoints.iter().map(ToString::to_string).collect(),
            destination: destination.to_string(),
            max_dimensions: max_dimensions.map(Into::into),
            package_types: package_types
                .iter()
                .map(ToString::to_string)
                .collect(),
            available_capacity: available_capacity.into(),
            start_date: start_date.coerce(),
            end_date: end_date.map(|d| d.coerce()),
            status: status.into(),
            created_at: created_at.coerce(),
        }
    }
}

/// Unique identifier of an `Announcement`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::announcement::Id)]
#[into(domain::announcement::Id)]
#[graphql(name = "AnnouncementId", transparent)]
pub struct Id(Uuid);

/// Status of an `Announcement`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AnnouncementStatus")]
pub enum Status {
    /// `Announcement` is published and awaits `Demand`s.
    Pending,

    /// `Announcement` is underway.
    Active,

    /// Trip of the `Announcement` is over.
    Completed,

    /// `Announcement` was called off by its driver.
    Cancelled,
}

impl From<domain::announcement::Status> for Status {
    fn from(status: domain::announcement::Status) -> Self {
        use domain::announcement::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Active => Self::Active,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
        }
    }
}

impl From<Status> for domain::announcement::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Active => Self::Active,
            Status::Completed => Self::Completed,
            Status::Cancelled => Self::Cancelled,
        }
    }
}

/// Maximum dimensions of a package.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct Dimensions {
    /// Length of a package.
    pub length: f64,

    /// Width of a package.
    pub width: f64,

    /// Height of a package.
    pub height: f64,
}

impl From<domain::announcement::Dimensions> for Dimensions {
    fn from(dims: domain::announcement::Dimensions) -> Self {
        Self {
            length: dims.length.into(),
            width: dims.width.into(),
            height: dims.height.into(),
        }
    }
}

/// Maximum dimensions of a package, as provided by a driver.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
pub struct DimensionsInput {
    /// Length of a package.
    pub length: f64,

    /// Width of a package.
    pub width: f64,

    /// Height of a package.
    pub height: f64,
}

impl From<DimensionsInput> for command::create_announcement::Dimensions {
    fn from(input: DimensionsInput) -> Self {
        let DimensionsInput {
            length,
            width,
            height,
        } = input;
        Self {
            length,
            width,
            height,
        }
    }
}

/// Fields of a new `Announcement`.
///
/// `startPoint`, `destination`, `availableCapacity` and `startDate` are
/// required: all the missing ones are reported at once.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "AnnouncementInput")]
pub struct Input {
    /// Location the trip starts from.
    pub start_point: Option<String>,

    /// Ordered locations the trip passes through.
    pub waypoints: Option<Vec<String>>,

    /// Location the trip ends at.
    pub destination: Option<String>,

    /// Maximum dimensions of a package, if limited.
    pub max_dimensions: Option<DimensionsInput>,

    /// Categories of cargo accepted for transportation.
    pub package_types: Option<Vec<String>>,

    /// Available weight capacity.
    pub available_capacity: Option<f64>,

    /// `DateTime` when the trip starts. Must be in the future.
    pub start_date: Option<DateTime>,
}

impl Input {
    /// Converts this [`Input`] into a [`command::CreateAnnouncement`] issued
    /// by the provided identity.
    #[must_use]
    pub fn into_command(
        self,
        identity: Option<domain::user::Identity>,
    ) -> command::CreateAnnouncement {
        let Self {
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
        } = self;
        command::CreateAnnouncement {
            identity,
            start_point,
            waypoints: waypoints.unwrap_or_default(),
            destination,
            max_dimensions: max_dimensions.map(Into::into),
            package_types: package_types.unwrap_or_default(),
            available_capacity,
            start_date,
        }
    }
}

/// Partial change of an `Announcement`.
///
/// Absent fields are left untouched.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "AnnouncementPatch")]
pub struct Patch {
    /// New location the trip starts from.
    pub start_point: Option<String>,

    /// New ordered locations the trip passes through.
    pub waypoints: Option<Vec<String>>,

    /// New location the trip ends at.
    pub destination: Option<String>,

    /// New maximum dimensions of a package.
    pub max_dimensions: Option<DimensionsInput>,

    /// New categories of cargo accepted for transportation.
    pub package_types: Option<Vec<String>>,

    /// New available weight capacity.
    pub available_capacity: Option<f64>,

    /// New `DateTime` when the trip starts. Must be in the future.
    pub start_date: Option<DateTime>,

    /// `DateTime` when the trip was completed.
    pub end_date: Option<DateTime>,

    /// New status. Moving to `COMPLETED` stamps the `endDate`, unless
    /// provided.
    pub status: Option<Status>,

    /// Ignored, as the owning driver of an `Announcement` never changes.
    pub driver_id: Option<api::user::Id>,
}

impl From<Patch> for command::update_announcement::Patch {
    fn from(patch: Patch) -> Self {
        let Patch {
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
            end_date,
            status,
            driver_id: _,
        } = patch;
        Self {
            start_point,
            waypoints,
            destination,
            max_dimensions: max_dimensions.map(Into::into),
            package_types,
            available_capacity,
            start_date,
            end_date,
            status: status.map(Into::into),
        }
    }
}

/// `Announcement` along with a summary of its driver.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ListedAnnouncement")]
pub struct Listed {
    /// The `Announcement` itself.
    pub announcement: Announcement,

    /// Summary of the driver owning the `Announcement`.
    pub driver: api::user::Summary,
}

impl From<read::announcement::WithDriver<read::user::Summary>> for Listed {
    fn from(
        listed: read::announcement::WithDriver<read::user::Summary>,
    ) -> Self {
        Self {
            announcement: listed.announcement.into(),
            driver: listed.driver.into(),
        }
    }
}

/// `Announcement` along with contact details of its driver.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DetailedAnnouncement")]
pub struct Detailed {
    /// The `Announcement` itself.
    pub announcement: Announcement,

    /// Contact details of the driver owning the `Announcement`.
    pub driver: api::user::Contact,
}

impl From<read::announcement::WithDriver<read::user::Contact>> for Detailed {
    fn from(
        detailed: read::announcement::WithDriver<read::user::Contact>,
    ) -> Self {
        Self {
            announcement: detailed.announcement.into(),
            driver: detailed.driver.into(),
        }
    }
}

/// Completed `Announcement` along with its delivered `Demand`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "CompletedAnnouncement")]
pub struct Completed {
    /// The completed `Announcement`.
    pub announcement: Announcement,

    /// `Demand`s delivered within the `Announcement`.
    pub demands: Vec<api::Demand>,
}

impl From<read::announcement::Completed> for Completed {
    fn from(completed: read::announcement::Completed) -> Self {
        Self {
            announcement: completed.announcement.into(),
            demands: completed.demands.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of an `Announcement` creation.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "CreateAnnouncementResult")]
pub struct CreateResult {
    /// The created `Announcement`.
    pub announcement: Announcement,

    /// Human-readable confirmation.
    pub message: String,
}

impl From<domain::Announcement> for CreateResult {
    fn from(announcement: domain::Announcement) -> Self {
        Self {
            announcement: announcement.into(),
            message: "Announcement created successfully".to_owned(),
        }
    }
}

/// Result of an `Announcement` deletion.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DeleteAnnouncementResult")]
pub struct DeleteResult {
    /// Unique identifier of the deleted `Announcement`.
    pub id: Id,

    /// Number of pending `Demand`s cancelled along with the `Announcement`.
    pub cancelled_demands: i32,

    /// Human-readable confirmation.
    pub message: String,
}

impl From<command::delete_announcement::Output> for DeleteResult {
    fn from(output: command::delete_announcement::Output) -> Self {
        let command::delete_announcement::Output {
            announcement,
            cancelled_demands,
        } = output;
        Self {
            id: announcement.id.into(),
            cancelled_demands: i32::try_from(cancelled_demands)
                .unwrap_or(i32::MAX),
            message: "Announcement deleted successfully".to_owned(),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use juniper::{
        graphql_input_value, DefaultScalarValue, FromInputValue as _,
        InputValue,
    };
    use service::domain::{announcement, user};

    use super::{Announcement, Input, Patch, Status};

    #[test]
    fn exposes_domain_fields() {
        let now = DateTime::now();
        let domain = announcement::Announcement {
            id: announcement::Id::new(),
            driver_id: user::Id::new(),
            start_point: announcement::Location::new("Casablanca").unwrap(),
            waypoints: vec![announcement::Location::new("Rabat").unwrap()],
            destination: announcement::Location::new("Fès").unwrap(),
            max_dimensions: announcement::Dimensions::new(1.0, 2.0, 3.0),
            package_types: announcement::PackageType::new("boxes")
                .into_iter()
                .collect(),
            available_capacity: announcement::Capacity::new(500.0).unwrap(),
            start_date: now.coerce(),
            end_date: None,
            status: announcement::Status::Pending,
            created_at: now.coerce(),
        };

        let exposed = Announcement::from(domain);

        assert_eq!(exposed.start_point, "Casablanca");
        assert_eq!(exposed.waypoints, ["Rabat"]);
        assert_eq!(exposed.destination, "Fès");
        assert_eq!(exposed.package_types, ["boxes"]);
        assert_eq!(exposed.max_dimensions.map(|d| d.height), Some(3.0));
        assert_eq!(exposed.available_capacity, 500.0);
        assert_eq!(exposed.status, Status::Pending);
    }

    #[test]
    fn keeps_absent_input_fields_absent() {
        let cmd = Input {
            start_point: Some("Casablanca".into()),
            waypoints: None,
            destination: None,
            max_dimensions: None,
            package_types: None,
            available_capacity: Some(500.0),
            start_date: None,
        }
        .into_command(None);

        assert_eq!(cmd.start_point.as_deref(), Some("Casablanca"));
        assert!(cmd.destination.is_none());
        assert!(cmd.waypoints.is_empty());
        assert!(cmd.start_date.is_none());
    }

    #[test]
    fn converts_patch_status() {
        let patch: service::command::update_announcement::Patch = Patch {
            status: Some(Status::Completed),
            ..Patch::default()
        }
        .into();

        assert_eq!(patch.status, Some(announcement::Status::Completed));
        assert!(patch.start_point.is_none());
    }

    #[test]
    fn ignores_driver_id_in_patch() {
        let input: InputValue<DefaultScalarValue> = graphql_input_value!({
            "driverId": "6a6c2d4e-5b1f-4c3a-9e2d-7f8b9a0c1d2e",
            "availableCapacity": 800.0,
        });

        let patch: service::command::update_announcement::Patch =
            Patch::from_input_value(&input).unwrap().into();

        assert_eq!(patch.available_capacity, Some(800.0));
        assert!(patch.start_point.is_none());
        assert!(patch.status.is_none());
    }
}
