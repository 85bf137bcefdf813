//! [`Announcement`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use itertools::Itertools as _;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Transport capacity offered by a driver for a route and a time window.
#[derive(Clone, Debug)]
pub struct Announcement {
    /// ID of this [`Announcement`].
    pub id: Id,

    /// ID of the driver owning this [`Announcement`].
    pub driver_id: user::Id,

    /// [`Location`] the trip starts from.
    pub start_point: Location,

    /// Ordered [`Location`]s the trip passes through.
    pub waypoints: Vec<Location>,

    /// [`Location`] the trip ends at.
    pub destination: Location,

    /// Maximum [`Dimensions`] of a package, if limited.
    pub max_dimensions: Option<Dimensions>,

    /// [`PackageType`]s accepted for transportation.
    pub package_types: Vec<PackageType>,

    /// Weight [`Capacity`] still available.
    pub available_capacity: Capacity,

    /// [`DateTime`] when the trip starts.
    pub start_date: StartDateTime,

    /// [`DateTime`] when the trip was completed, if it was.
    pub end_date: Option<EndDateTime>,

    /// [`Status`] of this [`Announcement`].
    pub status: Status,

    /// [`DateTime`] when this [`Announcement`] was created.
    pub created_at: CreationDateTime,
}

impl Announcement {
    /// Indicates whether this [`Announcement`] is owned by the provided
    /// driver.
    #[must_use]
    pub fn is_owned_by(&self, driver_id: user::Id) -> bool {
        self.driver_id == driver_id
    }
}

/// ID of an [`Announcement`].
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

/// Free-form location (city, address, etc.) on a route.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        !location.trim().is_empty() && location.len() <= 512
    }
}

/// Category of cargo accepted by an [`Announcement`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PackageType(String);

impl PackageType {
    /// Creates a new [`PackageType`] if the given `kind` is valid.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        let kind = kind.into();
        Self::check(&kind).then_some(Self(kind))
    }

    /// Checks whether the given `kind` is a valid [`PackageType`].
    fn check(kind: impl AsRef<str>) -> bool {
        let kind = kind.as_ref();
        !kind.trim().is_empty() && kind.len() <= 128
    }
}

/// Available weight capacity of an [`Announcement`].
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Capacity(f64);

impl Capacity {
    /// Creates a new [`Capacity`] if the given `value` is positive.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        is_positive(value).then_some(Self(value))
    }
}

/// Single positive measure of [`Dimensions`].
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Measure(f64);

impl Measure {
    /// Creates a new [`Measure`] if the given `value` is positive.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        is_positive(value).then_some(Self(value))
    }
}

/// Maximum dimensions of a package.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Length of a package.
    pub length: Measure,

    /// Width of a package.
    pub width: Measure,

    /// Height of a package.
    pub height: Measure,
}

impl Dimensions {
    /// Creates new [`Dimensions`] if all the given values are positive.
    #[must_use]
    pub fn new(length: f64, width: f64, height: f64) -> Option<Self> {
        Some(Self {
            length: Measure::new(length)?,
            width: Measure::new(width)?,
            height: Measure::new(height)?,
        })
    }
}

/// Checks whether the given `value` is a finite positive number.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

define_kind! {
    #[doc = "Status of an [`Announcement`]."]
    enum Status {
        #[doc = "[`Announcement`] is published and awaits demands."]
        Pending = 1,

        #[doc = "[`Announcement`] is underway."]
        Active = 2,

        #[doc = "Trip of the [`Announcement`] is over."]
        Completed = 3,

        #[doc = "[`Announcement`] was called off by its driver."]
        Cancelled = 4,
    }
}

impl Status {
    /// Indicates whether demands may still be placed on an [`Announcement`]
    /// in this [`Status`].
    #[must_use]
    pub fn accepts_demands(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

/// Field of an [`Announcement`] subject to validation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    /// [`Announcement::start_point`].
    StartPoint,

    /// [`Announcement::waypoints`].
    Waypoints,

    /// [`Announcement::destination`].
    Destination,

    /// [`Announcement::max_dimensions`].
    MaxDimensions,

    /// [`Announcement::package_types`].
    PackageTypes,

    /// [`Announcement::available_capacity`].
    AvailableCapacity,

    /// [`Announcement::start_date`].
    StartDate,

    /// [`Announcement::end_date`].
    EndDate,
}

impl Field {
    /// Parses the provided `raw` value of this [`Field`].
    ///
    /// # Errors
    ///
    /// With [`Invalid::Field`] if `parse` rejects the `raw` value.
    pub fn parse<R, T>(
        self,
        raw: R,
        parse: impl FnOnce(R) -> Option<T>,
    ) -> Result<T, Invalid> {
        parse(raw).ok_or(Invalid::Field(self))
    }

    /// Parses every one of the provided `raw` values of this [`Field`].
    ///
    /// # Errors
    ///
    /// With [`Invalid::Field`] if `parse` rejects any of the `raw` values.
    pub fn parse_all<R, T>(
        self,
        raw: impl IntoIterator<Item = R>,
        parse: impl Fn(R) -> Option<T>,
    ) -> Result<Vec<T>, Invalid> {
        raw.into_iter().map(|r| self.parse(r, &parse)).collect()
    }
}

/// Validation failure of [`Announcement`] fields.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum Invalid {
    /// Required [`Field`]s are absent.
    #[display("Missing required fields: {}", _0.iter().join(", "))]
    Missing(#[error(not(source))] Vec<Field>),

    /// [`Announcement::start_date`] is not in the future.
    #[display("Start date must be in the future")]
    StartDateNotFuture,

    /// [`Field`] value violates its format.
    #[display("Invalid `{_0}` field")]
    Field(#[error(not(source))] Field),
}

/// [`DateTime`] when an [`Announcement`] trip starts.
pub type StartDateTime = DateTimeOf<(Announcement, unit::Departure)>;

/// [`DateTime`] when an [`Announcement`] trip was completed.
pub type EndDateTime = DateTimeOf<(Announcement, unit::Completion)>;

/// [`DateTime`] when an [`Announcement`] was created.
pub type CreationDateTime = DateTimeOf<(Announcement, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Capacity, Dimensions, Field, Invalid, Location, PackageType};

    #[test]
    fn validates_locations() {
        assert!(Location::new("Casablanca").is_some());
        assert!(Location::new("").is_none());
        assert!(Location::new("   ").is_none());
        assert!(PackageType::new("fragile").is_some());
        assert!(PackageType::new("").is_none());
    }

    #[test]
    fn requires_positive_numbers() {
        assert!(Capacity::new(500.0).is_some());
        assert!(Capacity::new(0.0).is_none());
        assert!(Capacity::new(-1.0).is_none());
        assert!(Capacity::new(f64::NAN).is_none());

        assert!(Dimensions::new(1.0, 2.0, 3.0).is_some());
        assert!(Dimensions::new(1.0, 0.0, 3.0).is_none());
    }

    #[test]
    fn names_offending_fields() {
        assert_eq!(
            Field::Waypoints.parse_all(["Rabat", ""], Location::new),
            Err(Invalid::Field(Field::Waypoints)),
        );
        assert_eq!(
            Invalid::Missing(vec![Field::StartPoint, Field::AvailableCapacity])
                .to_string(),
            "Missing required fields: startPoint, availableCapacity",
        );
        assert_eq!(
            Invalid::Field(Field::MaxDimensions).to_string(),
            "Invalid `maxDimensions` field",
        );
    }
}
