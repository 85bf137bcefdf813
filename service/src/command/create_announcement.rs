//! [`Command`] for publishing a new [`Announcement`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        announcement::{self, Field, Invalid},
        user, Announcement,
    },
    error::{Kind, Kinded},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Announcement`].
///
/// Fields are accepted raw, so that every violation is reported as a
/// validation failure naming the offending [`Field`]s.
#[derive(Clone, Debug, Default)]
pub struct CreateAnnouncement {
    /// [`user::Identity`] of the driver publishing the [`Announcement`].
    pub identity: Option<user::Identity>,

    /// Location the trip starts from.
    pub start_point: Option<String>,

    /// Ordered locations the trip passes through.
    pub waypoints: Vec<String>,

    /// Location the trip ends at.
    pub destination: Option<String>,

    /// Maximum [`Dimensions`] of a package, if limited.
    pub max_dimensions: Option<Dimensions>,

    /// Categories of cargo accepted for transportation.
    pub package_types: Vec<String>,

    /// Available weight capacity.
    pub available_capacity: Option<f64>,

    /// [`DateTime`] when the trip starts.
    pub start_date: Option<DateTime>,
}

/// Raw maximum dimensions of a package.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    /// Length of a package.
    pub length: f64,

    /// Width of a package.
    pub width: f64,

    /// Height of a package.
    pub height: f64,
}

impl Dimensions {
    /// Validates these [`Dimensions`].
    pub(crate) fn parse(self) -> Option<announcement::Dimensions> {
        announcement::Dimensions::new(self.length, self.width, self.height)
    }
}

impl CreateAnnouncement {
    /// Validates this [`CreateAnnouncement`] and builds a new pending
    /// [`Announcement`] owned by the provided driver.
    ///
    /// Missing required fields are checked first and reported together,
    /// then the start date, then the format of every provided field.
    fn into_announcement(
        self,
        driver_id: user::Id,
    ) -> Result<Announcement, Invalid> {
        let Self {
            identity: _,
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
        } = self;

        let start_point = start_point.filter(|s| !s.trim().is_empty());
        let destination = destination.filter(|s| !s.trim().is_empty());
        let missing = [
            (Field::StartPoint, start_point.is_none()),
            (Field::Destination, destination.is_none()),
            (Field::AvailableCapacity, available_capacity.is_none()),
            (Field::StartDate, start_date.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect::<Vec<_>>();
        let (
            Some(start_point),
            Some(destination),
            Some(available_capacity),
            Some(start_date),
        ) = (start_point, destination, available_capacity, start_date)
        else {
            return Err(Invalid::Missing(missing));
        };

        if !start_date.is_future() {
            return Err(Invalid::StartDateNotFuture);
        }

        Ok(Announcement {
            id: announcement::Id::new(),
            driver_id,
            start_point: Field::StartPoint
                .parse(start_point, announcement::Location::new)?,
            waypoints: Field::Waypoints
                .parse_all(waypoints, announcement::Location::new)?,
            destination: Field::Destination
                .parse(destination, announcement::Location::new)?,
            max_dimensions: max_dimensions
                .map(|d| Field::MaxDimensions.parse(d, Dimensions::parse))
                .transpose()?,
            package_types: Field::PackageTypes
                .parse_all(package_types, announcement::PackageType::new)?,
            available_capacity: Field::AvailableCapacity
                .parse(available_capacity, announcement::Capacity::new)?,
            start_date: start_date.coerce(),
            end_date: None,
            status: announcement::Status::Pending,
            created_at: DateTime::now().coerce(),
        })
    }
}

impl<Db> Command<CreateAnnouncement> for Service<Db>
where
    Db: Database<Insert<Announcement>, Err = Traced<database::Error>>,
{
    type Ok = Announcement;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let driver_id = user::Identity::driver(cmd.identity)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let announcement = cmd
            .into_announcement(driver_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Insert(announcement.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(announcement)
    }
}

/// Error of [`CreateAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to publish [`Announcement`]s.
    #[display("{_0}")]
    Access(user::AccessError),

    /// [`Announcement`] fields are invalid.
    #[display("{_0}")]
    Invalid(Invalid),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::Invalid(_) => Kind::Validation,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Select},
        DateTime,
    };

    use crate::{
        domain::{
            announcement::{Field, Invalid, Status},
            user, Announcement,
        },
        error::{Kind, Kinded as _},
        fixture,
        infra::Database as _,
        query::{self, Query as _},
        read, Command as _,
    };

    use super::{CreateAnnouncement, Dimensions, ExecutionError};

    #[tokio::test]
    async fn publishes_pending_announcement() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;

        let created = svc
            .execute(CreateAnnouncement {
                waypoints: vec![],
                ..fixture::new_announcement(driver)
            })
            .await
            .unwrap();

        let fetched = svc
            .execute(query::GetAnnouncement {
                identity: None,
                announcement_id: created.id,
            })
            .await
            .unwrap();
        let announcement = fetched.announcement;
        assert_eq!(announcement.start_point.to_string(), "Casablanca");
        assert_eq!(announcement.destination.to_string(), "Rabat");
        assert_eq!(f64::from(announcement.available_capacity), 500.0);
        assert_eq!(announcement.status, Status::Pending);
        assert_eq!(announcement.driver_id, driver.user_id);
        assert!(announcement.waypoints.is_empty());
        assert!(announcement.end_date.is_none());
    }

    #[tokio::test]
    async fn rejects_past_start_date() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;

        for start_date in [
            DateTime::now(),
            DateTime::now() - Duration::from_secs(60),
        ] {
            let err = svc
                .execute(CreateAnnouncement {
                    start_date: Some(start_date),
                    ..fixture::new_announcement(driver)
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Kind::Validation);
            assert!(matches!(
                err.as_ref(),
                ExecutionError::Invalid(Invalid::StartDateNotFuture),
            ));
        }
        let stored = svc
            .database()
            .execute(Select(By::<Vec<Announcement>, _>::new(
                read::announcement::Selector {
                    driver_id: driver.user_id,
                    status: None,
                },
            )))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn reports_all_missing_fields() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;

        let err = svc
            .execute(CreateAnnouncement {
                identity: Some(driver),
                start_point: Some("  ".into()),
                ..CreateAnnouncement::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::Missing(fields))
                if fields == &[
                    Field::StartPoint,
                    Field::Destination,
                    Field::AvailableCapacity,
                    Field::StartDate,
                ],
        ));
    }

    #[tokio::test]
    async fn rejects_non_positive_numbers() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;

        let err = svc
            .execute(CreateAnnouncement {
                available_capacity: Some(0.0),
                ..fixture::new_announcement(driver)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::Field(Field::AvailableCapacity)),
        ));

        let err = svc
            .execute(CreateAnnouncement {
                max_dimensions: Some(Dimensions {
                    length: 1.0,
                    width: -2.0,
                    height: 3.0,
                }),
                ..fixture::new_announcement(driver)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::Field(Field::MaxDimensions)),
        ));
    }

    #[tokio::test]
    async fn requires_driver() {
        let svc = fixture::service();
        let shipper = fixture::register(&svc, user::Role::Shipper).await;

        let err = svc
            .execute(fixture::new_announcement(shipper))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);

        let err = svc
            .execute(CreateAnnouncement {
                identity: None,
                ..fixture::new_announcement(shipper)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Unauthorized);
    }
}
