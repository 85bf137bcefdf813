//! [`Command`] for updating an existing [`Announcement`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        announcement::{self, Field, Invalid},
        user, Announcement,
    },
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::{create_announcement::Dimensions, Command};

/// [`Command`] for updating an existing [`Announcement`] owned by the
/// caller.
#[derive(Clone, Debug)]
pub struct UpdateAnnouncement {
    /// [`user::Identity`] of the driver owning the [`Announcement`].
    pub identity: Option<user::Identity>,

    /// ID of the [`Announcement`] to update.
    pub announcement_id: announcement::Id,

    /// [`Patch`] to apply.
    pub patch: Patch,
}

/// Partial change of an [`Announcement`].
///
/// Absent fields are left untouched. Ownership, ID and creation time are not
/// patchable at all.
#[derive(Clone, Debug, Default)]
pub struct Patch {
    /// New [`Announcement::start_point`].
    pub start_point: Option<String>,

    /// New [`Announcement::waypoints`].
    pub waypoints: Option<Vec<String>>,

    /// New [`Announcement::destination`].
    pub destination: Option<String>,

    /// New [`Announcement::max_dimensions`].
    pub max_dimensions: Option<Dimensions>,

    /// New [`Announcement::package_types`].
    pub package_types: Option<Vec<String>>,

    /// New [`Announcement::available_capacity`].
    pub available_capacity: Option<f64>,

    /// New [`Announcement::start_date`].
    pub start_date: Option<DateTime>,

    /// New [`Announcement::end_date`].
    pub end_date: Option<DateTime>,

    /// New [`Announcement::status`].
    pub status: Option<announcement::Status>,
}

impl Patch {
    /// Applies this [`Patch`] to the provided [`Announcement`], validating
    /// every touched field.
    ///
    /// Moving to [`announcement::Status::Completed`] stamps the current
    /// [`DateTime`] as the end date, unless there is one already.
    ///
    /// # Errors
    ///
    /// With [`Invalid`] if any touched field is invalid. The [`Announcement`]
    /// is left in an unspecified state then.
    pub fn apply_to(self, a: &mut Announcement) -> Result<(), Invalid> {
        let Self {
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
            end_date,
            status,
        } = self;

        if let Some(raw) = start_point {
            a.start_point =
                Field::StartPoint.parse(raw, announcement::Location::new)?;
        }
        if let Some(raw) = waypoints {
            a.waypoints =
                Field::Waypoints.parse_all(raw, announcement::Location::new)?;
        }
        if let Some(raw) = destination {
            a.destination =
                Field::Destination.parse(raw, announcement::Location::new)?;
        }
        if let Some(raw) = max_dimensions {
            a.max_dimensions =
                Some(Field::MaxDimensions.parse(raw, Dimensions::parse)?);
        }
        if let Some(raw) = package_types {
            a.package_types = Field::PackageTypes
                .parse_all(raw, announcement::PackageType::new)?;
        }
        if let Some(raw) = available_capacity {
            a.available_capacity = Field::AvailableCapacity
                .parse(raw, announcement::Capacity::new)?;
        }
        if let Some(date) = start_date {
            if !date.is_future() {
                return Err(Invalid::StartDateNotFuture);
            }
            a.start_date = date.coerce();
        }
        if let Some(date) = end_date {
            a.end_date = Some(date.coerce());
        }
        if let Some(status) = status {
            if status == announcement::Status::Completed && a.end_date.is_none()
            {
                a.end_date = Some(DateTime::now().coerce());
            }
            a.status = status;
        }

        Ok(())
    }
}

impl<Db> Command<UpdateAnnouncement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Announcement, announcement::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Announcement>, read::announcement::OwnedBy>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<Update<Announcement>, Err = Traced<database::Error>>
        + Database<
            Select<
                By<
                    Option<read::announcement::WithDriver<read::user::Summary>>,
                    announcement::Id,
                >,
            >,
            Ok = Option<read::announcement::WithDriver<read::user::Summary>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::announcement::WithDriver<read::user::Summary>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAnnouncement {
            identity,
            announcement_id,
            patch,
        } = cmd;

        let driver_id = user::Identity::driver(identity)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut announcement = tx
            .execute(Select(By::new(read::announcement::OwnedBy {
                announcement_id,
                driver_id,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;

        patch
            .apply_to(&mut announcement)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(announcement))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let updated = tx
            .execute(Select(By::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(updated)
    }
}

/// Error of [`UpdateAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to update [`Announcement`]s.
    #[display("{_0}")]
    Access(user::AccessError),

    /// [`Announcement`] does not exist or is owned by another driver.
    #[display("`Announcement(id: {_0})` not found or no permission")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// Touched [`Announcement`] fields are invalid.
    #[display("{_0}")]
    Invalid(Invalid),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::AnnouncementNotExists(_) => Kind::NotFound,
            Self::Invalid(_) => Kind::Validation,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        domain::{
            announcement::{Field, Invalid, Status},
            user,
        },
        error::{Kind, Kinded as _},
        fixture, Command as _,
    };

    use super::{ExecutionError, Patch, UpdateAnnouncement};

    #[tokio::test]
    async fn hides_announcements_of_other_drivers() {
        let svc = fixture::service();
        let owner = fixture::register(&svc, user::Role::Driver).await;
        let other = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, owner).await;

        let err = svc
            .execute(UpdateAnnouncement {
                identity: Some(other),
                announcement_id: announcement.id,
                patch: Patch {
                    available_capacity: Some(1.0),
                    destination: Some("Tanger".into()),
                    ..Patch::default()
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementNotExists(id) if *id == announcement.id,
        ));
        let stored = fixture::stored(&svc, announcement.id).await.unwrap();
        assert_eq!(stored.driver_id, owner.user_id);
        assert_eq!(f64::from(stored.available_capacity), 500.0);
        assert_eq!(stored.destination.to_string(), "Rabat");
    }

    #[tokio::test]
    async fn applies_only_touched_fields() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let before = fixture::publish(&svc, driver).await;

        let updated = svc
            .execute(UpdateAnnouncement {
                identity: Some(driver),
                announcement_id: before.id,
                patch: Patch {
                    available_capacity: Some(800.0),
                    ..Patch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.driver.id, driver.user_id);
        let after = updated.announcement;
        assert_eq!(f64::from(after.available_capacity), 800.0);
        assert_eq!(after.driver_id, before.driver_id);
        assert_eq!(after.start_point, before.start_point);
        assert_eq!(after.destination, before.destination);
        assert_eq!(after.waypoints, before.waypoints);
        assert_eq!(after.package_types, before.package_types);
        assert_eq!(after.start_date, before.start_date);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.status, Status::Pending);
    }

    #[tokio::test]
    async fn stamps_completion() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;

        let updated = svc
            .execute(UpdateAnnouncement {
                identity: Some(driver),
                announcement_id: announcement.id,
                patch: Patch {
                    status: Some(Status::Completed),
                    ..Patch::default()
                },
            })
            .await
            .unwrap()
            .announcement;

        assert_eq!(updated.status, Status::Completed);
        assert!(updated.end_date.is_some());
    }

    #[tokio::test]
    async fn validates_touched_fields() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;

        for (patch, expected) in [
            (
                Patch {
                    start_point: Some(String::new()),
                    ..Patch::default()
                },
                Invalid::Field(Field::StartPoint),
            ),
            (
                Patch {
                    available_capacity: Some(-5.0),
                    ..Patch::default()
                },
                Invalid::Field(Field::AvailableCapacity),
            ),
            (
                Patch {
                    start_date: Some(DateTime::now() - Duration::from_secs(1)),
                    ..Patch::default()
                },
                Invalid::StartDateNotFuture,
            ),
        ] {
            let err = svc
                .execute(UpdateAnnouncement {
                    identity: Some(driver),
                    announcement_id: announcement.id,
                    patch,
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Kind::Validation);
            assert!(matches!(
                err.as_ref(),
                ExecutionError::Invalid(e) if *e == expected,
            ));
        }
        let stored = fixture::stored(&svc, announcement.id).await.unwrap();
        assert_eq!(stored.start_point, announcement.start_point);
    }

    #[tokio::test]
    async fn requires_driver() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let shipper = fixture::register(&svc, user::Role::Shipper).await;
        let announcement = fixture::publish(&svc, driver).await;

        for (identity, kind) in
            [(None, Kind::Unauthorized), (Some(shipper), Kind::Forbidden)]
        {
            let err = svc
                .execute(UpdateAnnouncement {
                    identity,
                    announcement_id: announcement.id,
                    patch: Patch::default(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
