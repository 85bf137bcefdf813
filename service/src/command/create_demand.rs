//! [`Command`] for placing a new [`Demand`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{announcement, demand, user, Announcement, Demand},
    error::{Kind, Kinded},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for placing a new [`Demand`] on an open [`Announcement`].
#[derive(Clone, Copy, Debug)]
pub struct CreateDemand {
    /// [`user::Identity`] of the shipper placing the [`Demand`].
    pub identity: Option<user::Identity>,

    /// ID of the [`Announcement`] to place the [`Demand`] on.
    pub announcement_id: announcement::Id,
}

impl<Db> Command<CreateDemand> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Announcement, announcement::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Announcement>, announcement::Id>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<Insert<Demand>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Demand;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateDemand) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDemand {
            identity,
            announcement_id,
        } = cmd;

        let shipper_id = user::Identity::shipper(identity)
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
        let announcement = tx
            .execute(Select(By::<Option<Announcement>, _>::new(
                announcement_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;
        if !announcement.status.accepts_demands() {
            return Err(tracerr::new!(E::AnnouncementClosed(
                announcement.status
            )));
        }

        let demand = Demand {
            id: demand::Id::new(),
            announcement_id,
            shipper_id,
            status: demand::Status::Pending,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(demand.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(demand)
    }
}

/// Error of [`CreateDemand`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to place [`Demand`]s.
    #[display("{_0}")]
    Access(user::AccessError),

    /// [`Announcement`] with the provided ID does not exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// [`Announcement`] doesn't accept [`Demand`]s anymore.
    #[display("`Announcement` is {_0} and accepts no demands")]
    #[from(ignore)]
    AnnouncementClosed(#[error(not(source))] announcement::Status),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::AnnouncementNotExists(_) => Kind::NotFound,
            Self::AnnouncementClosed(_) => Kind::Validation,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{update_announcement::Patch, UpdateAnnouncement},
        domain::{announcement, demand, user},
        error::{Kind, Kinded as _},
        fixture, Command as _,
    };

    use super::{CreateDemand, ExecutionError};

    #[tokio::test]
    async fn places_pending_demand() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let shipper = fixture::register(&svc, user::Role::Shipper).await;
        let announcement = fixture::publish(&svc, driver).await;

        let demand = svc
            .execute(CreateDemand {
                identity: Some(shipper),
                announcement_id: announcement.id,
            })
            .await
            .unwrap();

        assert_eq!(demand.announcement_id, announcement.id);
        assert_eq!(demand.shipper_id, shipper.user_id);
        assert_eq!(demand.status, demand::Status::Pending);
    }

    #[tokio::test]
    async fn requires_shipper() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;

        for (identity, kind) in
            [(None, Kind::Unauthorized), (Some(driver), Kind::Forbidden)]
        {
            let err = svc
                .execute(CreateDemand {
                    identity,
                    announcement_id: announcement.id,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }

    #[tokio::test]
    async fn rejects_closed_announcement() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let shipper = fixture::register(&svc, user::Role::Shipper).await;
        let announcement = fixture::publish(&svc, driver).await;
        _ = svc
            .execute(UpdateAnnouncement {
                identity: Some(driver),
                announcement_id: announcement.id,
                patch: Patch {
                    status: Some(announcement::Status::Cancelled),
                    ..Patch::default()
                },
            })
            .await
            .unwrap();

        let err = svc
            .execute(CreateDemand {
                identity: Some(shipper),
                announcement_id: announcement.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementClosed(announcement::Status::Cancelled),
        ));
    }

    #[tokio::test]
    async fn reports_absent_announcement() {
        let svc = fixture::service();
        let shipper = fixture::register(&svc, user::Role::Shipper).await;

        let err = svc
            .execute(CreateDemand {
                identity: Some(shipper),
                announcement_id: announcement::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
