//! [`Command`] for deleting an existing [`Announcement`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Demand;
use crate::{
    domain::{announcement, demand, user, Announcement},
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting an existing [`Announcement`] owned by the
/// caller.
///
/// Pending [`Demand`]s placed on the [`Announcement`] are cancelled before
/// it's removed, while [`Demand`]s in any other [`demand::Status`] are kept
/// untouched.
#[derive(Clone, Copy, Debug)]
pub struct DeleteAnnouncement {
    /// [`user::Identity`] of the driver owning the [`Announcement`].
    pub identity: Option<user::Identity>,

    /// ID of the [`Announcement`] to delete.
    pub announcement_id: announcement::Id,
}

/// Output of [`DeleteAnnouncement`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Deleted [`Announcement`].
    pub announcement: Announcement,

    /// Number of pending [`Demand`]s that have been cancelled.
    pub cancelled_demands: u64,
}

impl<Db> Command<DeleteAnnouncement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Announcement, announcement::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Announcement>, read::announcement::OwnedBy>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<
            Update<demand::Transition>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Announcement, announcement::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteAnnouncement {
            identity,
            announcement_id,
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
        let announcement = tx
            .execute(Select(By::new(read::announcement::OwnedBy {
                announcement_id,
                driver_id,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;

        // Demands must be cancelled before their announcement disappears.
        let cancelled_demands = tx
            .execute(Update(demand::Transition {
                announcement_id,
                from: demand::Status::Pending,
                to: demand::Status::Cancelled,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            announcement,
            cancelled_demands,
        })
    }
}

/// Error of [`DeleteAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to delete [`Announcement`]s.
    #[display("{_0}")]
    Access(user::AccessError),

    /// [`Announcement`] does not exist or is owned by another driver.
    #[display("`Announcement(id: {_0})` not found or no permission")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::AnnouncementNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{demand, user, Demand},
        error::{Kind, Kinded as _},
        fixture,
        infra::Database as _,
        read, Command as _,
    };

    use super::{DeleteAnnouncement, ExecutionError};

    #[tokio::test]
    async fn cancels_only_pending_demands() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;
        let other = fixture::publish(&svc, driver).await;
        for status in [
            demand::Status::Pending,
            demand::Status::Pending,
            demand::Status::Accepted,
            demand::Status::Delivered,
        ] {
            _ = fixture::place_demand(&svc, announcement.id, status).await;
        }
        _ = fixture::place_demand(&svc, other.id, demand::Status::Pending)
            .await;

        let out = svc
            .execute(DeleteAnnouncement {
                identity: Some(driver),
                announcement_id: announcement.id,
            })
            .await
            .unwrap();

        assert_eq!(out.announcement.id, announcement.id);
        assert_eq!(out.cancelled_demands, 2);
        assert!(fixture::stored(&svc, announcement.id).await.is_none());
        assert!(fixture::stored(&svc, other.id).await.is_some());

        let demands = svc
            .database()
            .execute(Select(By::<Vec<Demand>, _>::new(
                read::demand::Selector {
                    announcement_ids: vec![announcement.id, other.id],
                    status: None,
                },
            )))
            .await
            .unwrap();
        let statuses = |id| {
            demands
                .iter()
                .filter(|d| d.announcement_id == id)
                .map(|d| d.status)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            statuses(announcement.id),
            [
                demand::Status::Cancelled,
                demand::Status::Cancelled,
                demand::Status::Accepted,
                demand::Status::Delivered,
            ],
        );
        assert_eq!(statuses(other.id), [demand::Status::Pending]);
    }

    #[tokio::test]
    async fn hides_announcements_of_other_drivers() {
        let svc = fixture::service();
        let owner = fixture::register(&svc, user::Role::Driver).await;
        let other = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, owner).await;
        let pending = fixture::place_demand(
            &svc,
            announcement.id,
            demand::Status::Pending,
        )
        .await;

        let err = svc
            .execute(DeleteAnnouncement {
                identity: Some(other),
                announcement_id: announcement.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementNotExists(_),
        ));
        assert!(fixture::stored(&svc, announcement.id).await.is_some());
        let demands = svc
            .database()
            .execute(Select(By::<Vec<Demand>, _>::new(
                read::demand::Selector {
                    announcement_ids: vec![announcement.id],
                    status: Some(demand::Status::Pending),
                },
            )))
            .await
            .unwrap();
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].id, pending.id);
    }

    #[tokio::test]
    async fn reports_absent_announcement() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;

        svc.execute(DeleteAnnouncement {
            identity: Some(driver),
            announcement_id: announcement.id,
        })
        .await
        .unwrap();
        let err = svc
            .execute(DeleteAnnouncement {
                identity: Some(driver),
                announcement_id: announcement.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
