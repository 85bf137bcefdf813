//! [`Query`] collecting the completed [`Announcement`]s of a driver.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{announcement, demand, user, Announcement, Demand},
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] collecting the completed [`Announcement`]s of the calling
/// driver along with their delivered [`Demand`]s, latest completed first.
///
/// An empty history is not an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverHistory {
    /// [`user::Identity`] of the calling driver.
    pub identity: Option<user::Identity>,
}

impl<Db> Query<DriverHistory> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Announcement>, read::announcement::Selector>>,
            Ok = Vec<Announcement>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Demand>, read::demand::Selector>>,
            Ok = Vec<Demand>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<read::announcement::Completed>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: DriverHistory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let driver_id = user::Identity::driver(query.identity)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut completed = self
            .database()
            .execute(Select(By::new(read::announcement::Selector {
                driver_id,
                status: Some(announcement::Status::Completed),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        completed.sort_by(|a, b| b.end_date.cmp(&a.end_date));

        let mut delivered = self
            .database()
            .execute(Select(By::new(read::demand::Selector {
                announcement_ids: completed.iter().map(|a| a.id).collect(),
                status: Some(demand::Status::Delivered),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .into_group_map_by(|d| d.announcement_id);

        Ok(completed
            .into_iter()
            .map(|announcement| read::announcement::Completed {
                demands: delivered.remove(&announcement.id).unwrap_or_default(),
                announcement,
            })
            .collect())
    }
}

/// Error of [`DriverHistory`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to own [`Announcement`]s.
    #[display("{_0}")]
    Access(user::AccessError),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        command::{update_announcement::Patch, UpdateAnnouncement},
        domain::{announcement, demand, user},
        error::{Kind, Kinded as _},
        fixture, Command as _, Query as _,
    };

    use super::DriverHistory;

    #[tokio::test]
    async fn keeps_delivered_demands_of_completed_announcements() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let earlier = fixture::publish(&svc, driver).await;
        let later = fixture::publish(&svc, driver).await;
        let ongoing = fixture::publish(&svc, driver).await;

        let delivered =
            fixture::place_demand(&svc, earlier.id, demand::Status::Delivered)
                .await;
        _ = fixture::place_demand(&svc, earlier.id, demand::Status::Rejected)
            .await;
        _ = fixture::place_demand(&svc, ongoing.id, demand::Status::Delivered)
            .await;

        let now = DateTime::now();
        for (id, end_date) in [
            (earlier.id, now - Duration::from_secs(3600)),
            (later.id, now),
        ] {
            _ = svc
                .execute(UpdateAnnouncement {
                    identity: Some(driver),
                    announcement_id: id,
                    patch: Patch {
                        status: Some(announcement::Status::Completed),
                        end_date: Some(end_date),
                        ..Patch::default()
                    },
                })
                .await
                .unwrap();
        }

        let history = svc
            .execute(DriverHistory {
                identity: Some(driver),
            })
            .await
            .unwrap();

        assert_eq!(
            history
                .iter()
                .map(|c| c.announcement.id)
                .collect::<Vec<_>>(),
            [later.id, earlier.id],
        );
        assert!(history[0].demands.is_empty());
        assert_eq!(
            history[1].demands.iter().map(|d| d.id).collect::<Vec<_>>(),
            [delivered.id],
        );
    }

    #[tokio::test]
    async fn allows_empty_history() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        _ = fixture::publish(&svc, driver).await;

        let history = svc
            .execute(DriverHistory {
                identity: Some(driver),
            })
            .await
            .unwrap();

        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn requires_driver() {
        let svc = fixture::service();
        let shipper = fixture::register(&svc, user::Role::Shipper).await;

        for (identity, kind) in
            [(None, Kind::Unauthorized), (Some(shipper), Kind::Forbidden)]
        {
            let err =
                svc.execute(DriverHistory { identity }).await.unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
