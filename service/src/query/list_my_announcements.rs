//! [`Query`] listing the [`Announcement`]s of the calling driver.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::Config;
use crate::{
    domain::{user, Announcement},
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] listing the [`Announcement`]s of the calling driver, newest
/// first.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListMyAnnouncements {
    /// [`user::Identity`] of the calling driver.
    pub identity: Option<user::Identity>,
}

impl<Db> Query<ListMyAnnouncements> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Announcement>, read::announcement::Selector>>,
        Ok = Vec<Announcement>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Announcement>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ListMyAnnouncements,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let driver_id = user::Identity::driver(query.identity)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let list = self
            .database()
            .execute(Select(By::new(read::announcement::Selector {
                driver_id,
                status: None,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if list.is_empty() && self.config().empty_list_is_not_found {
            return Err(tracerr::new!(E::NoAnnouncements(driver_id)));
        }

        Ok(list)
    }
}

/// Error of [`ListMyAnnouncements`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Caller is not allowed to own [`Announcement`]s.
    #[display("{_0}")]
    Access(user::AccessError),

    /// Driver has no [`Announcement`]s.
    ///
    /// Reported only if [`Config::empty_list_is_not_found`] is set.
    #[display("`User(id: {_0})` has no announcements")]
    #[from(ignore)]
    NoAnnouncements(#[error(not(source))] user::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::NoAnnouncements(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        error::{Kind, Kinded as _},
        fixture, Query as _,
    };

    use super::{ExecutionError, ListMyAnnouncements};

    #[tokio::test]
    async fn lists_own_newest_first() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let other = fixture::register(&svc, user::Role::Driver).await;
        let older = fixture::publish(&svc, driver).await;
        _ = fixture::publish(&svc, other).await;
        let newer = fixture::publish(&svc, driver).await;

        let list = svc
            .execute(ListMyAnnouncements {
                identity: Some(driver),
            })
            .await
            .unwrap();

        assert_eq!(
            list.iter().map(|a| a.id).collect::<Vec<_>>(),
            [newer.id, older.id],
        );
    }

    #[tokio::test]
    async fn reports_empty_list_as_not_found() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;

        let err = svc
            .execute(ListMyAnnouncements {
                identity: Some(driver),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NoAnnouncements(id) if *id == driver.user_id,
        ));
    }

    #[tokio::test]
    async fn requires_driver() {
        let svc = fixture::service();
        let shipper = fixture::register(&svc, user::Role::Shipper).await;

        for (identity, kind) in
            [(None, Kind::Unauthorized), (Some(shipper), Kind::Forbidden)]
        {
            let err = svc
                .execute(ListMyAnnouncements { identity })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
