//! [`Query`] listing all the published [`Announcement`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::{domain::Announcement, Config};
use crate::{
    domain::user,
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] listing all the published [`Announcement`]s, oldest first,
/// along with a [`read::user::Summary`] of their drivers.
///
/// Visibility doesn't depend on the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListAnnouncements {
    /// [`user::Identity`] of the caller, if any.
    pub identity: Option<user::Identity>,
}

/// [`Announcement`] as listed by [`ListAnnouncements`].
pub type Listed = read::announcement::WithDriver<read::user::Summary>;

impl<Db> Query<ListAnnouncements> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Listed>, ()>>,
        Ok = Vec<Listed>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Listed>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: ListAnnouncements,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let list = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if list.is_empty() && self.config().empty_list_is_not_found {
            return Err(tracerr::new!(E::NoAnnouncements));
        }

        Ok(list)
    }
}

/// Error of [`ListAnnouncements`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No [`Announcement`]s are published.
    ///
    /// Reported only if [`Config::empty_list_is_not_found`] is set.
    #[display("No announcements")]
    NoAnnouncements,
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::NoAnnouncements => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        error::{Kind, Kinded as _},
        fixture,
        infra::Memory,
        Config, Query as _, Service,
    };

    use super::{ExecutionError, ListAnnouncements};

    #[tokio::test]
    async fn lists_oldest_first_with_driver_summary() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let shipper = fixture::register(&svc, user::Role::Shipper).await;
        let first = fixture::publish(&svc, driver).await;
        let second = fixture::publish(&svc, driver).await;

        for identity in [None, Some(driver), Some(shipper)] {
            let list =
                svc.execute(ListAnnouncements { identity }).await.unwrap();

            assert_eq!(
                list.iter().map(|a| a.announcement.id).collect::<Vec<_>>(),
                [first.id, second.id],
            );
            assert!(list.iter().all(|a| a.driver.id == driver.user_id));
        }
    }

    #[tokio::test]
    async fn reports_empty_list_as_not_found() {
        let svc = fixture::service();

        let err = svc
            .execute(ListAnnouncements::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
        assert!(matches!(err.as_ref(), ExecutionError::NoAnnouncements));
    }

    #[tokio::test]
    async fn returns_empty_list_if_configured() {
        let svc = Service::new(
            Config {
                empty_list_is_not_found: false,
                ..fixture::config()
            },
            Memory::new(),
        );

        let list = svc.execute(ListAnnouncements::default()).await.unwrap();

        assert!(list.is_empty());
    }
}
