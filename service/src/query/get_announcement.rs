//! [`Query`] fetching a single [`Announcement`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Announcement;
use crate::{
    domain::{announcement, user},
    error::{Kind, Kinded},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] fetching a single [`Announcement`] along with a
/// [`read::user::Contact`] of its driver.
#[derive(Clone, Copy, Debug)]
pub struct GetAnnouncement {
    /// [`user::Identity`] of the caller, if any.
    pub identity: Option<user::Identity>,

    /// ID of the [`Announcement`] to fetch.
    pub announcement_id: announcement::Id,
}

impl<Db> Query<GetAnnouncement> for Service<Db>
where
    Db: Database<
        Select<
            By<
                Option<read::announcement::WithDriver<read::user::Contact>>,
                announcement::Id,
            >,
        >,
        Ok = Option<read::announcement::WithDriver<read::user::Contact>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::announcement::WithDriver<read::user::Contact>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: GetAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GetAnnouncement {
            identity: _,
            announcement_id,
        } = query;

        self.database()
            .execute(Select(By::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`GetAnnouncement`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Announcement`] with the provided ID does not exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::AnnouncementNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{announcement, user},
        error::{Kind, Kinded as _},
        fixture, Query as _,
    };

    use super::GetAnnouncement;

    #[tokio::test]
    async fn exposes_driver_contact() {
        let svc = fixture::service();
        let driver = fixture::register(&svc, user::Role::Driver).await;
        let announcement = fixture::publish(&svc, driver).await;

        let found = svc
            .execute(GetAnnouncement {
                identity: None,
                announcement_id: announcement.id,
            })
            .await
            .unwrap();

        assert_eq!(found.announcement.id, announcement.id);
        assert_eq!(found.driver.id, driver.user_id);
        assert_eq!(
            found.driver.phone.map(|p| p.to_string()).as_deref(),
            Some("+212 661 234 567"),
        );
    }

    #[tokio::test]
    async fn reports_absent_announcement() {
        let svc = fixture::service();

        let err = svc
            .execute(GetAnnouncement {
                identity: None,
                announcement_id: announcement::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
