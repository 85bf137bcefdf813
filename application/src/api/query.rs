//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "me",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn me(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.identity.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists all the published `Announcement`s, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NO_ANNOUNCEMENTS` - there are no `Announcement`s at all.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "announcements",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn announcements(
        ctx: &Context,
    ) -> Result<Vec<api::announcement::Listed>, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(query::ListAnnouncements { identity })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Returns the `Announcement` with the specified ID, along with contact
    /// details of its driver.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ANNOUNCEMENT_NOT_EXISTS` - the `Announcement` with the specified ID
    ///                               does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "announcement",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn announcement(
        id: api::announcement::Id,
        ctx: &Context,
    ) -> Result<api::announcement::Detailed, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(query::GetAnnouncement {
                identity,
                announcement_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the `Announcement`s of the authenticated driver, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_DRIVER` - the authenticated `User` is not a driver;
    /// - `NO_ANNOUNCEMENTS` - the driver has no `Announcement`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myAnnouncements",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_announcements(
        ctx: &Context,
    ) -> Result<Vec<api::Announcement>, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(query::ListMyAnnouncements { identity })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Lists the completed `Announcement`s of the authenticated driver along
    /// with their delivered `Demand`s, latest completed first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_DRIVER` - the authenticated `User` is not a driver.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "driverHistory",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn driver_history(
        ctx: &Context,
    ) -> Result<Vec<api::announcement::Completed>, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(query::DriverHistory { identity })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum AnnouncementError {
        #[code = "ANNOUNCEMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Announcement` with the specified ID does not exist"]
        NotExists,

        #[code = "NO_ANNOUNCEMENTS"]
        #[status = NOT_FOUND]
        #[message = "No `Announcement`s found"]
        NoneFound,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

impl AsError for query::list_announcements::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoAnnouncements => Some(AnnouncementError::NoneFound.into()),
        }
    }
}

impl AsError for query::get_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(AnnouncementError::NotExists.into())
            }
        }
    }
}

impl AsError for query::list_my_announcements::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
            Self::NoAnnouncements(_) => {
                Some(AnnouncementError::NoneFound.into())
            }
        }
    }
}

impl AsError for query::driver_history::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        domain::{announcement, user},
        query::{
            driver_history, get_announcement, list_announcements,
            list_my_announcements,
        },
    };

    use crate::AsError as _;

    #[test]
    fn reports_absent_announcements_as_not_found() {
        for err in [
            list_announcements::ExecutionError::NoAnnouncements.into_error(),
            list_my_announcements::ExecutionError::NoAnnouncements(
                user::Id::new(),
            )
            .into_error(),
        ] {
            assert_eq!(err.code, "NO_ANNOUNCEMENTS");
            assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
        }

        let err = get_announcement::ExecutionError::AnnouncementNotExists(
            announcement::Id::new(),
        )
        .into_error();
        assert_eq!(err.code, "ANNOUNCEMENT_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn requires_driver_for_history() {
        let err = driver_history::ExecutionError::Access(
            user::AccessError::NotDriver(user::Id::new()),
        )
        .into_error();

        assert_eq!(err.code, "NOT_DRIVER");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }
}
