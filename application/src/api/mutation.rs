//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` and opens a `Session` for it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            first_name = %first_name,
            gql.name = "createUser",
            last_name = %last_name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        first_name: api::user::Name,
        last_name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        role: api::user::Role,
        phone: Option<api::user::Phone>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                phone: phone.map(Into::into),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            identity: output.user.identity(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            identity: output.user.identity(),
        })
        .await;

        Ok(output.into())
    }

    /// Publishes a new `Announcement` of the authenticated driver.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_DRIVER` - the authenticated `User` is not a driver;
    /// - `VALIDATION_FAILED` - required fields are missing, the start date is
    ///                         not in the future, or a field is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createAnnouncement",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_announcement(
        input: api::announcement::Input,
        ctx: &Context,
    ) -> Result<api::announcement::CreateResult, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(input.into_command(identity))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Applies the provided `AnnouncementPatch` to an `Announcement` of the
    /// authenticated driver.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_DRIVER` - the authenticated `User` is not a driver;
    /// - `ANNOUNCEMENT_NOT_EXISTS` - the `Announcement` does not exist or is
    ///                               owned by another driver;
    /// - `VALIDATION_FAILED` - a patched field is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateAnnouncement",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_announcement(
        id: api::announcement::Id,
        patch: api::announcement::Patch,
        ctx: &Context,
    ) -> Result<api::announcement::Listed, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(command::UpdateAnnouncement {
                identity,
                announcement_id: id.into(),
                patch: patch.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes an `Announcement` of the authenticated driver, cancelling its
    /// pending `Demand`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_DRIVER` - the authenticated `User` is not a driver;
    /// - `ANNOUNCEMENT_NOT_EXISTS` - the `Announcement` does not exist or is
    ///                               owned by another driver.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteAnnouncement",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_announcement(
        id: api::announcement::Id,
        ctx: &Context,
    ) -> Result<api::announcement::DeleteResult, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(command::DeleteAnnouncement {
                identity,
                announcement_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Places a new `Demand` of the authenticated shipper on an open
    /// `Announcement`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_SHIPPER` - the authenticated `User` is not a shipper;
    /// - `ANNOUNCEMENT_NOT_EXISTS` - the `Announcement` does not exist;
    /// - `ANNOUNCEMENT_CLOSED` - the `Announcement` accepts no more `Demand`s.
    #[tracing::instrument(
        skip_all,
        fields(
            announcement_id = %announcement_id,
            gql.name = "createDemand",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_demand(
        announcement_id: api::announcement::Id,
        ctx: &Context,
    ) -> Result<api::Demand, Error> {
        let identity = ctx.identity().await?;
        ctx.service()
            .execute(command::CreateDemand {
                identity,
                announcement_id: announcement_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::create_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(api::query::AnnouncementError::NotExists.into())
            }
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(api::query::AnnouncementError::NotExists.into())
            }
        }
    }
}

impl AsError for command::create_demand::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ANNOUNCEMENT_CLOSED"]
                #[status = BAD_REQUEST]
                #[message = "`Announcement` accepts no more `Demand`s"]
                AnnouncementClosed,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(api::query::AnnouncementError::NotExists.into())
            }
            Self::AnnouncementClosed(_) => {
                Some(Error::AnnouncementClosed.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{
            create_announcement, create_demand, create_user,
            create_user_session, delete_announcement, update_announcement,
        },
        domain::{
            announcement::{self, Field, Invalid},
            user,
        },
    };

    use crate::AsError as _;

    #[test]
    fn maps_registration_errors() {
        let err = create_user::ExecutionError::EmailOccupied(
            user::Email::new("taken@example.com").unwrap(),
        )
        .into_error();
        assert_eq!(err.code, "EMAIL_OCCUPIED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        for err in [
            create_user_session::ExecutionError::WrongCredentials,
            create_user_session::ExecutionError::UserNotExists(user::Id::new()),
        ] {
            let err = err.into_error();
            assert_eq!(err.code, "WRONG_CREDENTIALS");
            assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn maps_lifecycle_errors() {
        let id = announcement::Id::new();

        for (err, code, status) in [
            (
                create_announcement::ExecutionError::Access(
                    user::AccessError::Unauthorized,
                )
                .into_error(),
                "AUTHORIZATION_REQUIRED",
                http::StatusCode::UNAUTHORIZED,
            ),
            (
                create_announcement::ExecutionError::Invalid(
                    Invalid::StartDateNotFuture,
                )
                .into_error(),
                "VALIDATION_FAILED",
                http::StatusCode::BAD_REQUEST,
            ),
            (
                update_announcement::ExecutionError::Invalid(Invalid::Field(
                    Field::AvailableCapacity,
                ))
                .into_error(),
                "VALIDATION_FAILED",
                http::StatusCode::BAD_REQUEST,
            ),
            (
                update_announcement::ExecutionError::AnnouncementNotExists(id)
                    .into_error(),
                "ANNOUNCEMENT_NOT_EXISTS",
                http::StatusCode::NOT_FOUND,
            ),
            (
                delete_announcement::ExecutionError::Access(
                    user::AccessError::NotDriver(user::Id::new()),
                )
                .into_error(),
                "NOT_DRIVER",
                http::StatusCode::FORBIDDEN,
            ),
            (
                create_demand::ExecutionError::Access(
                    user::AccessError::NotShipper(user::Id::new()),
                )
                .into_error(),
                "NOT_SHIPPER",
                http::StatusCode::FORBIDDEN,
            ),
            (
                create_demand::ExecutionError::AnnouncementClosed(
                    announcement::Status::Completed,
                )
                .into_error(),
                "ANNOUNCEMENT_CLOSED",
                http::StatusCode::BAD_REQUEST,
            ),
        ] {
            assert_eq!(err.code, code);
            assert_eq!(err.status_code, status);
        }
    }

    #[test]
    fn names_offending_field_in_message() {
        let err = update_announcement::ExecutionError::Invalid(Invalid::Field(
            Field::MaxDimensions,
        ))
        .into_error();

        assert_eq!(err.message, "Invalid `maxDimensions` field");
    }
}
