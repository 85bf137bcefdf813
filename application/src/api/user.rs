//! [`User`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] of the platform.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` of the platform.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// First name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.firstName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn first_name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.first_name.clone().into())
    }

    /// Last name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.lastName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn last_name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.last_name.clone().into())
    }

    /// Email of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Email, Error> {
        Ok(self.user(ctx).await?.email.clone().into())
    }

    /// Phone of this `User`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Option<Phone>, Error> {
        Ok(self.user(ctx).await?.phone.clone().map(Into::into))
    }

    /// Role of this `User` on the platform.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn role(&self, ctx: &Context) -> Result<Role, Error> {
        Ok(self.user(ctx).await?.role.into())
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Password of a `User`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Phone of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPhone",
    with = scalar::Via::<domain::user::Phone>,
)]
pub struct Phone(domain::user::Phone);

/// Role of a `User` on the platform.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    /// Offers transport capacity by publishing `Announcement`s.
    Driver,

    /// Requests transport capacity by placing `Demand`s.
    Shipper,
}

impl From<domain::user::Role> for Role {
    fn from(role: domain::user::Role) -> Self {
        use domain::user::Role as R;
        match role {
            R::Driver => Self::Driver,
            R::Shipper => Self::Shipper,
        }
    }
}

impl From<Role> for domain::user::Role {
    fn from(role: Role) -> Self {
        match role {
            Role::Driver => Self::Driver,
            Role::Shipper => Self::Shipper,
        }
    }
}

/// Public projection of a driver, attached to listed `Announcement`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DriverSummary")]
pub struct Summary {
    /// Unique identifier of the driver.
    pub id: Id,

    /// First name of the driver.
    pub first_name: Name,

    /// Last name of the driver.
    pub last_name: Name,

    /// Email of the driver.
    pub email: Email,
}

impl From<read::user::Summary> for Summary {
    fn from(summary: read::user::Summary) -> Self {
        let read::user::Summary {
            id,
            first_name,
            last_name,
            email,
        } = summary;
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// Contact details of a driver, attached to a single `Announcement`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DriverContact")]
pub struct Contact {
    /// Unique identifier of the driver.
    pub id: Id,

    /// First name of the driver.
    pub first_name: Name,

    /// Last name of the driver.
    pub last_name: Name,

    /// Email of the driver.
    pub email: Email,

    /// Phone of the driver, if any.
    pub phone: Option<Phone>,
}

impl From<read::user::Contact> for Contact {
    fn from(contact: read::user::Contact) -> Self {
        let read::user::Contact {
            id,
            first_name,
            last_name,
            email,
            phone,
        } = contact;
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.map(Into::into),
        }
    }
}

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<command::create_user_session::Output> for CreateResult {
        fn from(output: command::create_user_session::Output) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{domain::user, read};

    use super::{Contact, Id, Role, Summary};

    fn contact() -> read::user::Contact {
        read::user::Contact {
            id: user::Id::new(),
            first_name: user::Name::new("Youssef").unwrap(),
            last_name: user::Name::new("Alaoui").unwrap(),
            email: user::Email::new("youssef@example.com").unwrap(),
            phone: user::Phone::new("+212 661 234 567"),
        }
    }

    #[test]
    fn projects_driver_details() {
        let contact = contact();
        let id = contact.id;

        let summary = Summary::from(read::user::Summary::from(contact.clone()));
        assert_eq!(summary.id, Id::from(id));
        assert_eq!(summary.email.to_string(), "youssef@example.com");

        let detailed = Contact::from(contact);
        assert_eq!(
            detailed.phone.map(|p| p.to_string()).as_deref(),
            Some("+212 661 234 567"),
        );
    }

    #[test]
    fn converts_roles_both_ways() {
        for role in [user::Role::Driver, user::Role::Shipper] {
            assert_eq!(user::Role::from(Role::from(role)), role);
        }
    }
}
