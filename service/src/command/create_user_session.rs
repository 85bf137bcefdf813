//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    error::{Kind, Kinded},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at = (DateTime::now() + self.config().session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) | Self::JsonWebTokenEncodeError(_) => Kind::Internal,
            Self::UserNotExists(_) => Kind::NotFound,
            Self::WrongCredentials => Kind::Unauthorized,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;
    use secrecy::SecretBox;

    use crate::{
        command::AuthorizeUserSession,
        domain::user,
        error::{Kind, Kinded as _},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn password(raw: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(raw).unwrap()))
    }

    #[tokio::test]
    async fn logs_in_by_credentials() {
        let svc = fixture::service();
        let user = user::User {
            password_hash: user::PasswordHash::new(
                &user::Password::new("qwerty").unwrap(),
            )
            .unwrap(),
            ..fixture::user(user::Role::Driver)
        };
        svc.database().execute(Insert(user.clone())).await.unwrap();

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                email: user.email.clone(),
                password: password("qwerty"),
            })
            .await
            .unwrap();
        assert_eq!(out.user.id, user.id);

        let identity = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(identity.user_id, user.id);
        assert!(identity.is_driver);
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let svc = fixture::service();
        let user = user::User {
            password_hash: user::PasswordHash::new(
                &user::Password::new("qwerty").unwrap(),
            )
            .unwrap(),
            ..fixture::user(user::Role::Shipper)
        };
        svc.database().execute(Insert(user.clone())).await.unwrap();

        for (email, raw) in [
            (user.email.clone(), "qwertz"),
            (user::Email::new("nobody@example.com").unwrap(), "qwerty"),
        ] {
            let err = svc
                .execute(CreateUserSession::ByCredentials {
                    email,
                    password: password(raw),
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Kind::Unauthorized);
            assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
        }
    }

    #[tokio::test]
    async fn expires_after_ttl() {
        let svc = fixture::service();
        let identity = fixture::register(&svc, user::Role::Shipper).await;

        let out = svc
            .execute(CreateUserSession::ByUserId(identity.user_id))
            .await
            .unwrap();

        assert_eq!(out.user.id, identity.user_id);
        assert!(out.expires_at.is_future());
    }
}
