//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

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

/// [`Command`] for authorizing a [`User`] by a [`Session`] token, resolving
/// it into a [`user::Identity`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = user::Identity;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let user = self
            .database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())?;

        Ok(user.identity())
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Kind::Unauthorized
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreateUserSession,
        domain::user::{self, session},
        error::{Kind, Kinded as _},
        fixture, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn rejects_malformed_token() {
        let svc = fixture::service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: "not.a.token".parse::<session::Token>().unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Unauthorized);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_token_of_vanished_user() {
        let issuer = fixture::service();
        let identity = fixture::register(&issuer, user::Role::Driver).await;
        let token = issuer
            .execute(CreateUserSession::ByUserId(identity.user_id))
            .await
            .unwrap()
            .token;

        let err = fixture::service()
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Unauthorized);
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == identity.user_id,
        ));
    }
}
