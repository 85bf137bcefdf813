//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Phone, Role};
use crate::{
    domain::{user, User},
    error::{Kind, Kinded},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// First [`Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            first_name,
            last_name,
            email,
            phone,
            password,
            role,
        } = cmd;

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(E::PasswordHash)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let u = tx
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            first_name,
            last_name,
            email,
            phone,
            password_hash,
            role,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] failed to be hashed.
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(#[error(not(source))] argon2::password_hash::Error),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::EmailOccupied(_) => Kind::Validation,
            Self::PasswordHash(_) => Kind::Internal,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user,
        error::{Kind, Kinded as _},
        fixture, Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn new_user(email: &str, role: user::Role) -> CreateUser {
        CreateUser {
            first_name: user::Name::new("Salma").unwrap(),
            last_name: user::Name::new("Bennani").unwrap(),
            email: user::Email::new(email).unwrap(),
            phone: None,
            password: SecretBox::new(Box::new(
                user::Password::new("s3cr3t").unwrap(),
            )),
            role,
        }
    }

    #[tokio::test]
    async fn hashes_password() {
        let svc = fixture::service();

        let user = svc
            .execute(new_user("salma@example.com", user::Role::Shipper))
            .await
            .unwrap();

        assert_eq!(user.role, user::Role::Shipper);
        assert!(!user.identity().is_driver);
        assert!(user
            .password_hash
            .verify(&user::Password::new("s3cr3t").unwrap()));
        assert!(!user
            .password_hash
            .verify(&user::Password::new("secret").unwrap()));
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = fixture::service();
        _ = svc
            .execute(new_user("salma@example.com", user::Role::Driver))
            .await
            .unwrap();

        let err = svc
            .execute(new_user("salma@example.com", user::Role::Shipper))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
    }
}
