//! GraphQL API definitions.

pub mod announcement;
pub mod demand;
mod mutation;
mod query;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;
use service::domain;

use crate::{define_error, AsError, Context, Error};

pub use self::{
    announcement::Announcement, demand::Demand, mutation::Mutation,
    query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_DRIVER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a driver"]
        Driver,

        #[code = "NOT_SHIPPER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a shipper"]
        Shipper,
    }
}

impl AsError for domain::user::AccessError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Unauthorized => {
                crate::context::AuthError::AuthroizationRequired.into()
            }
            Self::NotDriver(_) => PrivilegeError::Driver.into(),
            Self::NotShipper(_) => PrivilegeError::Shipper.into(),
        })
    }
}

impl AsError for domain::announcement::Invalid {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "VALIDATION_FAILED",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

#[cfg(test)]
mod spec {
    use service::domain::{
        announcement::{Field, Invalid},
        user,
    };

    use crate::AsError as _;

    #[test]
    fn maps_access_errors() {
        let id = user::Id::new();

        for (err, code, status) in [
            (
                user::AccessError::Unauthorized,
                "AUTHORIZATION_REQUIRED",
                http::StatusCode::UNAUTHORIZED,
            ),
            (
                user::AccessError::NotDriver(id),
                "NOT_DRIVER",
                http::StatusCode::FORBIDDEN,
            ),
            (
                user::AccessError::NotShipper(id),
                "NOT_SHIPPER",
                http::StatusCode::FORBIDDEN,
            ),
        ] {
            let err = err.into_error();
            assert_eq!(err.code, code);
            assert_eq!(err.status_code, status);
        }
    }

    #[test]
    fn names_invalid_fields() {
        let err = Invalid::Missing(vec![Field::StartPoint, Field::StartDate])
            .into_error();

        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            "Missing required fields: startPoint, startDate",
        );
    }
}
