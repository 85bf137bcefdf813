//! Classification of [`Service`] failures.
//!
//! [`Service`]: crate::Service

use derive_more::Display;
use tracerr::Traced;

use crate::{domain::user, infra::database};

/// Kind of a [`Command`] or [`Query`] failure, independent of any transport.
///
/// [`Command`]: crate::Command
/// [`Query`]: crate::Query
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// No identity was provided where one is required, or it failed to
    /// resolve.
    #[display("unauthorized")]
    Unauthorized,

    /// Identity was resolved, but lacks the required role.
    #[display("forbidden")]
    Forbidden,

    /// Target is absent, not owned by the caller, or the result is empty.
    #[display("not found")]
    NotFound,

    /// Provided input violates the domain rules.
    #[display("validation failed")]
    Validation,

    /// Unexpected infrastructure fault.
    #[display("internal error")]
    Internal,
}

/// Type having a [`Kind`].
pub trait Kinded {
    /// Returns the [`Kind`] of this failure.
    fn kind(&self) -> Kind;
}

impl<E: Kinded> Kinded for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}

impl Kinded for database::Error {
    fn kind(&self) -> Kind {
        Kind::Internal
    }
}

impl Kinded for user::AccessError {
    fn kind(&self) -> Kind {
        match self {
            Self::Unauthorized => Kind::Unauthorized,
            Self::NotDriver(_) | Self::NotShipper(_) => Kind::Forbidden,
        }
    }
}
