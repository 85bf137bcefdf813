//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`], as resolved from a session.
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, Query as _};

    use super::ById;

    #[tokio::test]
    async fn fetches_profile() {
        let svc = fixture::service();
        let identity = fixture::register(&svc, user::Role::Driver).await;

        let found = svc.execute(ById::by(identity.user_id)).await.unwrap();
        assert_eq!(found.map(|u| u.role), Some(user::Role::Driver));

        let absent = svc.execute(ById::by(user::Id::new())).await.unwrap();
        assert!(absent.is_none());
    }
}
