//! Fixtures shared by [`Service`] tests.

use std::time::Duration;

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    command::{self, Command as _},
    domain::{announcement, demand, user, Announcement, Demand, User},
    infra::{Database as _, Memory},
    Config, Service,
};

/// Secret the test [`Config`] signs tokens with.
const JWT_SECRET: &[u8] = b"test-secret";

/// Returns [`Config`] used in tests.
pub(crate) fn config() -> Config {
    Config {
        jwt_encoding_key: EncodingKey::from_secret(JWT_SECRET),
        jwt_decoding_key: DecodingKey::from_secret(JWT_SECRET),
        session_ttl: Duration::from_secs(30 * 60),
        empty_list_is_not_found: true,
    }
}

/// Creates a new [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(config(), Memory::new())
}

/// Builds a new [`User`] with the provided [`user::Role`].
///
/// Its password hash is a placeholder never matching any password.
pub(crate) fn user(role: user::Role) -> User {
    let id = user::Id::new();

    // SAFETY: Fixture users never log in with a password.
    #[expect(unsafe_code, reason = "test fixture")]
    let password_hash = unsafe { user::PasswordHash::new_unchecked("") };

    User {
        id,
        first_name: user::Name::new("Youssef").unwrap(),
        last_name: user::Name::new("Alaoui").unwrap(),
        email: user::Email::new(format!("{id}@example.com")).unwrap(),
        phone: user::Phone::new("+212 661 234 567"),
        password_hash,
        role,
        created_at: DateTime::now().coerce(),
    }
}

/// Stores a new [`User`] with the provided [`user::Role`] and returns its
/// [`user::Identity`].
pub(crate) async fn register(
    svc: &Service<Memory>,
    role: user::Role,
) -> user::Identity {
    let user = user(role);
    svc.database().execute(Insert(user.clone())).await.unwrap();
    user.identity()
}

/// Returns a valid [`command::CreateAnnouncement`] on behalf of the provided
/// `identity`, departing tomorrow.
pub(crate) fn new_announcement(
    identity: user::Identity,
) -> command::CreateAnnouncement {
    command::CreateAnnouncement {
        identity: Some(identity),
        start_point: Some("Casablanca".into()),
        waypoints: vec!["Mohammedia".into()],
        destination: Some("Rabat".into()),
        max_dimensions: None,
        package_types: vec!["parcel".into()],
        available_capacity: Some(500.0),
        start_date: Some(DateTime::now() + Duration::from_secs(24 * 60 * 60)),
    }
}

/// Publishes a valid [`Announcement`] on behalf of the provided driver.
pub(crate) async fn publish(
    svc: &Service<Memory>,
    driver: user::Identity,
) -> Announcement {
    svc.execute(new_announcement(driver)).await.unwrap()
}

/// Stores a new [`Demand`] with the provided [`demand::Status`] on the
/// provided [`Announcement`].
pub(crate) async fn place_demand(
    svc: &Service<Memory>,
    announcement_id: announcement::Id,
    status: demand::Status,
) -> Demand {
    let demand = Demand {
        id: demand::Id::new(),
        announcement_id,
        shipper_id: user::Id::new(),
        status,
        created_at: DateTime::now().coerce(),
    };
    svc.database().execute(Insert(demand.clone())).await.unwrap();
    demand
}

/// Loads the [`Announcement`] with the provided ID right from the database.
pub(crate) async fn stored(
    svc: &Service<Memory>,
    id: announcement::Id,
) -> Option<Announcement> {
    svc.database()
        .execute(Select(By::<Option<Announcement>, _>::new(id)))
        .await
        .unwrap()
}
