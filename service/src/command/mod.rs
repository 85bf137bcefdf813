//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_announcement;
pub mod create_demand;
pub mod create_user;
pub mod create_user_session;
pub mod delete_announcement;
pub mod update_announcement;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_announcement::CreateAnnouncement, create_demand::CreateDemand,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_announcement::DeleteAnnouncement,
    update_announcement::UpdateAnnouncement,
};
