//! [`User`] read model definitions.
//!
//! [`User`]: crate::domain::User

use crate::domain::{user, User};

/// Public projection of a driver, attached to listed announcements.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// ID of the [`User`].
    pub id: user::Id,

    /// First [`user::Name`] of the [`User`].
    pub first_name: user::Name,

    /// Last [`user::Name`] of the [`User`].
    pub last_name: user::Name,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,
}

impl From<User> for Summary {
    fn from(user: User) -> Self {
        Contact::from(user).into()
    }
}

/// Detailed projection of a driver, attached to a single announcement.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    /// ID of the [`User`].
    pub id: user::Id,

    /// First [`user::Name`] of the [`User`].
    pub first_name: user::Name,

    /// Last [`user::Name`] of the [`User`].
    pub last_name: user::Name,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::Phone`] of the [`User`], if any.
    pub phone: Option<user::Phone>,
}

impl From<User> for Contact {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
        }
    }
}

impl From<Contact> for Summary {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
        }
    }
}
