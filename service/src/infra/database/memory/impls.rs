//! [`Database`] implementations of [`Memory`].

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{announcement, demand, user, Announcement, Demand, User},
    infra::{database, Database},
    read,
};

use super::{Memory, State, Storage};

/// Inserts the provided `value` into `values`, or replaces the one with the
/// same key.
fn upsert<T, K>(values: &mut Vec<T>, value: T, key: impl Fn(&T) -> K)
where
    K: PartialEq,
{
    let k = key(&value);
    if let Some(existing) = values.iter_mut().find(|v| key(v) == k) {
        *existing = value;
    } else {
        values.push(value);
    }
}

impl State {
    /// Returns the [`User`] with the provided ID, if any.
    fn user(&self, id: user::Id) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

impl<S: Storage> Database<Select<By<Option<User>, user::Id>>> for Memory<S> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.user(id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<'l, S: Storage> Database<Select<By<Option<User>, &'l user::Email>>>
    for Memory<S>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.read(|s| s.users.iter().find(|u| &u.email == email).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<User>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.users, user, |u| u.id))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Announcement>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(announcement): Insert<Announcement>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(announcement))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Announcement>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(announcement): Update<Announcement>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.announcements, announcement, |a| a.id))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Delete<By<Announcement, announcement::Id>>>
    for Memory<S>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Announcement, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| s.announcements.retain(|a| a.id != id))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Lock<By<Announcement, announcement::Id>>>
    for Memory<S>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Announcement, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // `Tx` already holds the whole `State` exclusively.
        Ok(())
    }
}

impl<S: Storage> Database<Select<By<Option<Announcement>, announcement::Id>>>
    for Memory<S>
{
    type Ok = Option<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Announcement>, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.announcements.iter().find(|a| a.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage>
    Database<Select<By<Option<Announcement>, read::announcement::OwnedBy>>>
    for Memory<S>
{
    type Ok = Option<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Announcement>, read::announcement::OwnedBy>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::OwnedBy {
            announcement_id,
            driver_id,
        } = by.into_inner();
        self.read(|s| {
            s.announcements
                .iter()
                .find(|a| a.id == announcement_id && a.is_owned_by(driver_id))
                .cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage>
    Database<Select<By<Vec<Announcement>, read::announcement::Selector>>>
    for Memory<S>
{
    type Ok = Vec<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Announcement>, read::announcement::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::Selector { driver_id, status } =
            by.into_inner();
        let mut found = self
            .read(|s| {
                // Latest insertions go first among equal creation times.
                s.announcements
                    .iter()
                    .rev()
                    .filter(|a| a.is_owned_by(driver_id))
                    .filter(|a| status.map_or(true, |st| a.status == st))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

impl<S, D> Database<Select<By<Vec<read::announcement::WithDriver<D>>, ()>>>
    for Memory<S>
where
    S: Storage,
    D: From<User>,
{
    type Ok = Vec<read::announcement::WithDriver<D>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::announcement::WithDriver<D>>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut found = self
            .read(|s| {
                s.announcements
                    .iter()
                    .filter_map(|a| {
                        let driver = s.user(a.driver_id)?.clone();
                        Some((a.clone(), driver))
                    })
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by(|(a, _), (b, _)| a.created_at.cmp(&b.created_at));
        Ok(found
            .into_iter()
            .map(|(announcement, driver)| read::announcement::WithDriver {
                announcement,
                driver: driver.into(),
            })
            .collect())
    }
}

impl<S, D>
    Database<
        Select<
            By<Option<read::announcement::WithDriver<D>>, announcement::Id>,
        >,
    > for Memory<S>
where
    S: Storage,
    D: From<User>,
{
    type Ok = Option<read::announcement::WithDriver<D>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::announcement::WithDriver<D>>, announcement::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let found = self
            .read(|s| {
                let announcement = s.announcements.iter().find(|a| a.id == id)?;
                let driver = s.user(announcement.driver_id)?;
                Some((announcement.clone(), driver.clone()))
            })
            .await
            .map_err(tracerr::wrap!())?;
        Ok(found.map(|(announcement, driver)| {
            read::announcement::WithDriver {
                announcement,
                driver: driver.into(),
            }
        }))
    }
}

impl<S: Storage> Database<Insert<Demand>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(demand): Insert<Demand>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.demands, demand, |d| d.id))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<demand::Transition>> for Memory<S> {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<demand::Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let demand::Transition {
            announcement_id,
            from,
            to,
        } = transition;
        self.write(|s| {
            let mut count = 0_u64;
            for d in s.demands.iter_mut().filter(|d| {
                d.announcement_id == announcement_id && d.status == from
            }) {
                d.status = to;
                count += 1;
            }
            count
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Demand>, read::demand::Selector>>>
    for Memory<S>
{
    type Ok = Vec<Demand>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Demand>, read::demand::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::demand::Selector {
            announcement_ids,
            status,
        } = by.into_inner();
        let mut found = self
            .read(|s| {
                s.demands
                    .iter()
                    .filter(|d| announcement_ids.contains(&d.announcement_id))
                    .filter(|d| status.map_or(true, |st| d.status == st))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}
