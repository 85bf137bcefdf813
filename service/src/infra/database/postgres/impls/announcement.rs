//! [`Announcement`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{announcement, Announcement},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `announcements` table aliased as `a`, in the order
/// [`from_row()`] expects them.
const COLUMNS: &str = "\
    a.id, a.driver_id, \
    a.start_point, a.waypoints, a.destination, \
    a.max_length, a.max_width, a.max_height, \
    a.package_types, a.available_capacity, \
    a.start_date, a.end_date, \
    a.status, a.created_at";

/// Columns of the `users` table aliased as `u`, describing the driver of an
/// [`Announcement`].
const DRIVER_COLUMNS: &str = "\
    u.first_name AS driver_first_name, \
    u.last_name AS driver_last_name, \
    u.email AS driver_email, \
    u.phone AS driver_phone";

/// Builds an [`Announcement`] from the provided [`Row`] containing
/// [`COLUMNS`].
fn from_row(row: &Row) -> Announcement {
    let max_dimensions = match (
        row.get::<_, Option<announcement::Measure>>("max_length"),
        row.get::<_, Option<announcement::Measure>>("max_width"),
        row.get::<_, Option<announcement::Measure>>("max_height"),
    ) {
        (Some(length), Some(width), Some(height)) => {
            Some(announcement::Dimensions {
                length,
                width,
                height,
            })
        }
        _ => None,
    };

    Announcement {
        id: row.get("id"),
        driver_id: row.get("driver_id"),
        start_point: row.get("start_point"),
        waypoints: row.get("waypoints"),
        destination: row.get("destination"),
        max_dimensions,
        package_types: row.get("package_types"),
        available_capacity: row.get("available_capacity"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

/// Builds a [`read::announcement::WithDriver`] from the provided [`Row`]
/// containing [`COLUMNS`] and [`DRIVER_COLUMNS`].
fn with_driver_from_row<D>(row: &Row) -> read::announcement::WithDriver<D>
where
    D: From<read::user::Contact>,
{
    let announcement = from_row(row);
    let driver = read::user::Contact {
        id: announcement.driver_id,
        first_name: row.get("driver_first_name"),
        last_name: row.get("driver_last_name"),
        email: row.get("driver_email"),
        phone: row.get("driver_phone"),
    };
    read::announcement::WithDriver {
        announcement,
        driver: driver.into(),
    }
}

impl<C> Database<Insert<Announcement>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<Announcement>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
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

impl<C> Database<Update<Announcement>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(announcement): Update<Announcement>,
    ) -> Result<Self::Ok, Self::Err> {
        let Announcement {
            id,
            driver_id,
            start_point,
            waypoints,
            destination,
            max_dimensions,
            package_types,
            available_capacity,
            start_date,
            end_date,
            status,
            created_at,
        } = announcement;
        let max_length = max_dimensions.map(|d| d.length);
        let max_width = max_dimensions.map(|d| d.width);
        let max_height = max_dimensions.map(|d| d.height);

        const SQL: &str = "\
            INSERT INTO announcements (\
                id, driver_id, \
                start_point, waypoints, destination, \
                max_length, max_width, max_height, \
                package_types, available_capacity, \
                start_date, end_date, \
                status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR[], $5::VARCHAR, \
                $6::FLOAT8, $7::FLOAT8, $8::FLOAT8, \
                $9::VARCHAR[], $10::FLOAT8, \
                $11::TIMESTAMPTZ, $12::TIMESTAMPTZ, \
                $13::INT2, $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET start_point = EXCLUDED.start_point, \
                waypoints = EXCLUDED.waypoints, \
                destination = EXCLUDED.destination, \
                max_length = EXCLUDED.max_length, \
                max_width = EXCLUDED.max_width, \
                max_height = EXCLUDED.max_height, \
                package_types = EXCLUDED.package_types, \
                available_capacity = EXCLUDED.available_capacity, \
                start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &driver_id,
                &start_point,
                &waypoints,
                &destination,
                &max_length,
                &max_width,
                &max_height,
                &package_types,
                &available_capacity,
                &start_date,
                &end_date,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Announcement, announcement::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Announcement, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: announcement::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM announcements \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Announcement, announcement::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Announcement, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: announcement::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM announcements \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Announcement>, announcement::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Announcement>, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM announcements AS a \
             WHERE a.id = $1::UUID \
             LIMIT 1"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C>
    Database<Select<By<Option<Announcement>, read::announcement::OwnedBy>>>
    for Postgres<C>
where
    C: Connection,
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

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM announcements AS a \
             WHERE a.id = $1::UUID \
               AND a.driver_id = $2::UUID \
             LIMIT 1"
        );
        Ok(self
            .query_opt(&sql, &[&announcement_id, &driver_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C>
    Database<Select<By<Vec<Announcement>, read::announcement::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Announcement>, read::announcement::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::Selector { driver_id, status } =
            by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM announcements AS a \
             WHERE a.driver_id = $1::UUID \
               AND ($2::INT2 IS NULL OR a.status = $2::INT2) \
             ORDER BY a.created_at DESC, a.id"
        );
        Ok(self
            .query(&sql, &[&driver_id, &status])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C, D> Database<Select<By<Vec<read::announcement::WithDriver<D>>, ()>>>
    for Postgres<C>
where
    C: Connection,
    D: From<read::user::Contact>,
{
    type Ok = Vec<read::announcement::WithDriver<D>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::announcement::WithDriver<D>>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS}, {DRIVER_COLUMNS} \
             FROM announcements AS a \
             INNER JOIN users AS u ON u.id = a.driver_id \
             ORDER BY a.created_at, a.id"
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(with_driver_from_row)
            .collect())
    }
}

impl<C, D>
    Database<
        Select<
            By<Option<read::announcement::WithDriver<D>>, announcement::Id>,
        >,
    > for Postgres<C>
where
    C: Connection,
    D: From<read::user::Contact>,
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

        let sql = format!(
            "SELECT {COLUMNS}, {DRIVER_COLUMNS} \
             FROM announcements AS a \
             INNER JOIN users AS u ON u.id = a.driver_id \
             WHERE a.id = $1::UUID \
             LIMIT 1"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(with_driver_from_row))
    }
}
