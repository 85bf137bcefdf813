//! [`Demand`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{demand, Demand},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Insert<Demand>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(demand): Insert<Demand>,
    ) -> Result<Self::Ok, Self::Err> {
        let Demand {
            id,
            announcement_id,
            shipper_id,
            status,
            created_at,
        } = demand;

        const SQL: &str = "\
            INSERT INTO demands (\
                id, announcement_id, shipper_id, \
                status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::INT2, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status";
        self.exec(
            SQL,
            &[&id, &announcement_id, &shipper_id, &status, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<demand::Transition>> for Postgres<C>
where
    C: Connection,
{
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

        const SQL: &str = "\
            UPDATE demands \
            SET status = $3::INT2 \
            WHERE announcement_id = $1::UUID \
              AND status = $2::INT2";
        self.exec(SQL, &[&announcement_id, &from, &to])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Demand>, read::demand::Selector>>>
    for Postgres<C>
where
    C: Connection,
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
        if announcement_ids.is_empty() {
            return Ok(Vec::new());
        }

        const SQL: &str = "\
            SELECT id, announcement_id, shipper_id, \
                   status, created_at \
            FROM demands \
            WHERE announcement_id = ANY($1::UUID[]) \
              AND ($2::INT2 IS NULL OR status = $2::INT2) \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&announcement_ids, &status])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Demand {
                id: row.get("id"),
                announcement_id: row.get("announcement_id"),
                shipper_id: row.get("shipper_id"),
                status: row.get("status"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
